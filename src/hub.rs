mod config_reader;
mod io_common;
mod io_fixture;

use log::{debug, info, warn};

use election_hub::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::{Args, Command};
use crate::hub::config_reader::*;
use crate::hub::io_common::*;
use crate::hub::io_fixture::*;

#[derive(Debug, Snafu)]
pub enum HubError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Fixture record {model} {pk}: cannot read fields"))]
    FixtureFields {
        model: String,
        pk: String,
        source: serde_json::Error,
    },
    #[snafu(display("Fixture record {model} {pk}: {message}"))]
    FixtureValue {
        model: String,
        pk: String,
        message: String,
    },
    #[snafu(display("No fixture file given (use --data or dataPath in the configuration)"))]
    MissingDataPath {},
    #[snafu(display("{count} election(s) failed validation"))]
    InvalidElections { count: usize },
    #[snafu(display("Collapse aborted"))]
    Collapse { source: CollapseError },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type HubResult<T> = Result<T, HubError>;

/// The options of a run, once the configuration file and the command line are merged.
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_path: String,
    pub output_path: Option<String>,
    pub rules: ValidationRules,
}

pub fn settings(args: &Args) -> HubResult<Settings> {
    let config = match &args.config {
        Some(p) => read_config(p)?,
        None => HubConfig::default(),
    };
    // Paths in the configuration are relative to the configuration file.
    let root = args
        .config
        .as_ref()
        .and_then(|p| Path::new(p).parent())
        .map(|p| p.to_path_buf())
        .unwrap_or_default();
    let resolve = |p: &String| -> String {
        let full: PathBuf = [root.as_path(), Path::new(p)].iter().collect();
        full.display().to_string()
    };

    let data_path = match (&args.data, &config.data_path) {
        (Some(p), _) => p.clone(),
        (None, Some(p)) => resolve(p),
        (None, None) => return MissingDataPathSnafu {}.fail(),
    };
    let blanket = args.blanket_primary_party.clone().or_else(|| {
        config
            .validation
            .as_ref()
            .and_then(|v| v.blanket_primary_party.clone())
    });
    let res = Settings {
        data_path,
        output_path: config.output_path.as_ref().map(resolve),
        rules: validation_rules(blanket.as_deref())?,
    };
    debug!("settings: {:?}", res);
    Ok(res)
}

pub fn run(args: &Args) -> HubResult<()> {
    let settings = settings(args)?;
    info!("Reading records from {:?}", settings.data_path);
    let fixture = read_fixture(&settings.data_path)?;

    match &args.command {
        Command::Validate { all } => {
            let report = validation_report(&fixture.store, &settings.rules, *all);
            for line in report.iter() {
                println!("{}", line);
            }
            let count = count_invalid(&fixture.store, &settings.rules);
            if count > 0 {
                return InvalidElectionsSnafu { count }.fail();
            }
            info!("All elections are valid");
        }
        Command::Keys => {
            for line in key_lines(&fixture.store) {
                println!("{}", line);
            }
        }
        Command::Status { out, reference } => {
            let out_path = out.clone().or_else(|| settings.output_path.clone());
            run_status(&fixture.store, out_path, reference.clone())?;
        }
        Command::Collapse { out, dry_run } => {
            let out_path = out.clone().or_else(|| settings.output_path.clone());
            run_collapse(fixture, out_path, *dry_run)?;
        }
    }
    Ok(())
}

/// One line per violated rule. Without `all`, only the first violation of each
/// election is reported.
pub fn validation_report<R: HubReader>(store: &R, rules: &ValidationRules, all: bool) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for e in store.elections(&ElectionFilter::default()) {
        let errors: Vec<ValidationError> = if all {
            violations(&e, rules)
        } else {
            validate(&e, rules).err().into_iter().collect()
        };
        for err in errors {
            lines.push(format!("{} [{}]: {}", e.elec_key_string(), err.field(), err));
        }
    }
    lines
}

fn count_invalid<R: HubReader>(store: &R, rules: &ValidationRules) -> usize {
    store
        .elections(&ElectionFilter::default())
        .iter()
        .filter(|e| validate(e, rules).is_err())
        .count()
}

pub fn key_lines<R: HubReader>(store: &R) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for e in store.elections(&ElectionFilter::default()) {
        lines.push(format!("election {:>5}  {}", e.id, e.elec_key_string()));
    }
    for log in store.logs() {
        let contact = log.contact.and_then(|id| store.contact(id));
        if log.contact.is_some() && contact.is_none() {
            warn!("log {}: unknown contact {:?}", log.id, log.contact);
        }
        lines.push(format!(
            "log {:>10}  {}",
            log.id,
            log.log_key_string(contact.as_ref())
        ));
    }
    lines
}

pub fn run_status<R: HubReader>(
    store: &R,
    out_path: Option<String>,
    check_status_path: Option<String>,
) -> HubResult<String> {
    let status = status_json(store).context(ParsingJsonSnafu {})?;
    let status_js: JSValue = serde_json::from_str(&status).context(ParsingJsonSnafu {})?;
    let pretty_js_status = serde_json::to_string_pretty(&status_js).context(ParsingJsonSnafu {})?;
    write_output(out_path.as_deref(), &pretty_js_status)?;

    // The reference status, if provided for comparison
    if let Some(ref_p) = check_status_path {
        let status_ref = read_json(&ref_p)?;
        let pretty_js_status_ref =
            serde_json::to_string_pretty(&status_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_status_ref != pretty_js_status {
            warn!("Found differences with the reference status");
            print_diff(
                pretty_js_status_ref.as_str(),
                pretty_js_status.as_str(),
                "\n",
            );
            whatever!("Difference detected between computed status and reference status")
        }
    }
    Ok(pretty_js_status)
}

pub fn run_collapse(
    mut fixture: Fixture,
    out_path: Option<String>,
    dry_run: bool,
) -> HubResult<CollapseReport> {
    let plan = plan_collapse(&fixture.store).context(CollapseSnafu {})?;
    if dry_run {
        for merge in plan.primaries.iter() {
            println!("keep   {:>5}  {}", merge.keep.id, merge.keep);
            for dup in merge.delete.iter() {
                println!("merge  {:>5}  {}", dup.id, dup);
            }
        }
        for dedup in plan.specials.iter() {
            println!("keep   {:>5}  {}", dedup.keep.id, dedup.keep);
            for dup in dedup.delete.iter() {
                println!("delete {:>5}  {}", dup.id, dup);
            }
        }
        return Ok(CollapseReport {
            merged_groups: plan.primaries.len() + plan.specials.len(),
            updated: Vec::new(),
            deleted: plan.deleted_ids(),
        });
    }

    let report = apply_collapse(&mut fixture.store, &plan).context(CollapseSnafu {})?;
    info!(
        "Collapsed {} group(s): {} record(s) deleted, {} updated",
        report.merged_groups,
        report.deleted.len(),
        report.updated.len()
    );
    let contents = write_fixture_json(&fixture)?;
    write_output(out_path.as_deref(), &contents)?;
    Ok(report)
}

pub fn read_json(path: &str) -> HubResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_path(name: &str) -> String {
        format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    fn load(name: &str) -> Fixture {
        let _ = env_logger::builder().is_test(true).try_init();
        read_fixture(&fixture_path(name)).unwrap()
    }

    fn election(fixture: &Fixture, id: ElectionId) -> Election {
        fixture
            .store
            .elections(&ElectionFilter::default())
            .into_iter()
            .find(|e| e.id == id)
            .unwrap()
    }

    #[test]
    fn florida_keys() {
        let f = load("elections.json");
        assert_eq!(
            election(&f, 4).elec_key_string(),
            "2012-11-06 - FL - general (prez, senate, house, state_officers, state_leg)"
        );
        assert_eq!(
            election(&f, 30).elec_key().parts(),
            vec!["2012-08-14", "FL", "primary", "REP", "senate", "house", "state_leg"]
        );
        assert_eq!(
            election(&f, 31).elec_key_string(),
            "2012-01-31 - FL - primary/REP (prez)"
        );
        assert_eq!(
            election(&f, 35).special_key(),
            vec!["special", "state-senate", "1"]
        );
        assert!(election(&f, 4).special_key().is_empty());
    }

    #[test]
    fn florida_validation() {
        let f = load("elections.json");
        let rules = ValidationRules::DEFAULT_RULES;
        assert!(validation_report(&f.store, &rules, true).is_empty());

        let mut special = election(&f, 36);
        special.office = Some("state-house".to_string());
        special.district = String::new();
        assert!(validate(&special, &rules).is_err());
    }

    #[test]
    fn log_keys_resolve_contacts() {
        let f = load("elections.json");
        let lines = key_lines(&f.store);
        assert!(lines
            .iter()
            .any(|l| l.ends_with("FL - 2013-01-15 - Request for precinct results - Ann Smith")));
        assert!(lines
            .iter()
            .any(|l| l.ends_with("FL - 2013-02-01 - Follow-up call")));
    }

    #[test]
    fn status_matches_reference() {
        let f = load("state_status.json");
        let pretty = run_status(
            &f.store,
            Some(std::env::temp_dir().join("hubctl_status.json").display().to_string()),
            Some(fixture_path("state_status_expected.json")),
        )
        .unwrap();

        let statuses: JSValue = serde_json::from_str(&pretty).unwrap();
        let statuses = statuses.as_array().unwrap();
        assert_eq!(statuses.len(), 2);
        let status = &statuses[0];
        assert_eq!(status["postal"], "IL");
        assert_eq!(status["name"], "Illinois");
        assert_eq!(status["metadata_status"], "partial");
        assert_eq!(status["volunteers"].as_array().unwrap().len(), 1);
        assert_eq!(status["volunteers"][0]["full_name"], "Aaliyah Clay");
    }

    #[test]
    fn collapse_writes_merged_fixture() {
        let f = load("elections.json");
        let out = std::env::temp_dir().join("hubctl_collapsed.json");
        let report = run_collapse(f, Some(out.display().to_string()), false).unwrap();
        assert_eq!(report.deleted, vec![32, 37]);
        assert_eq!(report.updated, vec![30]);

        let collapsed = read_fixture(&out.display().to_string()).unwrap();
        let merged = election(&collapsed, 30);
        assert_eq!(merged.offices(), vec!["prez", "senate", "house", "state_leg"]);
        // Records of other models are written back untouched.
        assert_eq!(collapsed.passthrough.len(), 2);

        // Running again on the collapsed records changes nothing.
        let again = run_collapse(collapsed, Some(out.display().to_string()), true).unwrap();
        assert!(again.deleted.is_empty());
    }

    #[test]
    fn collapse_aborts_on_undated_special() {
        let mut f = load("elections.json");
        let mut undated = election(&f, 35);
        undated.id = 99;
        undated.end_date = None;
        f.store.insert_election(undated);
        let res = run_collapse(f, None, true);
        assert!(matches!(res, Err(HubError::Collapse { .. })));
    }
}
