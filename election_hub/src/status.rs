// Per-state status rollups, as shown on the public dashboard.

use log::debug;
use serde::Serialize;

use crate::model::*;
use crate::store::*;

/// Summary of how far the results of a state have been processed.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultsStatus {
    Raw,
    Clean,
}

/// The rules deciding the results status, evaluated in order. The first rule
/// matched by any election wins.
const RESULTS_STATUS_RULES: [(ResultLevel, LevelStatus, ResultsStatus); 4] = [
    (ResultLevel::Precinct, LevelStatus::Baked, ResultsStatus::Clean),
    (ResultLevel::County, LevelStatus::Baked, ResultsStatus::Clean),
    (ResultLevel::Precinct, LevelStatus::BakedRaw, ResultsStatus::Raw),
    (ResultLevel::County, LevelStatus::BakedRaw, ResultsStatus::Raw),
];

pub fn results_status(elections: &[Election]) -> Option<ResultsStatus> {
    RESULTS_STATUS_RULES
        .iter()
        .find(|(level, status, _)| {
            elections
                .iter()
                .any(|e| e.levels.get(*level).status == Some(*status))
        })
        .map(|(_, _, res)| *res)
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct VolunteerEntry {
    pub full_name: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct DevVolunteerEntry {
    pub full_name: String,
    pub website: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct StatusEntry {
    pub postal: String,
    pub name: String,
    pub metadata_status: MetadataStatus,
    pub results_status: Option<ResultsStatus>,
    pub volunteers: Vec<VolunteerEntry>,
    pub metadata_volunteers: Vec<VolunteerEntry>,
    pub dev_volunteers: Vec<DevVolunteerEntry>,
}

pub const DEV_ROLE: &str = "dev";
pub const METADATA_ROLE: &str = "metadata";

pub fn status_entry<R: HubReader>(store: &R, state: &State) -> StatusEntry {
    let elections = store.elections(&ElectionFilter {
        state: Some(state.postal.clone()),
        ..Default::default()
    });

    let mut assigned = store.volunteers_for_state(&state.postal);
    assigned.sort_by(|a, b| {
        (&a.last_name, &a.first_name).cmp(&(&b.last_name, &b.first_name))
    });

    let mut volunteers = Vec::new();
    let mut metadata_volunteers = Vec::new();
    let mut dev_volunteers = Vec::new();
    // Every volunteer goes into a single list.
    for v in assigned.iter() {
        if v.has_role(DEV_ROLE) {
            dev_volunteers.push(DevVolunteerEntry {
                full_name: v.full_name(),
                website: v.website.clone(),
            });
        } else if v.has_role(METADATA_ROLE) {
            metadata_volunteers.push(VolunteerEntry {
                full_name: v.full_name(),
            });
        } else {
            volunteers.push(VolunteerEntry {
                full_name: v.full_name(),
            });
        }
    }

    let entry = StatusEntry {
        postal: state.postal.clone(),
        name: state.name.clone(),
        metadata_status: state.metadata_status,
        results_status: results_status(&elections),
        volunteers,
        metadata_volunteers,
        dev_volunteers,
    };
    debug!("status_entry: {:?}", entry);
    entry
}

/// The status entries of all the states, ordered by state name.
pub fn status_entries<R: HubReader>(store: &R) -> Vec<StatusEntry> {
    store
        .states()
        .iter()
        .map(|s| status_entry(store, s))
        .collect()
}

/// The status entries of all the states as a JSON array.
pub fn status_json<R: HubReader>(store: &R) -> serde_json::Result<String> {
    serde_json::to_string(&status_entries(store))
}
