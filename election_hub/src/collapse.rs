// One-off collapse of duplicate primary records.
//
// Older data entry created one primary record per party and per batch of
// offices. Primaries held by a state on the same day are collapsed into one
// record carrying all the contested offices. Special primaries are single
// races, so duplicates are simply removed.
//
// The store must not be written to by anyone else while this runs.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::{debug, info};
use snafu::prelude::*;

use crate::model::*;
use crate::store::*;

#[derive(Debug, Snafu, Eq, PartialEq, Clone)]
pub enum CollapseError {
    #[snafu(display("special primary {election} has no end_date"))]
    MissingEndDate { id: ElectionId, election: String },

    #[snafu(display("store error while collapsing"))]
    Store { source: StoreError },
}

pub type CollapseResult<T> = Result<T, CollapseError>;

/// Primaries of one state on one day, merged into the first record.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PrimaryMerge {
    /// The kept record, with the office flags of the duplicates merged in.
    pub keep: Election,
    /// True if merging changed the flags of the kept record.
    pub changed: bool,
    pub delete: Vec<Election>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SpecialDedup {
    pub keep: Election,
    pub delete: Vec<Election>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct CollapsePlan {
    pub primaries: Vec<PrimaryMerge>,
    pub specials: Vec<SpecialDedup>,
}

impl CollapsePlan {
    pub fn is_empty(&self) -> bool {
        self.primaries.is_empty() && self.specials.is_empty()
    }

    pub fn deleted_ids(&self) -> Vec<ElectionId> {
        let mut ids: Vec<ElectionId> = self
            .primaries
            .iter()
            .flat_map(|m| m.delete.iter().map(|e| e.id))
            .chain(
                self.specials
                    .iter()
                    .flat_map(|s| s.delete.iter().map(|e| e.id)),
            )
            .collect();
        ids.sort_unstable();
        ids
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct CollapseReport {
    pub merged_groups: usize,
    pub updated: Vec<ElectionId>,
    pub deleted: Vec<ElectionId>,
}

type PrimaryKey = (String, Option<NaiveDate>);
type SpecialKey = (String, NaiveDate, Option<String>, String);

/// Computes what the collapse would do, without touching the store.
///
/// Fails if any special primary has no end date.
pub fn plan_collapse<R: HubReader>(store: &R) -> CollapseResult<CollapsePlan> {
    let mut plan = CollapsePlan::default();

    let mut groups: BTreeMap<PrimaryKey, Vec<Election>> = BTreeMap::new();
    for e in store.elections(&ElectionFilter {
        race_type: Some(RaceType::Primary),
        special: Some(false),
        ..Default::default()
    }) {
        groups
            .entry((e.state.clone(), e.end_date))
            .or_default()
            .push(e);
    }

    let mut specials: BTreeMap<SpecialKey, Vec<Election>> = BTreeMap::new();
    for e in store.elections(&ElectionFilter {
        race_type: Some(RaceType::Primary),
        special: Some(true),
        ..Default::default()
    }) {
        let end_date = e.end_date.with_context(|| MissingEndDateSnafu {
            id: e.id,
            election: e.to_string(),
        })?;
        specials
            .entry((e.state.clone(), end_date, e.office.clone(), e.district.clone()))
            .or_default()
            .push(e);
    }

    for (key, elecs) in groups {
        if elecs.len() < 2 {
            continue;
        }
        debug!("plan_collapse: {:?} has {} elections to merge", key, elecs.len());
        let mut iter = elecs.into_iter();
        if let Some(mut keep) = iter.next() {
            let delete: Vec<Election> = iter.collect();
            let mut changed = false;
            for dup in delete.iter() {
                changed |= keep.offices.merge(&dup.offices);
            }
            plan.primaries.push(PrimaryMerge {
                keep,
                changed,
                delete,
            });
        }
    }

    for (key, elecs) in specials {
        if elecs.len() < 2 {
            continue;
        }
        debug!("plan_collapse: {:?} has {} duplicate specials", key, elecs.len());
        let mut iter = elecs.into_iter();
        if let Some(keep) = iter.next() {
            plan.specials.push(SpecialDedup {
                keep,
                delete: iter.collect(),
            });
        }
    }

    Ok(plan)
}

/// Writes a plan to the store. Every action is logged before it is applied.
pub fn apply_collapse<W: HubWriter>(
    store: &mut W,
    plan: &CollapsePlan,
) -> CollapseResult<CollapseReport> {
    let mut report = CollapseReport::default();

    for merge in plan.primaries.iter() {
        info!(
            "{} ({}) has {} elections to merge",
            merge.keep.state,
            merge.keep.end_date_string(),
            merge.delete.len() + 1
        );
        // The merged record is written before any duplicate goes away.
        if merge.changed {
            info!("Saving merged record: {} (id {})", merge.keep, merge.keep.id);
            store.save_election(&merge.keep).context(StoreSnafu {})?;
            report.updated.push(merge.keep.id);
        } else {
            info!("Kept {} (id {}) unchanged", merge.keep, merge.keep.id);
        }
        for dup in merge.delete.iter() {
            info!("Deleting {} (id {}), merged into id {}", dup, dup.id, merge.keep.id);
            store.delete_election(dup.id).context(StoreSnafu {})?;
            report.deleted.push(dup.id);
        }
        report.merged_groups += 1;
    }

    info!("Consolidating special primaries...");
    for dedup in plan.specials.iter() {
        for dup in dedup.delete.iter() {
            info!("Deleting {} (id {})", dup, dup.id);
            store.delete_election(dup.id).context(StoreSnafu {})?;
            report.deleted.push(dup.id);
        }
        info!("Kept {} (id {})", dedup.keep, dedup.keep.id);
        report.merged_groups += 1;
    }

    Ok(report)
}

/// Plans and applies the collapse.
pub fn collapse_elections<W: HubWriter>(store: &mut W) -> CollapseResult<CollapseReport> {
    let plan = plan_collapse(store)?;
    if plan.is_empty() {
        info!("No duplicate primaries found");
    }
    apply_collapse(store, &plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ElectionBuilder;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn primary(id: ElectionId, state: &str, date: &str, party: &str, offices: &[OfficeFlag]) -> Election {
        ElectionBuilder::new(id, state, RaceType::Primary, day(date))
            .end_date(day(date))
            .primary("closed", Some(party))
            .offices(offices)
            .build()
    }

    fn special(id: ElectionId, date: Option<&str>, district: &str) -> Election {
        let mut b = ElectionBuilder::new(id, "FL", RaceType::Primary, day("2011-09-20"))
            .primary("closed", Some("DEM"))
            .special("state-senate", district);
        if let Some(d) = date {
            b = b.end_date(day(d));
        }
        b.build()
    }

    fn dataset() -> MemoryStore {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut store = MemoryStore::new();
        store.insert_election(primary(30, "FL", "2012-08-14", "REP", &[OfficeFlag::Senate]));
        store.insert_election(primary(32, "FL", "2012-08-14", "DEM", &[OfficeFlag::House]));
        store.insert_election(primary(33, "FL", "2012-08-14", "DEM", &[OfficeFlag::StateLeg]));
        store.insert_election(primary(31, "FL", "2012-01-31", "REP", &[OfficeFlag::Prez]));
        store.insert_election(primary(40, "MD", "2012-04-03", "REP", &[OfficeFlag::Prez]));
        store.insert_election(special(35, Some("2011-09-20"), "1"));
        store.insert_election(special(36, Some("2011-09-20"), "1"));
        store.insert_election(special(37, Some("2011-09-20"), "2"));
        store.insert_election(
            ElectionBuilder::new(4, "FL", RaceType::General, day("2012-11-06"))
                .end_date(day("2012-11-06"))
                .offices(&[OfficeFlag::Prez])
                .build(),
        );
        store.insert_election(
            ElectionBuilder::new(5, "FL", RaceType::General, day("2012-11-06"))
                .end_date(day("2012-11-06"))
                .offices(&[OfficeFlag::Senate])
                .build(),
        );
        store
    }

    fn ids(store: &MemoryStore) -> Vec<ElectionId> {
        store
            .elections(&ElectionFilter::default())
            .iter()
            .map(|e| e.id)
            .collect()
    }

    #[test]
    fn merges_primaries_on_the_same_day() {
        let mut store = dataset();
        let report = collapse_elections(&mut store).unwrap();
        assert_eq!(report.deleted, vec![32, 33, 36]);
        assert_eq!(report.updated, vec![30]);
        assert_eq!(report.merged_groups, 2);

        // Generals are never merged.
        assert_eq!(ids(&store), vec![4, 5, 30, 31, 35, 37, 40]);

        let merged = store
            .elections(&ElectionFilter::default())
            .into_iter()
            .find(|e| e.id == 30)
            .unwrap();
        assert_eq!(merged.offices(), vec!["senate", "house", "state_leg"]);
        assert_eq!(merged.primary_party, Some("REP".to_string()));
    }

    #[test]
    fn second_run_is_a_no_op() {
        let mut store = dataset();
        collapse_elections(&mut store).unwrap();
        let snapshot = store.elections(&ElectionFilter::default());

        let plan = plan_collapse(&store).unwrap();
        assert!(plan.is_empty());
        let report = collapse_elections(&mut store).unwrap();
        assert_eq!(report, CollapseReport::default());
        assert_eq!(store.elections(&ElectionFilter::default()), snapshot);
    }

    #[test]
    fn missing_end_date_aborts_before_any_change() {
        let mut store = dataset();
        store.insert_election(special(50, None, "7"));
        let before = store.elections(&ElectionFilter::default());

        let err = collapse_elections(&mut store).unwrap_err();
        assert!(matches!(err, CollapseError::MissingEndDate { id: 50, .. }));
        assert_eq!(store.elections(&ElectionFilter::default()), before);
    }

    #[test]
    fn plan_lists_deletions() {
        let plan = plan_collapse(&dataset()).unwrap();
        assert_eq!(plan.deleted_ids(), vec![32, 33, 36]);
        assert_eq!(plan.primaries.len(), 1);
        assert!(plan.primaries[0].changed);
        assert_eq!(plan.specials[0].keep.id, 35);
    }

    #[test]
    fn unchanged_kept_record_is_not_saved() {
        let mut store = MemoryStore::new();
        store.insert_election(primary(1, "OH", "2012-03-06", "REP", &[OfficeFlag::Prez]));
        store.insert_election(primary(2, "OH", "2012-03-06", "DEM", &[OfficeFlag::Prez]));
        let report = collapse_elections(&mut store).unwrap();
        assert_eq!(report.deleted, vec![2]);
        assert!(report.updated.is_empty());
    }

    // Accepts deletions but refuses to save.
    struct ReadOnlySaves(MemoryStore);

    impl HubReader for ReadOnlySaves {
        fn elections(&self, filter: &ElectionFilter) -> Vec<Election> {
            self.0.elections(filter)
        }
        fn states(&self) -> Vec<State> {
            self.0.states()
        }
        fn volunteers_for_state(&self, postal: &str) -> Vec<Volunteer> {
            self.0.volunteers_for_state(postal)
        }
        fn contact(&self, id: ContactId) -> Option<Contact> {
            self.0.contact(id)
        }
        fn logs(&self) -> Vec<Log> {
            self.0.logs()
        }
    }

    impl HubWriter for ReadOnlySaves {
        fn save_election(&mut self, election: &Election) -> StoreResult<()> {
            Err(StoreError::UnknownElection { id: election.id })
        }
        fn delete_election(&mut self, id: ElectionId) -> StoreResult<()> {
            self.0.delete_election(id)
        }
    }

    #[test]
    fn failed_save_keeps_the_duplicates() {
        let mut store = ReadOnlySaves(dataset());
        let before = ids(&store.0);

        let err = collapse_elections(&mut store).unwrap_err();
        assert!(matches!(err, CollapseError::Store { .. }));
        assert_eq!(ids(&store.0), before);
    }
}
