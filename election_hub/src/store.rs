// Data access for the hub records.

use std::collections::BTreeMap;

use log::debug;
use snafu::prelude::*;

use crate::model::*;

#[derive(Debug, Snafu, Eq, PartialEq, Clone)]
pub enum StoreError {
    #[snafu(display("no election with id {id}"))]
    UnknownElection { id: ElectionId },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Restricts the elections returned by a reader. Unset fields match anything.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ElectionFilter {
    pub state: Option<String>,
    pub race_type: Option<RaceType>,
    pub special: Option<bool>,
}

impl ElectionFilter {
    pub fn matches(&self, e: &Election) -> bool {
        self.state.as_ref().map_or(true, |s| *s == e.state)
            && self.race_type.map_or(true, |r| r == e.race_type)
            && self.special.map_or(true, |s| s == e.special)
    }
}

/// Read access to the records.
///
/// Elections are returned in ascending id order, states in ascending name order.
pub trait HubReader {
    fn elections(&self, filter: &ElectionFilter) -> Vec<Election>;
    fn states(&self) -> Vec<State>;
    fn volunteers_for_state(&self, postal: &str) -> Vec<Volunteer>;
    fn contact(&self, id: ContactId) -> Option<Contact>;
    fn logs(&self) -> Vec<Log>;
}

/// Write access, only needed to collapse duplicate elections.
pub trait HubWriter: HubReader {
    /// Replaces an existing election.
    fn save_election(&mut self, election: &Election) -> StoreResult<()>;
    fn delete_election(&mut self, id: ElectionId) -> StoreResult<()>;
}

/// Keeps all the records in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    elections: BTreeMap<ElectionId, Election>,
    states: BTreeMap<String, State>,
    volunteers: BTreeMap<VolunteerId, Volunteer>,
    contacts: BTreeMap<ContactId, Contact>,
    logs: BTreeMap<LogId, Log>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    // The insert_* methods return the record previously stored under the same key.

    pub fn insert_election(&mut self, election: Election) -> Option<Election> {
        self.elections.insert(election.id, election)
    }

    pub fn insert_state(&mut self, state: State) -> Option<State> {
        self.states.insert(state.postal.clone(), state)
    }

    pub fn insert_volunteer(&mut self, volunteer: Volunteer) -> Option<Volunteer> {
        self.volunteers.insert(volunteer.id, volunteer)
    }

    pub fn insert_contact(&mut self, contact: Contact) -> Option<Contact> {
        self.contacts.insert(contact.id, contact)
    }

    pub fn insert_log(&mut self, log: Log) -> Option<Log> {
        self.logs.insert(log.id, log)
    }

    pub fn all_volunteers(&self) -> Vec<Volunteer> {
        self.volunteers.values().cloned().collect()
    }

    pub fn all_contacts(&self) -> Vec<Contact> {
        self.contacts.values().cloned().collect()
    }
}

impl HubReader for MemoryStore {
    fn elections(&self, filter: &ElectionFilter) -> Vec<Election> {
        self.elections
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect()
    }

    fn states(&self) -> Vec<State> {
        let mut states: Vec<State> = self.states.values().cloned().collect();
        states.sort_by(|a, b| a.name.cmp(&b.name));
        states
    }

    fn volunteers_for_state(&self, postal: &str) -> Vec<Volunteer> {
        self.volunteers
            .values()
            .filter(|v| v.states.iter().any(|s| s == postal))
            .cloned()
            .collect()
    }

    fn contact(&self, id: ContactId) -> Option<Contact> {
        self.contacts.get(&id).cloned()
    }

    fn logs(&self) -> Vec<Log> {
        self.logs.values().cloned().collect()
    }
}

impl HubWriter for MemoryStore {
    fn save_election(&mut self, election: &Election) -> StoreResult<()> {
        let slot = self
            .elections
            .get_mut(&election.id)
            .context(UnknownElectionSnafu { id: election.id })?;
        debug!("save_election: {}", election.id);
        *slot = election.clone();
        Ok(())
    }

    fn delete_election(&mut self, id: ElectionId) -> StoreResult<()> {
        debug!("delete_election: {}", id);
        self.elections
            .remove(&id)
            .map(|_| ())
            .context(UnknownElectionSnafu { id })
    }
}
