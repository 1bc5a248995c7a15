// Identity keys for election and log records.
//
// The keys are used for display and to detect duplicate records, so their
// element order is fixed.

use std::fmt::Display;

use crate::model::*;

/// The canonical identity of an election.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct ElecKey {
    pub end_date: String,
    pub state: String,
    pub race_type: RaceType,
    /// Only set for primaries.
    pub party: Option<String>,
    /// The special key, empty for regularly scheduled races.
    pub special: Vec<String>,
    pub offices: Vec<OfficeFlag>,
}

impl ElecKey {
    /// The flat tuple form of the key.
    pub fn parts(&self) -> Vec<String> {
        let mut parts = vec![
            self.end_date.clone(),
            self.state.clone(),
            self.race_type.slug().to_string(),
        ];
        parts.extend(self.party.iter().cloned());
        parts.extend(self.special.iter().cloned());
        parts.extend(self.offices.iter().map(|o| o.name().to_string()));
        parts
    }
}

impl Display for ElecKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let race = match &self.party {
            Some(party) => format!("{}/{}", self.race_type.slug(), party),
            None => self.race_type.slug().to_string(),
        };
        let mut bits = vec![self.end_date.clone(), self.state.clone(), race];
        bits.extend(self.special.iter().cloned());
        write!(f, "{}", bits.join(" - "))?;
        if !self.offices.is_empty() {
            let names: Vec<&str> = self.offices.iter().map(|o| o.name()).collect();
            write!(f, " ({})", names.join(", "))?;
        }
        Ok(())
    }
}

impl Election {
    /// The contested offices, in canonical order.
    pub fn offices(&self) -> Vec<&'static str> {
        self.offices
            .contested()
            .iter()
            .map(|o| o.name())
            .collect()
    }

    pub fn elec_key(&self) -> ElecKey {
        let party = match self.race_type {
            RaceType::Primary => self.primary_party.clone(),
            _ => None,
        };
        ElecKey {
            end_date: self.end_date_string(),
            state: self.state.clone(),
            race_type: self.race_type,
            party,
            special: self.special_key(),
            offices: self.offices.contested(),
        }
    }

    /// The key rendered as `2012-08-14 - FL - primary/REP (senate, house)`.
    pub fn elec_key_string(&self) -> String {
        self.elec_key().to_string()
    }

    /// `("special", office, district)` for special races, empty otherwise.
    ///
    /// The district is left out when it is blank.
    pub fn special_key(&self) -> Vec<String> {
        if !self.is_special() {
            return Vec::new();
        }
        let mut key = vec![
            "special".to_string(),
            self.office.clone().unwrap_or_default(),
        ];
        if !self.district.is_empty() {
            key.push(self.district.clone());
        }
        key
    }
}

impl Log {
    /// `(state, date, subject)`, followed by the contact's name when the log
    /// refers to a contact.
    ///
    /// The contact is resolved by the caller; passing `None` for a log that
    /// has a contact drops the name from the key, and so does passing a
    /// contact other than the one the log references.
    pub fn log_key(&self, contact: Option<&Contact>) -> Vec<String> {
        let mut key = vec![
            self.state.clone(),
            self.date.format("%Y-%m-%d").to_string(),
            self.subject.clone(),
        ];
        if let (Some(id), Some(c)) = (self.contact, contact) {
            if c.id == id {
                key.push(c.full_name());
            }
        }
        key
    }

    pub fn log_key_string(&self, contact: Option<&Contact>) -> String {
        self.log_key(contact).join(" - ")
    }
}
