// ********* Record data structures ***********

use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

pub type ElectionId = u32;
pub type LogId = u32;
pub type ContactId = u32;
pub type VolunteerId = u32;

/// The kind of race an election record describes.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum RaceType {
    General,
    Primary,
    Special,
}

impl RaceType {
    pub fn slug(&self) -> &'static str {
        match self {
            RaceType::General => "general",
            RaceType::Primary => "primary",
            RaceType::Special => "special",
        }
    }
}

impl Display for RaceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for RaceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(RaceType::General),
            "primary" => Ok(RaceType::Primary),
            "special" => Ok(RaceType::Special),
            x => Err(format!("unknown race type: {:?}", x)),
        }
    }
}

/// The categories of offices that may be contested in an election.
///
/// The declaration order is the canonical order used by the election keys.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum OfficeFlag {
    Prez,
    Senate,
    House,
    Gov,
    StateOfficers,
    StateLeg,
}

impl OfficeFlag {
    pub const ALL: [OfficeFlag; 6] = [
        OfficeFlag::Prez,
        OfficeFlag::Senate,
        OfficeFlag::House,
        OfficeFlag::Gov,
        OfficeFlag::StateOfficers,
        OfficeFlag::StateLeg,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OfficeFlag::Prez => "prez",
            OfficeFlag::Senate => "senate",
            OfficeFlag::House => "house",
            OfficeFlag::Gov => "gov",
            OfficeFlag::StateOfficers => "state_officers",
            OfficeFlag::StateLeg => "state_leg",
        }
    }
}

/// The office-contested flags of an election.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default, Hash)]
pub struct OfficeFlags {
    pub prez: bool,
    pub senate: bool,
    pub house: bool,
    pub gov: bool,
    pub state_officers: bool,
    pub state_leg: bool,
}

impl OfficeFlags {
    pub fn get(&self, flag: OfficeFlag) -> bool {
        match flag {
            OfficeFlag::Prez => self.prez,
            OfficeFlag::Senate => self.senate,
            OfficeFlag::House => self.house,
            OfficeFlag::Gov => self.gov,
            OfficeFlag::StateOfficers => self.state_officers,
            OfficeFlag::StateLeg => self.state_leg,
        }
    }

    pub fn set(&mut self, flag: OfficeFlag, value: bool) {
        let slot = match flag {
            OfficeFlag::Prez => &mut self.prez,
            OfficeFlag::Senate => &mut self.senate,
            OfficeFlag::House => &mut self.house,
            OfficeFlag::Gov => &mut self.gov,
            OfficeFlag::StateOfficers => &mut self.state_officers,
            OfficeFlag::StateLeg => &mut self.state_leg,
        };
        *slot = value;
    }

    pub fn any(&self) -> bool {
        OfficeFlag::ALL.iter().any(|f| self.get(*f))
    }

    /// The flags that are set, in canonical order.
    pub fn contested(&self) -> Vec<OfficeFlag> {
        OfficeFlag::ALL
            .iter()
            .copied()
            .filter(|f| self.get(*f))
            .collect()
    }

    /// Sets every flag that is set in `other`. Returns true if anything changed.
    pub fn merge(&mut self, other: &OfficeFlags) -> bool {
        let mut changed = false;
        for flag in OfficeFlag::ALL {
            if other.get(flag) && !self.get(flag) {
                self.set(flag, true);
                changed = true;
            }
        }
        changed
    }
}

/// The geographic granularities at which results are reported.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum ResultLevel {
    State,
    County,
    Precinct,
    CongDist,
    StateLeg,
}

impl ResultLevel {
    pub const ALL: [ResultLevel; 5] = [
        ResultLevel::State,
        ResultLevel::County,
        ResultLevel::Precinct,
        ResultLevel::CongDist,
        ResultLevel::StateLeg,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ResultLevel::State => "state",
            ResultLevel::County => "county",
            ResultLevel::Precinct => "precinct",
            ResultLevel::CongDist => "cong_dist",
            ResultLevel::StateLeg => "state_leg",
        }
    }
}

/// How far the results at one reporting level have been processed.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum LevelStatus {
    /// Loaded as-is from the raw source files.
    BakedRaw,
    /// Standardized and cleaned.
    Baked,
}

impl LevelStatus {
    pub fn slug(&self) -> &'static str {
        match self {
            LevelStatus::BakedRaw => "baked-raw",
            LevelStatus::Baked => "baked",
        }
    }
}

impl FromStr for LevelStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "baked-raw" => Ok(LevelStatus::BakedRaw),
            "baked" => Ok(LevelStatus::Baked),
            x => Err(format!("unknown level status: {:?}", x)),
        }
    }
}

/// Reporting information for one geographic level.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default, Hash)]
pub struct LevelReport {
    /// Results are published at this level.
    pub available: bool,
    pub status: Option<LevelStatus>,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Default, Hash)]
pub struct ReportingLevels {
    pub state: LevelReport,
    pub county: LevelReport,
    pub precinct: LevelReport,
    pub cong_dist: LevelReport,
    pub state_leg: LevelReport,
}

impl ReportingLevels {
    pub fn get(&self, level: ResultLevel) -> &LevelReport {
        match level {
            ResultLevel::State => &self.state,
            ResultLevel::County => &self.county,
            ResultLevel::Precinct => &self.precinct,
            ResultLevel::CongDist => &self.cong_dist,
            ResultLevel::StateLeg => &self.state_leg,
        }
    }

    pub fn get_mut(&mut self, level: ResultLevel) -> &mut LevelReport {
        match level {
            ResultLevel::State => &mut self.state,
            ResultLevel::County => &mut self.county,
            ResultLevel::Precinct => &mut self.precinct,
            ResultLevel::CongDist => &mut self.cong_dist,
            ResultLevel::StateLeg => &mut self.state_leg,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Election {
    pub id: ElectionId,
    /// Postal code of the state.
    pub state: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub race_type: RaceType,
    pub special: bool,
    /// Slug of the office, for itemized (special) races.
    pub office: Option<String>,
    pub district: String,
    pub primary_type: String,
    /// Slug of the party holding the primary.
    pub primary_party: Option<String>,
    pub offices: OfficeFlags,
    pub result_type: String,
    pub levels: ReportingLevels,
    pub absentee_and_provisional: bool,
    pub direct_link: String,
    pub portal_link: String,
    pub note: String,
    pub level_note: String,
    pub organization: Option<u32>,
    pub formats: Vec<String>,
    /// The user who entered the record.
    pub user: Option<u32>,
}

impl Election {
    pub fn is_special(&self) -> bool {
        self.special || self.race_type == RaceType::Special
    }

    pub fn end_date_string(&self) -> String {
        self.end_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

impl Display for Election {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.elec_key_string())
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Contact {
    pub id: ContactId,
    pub org: u32,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub mobile: String,
    pub note: String,
}

impl Contact {
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.middle_name, &self.last_name)
    }
}

/// A record of an exchange with a state's election officials.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Log {
    pub id: LogId,
    pub state: String,
    pub date: NaiveDate,
    pub subject: String,
    pub contact: Option<ContactId>,
    pub org: Option<u32>,
    pub user: u32,
    pub formal_request: bool,
    pub follow_up: Option<NaiveDate>,
    pub gdoc_link: String,
    pub notes: String,
}

/// How complete the election metadata is for a state.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize)]
pub enum MetadataStatus {
    #[serde(rename = "not-started")]
    NotStarted,
    #[serde(rename = "partial")]
    Partial,
    #[serde(rename = "up-to-date")]
    UpToDate,
}

impl MetadataStatus {
    pub fn slug(&self) -> &'static str {
        match self {
            MetadataStatus::NotStarted => "not-started",
            MetadataStatus::Partial => "partial",
            MetadataStatus::UpToDate => "up-to-date",
        }
    }
}

impl FromStr for MetadataStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not-started" | "" => Ok(MetadataStatus::NotStarted),
            "partial" => Ok(MetadataStatus::Partial),
            "up-to-date" => Ok(MetadataStatus::UpToDate),
            x => Err(format!("unknown metadata status: {:?}", x)),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct State {
    pub postal: String,
    pub name: String,
    pub note: String,
    pub metadata_status: MetadataStatus,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Volunteer {
    pub id: VolunteerId,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub email: String,
    pub website: String,
    pub twitter: String,
    pub affil: String,
    pub note: String,
    pub user: Option<u32>,
    /// Postal codes of the states this volunteer works on.
    pub states: Vec<String>,
    /// Slugs of the roles of this volunteer.
    pub roles: Vec<String>,
}

impl Volunteer {
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.middle_name, &self.last_name)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

fn full_name(first: &str, middle: &str, last: &str) -> String {
    [first, middle, last]
        .iter()
        .filter(|s| !s.is_empty())
        .cloned()
        .collect::<Vec<&str>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_reports_changes() {
        let mut kept = OfficeFlags {
            senate: true,
            ..Default::default()
        };
        let dup = OfficeFlags {
            prez: true,
            senate: true,
            ..Default::default()
        };
        assert!(kept.merge(&dup));
        assert_eq!(kept.contested(), vec![OfficeFlag::Prez, OfficeFlag::Senate]);
        assert!(!kept.merge(&dup));
    }

    #[test]
    fn full_name_skips_empty_middle() {
        assert_eq!(full_name("Aaliyah", "", "Clay"), "Aaliyah Clay");
        assert_eq!(full_name("John", "Q", "Public"), "John Q Public");
    }

    #[test]
    fn parses_slugs() {
        assert_eq!("primary".parse::<RaceType>(), Ok(RaceType::Primary));
        assert!("runoff".parse::<RaceType>().is_err());
        assert_eq!("baked-raw".parse::<LevelStatus>(), Ok(LevelStatus::BakedRaw));
        assert_eq!("".parse::<MetadataStatus>(), Ok(MetadataStatus::NotStarted));
    }
}
