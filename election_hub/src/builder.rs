use chrono::NaiveDate;

pub use crate::model::*;

/// A builder for election records.
///
/// Only the fields that matter for keys, validation and status need to be set;
/// everything else starts empty.
///
/// ```
/// use chrono::NaiveDate;
/// use election_hub::builder::ElectionBuilder;
/// use election_hub::{OfficeFlag, RaceType};
///
/// let day = NaiveDate::from_ymd_opt(2012, 8, 14).unwrap();
/// let election = ElectionBuilder::new(30, "FL", RaceType::Primary, day)
///     .end_date(day)
///     .primary("closed", Some("REP"))
///     .offices(&[OfficeFlag::Senate, OfficeFlag::House])
///     .build();
///
/// assert_eq!(election.elec_key_string(), "2012-08-14 - FL - primary/REP (senate, house)");
/// ```
pub struct ElectionBuilder {
    election: Election,
}

impl ElectionBuilder {
    pub fn new(
        id: ElectionId,
        state: &str,
        race_type: RaceType,
        start_date: NaiveDate,
    ) -> ElectionBuilder {
        ElectionBuilder {
            election: Election {
                id,
                state: state.to_string(),
                start_date,
                end_date: None,
                race_type,
                special: race_type == RaceType::Special,
                office: None,
                district: String::new(),
                primary_type: String::new(),
                primary_party: None,
                offices: OfficeFlags::default(),
                result_type: String::new(),
                levels: ReportingLevels::default(),
                absentee_and_provisional: false,
                direct_link: String::new(),
                portal_link: String::new(),
                note: String::new(),
                level_note: String::new(),
                organization: None,
                formats: Vec::new(),
                user: None,
            },
        }
    }

    pub fn end_date(mut self, end_date: NaiveDate) -> ElectionBuilder {
        self.election.end_date = Some(end_date);
        self
    }

    pub fn primary(mut self, primary_type: &str, party: Option<&str>) -> ElectionBuilder {
        self.election.primary_type = primary_type.to_string();
        self.election.primary_party = party.map(|p| p.to_string());
        self
    }

    /// Marks the record as an itemized special race for one office.
    pub fn special(mut self, office: &str, district: &str) -> ElectionBuilder {
        self.election.special = true;
        self.election.office = Some(office.to_string());
        self.election.district = district.to_string();
        self
    }

    pub fn offices(mut self, flags: &[OfficeFlag]) -> ElectionBuilder {
        for flag in flags {
            self.election.offices.set(*flag, true);
        }
        self
    }

    pub fn level_status(mut self, level: ResultLevel, status: LevelStatus) -> ElectionBuilder {
        let report = self.election.levels.get_mut(level);
        report.available = true;
        report.status = Some(status);
        self
    }

    pub fn build(self) -> Election {
        self.election
    }
}
