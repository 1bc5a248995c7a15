// Reading and writing the JSON dump format of the tracking database:
// a list of {"model": "hub.election", "pk": 4, "fields": {...}} objects.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::hub::*;

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FixtureRecord {
    pub model: String,
    pub pk: JSValue,
    pub fields: JSValue,
}

/// The records of a fixture file.
#[derive(Debug, Clone, Default)]
pub struct Fixture {
    pub store: MemoryStore,
    /// Records of models the hub does not look at, written back as they were read.
    pub passthrough: Vec<FixtureRecord>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
struct StateFields {
    name: String,
    #[serde(default)]
    note: String,
    #[serde(default)]
    metadata_status: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
struct ElectionFields {
    state: String,
    start_date: NaiveDate,
    #[serde(default, deserialize_with = "blank_date")]
    end_date: Option<NaiveDate>,
    race_type: String,
    #[serde(default)]
    special: bool,
    #[serde(default)]
    office: Option<String>,
    #[serde(default)]
    district: String,
    #[serde(default)]
    primary_type: String,
    #[serde(default)]
    primary_party: Option<String>,
    #[serde(default)]
    prez: bool,
    #[serde(default)]
    senate: bool,
    #[serde(default)]
    house: bool,
    #[serde(default)]
    gov: bool,
    #[serde(default)]
    state_officers: bool,
    #[serde(default)]
    state_leg: bool,
    #[serde(default)]
    result_type: String,
    #[serde(default)]
    state_level: bool,
    #[serde(default)]
    county_level: bool,
    #[serde(default)]
    precinct_level: bool,
    #[serde(default)]
    cong_dist_level: bool,
    #[serde(default)]
    state_leg_level: bool,
    #[serde(default)]
    state_level_status: String,
    #[serde(default)]
    county_level_status: String,
    #[serde(default)]
    precinct_level_status: String,
    #[serde(default)]
    cong_dist_level_status: String,
    #[serde(default)]
    state_leg_level_status: String,
    #[serde(default)]
    absentee_and_provisional: bool,
    #[serde(default)]
    direct_link: String,
    #[serde(default)]
    portal_link: String,
    #[serde(default)]
    note: String,
    #[serde(default)]
    level_note: String,
    #[serde(default)]
    organization: Option<u32>,
    #[serde(default)]
    formats: Vec<String>,
    #[serde(default)]
    user: Option<u32>,
}

impl ElectionFields {
    fn level_fields(&self, level: ResultLevel) -> (bool, &String) {
        match level {
            ResultLevel::State => (self.state_level, &self.state_level_status),
            ResultLevel::County => (self.county_level, &self.county_level_status),
            ResultLevel::Precinct => (self.precinct_level, &self.precinct_level_status),
            ResultLevel::CongDist => (self.cong_dist_level, &self.cong_dist_level_status),
            ResultLevel::StateLeg => (self.state_leg_level, &self.state_leg_level_status),
        }
    }

    fn level_fields_mut(&mut self, level: ResultLevel) -> (&mut bool, &mut String) {
        match level {
            ResultLevel::State => (&mut self.state_level, &mut self.state_level_status),
            ResultLevel::County => (&mut self.county_level, &mut self.county_level_status),
            ResultLevel::Precinct => (&mut self.precinct_level, &mut self.precinct_level_status),
            ResultLevel::CongDist => (&mut self.cong_dist_level, &mut self.cong_dist_level_status),
            ResultLevel::StateLeg => (&mut self.state_leg_level, &mut self.state_leg_level_status),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
struct ContactFields {
    org: u32,
    first_name: String,
    #[serde(default)]
    middle_name: String,
    last_name: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    mobile: String,
    #[serde(default)]
    note: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
struct LogFields {
    state: String,
    date: NaiveDate,
    subject: String,
    #[serde(default)]
    contact: Option<u32>,
    #[serde(default)]
    org: Option<u32>,
    user: u32,
    #[serde(default)]
    formal_request: bool,
    #[serde(default, deserialize_with = "blank_date")]
    follow_up: Option<NaiveDate>,
    #[serde(default)]
    gdoc_link: String,
    #[serde(default)]
    notes: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
struct VolunteerFields {
    first_name: String,
    #[serde(default)]
    middle_name: String,
    last_name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    website: String,
    #[serde(default)]
    twitter: String,
    #[serde(default)]
    affil: String,
    #[serde(default)]
    note: String,
    #[serde(default)]
    user: Option<u32>,
    #[serde(default)]
    states: Vec<String>,
    #[serde(default)]
    roles: Vec<String>,
}

// Dates may be dumped as null or as an empty string.
fn blank_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref() {
        None | Some("") => Ok(None),
        Some(x) => NaiveDate::parse_from_str(x, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

pub fn read_fixture(path: &str) -> HubResult<Fixture> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("Read fixture file {:?}", path);
    parse_fixture(&contents)
}

pub fn parse_fixture(contents: &str) -> HubResult<Fixture> {
    let records: Vec<FixtureRecord> = serde_json::from_str(contents).context(ParsingJsonSnafu {})?;
    let mut fixture = Fixture::default();
    for rec in records {
        let replaced = match rec.model.as_str() {
            "hub.state" => fixture.store.insert_state(read_state(&rec)?).is_some(),
            "hub.election" => fixture.store.insert_election(read_election(&rec)?).is_some(),
            "hub.contact" => fixture.store.insert_contact(read_contact(&rec)?).is_some(),
            "hub.log" => fixture.store.insert_log(read_log(&rec)?).is_some(),
            "hub.volunteer" => fixture.store.insert_volunteer(read_volunteer(&rec)?).is_some(),
            x => {
                debug!("parse_fixture: keeping {} {} as is", x, rec.pk);
                fixture.passthrough.push(rec);
                continue;
            }
        };
        if replaced {
            return value_error(&rec, "duplicate primary key".to_string());
        }
    }
    info!(
        "Read {} elections, {} states, {} logs, {} other records",
        fixture.store.elections(&ElectionFilter::default()).len(),
        fixture.store.states().len(),
        fixture.store.logs().len(),
        fixture.passthrough.len()
    );
    Ok(fixture)
}

fn fields<T: for<'de> Deserialize<'de>>(rec: &FixtureRecord) -> HubResult<T> {
    serde_json::from_value(rec.fields.clone()).context(FixtureFieldsSnafu {
        model: rec.model.clone(),
        pk: rec.pk.to_string(),
    })
}

fn int_pk(rec: &FixtureRecord) -> HubResult<u32> {
    match rec.pk.as_u64().map(u32::try_from) {
        Some(Ok(x)) => Ok(x),
        Some(Err(_)) => value_error(rec, "primary key out of range".to_string()),
        None => value_error(rec, "expected an integer primary key".to_string()),
    }
}

fn value_error<T>(rec: &FixtureRecord, message: String) -> HubResult<T> {
    FixtureValueSnafu {
        model: rec.model.clone(),
        pk: rec.pk.to_string(),
        message,
    }
    .fail()
}

fn read_state(rec: &FixtureRecord) -> HubResult<State> {
    let f: StateFields = fields(rec)?;
    let postal = match rec.pk.as_str() {
        Some(p) => p.to_string(),
        None => return value_error(rec, "expected a postal code as primary key".to_string()),
    };
    let metadata_status = match f.metadata_status.parse::<MetadataStatus>() {
        Ok(x) => x,
        Err(msg) => return value_error(rec, msg),
    };
    Ok(State {
        postal,
        name: f.name,
        note: f.note,
        metadata_status,
    })
}

fn read_election(rec: &FixtureRecord) -> HubResult<Election> {
    let f: ElectionFields = fields(rec)?;
    let race_type = match f.race_type.parse::<RaceType>() {
        Ok(x) => x,
        Err(msg) => return value_error(rec, msg),
    };
    let mut levels = ReportingLevels::default();
    for level in ResultLevel::ALL {
        let (available, status) = f.level_fields(level);
        let report = levels.get_mut(level);
        report.available = available;
        report.status = match status.as_str() {
            "" => None,
            s => match s.parse::<LevelStatus>() {
                Ok(x) => Some(x),
                Err(msg) => return value_error(rec, format!("{}_level_status: {}", level.name(), msg)),
            },
        };
    }
    Ok(Election {
        id: int_pk(rec)?,
        state: f.state,
        start_date: f.start_date,
        end_date: f.end_date,
        race_type,
        special: f.special,
        office: f.office.filter(|o| !o.is_empty()),
        district: f.district,
        primary_type: f.primary_type,
        primary_party: f.primary_party.filter(|p| !p.is_empty()),
        offices: OfficeFlags {
            prez: f.prez,
            senate: f.senate,
            house: f.house,
            gov: f.gov,
            state_officers: f.state_officers,
            state_leg: f.state_leg,
        },
        result_type: f.result_type,
        levels,
        absentee_and_provisional: f.absentee_and_provisional,
        direct_link: f.direct_link,
        portal_link: f.portal_link,
        note: f.note,
        level_note: f.level_note,
        organization: f.organization,
        formats: f.formats,
        user: f.user,
    })
}

fn read_contact(rec: &FixtureRecord) -> HubResult<Contact> {
    let f: ContactFields = fields(rec)?;
    Ok(Contact {
        id: int_pk(rec)?,
        org: f.org,
        first_name: f.first_name,
        middle_name: f.middle_name,
        last_name: f.last_name,
        title: f.title,
        email: f.email,
        phone: f.phone,
        mobile: f.mobile,
        note: f.note,
    })
}

fn read_log(rec: &FixtureRecord) -> HubResult<Log> {
    let f: LogFields = fields(rec)?;
    Ok(Log {
        id: int_pk(rec)?,
        state: f.state,
        date: f.date,
        subject: f.subject,
        contact: f.contact,
        org: f.org,
        user: f.user,
        formal_request: f.formal_request,
        follow_up: f.follow_up,
        gdoc_link: f.gdoc_link,
        notes: f.notes,
    })
}

fn read_volunteer(rec: &FixtureRecord) -> HubResult<Volunteer> {
    let f: VolunteerFields = fields(rec)?;
    Ok(Volunteer {
        id: int_pk(rec)?,
        first_name: f.first_name,
        middle_name: f.middle_name,
        last_name: f.last_name,
        email: f.email,
        website: f.website,
        twitter: f.twitter,
        affil: f.affil,
        note: f.note,
        user: f.user,
        states: f.states,
        roles: f.roles,
    })
}

fn record<T: Serialize>(model: &str, pk: JSValue, fields: &T) -> HubResult<FixtureRecord> {
    Ok(FixtureRecord {
        model: model.to_string(),
        pk,
        fields: serde_json::to_value(fields).context(ParsingJsonSnafu {})?,
    })
}

fn election_fields(e: &Election) -> ElectionFields {
    let mut f = ElectionFields {
        state: e.state.clone(),
        start_date: e.start_date,
        end_date: e.end_date,
        race_type: e.race_type.slug().to_string(),
        special: e.special,
        office: e.office.clone(),
        district: e.district.clone(),
        primary_type: e.primary_type.clone(),
        primary_party: e.primary_party.clone(),
        prez: e.offices.prez,
        senate: e.offices.senate,
        house: e.offices.house,
        gov: e.offices.gov,
        state_officers: e.offices.state_officers,
        state_leg: e.offices.state_leg,
        result_type: e.result_type.clone(),
        state_level: false,
        county_level: false,
        precinct_level: false,
        cong_dist_level: false,
        state_leg_level: false,
        state_level_status: String::new(),
        county_level_status: String::new(),
        precinct_level_status: String::new(),
        cong_dist_level_status: String::new(),
        state_leg_level_status: String::new(),
        absentee_and_provisional: e.absentee_and_provisional,
        direct_link: e.direct_link.clone(),
        portal_link: e.portal_link.clone(),
        note: e.note.clone(),
        level_note: e.level_note.clone(),
        organization: e.organization,
        formats: e.formats.clone(),
        user: e.user,
    };
    for level in ResultLevel::ALL {
        let report = e.levels.get(level);
        let (available, status) = f.level_fields_mut(level);
        *available = report.available;
        *status = report
            .status
            .map(|s| s.slug().to_string())
            .unwrap_or_default();
    }
    f
}

/// Serializes all the records, the untouched ones first.
pub fn write_fixture_json(fixture: &Fixture) -> HubResult<String> {
    let store = &fixture.store;
    let mut records: Vec<FixtureRecord> = fixture.passthrough.clone();
    for s in store.states() {
        let f = StateFields {
            name: s.name.clone(),
            note: s.note.clone(),
            metadata_status: s.metadata_status.slug().to_string(),
        };
        records.push(record("hub.state", JSValue::from(s.postal.clone()), &f)?);
    }
    for c in store.all_contacts() {
        let f = ContactFields {
            org: c.org,
            first_name: c.first_name,
            middle_name: c.middle_name,
            last_name: c.last_name,
            title: c.title,
            email: c.email,
            phone: c.phone,
            mobile: c.mobile,
            note: c.note,
        };
        records.push(record("hub.contact", JSValue::from(c.id), &f)?);
    }
    for e in store.elections(&ElectionFilter::default()) {
        records.push(record("hub.election", JSValue::from(e.id), &election_fields(&e))?);
    }
    for l in store.logs() {
        let f = LogFields {
            state: l.state,
            date: l.date,
            subject: l.subject,
            contact: l.contact,
            org: l.org,
            user: l.user,
            formal_request: l.formal_request,
            follow_up: l.follow_up,
            gdoc_link: l.gdoc_link,
            notes: l.notes,
        };
        records.push(record("hub.log", JSValue::from(l.id), &f)?);
    }
    for v in store.all_volunteers() {
        let f = VolunteerFields {
            first_name: v.first_name,
            middle_name: v.middle_name,
            last_name: v.last_name,
            email: v.email,
            website: v.website,
            twitter: v.twitter,
            affil: v.affil,
            note: v.note,
            user: v.user,
            states: v.states,
            roles: v.roles,
        };
        records.push(record("hub.volunteer", JSValue::from(v.id), &f)?);
    }
    serde_json::to_string_pretty(&records).context(ParsingJsonSnafu {})
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORDS: &str = r#"[
        {"model": "hub.party", "pk": "REP", "fields": {"name": "Republican"}},
        {"model": "hub.state", "pk": "FL", "fields": {"name": "Florida", "metadata_status": "partial"}},
        {"model": "hub.election", "pk": 35, "fields": {
            "state": "FL", "start_date": "2011-09-20", "end_date": "2011-09-20",
            "race_type": "primary", "special": true, "office": "state-senate", "district": "1",
            "primary_type": "closed", "primary_party": "DEM",
            "precinct_level": true, "precinct_level_status": "baked-raw"}},
        {"model": "hub.election", "pk": 36, "fields": {
            "state": "FL", "start_date": "2012-04-10", "end_date": "",
            "race_type": "general", "special": true, "office": "state-house", "district": "33"}}
    ]"#;

    #[test]
    fn reads_records() {
        let f = parse_fixture(RECORDS).unwrap();
        assert_eq!(f.passthrough.len(), 1);
        let elections = f.store.elections(&ElectionFilter::default());
        assert_eq!(elections.len(), 2);
        assert_eq!(elections[0].special_key(), vec!["special", "state-senate", "1"]);
        assert_eq!(
            elections[0].levels.precinct,
            LevelReport {
                available: true,
                status: Some(LevelStatus::BakedRaw)
            }
        );
        assert_eq!(elections[1].end_date, None);
        assert_eq!(f.store.states()[0].metadata_status, MetadataStatus::Partial);
    }

    #[test]
    fn round_trips_modeled_fields() {
        let f = parse_fixture(RECORDS).unwrap();
        let written = write_fixture_json(&f).unwrap();
        let again = parse_fixture(&written).unwrap();
        assert_eq!(
            again.store.elections(&ElectionFilter::default()),
            f.store.elections(&ElectionFilter::default())
        );
        assert_eq!(again.store.states(), f.store.states());
        assert_eq!(again.passthrough, f.passthrough);
    }

    #[test]
    fn rejects_unknown_race_type() {
        let bad = r#"[{"model": "hub.election", "pk": 1, "fields": {
            "state": "FL", "start_date": "2012-01-01", "race_type": "runoff"}}]"#;
        assert!(matches!(
            parse_fixture(bad),
            Err(HubError::FixtureValue { .. })
        ));
    }

    fn election_record(pk: &str, state: &str) -> String {
        format!(
            r#"{{"model": "hub.election", "pk": {}, "fields": {{
            "state": "{}", "start_date": "2012-11-06", "race_type": "general", "prez": true}}}}"#,
            pk, state
        )
    }

    #[test]
    fn rejects_out_of_range_pk() {
        // 4294967300 would wrap around to 4.
        let records = format!(
            "[{}, {}]",
            election_record("4", "FL"),
            election_record("4294967300", "MD")
        );
        match parse_fixture(&records) {
            Err(HubError::FixtureValue { pk, message, .. }) => {
                assert_eq!(pk, "4294967300");
                assert_eq!(message, "primary key out of range");
            }
            other => panic!("unexpected result {:?}", other.map(|f| f.passthrough)),
        }
    }

    #[test]
    fn rejects_duplicate_pk() {
        let records = format!("[{}, {}]", election_record("4", "FL"), election_record("4", "MD"));
        match parse_fixture(&records) {
            Err(HubError::FixtureValue { model, pk, message }) => {
                assert_eq!(model, "hub.election");
                assert_eq!(pk, "4");
                assert_eq!(message, "duplicate primary key");
            }
            other => panic!("unexpected result {:?}", other.map(|f| f.passthrough)),
        }

        let states = r#"[
            {"model": "hub.state", "pk": "FL", "fields": {"name": "Florida"}},
            {"model": "hub.state", "pk": "FL", "fields": {"name": "Florida"}}]"#;
        assert!(matches!(
            parse_fixture(states),
            Err(HubError::FixtureValue { .. })
        ));
    }
}
