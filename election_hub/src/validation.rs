use log::debug;
use snafu::prelude::*;

use crate::config::*;
use crate::model::*;

/// A combination of fields that is not allowed on an election.
///
/// These are recoverable: the record must be corrected and checked again.
#[derive(Debug, Snafu, Eq, PartialEq, Clone)]
pub enum ValidationError {
    #[snafu(display("election {id}: general elections must contest at least one office"))]
    NoOfficeContested { id: ElectionId },

    #[snafu(display(
        "election {id}: general elections may not have a primary type (found {primary_type:?})"
    ))]
    PrimaryTypeOnGeneral { id: ElectionId, primary_type: String },

    #[snafu(display("election {id}: general elections may not have a primary party (found {party})"))]
    PrimaryPartyOnGeneral { id: ElectionId, party: String },

    #[snafu(display("election {id}: primaries must have a primary type"))]
    MissingPrimaryType { id: ElectionId },

    #[snafu(display("election {id}: unknown primary type {primary_type:?}"))]
    UnknownPrimaryType { id: ElectionId, primary_type: String },

    #[snafu(display("election {id}: {primary_type} primaries must have a party"))]
    MissingPrimaryParty { id: ElectionId, primary_type: String },

    #[snafu(display(
        "election {id}: blanket primaries are nonpartisan or multi-party and may not name a party (found {party})"
    ))]
    BlanketPrimaryParty { id: ElectionId, party: String },

    #[snafu(display("election {id}: special elections must have an office"))]
    MissingSpecialOffice { id: ElectionId },

    #[snafu(display("election {id}: special elections for {office} must have a district"))]
    MissingSpecialDistrict { id: ElectionId, office: String },
}

impl ValidationError {
    /// The field to correct.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::NoOfficeContested { .. } => "offices",
            ValidationError::PrimaryTypeOnGeneral { .. }
            | ValidationError::MissingPrimaryType { .. }
            | ValidationError::UnknownPrimaryType { .. } => "primary_type",
            ValidationError::PrimaryPartyOnGeneral { .. }
            | ValidationError::MissingPrimaryParty { .. }
            | ValidationError::BlanketPrimaryParty { .. } => "primary_party",
            ValidationError::MissingSpecialOffice { .. } => "office",
            ValidationError::MissingSpecialDistrict { .. } => "district",
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Checks an election before it is saved, stopping at the first violation.
pub fn validate(election: &Election, rules: &ValidationRules) -> ValidationResult<()> {
    match violations(election, rules).into_iter().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// All the violations of an election, in the order `validate` checks them.
pub fn violations(election: &Election, rules: &ValidationRules) -> Vec<ValidationError> {
    let mut errors: Vec<ValidationError> = Vec::new();
    // Itemized races are checked on their office first.
    if election.is_special() {
        check_special(election, rules, &mut errors);
    }
    match election.race_type {
        RaceType::General => check_general(election, &mut errors),
        RaceType::Primary => check_primary(election, rules, &mut errors),
        RaceType::Special => {}
    }
    debug!(
        "violations: election {}: {} violation(s)",
        election.id,
        errors.len()
    );
    errors
}

fn check_general(e: &Election, errors: &mut Vec<ValidationError>) {
    // An itemized race names its office instead of setting flags.
    if !e.offices.any() && e.office.is_none() {
        errors.push(ValidationError::NoOfficeContested { id: e.id });
    }
    if !e.primary_type.is_empty() {
        errors.push(ValidationError::PrimaryTypeOnGeneral {
            id: e.id,
            primary_type: e.primary_type.clone(),
        });
    }
    if let Some(party) = &e.primary_party {
        errors.push(ValidationError::PrimaryPartyOnGeneral {
            id: e.id,
            party: party.clone(),
        });
    }
}

fn check_primary(e: &Election, rules: &ValidationRules, errors: &mut Vec<ValidationError>) {
    match (e.primary_type.as_str(), &e.primary_party) {
        ("", _) => errors.push(ValidationError::MissingPrimaryType { id: e.id }),
        ("open" | "closed", None) => errors.push(ValidationError::MissingPrimaryParty {
            id: e.id,
            primary_type: e.primary_type.clone(),
        }),
        ("blanket", Some(party)) if rules.blanket_party == BlanketPartyPolicy::Reject => {
            errors.push(ValidationError::BlanketPrimaryParty {
                id: e.id,
                party: party.clone(),
            })
        }
        (x, _) if !PRIMARY_TYPES.contains(&x) => {
            errors.push(ValidationError::UnknownPrimaryType {
                id: e.id,
                primary_type: x.to_string(),
            })
        }
        _ => {}
    }
}

fn check_special(e: &Election, rules: &ValidationRules, errors: &mut Vec<ValidationError>) {
    match &e.office {
        None => errors.push(ValidationError::MissingSpecialOffice { id: e.id }),
        Some(office) if rules.state_leg_offices.contains(&office.as_str()) && e.district.is_empty() => {
            errors.push(ValidationError::MissingSpecialDistrict {
                id: e.id,
                office: office.clone(),
            })
        }
        Some(_) => {}
    }
}
