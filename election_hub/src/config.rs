// ********* Configuration **********

/// What to do with a blanket primary that names a party.
///
/// A blanket primary is either nonpartisan or has candidates from several
/// parties in the same race, so a single party is suspicious. Whether it is
/// an error is a policy choice left to the operators of the hub.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum BlanketPartyPolicy {
    Reject,
    Allow,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ValidationRules {
    pub blanket_party: BlanketPartyPolicy,
    /// Office slugs that denote a state legislative seat.
    pub state_leg_offices: &'static [&'static str],
}

impl ValidationRules {
    pub const DEFAULT_RULES: ValidationRules = ValidationRules {
        blanket_party: BlanketPartyPolicy::Reject,
        state_leg_offices: &["state-house", "state-senate"],
    };
}

impl Default for ValidationRules {
    fn default() -> Self {
        ValidationRules::DEFAULT_RULES
    }
}

/// The accepted values for the type of a primary.
pub const PRIMARY_TYPES: [&str; 4] = ["open", "closed", "blanket", "other"];
