use crate::hub::*;

use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationSettings {
    #[serde(rename = "blanketPrimaryParty")]
    pub blanket_primary_party: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct HubConfig {
    #[serde(rename = "dataPath")]
    pub data_path: Option<String>,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
    pub validation: Option<ValidationSettings>,
}

pub fn read_config(path: &str) -> HubResult<HubConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: HubConfig = serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;
    info!("config: {:?}", config);
    Ok(config)
}

pub fn validation_rules(blanket_primary_party: Option<&str>) -> HubResult<ValidationRules> {
    let blanket_party = match blanket_primary_party {
        None | Some("reject") => BlanketPartyPolicy::Reject,
        Some("allow") => BlanketPartyPolicy::Allow,
        Some(x) => {
            whatever!(
                "Cannot understand blanketPrimaryParty option {:?}: expected reject or allow",
                x
            )
        }
    };
    Ok(ValidationRules {
        blanket_party,
        ..ValidationRules::DEFAULT_RULES
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_config() {
        let config: HubConfig = serde_json::from_str(
            r#"{"dataPath": "records.json", "validation": {"blanketPrimaryParty": "allow"}}"#,
        )
        .unwrap();
        assert_eq!(config.data_path.as_deref(), Some("records.json"));
        assert_eq!(config.output_path, None);
        let blanket = config.validation.and_then(|v| v.blanket_primary_party);
        assert_eq!(
            validation_rules(blanket.as_deref()).unwrap().blanket_party,
            BlanketPartyPolicy::Allow
        );
    }

    #[test]
    fn rejects_unknown_policy() {
        assert!(validation_rules(Some("maybe")).is_err());
        assert_eq!(
            validation_rules(None).unwrap(),
            ValidationRules::DEFAULT_RULES
        );
    }
}
