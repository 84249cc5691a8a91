use std::collections::BTreeMap;

use crate::ConfigError;

/// Flat `config_settings` mapping handed over by the build front end.
pub type ConfigSettings = BTreeMap<String, String>;

pub const EXCLUDE_TESTS: &str = "exclude-tests";

const RECOGNIZED: &[&str] = &[EXCLUDE_TESTS];

/// Caller settings after validation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildSettings {
    pub exclude_tests: bool,
}

impl BuildSettings {
    /// Validate the raw front-end settings.
    ///
    /// `exclude-tests` is a flag: it must be present with an empty value or
    /// absent. Any other key is rejected.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unrecognized keys or a non-empty
    /// `exclude-tests` value.
    pub fn from_config_settings(settings: &ConfigSettings) -> Result<Self, ConfigError> {
        let unknown: Vec<String> = settings
            .keys()
            .filter(|key| !RECOGNIZED.contains(&key.as_str()))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(ConfigError::UnknownSettings { keys: unknown });
        }

        let exclude_tests = match settings.get(EXCLUDE_TESTS) {
            None => false,
            Some(value) if value.is_empty() => true,
            Some(value) => {
                return Err(ConfigError::UnexpectedSettingValue {
                    key: EXCLUDE_TESTS.to_string(),
                    value: value.clone(),
                })
            }
        };
        Ok(Self { exclude_tests })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(pairs: &[(&str, &str)]) -> ConfigSettings {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn empty_settings_do_not_exclude_tests() {
        let parsed = BuildSettings::from_config_settings(&settings(&[])).unwrap();
        assert!(!parsed.exclude_tests);
    }

    #[test]
    fn exclude_tests_flag_without_value() {
        let parsed =
            BuildSettings::from_config_settings(&settings(&[("exclude-tests", "")])).unwrap();
        assert!(parsed.exclude_tests);
    }

    #[test]
    fn exclude_tests_with_value_is_rejected() {
        let err = BuildSettings::from_config_settings(&settings(&[("exclude-tests", "yes")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnexpectedSettingValue {
                key: "exclude-tests".to_string(),
                value: "yes".to_string(),
            }
        );
    }

    #[test]
    fn unknown_keys_are_rejected_together() {
        let err = BuildSettings::from_config_settings(&settings(&[
            ("exclude-tests", ""),
            ("python_tag", "cp311"),
            ("color", "1"),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownSettings {
                keys: vec!["color".to_string(), "python_tag".to_string()],
            }
        );
    }
}
