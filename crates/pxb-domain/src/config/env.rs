use std::collections::HashMap;
use std::env;

use crate::ConfigError;

pub const SOURCE_DATE_EPOCH: &str = "SOURCE_DATE_EPOCH";

/// Environment captured once at the backend boundary.
///
/// The build pipeline never reads process environment directly.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    pub fn capture() -> Self {
        Self {
            vars: env::vars().collect(),
        }
    }

    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Archive timestamp override, in seconds since the Unix epoch.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the variable is not an integer.
    pub fn source_date_epoch(&self) -> Result<Option<u64>, ConfigError> {
        match self.var(SOURCE_DATE_EPOCH).map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => value.parse::<u64>().map(Some).map_err(|_| {
                ConfigError::InvalidSourceDateEpoch {
                    value: value.to_string(),
                }
            }),
        }
    }

    pub fn testing(pairs: &[(&str, &str)]) -> Self {
        let vars = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Self { vars }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_date_epoch_parses_integers() {
        let env = EnvSnapshot::testing(&[("SOURCE_DATE_EPOCH", "1700000000")]);
        assert_eq!(env.source_date_epoch().unwrap(), Some(1_700_000_000));
    }

    #[test]
    fn blank_source_date_epoch_is_unset() {
        let env = EnvSnapshot::testing(&[("SOURCE_DATE_EPOCH", " ")]);
        assert_eq!(env.source_date_epoch().unwrap(), None);
        assert_eq!(EnvSnapshot::default().source_date_epoch().unwrap(), None);
    }

    #[test]
    fn garbage_source_date_epoch_is_rejected() {
        let env = EnvSnapshot::testing(&[("SOURCE_DATE_EPOCH", "yesterday")]);
        assert!(matches!(
            env.source_date_epoch(),
            Err(ConfigError::InvalidSourceDateEpoch { .. })
        ));
    }
}
