use std::str::FromStr;

use pep440_rs::Version;

use crate::ConfigError;

/// Escapes a project name for use in distribution file names.
///
/// Runs of `-`, `_` and `.` collapse into a single `_` and the result is
/// lowercased, so `Foo.Bar--baz` becomes `foo_bar_baz`.
pub fn normalize_dist_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut in_separator = false;
    for ch in name.chars() {
        if matches!(ch, '-' | '_' | '.') {
            if !in_separator {
                result.push('_');
            }
            in_separator = true;
        } else {
            result.extend(ch.to_lowercase());
            in_separator = false;
        }
    }
    result
}

/// Normalizes a version string according to PEP 440.
pub fn normalize_version(version: &str) -> Result<String, ConfigError> {
    let parsed = Version::from_str(version.trim()).map_err(|err| ConfigError::InvalidVersion {
        version: version.to_string(),
        reason: err.to_string(),
    })?;
    Ok(parsed.to_string())
}

/// The `{name}-{version}` label shared by sdist roots, wheel names and the
/// dist-info directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DistLabel {
    name: String,
    version: String,
}

impl DistLabel {
    pub fn new(name: &str, version: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            name: normalize_dist_name(name),
            version: normalize_version(version)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn dist_info_dir(&self) -> String {
        format!("{self}.dist-info")
    }
}

impl std::fmt::Display for DistLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.name, self.version)
    }
}
