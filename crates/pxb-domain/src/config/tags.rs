use toml_edit::Item;

use crate::ConfigError;

/// Wheel compatibility tags as configured: `[python, abi, platform]`.
///
/// Each component may hold several dot-separated values (`cp39.cp310`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagSet {
    python: String,
    abi: String,
    platform: String,
}

impl Default for TagSet {
    fn default() -> Self {
        Self {
            python: "py3".to_string(),
            abi: "none".to_string(),
            platform: "any".to_string(),
        }
    }
}

impl TagSet {
    /// # Errors
    ///
    /// Returns a configuration error unless exactly three components are
    /// given and none of their dot-separated values is empty.
    pub fn new(components: &[String]) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidTags {
            tags: components.to_vec(),
        };
        let [python, abi, platform] = components else {
            return Err(invalid());
        };
        let well_formed = |component: &String| {
            !component.is_empty() && component.split('.').all(|value| !value.is_empty())
        };
        if ![python, abi, platform].into_iter().all(well_formed) {
            return Err(invalid());
        }
        Ok(Self {
            python: python.clone(),
            abi: abi.clone(),
            platform: platform.clone(),
        })
    }

    pub(crate) fn from_item(item: &Item) -> Result<Self, ConfigError> {
        let array = item.as_array().ok_or_else(|| ConfigError::InvalidField {
            field: "tool.pxb.wheel.tags".to_string(),
            reason: "expected an array of strings".to_string(),
        })?;
        let mut components = Vec::with_capacity(array.len());
        for value in array {
            let component = value.as_str().ok_or_else(|| ConfigError::InvalidField {
                field: "tool.pxb.wheel.tags".to_string(),
                reason: "expected an array of strings".to_string(),
            })?;
            components.push(component.to_string());
        }
        Self::new(&components)
    }

    fn components(&self) -> [&str; 3] {
        [&self.python, &self.abi, &self.platform]
    }

    /// The literal configured tags joined by `-`, as used in the wheel file
    /// name (`cp39.cp310-none-any`).
    pub fn filename_component(&self) -> String {
        self.components().join("-")
    }

    /// Every combination of the multi-valued components, in order.
    pub fn expand(&self) -> Vec<String> {
        let mut combinations = vec![String::new()];
        for component in self.components() {
            let mut next = Vec::with_capacity(combinations.len());
            for prefix in &combinations {
                for value in component.split('.') {
                    if prefix.is_empty() {
                        next.push(value.to_string());
                    } else {
                        next.push(format!("{prefix}-{value}"));
                    }
                }
            }
            combinations = next;
        }
        combinations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(parts: &[&str]) -> Result<TagSet, ConfigError> {
        let owned: Vec<String> = parts.iter().map(ToString::to_string).collect();
        TagSet::new(&owned)
    }

    #[test]
    fn default_is_pure_python() {
        let tags = TagSet::default();
        assert_eq!(tags.filename_component(), "py3-none-any");
        assert_eq!(tags.expand(), vec!["py3-none-any"]);
    }

    #[test]
    fn multi_valued_components_expand_as_cartesian_product() {
        let tags = tags(&["cp39.cp310", "abi3", "manylinux1_x86_64.macosx_11_0_arm64"]).unwrap();
        assert_eq!(
            tags.filename_component(),
            "cp39.cp310-abi3-manylinux1_x86_64.macosx_11_0_arm64"
        );
        assert_eq!(
            tags.expand(),
            vec![
                "cp39-abi3-manylinux1_x86_64",
                "cp39-abi3-macosx_11_0_arm64",
                "cp310-abi3-manylinux1_x86_64",
                "cp310-abi3-macosx_11_0_arm64",
            ]
        );
    }

    #[test]
    fn wrong_arity_is_rejected() {
        assert!(tags(&["py3", "none"]).is_err());
        assert!(tags(&["py3", "none", "any", "extra"]).is_err());
    }

    #[test]
    fn empty_values_are_rejected() {
        assert!(tags(&["py3", "", "any"]).is_err());
        assert!(tags(&["py3..py2", "none", "any"]).is_err());
    }
}
