use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use pep440_rs::VersionSpecifiers;
use pep508_rs::Requirement as PepRequirement;
use toml_edit::{DocumentMut, Item, Table};

use crate::{ConfigError, DescriptorError};

pub const DESCRIPTOR_FILE: &str = "pyproject.toml";

/// Tool table namespace inside `[tool]`.
pub const TOOL_NAMESPACE: &str = "pxb";

/// Core metadata pulled from the `[project]` table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProjectMetadata {
    pub name: String,
    pub version: String,
    pub summary: Option<String>,
    pub requires_python: Option<String>,
    pub requires_dist: Vec<String>,
    pub optional_requires: BTreeMap<String, Vec<String>>,
    pub entry_points: BTreeMap<String, BTreeMap<String, String>>,
}

/// A parsed `pyproject.toml`, read-only.
#[derive(Debug)]
pub struct ProjectDescriptor {
    path: PathBuf,
    doc: DocumentMut,
}

impl ProjectDescriptor {
    /// Read the descriptor from the project root.
    ///
    /// # Errors
    ///
    /// Returns an error when the file is missing, unreadable or not TOML.
    pub fn load(project_root: &Path) -> Result<Self, DescriptorError> {
        let path = project_root.join(DESCRIPTOR_FILE);
        let contents = fs::read_to_string(&path).map_err(|source| DescriptorError::Read {
            path: path.clone(),
            source,
        })?;
        Self::parse(path, &contents)
    }

    pub(crate) fn parse(path: PathBuf, contents: &str) -> Result<Self, DescriptorError> {
        match contents.parse::<DocumentMut>() {
            Ok(doc) => Ok(Self { path, doc }),
            Err(source) => Err(DescriptorError::Parse { path, source }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Extract and validate `[project]` metadata.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `name` or `version` are missing or
    /// any optional field is malformed.
    pub fn metadata(&self) -> Result<ProjectMetadata, ConfigError> {
        let project = self
            .doc
            .get("project")
            .and_then(Item::as_table)
            .ok_or(ConfigError::MissingField { field: "project" })?;

        let name = required_string(project, "name", "project.name")?;
        let version = match project.get("version") {
            Some(_) => required_string(project, "version", "project.version")?,
            None if is_dynamic(project, "version") => {
                return Err(ConfigError::InvalidField {
                    field: "project.version".to_string(),
                    reason: "dynamic versions are not supported; set a static version".to_string(),
                })
            }
            None => {
                return Err(ConfigError::MissingField {
                    field: "project.version",
                })
            }
        };

        let summary = optional_string(project, "description", "project.description")?;
        if summary.as_deref().is_some_and(|text| text.contains(['\n', '\r'])) {
            return Err(ConfigError::InvalidField {
                field: "project.description".to_string(),
                reason: "must be a single line".to_string(),
            });
        }
        let requires_python =
            optional_string(project, "requires-python", "project.requires-python")?;
        if let Some(specifiers) = &requires_python {
            VersionSpecifiers::from_str(specifiers).map_err(|err| ConfigError::InvalidField {
                field: "project.requires-python".to_string(),
                reason: err.to_string(),
            })?;
        }
        let requires_dist = requirement_list(project.get("dependencies"), "project.dependencies")?;
        let optional_requires = collect_optional_dependencies(project)?;
        let entry_points = collect_entry_points(project);

        Ok(ProjectMetadata {
            name,
            version,
            summary,
            requires_python,
            requires_dist,
            optional_requires,
            entry_points,
        })
    }

    /// The `[tool.pxb.<section>]` table, if present.
    pub fn tool_table(&self, section: &str) -> Option<&Table> {
        self.doc
            .get("tool")
            .and_then(Item::as_table)
            .and_then(|tool| tool.get(TOOL_NAMESPACE))
            .and_then(Item::as_table)
            .and_then(|ns| ns.get(section))
            .and_then(Item::as_table)
    }
}

fn required_string(
    table: &Table,
    key: &str,
    field: &'static str,
) -> Result<String, ConfigError> {
    let item = table.get(key).ok_or(ConfigError::MissingField { field })?;
    let value = item.as_str().ok_or_else(|| ConfigError::InvalidField {
        field: field.to_string(),
        reason: "expected a string".to_string(),
    })?;
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::InvalidField {
            field: field.to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    Ok(value.to_string())
}

fn optional_string(table: &Table, key: &str, field: &str) -> Result<Option<String>, ConfigError> {
    match table.get(key) {
        None => Ok(None),
        Some(item) => item
            .as_str()
            .map(|value| Some(value.to_string()))
            .ok_or_else(|| ConfigError::InvalidField {
                field: field.to_string(),
                reason: "expected a string".to_string(),
            }),
    }
}

fn is_dynamic(project: &Table, key: &str) -> bool {
    project
        .get("dynamic")
        .and_then(Item::as_array)
        .is_some_and(|values| values.iter().any(|value| value.as_str() == Some(key)))
}

fn requirement_list(item: Option<&Item>, field: &str) -> Result<Vec<String>, ConfigError> {
    let Some(item) = item else {
        return Ok(Vec::new());
    };
    let array = item.as_array().ok_or_else(|| ConfigError::InvalidField {
        field: field.to_string(),
        reason: "expected an array of requirement strings".to_string(),
    })?;
    let mut requirements = Vec::with_capacity(array.len());
    for value in array {
        let spec = value.as_str().ok_or_else(|| ConfigError::InvalidField {
            field: field.to_string(),
            reason: "expected an array of requirement strings".to_string(),
        })?;
        let spec = spec.trim();
        if let Err(err) = <PepRequirement as FromStr>::from_str(spec) {
            return Err(ConfigError::InvalidField {
                field: field.to_string(),
                reason: format!("'{spec}': {err}"),
            });
        }
        requirements.push(spec.to_string());
    }
    Ok(requirements)
}

fn collect_optional_dependencies(
    project: &Table,
) -> Result<BTreeMap<String, Vec<String>>, ConfigError> {
    let mut extras = BTreeMap::new();
    let Some(optional) = project
        .get("optional-dependencies")
        .and_then(Item::as_table)
    else {
        return Ok(extras);
    };
    for (name, item) in optional.iter() {
        let field = format!("project.optional-dependencies.{name}");
        let deps = requirement_list(Some(item), &field)?;
        if !deps.is_empty() {
            extras.insert(name.to_string(), deps);
        }
    }
    Ok(extras)
}

fn collect_entry_points(project: &Table) -> BTreeMap<String, BTreeMap<String, String>> {
    let mut groups = BTreeMap::new();
    collect_entry_point_group(project.get("scripts"), "console_scripts", &mut groups);
    collect_entry_point_group(project.get("gui-scripts"), "gui_scripts", &mut groups);
    if let Some(ep_table) = project.get("entry-points").and_then(Item::as_table) {
        for (group, item) in ep_table.iter() {
            collect_entry_point_group(Some(item), group, &mut groups);
        }
    }
    groups
}

fn collect_entry_point_group(
    item: Option<&Item>,
    group: &str,
    groups: &mut BTreeMap<String, BTreeMap<String, String>>,
) {
    let Some(entries) = item.and_then(Item::as_table_like) else {
        return;
    };
    let mut mapped = BTreeMap::new();
    for (name, value) in entries.iter() {
        if let Some(target) = value.as_str() {
            mapped.insert(name.to_string(), target.to_string());
        }
    }
    if !mapped.is_empty() {
        groups.insert(group.to_string(), mapped);
    }
}
