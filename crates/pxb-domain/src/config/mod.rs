//! Typed build configuration and the resolver that produces it.
//!
//! A [`Configuration`] is built once per build call from three sources: the
//! project descriptor, the `[tool.pxb.<kind>]` table and the front end's
//! config settings. It is immutable afterwards and every later stage reads
//! from it instead of the filesystem or the environment.

mod env;
mod hooks;
mod settings;
mod tags;

use std::path::{Component, Path, PathBuf};

use toml_edit::{Item, Table};
use tracing::{debug, warn};

pub use env::{EnvSnapshot, SOURCE_DATE_EPOCH};
pub use hooks::{FileFilter, HookRegistry, PathPredicate};
pub use settings::{BuildSettings, ConfigSettings, EXCLUDE_TESTS};
pub use tags::TagSet;

use crate::project::{DistLabel, ProjectDescriptor, ProjectMetadata};
use crate::{ConfigError, ResolveError};

pub const DEFAULT_SOURCE_ROOT: &str = "src";

const FILE_FILTER_KEY: &str = "file-filter";
const TAGS_KEY: &str = "tags";
const SOURCE_ROOT_KEY: &str = "source-root";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildKind {
    Sdist,
    Wheel,
}

impl BuildKind {
    pub fn section(self) -> &'static str {
        match self {
            Self::Sdist => "sdist",
            Self::Wheel => "wheel",
        }
    }

    fn recognized_keys(self) -> &'static [&'static str] {
        match self {
            Self::Sdist => &[FILE_FILTER_KEY],
            Self::Wheel => &[FILE_FILTER_KEY, TAGS_KEY, SOURCE_ROOT_KEY],
        }
    }
}

/// Settings from `[tool.pxb.sdist]` or `[tool.pxb.wheel]`.
#[derive(Clone, Debug)]
pub struct ToolOptions {
    pub file_filter: Option<FileFilter>,
    /// Only populated for wheel builds.
    pub tags: Option<TagSet>,
    /// Package source root, relative to the project root.
    pub source_root: PathBuf,
}

impl Default for ToolOptions {
    fn default() -> Self {
        Self {
            file_filter: None,
            tags: None,
            source_root: PathBuf::from(DEFAULT_SOURCE_ROOT),
        }
    }
}

/// Everything one build call needs to know about the project.
#[derive(Clone, Debug)]
pub struct Configuration {
    pub kind: BuildKind,
    pub project_root: PathBuf,
    pub metadata: ProjectMetadata,
    pub label: DistLabel,
    pub tool: ToolOptions,
    pub settings: BuildSettings,
    /// Archive timestamp, seconds since the epoch.
    pub source_date_epoch: Option<u64>,
}

impl Configuration {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn version(&self) -> &str {
        &self.metadata.version
    }

    /// Tags for wheel builds; the default triple when none were resolved.
    pub fn tags(&self) -> TagSet {
        self.tool.tags.clone().unwrap_or_default()
    }

    pub fn source_root_path(&self) -> PathBuf {
        self.project_root.join(&self.tool.source_root)
    }
}

/// Inputs for [`resolve_config`].
#[derive(Clone, Copy, Debug)]
pub struct ResolveRequest<'a> {
    pub project_root: &'a Path,
    pub kind: BuildKind,
    pub settings: &'a ConfigSettings,
    pub hooks: &'a HookRegistry,
    pub env: &'a EnvSnapshot,
}

/// Build the configuration for one build invocation.
///
/// # Errors
///
/// Returns a descriptor error when `pyproject.toml` cannot be read or parsed,
/// and a configuration error for invalid settings, metadata or tool options.
pub fn resolve_config(request: &ResolveRequest<'_>) -> Result<Configuration, ResolveError> {
    let settings = BuildSettings::from_config_settings(request.settings)?;
    let descriptor = ProjectDescriptor::load(request.project_root)?;
    let metadata = descriptor.metadata()?;
    let label = DistLabel::new(&metadata.name, &metadata.version)?;
    let tool = resolve_tool_options(
        descriptor.tool_table(request.kind.section()),
        request.kind,
        request.hooks,
    )?;
    let source_date_epoch = request.env.source_date_epoch()?;

    debug!(
        kind = request.kind.section(),
        label = %label,
        exclude_tests = settings.exclude_tests,
        file_filter = ?tool.file_filter.as_ref().map(FileFilter::reference),
        "resolved build configuration"
    );

    Ok(Configuration {
        kind: request.kind,
        project_root: request.project_root.to_path_buf(),
        metadata,
        label,
        tool,
        settings,
        source_date_epoch,
    })
}

fn resolve_tool_options(
    table: Option<&Table>,
    kind: BuildKind,
    hooks: &HookRegistry,
) -> Result<ToolOptions, ConfigError> {
    let mut options = ToolOptions::default();
    if let Some(table) = table {
        for (key, _) in table.iter() {
            if !kind.recognized_keys().iter().any(|known| *known == key) {
                warn!(
                    key,
                    section = kind.section(),
                    "ignoring unrecognized key in [tool.pxb.{}]",
                    kind.section()
                );
            }
        }
        if let Some(item) = table.get(FILE_FILTER_KEY) {
            let reference = item.as_str().ok_or_else(|| ConfigError::InvalidField {
                field: format!("tool.pxb.{}.{FILE_FILTER_KEY}", kind.section()),
                reason: "expected a 'module:callable' string".to_string(),
            })?;
            options.file_filter = Some(hooks.resolve(reference.trim())?);
        }
        if kind == BuildKind::Wheel {
            if let Some(item) = table.get(TAGS_KEY) {
                options.tags = Some(TagSet::from_item(item)?);
            }
            if let Some(item) = table.get(SOURCE_ROOT_KEY) {
                options.source_root = source_root_from_item(item)?;
            }
        }
    }
    if kind == BuildKind::Wheel && options.tags.is_none() {
        options.tags = Some(TagSet::default());
    }
    Ok(options)
}

fn source_root_from_item(item: &Item) -> Result<PathBuf, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidField {
        field: format!("tool.pxb.wheel.{SOURCE_ROOT_KEY}"),
        reason: reason.to_string(),
    };
    let raw = item.as_str().ok_or_else(|| invalid("expected a string"))?;
    let path = PathBuf::from(raw.trim());
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(invalid("must be a relative path inside the project"));
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn project(pyproject: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("pyproject.toml"), pyproject).expect("write pyproject");
        dir
    }

    fn resolve(
        root: &Path,
        kind: BuildKind,
        settings: &ConfigSettings,
        hooks: &HookRegistry,
    ) -> Result<Configuration, ResolveError> {
        resolve_config(&ResolveRequest {
            project_root: root,
            kind,
            settings,
            hooks,
            env: &EnvSnapshot::default(),
        })
    }

    fn keep_everything(_: &Configuration, _: &Path) -> anyhow::Result<bool> {
        Ok(true)
    }

    const MINIMAL: &str = "[project]\nname = \"Demo.Pkg\"\nversion = \"1.0\"\n";

    #[test]
    fn wheel_configuration_gets_default_tags() {
        let dir = project(MINIMAL);
        let config = resolve(
            dir.path(),
            BuildKind::Wheel,
            &ConfigSettings::new(),
            &HookRegistry::new(),
        )
        .unwrap();
        assert_eq!(config.name(), "Demo.Pkg");
        assert_eq!(config.label.to_string(), "demo_pkg-1.0");
        assert_eq!(config.tool.tags, Some(TagSet::default()));
        assert_eq!(config.tool.source_root, PathBuf::from("src"));
        assert!(!config.settings.exclude_tests);
    }

    #[test]
    fn sdist_configuration_has_no_tags() {
        let dir = project(MINIMAL);
        let config = resolve(
            dir.path(),
            BuildKind::Sdist,
            &ConfigSettings::new(),
            &HookRegistry::new(),
        )
        .unwrap();
        assert!(config.tool.tags.is_none());
    }

    #[test]
    fn tool_tables_are_selected_by_kind() {
        let dir = project(&format!(
            "{MINIMAL}\n[tool.pxb.sdist]\nfile-filter = \"custom:keep\"\n\n[tool.pxb.wheel]\ntags = [\"cp39.cp310\", \"abi3\", \"any\"]\nsource-root = \"lib\"\n"
        ));
        let mut hooks = HookRegistry::new();
        hooks.register("custom:keep", keep_everything).unwrap();

        let sdist = resolve(dir.path(), BuildKind::Sdist, &ConfigSettings::new(), &hooks).unwrap();
        assert_eq!(
            sdist.tool.file_filter.as_ref().map(FileFilter::reference),
            Some("custom:keep")
        );

        let wheel = resolve(dir.path(), BuildKind::Wheel, &ConfigSettings::new(), &hooks).unwrap();
        assert!(wheel.tool.file_filter.is_none());
        assert_eq!(wheel.tags().filename_component(), "cp39.cp310-abi3-any");
        assert_eq!(wheel.tool.source_root, PathBuf::from("lib"));
    }

    #[test]
    fn unknown_hook_reference_fails_resolution() {
        let dir = project(&format!(
            "{MINIMAL}\n[tool.pxb.sdist]\nfile-filter = \"custom:missing\"\n"
        ));
        let err = resolve(
            dir.path(),
            BuildKind::Sdist,
            &ConfigSettings::new(),
            &HookRegistry::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Config(ConfigError::UnknownHook { .. })
        ));
    }

    #[test]
    fn caller_settings_are_validated_before_reading_the_descriptor() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut settings = ConfigSettings::new();
        settings.insert("verbose".to_string(), String::new());
        let err = resolve(dir.path(), BuildKind::Sdist, &settings, &HookRegistry::new())
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Config(ConfigError::UnknownSettings { .. })
        ));
    }

    #[test]
    fn source_root_must_stay_inside_project() {
        let dir = project(&format!(
            "{MINIMAL}\n[tool.pxb.wheel]\nsource-root = \"../elsewhere\"\n"
        ));
        let err = resolve(
            dir.path(),
            BuildKind::Wheel,
            &ConfigSettings::new(),
            &HookRegistry::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Config(ConfigError::InvalidField { .. })
        ));
    }

    #[test]
    fn missing_descriptor_is_a_descriptor_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = resolve(
            dir.path(),
            BuildKind::Wheel,
            &ConfigSettings::new(),
            &HookRegistry::new(),
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::Descriptor(_)));
    }
}
