#![deny(clippy::all)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

pub mod config;
mod error;
pub mod project;

pub use config::{
    resolve_config, BuildKind, BuildSettings, ConfigSettings, Configuration, EnvSnapshot,
    FileFilter, HookRegistry, PathPredicate, ResolveRequest, TagSet, ToolOptions,
    DEFAULT_SOURCE_ROOT, EXCLUDE_TESTS, SOURCE_DATE_EPOCH,
};
pub use error::{ConfigError, DescriptorError, ResolveError};
pub use project::{
    normalize_dist_name, normalize_version, DistLabel, ProjectDescriptor, ProjectMetadata,
    DESCRIPTOR_FILE, TOOL_NAMESPACE,
};
