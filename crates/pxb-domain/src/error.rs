use std::io;
use std::path::PathBuf;

/// Problems with the project's configuration that the user must fix.
///
/// These are never retried; front ends surface the message as-is.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unrecognized config settings: {}", keys.join(", "))]
    UnknownSettings { keys: Vec<String> },
    #[error("config setting `{key}` shouldn't have a value (got '{value}')")]
    UnexpectedSettingValue { key: String, value: String },
    #[error("pyproject.toml is missing required field `{field}`")]
    MissingField { field: &'static str },
    #[error("pyproject.toml field `{field}` is invalid: {reason}")]
    InvalidField { field: String, reason: String },
    #[error("version '{version}' is not a valid PEP 440 version: {reason}")]
    InvalidVersion { version: String, reason: String },
    #[error("wheel tags must be exactly three non-empty strings (got {tags:?})")]
    InvalidTags { tags: Vec<String> },
    #[error("file filter reference must look like 'module:callable' (got '{reference}')")]
    MalformedHookReference { reference: String },
    #[error("file filter '{reference}' is not registered with this backend")]
    UnknownHook { reference: String },
    #[error("SOURCE_DATE_EPOCH must be a non-negative integer (got '{value}')")]
    InvalidSourceDateEpoch { value: String },
    #[error("package source root '{}' does not exist", path.display())]
    MissingSourceRoot { path: PathBuf },
    #[error("prepared metadata at '{}' does not match the project metadata", path.display())]
    StaleMetadata { path: PathBuf },
}

/// The project descriptor could not be read or parsed.
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml_edit::TomlError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}
