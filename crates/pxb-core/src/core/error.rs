use std::io;

use pxb_domain::{ConfigError, DescriptorError, ResolveError};

/// Everything a build hook can fail with.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
    /// The backend variant cannot perform this hook at all.
    #[error("{operation} is not supported by this backend")]
    Unsupported { operation: &'static str },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Archive(#[from] zip::result::ZipError),
    /// Raised by a user file filter; passed through untouched.
    #[error(transparent)]
    Hook(anyhow::Error),
    #[error("two archive members map to '{path}'")]
    DuplicatePath { path: String },
}

impl BackendError {
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_) | Self::DuplicatePath { .. })
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}

impl From<ResolveError> for BackendError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Config(err) => Self::Config(err),
            ResolveError::Descriptor(err) => Self::Descriptor(err),
        }
    }
}

pub type Result<T, E = BackendError> = std::result::Result<T, E>;
