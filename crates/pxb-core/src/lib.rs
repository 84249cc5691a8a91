#![deny(clippy::all, warnings)]

mod core;

pub use crate::core::backend::{Backend, BackendVariant};
pub use crate::core::error::{BackendError, Result};
pub use crate::core::filter::{builtin_hooks, DEFAULT_HOOK, EXCLUDE_HIDDEN_HOOK};
pub use crate::core::hash::{copy_hashed, digest, digest_bytes, FileDigest, PAGE_SIZE};
pub use crate::core::metadata::{
    entry_points_lines, metadata_lines, render_lines, wheel_descriptor_lines, PXB_VERSION,
};
pub use crate::core::outcome::{
    format_status_message, to_json_response, CommandStatus, ExecutionOutcome,
};
pub use crate::core::record::{Record, RecordEntry};

pub use pxb_domain::{
    BuildKind, ConfigError, ConfigSettings, Configuration, DescriptorError, EnvSnapshot,
    HookRegistry, PathPredicate, TagSet, EXCLUDE_TESTS,
};
