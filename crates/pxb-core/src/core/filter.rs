//! Decides which project paths end up in an archive.
//!
//! Precedence, highest first:
//! 1. the traversal root is always kept,
//! 2. top-level LICENSE/COPYING/README files and `pyproject.toml` are always
//!    kept, even over a user filter,
//! 3. a configured `file-filter` hook decides,
//! 4. otherwise [`default_policy`] decides.

use std::path::Path;

use pxb_domain::{normalize_version, Configuration, HookRegistry, DESCRIPTOR_FILE};

use super::error::{BackendError, Result};

pub const DEFAULT_HOOK: &str = "pxb.filters:default";
pub const EXCLUDE_HIDDEN_HOOK: &str = "pxb.filters:exclude_hidden";

const ALWAYS_INCLUDED_STEMS: &[&str] = &["LICENSE", "COPYING", "README"];
const BUILD_OUTPUT_DIRS: &[&str] = &["build", "dist"];
const CACHE_DIR: &str = "__pycache__";
const TEST_DIRS: &[&str] = &["tests", "test"];

/// Whether `relative` (relative to the project root) belongs in the archive.
///
/// # Errors
///
/// Returns [`BackendError::Hook`] carrying whatever a user filter raised.
pub fn include(config: &Configuration, relative: &Path) -> Result<bool> {
    if relative.as_os_str().is_empty() {
        return Ok(true);
    }
    if always_included(relative) {
        return Ok(true);
    }
    match &config.tool.file_filter {
        Some(filter) => filter.include(config, relative).map_err(BackendError::Hook),
        None => Ok(default_policy(config, relative)),
    }
}

fn always_included(relative: &Path) -> bool {
    if relative.components().count() != 1 {
        return false;
    }
    let stem_matches = relative
        .file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| {
            ALWAYS_INCLUDED_STEMS
                .iter()
                .any(|candidate| stem.eq_ignore_ascii_case(candidate))
        });
    stem_matches
        || relative
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.eq_ignore_ascii_case(DESCRIPTOR_FILE))
}

/// The built-in rules used when no `file-filter` is configured.
pub fn default_policy(config: &Configuration, relative: &Path) -> bool {
    let mut components = relative.iter().map(|c| c.to_string_lossy());
    let Some(first) = components.next() else {
        return true;
    };
    if BUILD_OUTPUT_DIRS.iter().any(|dir| *dir == first) {
        return false;
    }
    for component in std::iter::once(first).chain(components) {
        if component.starts_with('.')
            || component == CACHE_DIR
            || component.ends_with(".egg-info")
        {
            return false;
        }
        if config.settings.exclude_tests && TEST_DIRS.iter().any(|dir| *dir == component) {
            return false;
        }
    }
    !is_previous_artifact(config, relative)
}

/// `{name}-{version}.tar.gz` or `{name}-{version}[-build]-{py}-{abi}-{plat}.whl`
/// for this project's normalized name and any valid version.
fn is_previous_artifact(config: &Configuration, relative: &Path) -> bool {
    let Some(rest) = relative
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.strip_prefix(config.label.name()))
        .and_then(|rest| rest.strip_prefix('-'))
    else {
        return false;
    };
    if let Some(version) = rest.strip_suffix(".tar.gz") {
        return normalize_version(version).is_ok();
    }
    if let Some(stem) = rest.strip_suffix(".whl") {
        let parts: Vec<&str> = stem.split('-').collect();
        return (4..=5).contains(&parts.len()) && normalize_version(parts[0]).is_ok();
    }
    false
}

fn is_hidden(relative: &Path) -> bool {
    relative
        .iter()
        .any(|component| component.to_string_lossy().starts_with('.'))
}

fn default_hook(config: &Configuration, relative: &Path) -> anyhow::Result<bool> {
    Ok(default_policy(config, relative))
}

fn exclude_hidden_hook(_: &Configuration, relative: &Path) -> anyhow::Result<bool> {
    Ok(!is_hidden(relative))
}

type HookFn = fn(&Configuration, &Path) -> anyhow::Result<bool>;

/// Filters every backend knows about without any embedding code.
pub fn builtin_hooks() -> HookRegistry {
    let builtins: [(&str, HookFn); 2] = [
        (DEFAULT_HOOK, default_hook),
        (EXCLUDE_HIDDEN_HOOK, exclude_hidden_hook),
    ];
    let mut registry = HookRegistry::new();
    for (reference, hook) in builtins {
        let registered = registry.register(reference, hook);
        debug_assert!(registered.is_ok(), "malformed builtin reference {reference}");
    }
    registry
}
