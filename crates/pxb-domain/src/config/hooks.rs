use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::{ConfigError, Configuration};

/// A user-supplied inclusion rule for archive members.
///
/// `path` is relative to the project root. Errors are propagated to the
/// build caller untouched.
pub trait PathPredicate: Send + Sync {
    fn include(&self, config: &Configuration, path: &Path) -> anyhow::Result<bool>;
}

impl<F> PathPredicate for F
where
    F: Fn(&Configuration, &Path) -> anyhow::Result<bool> + Send + Sync,
{
    fn include(&self, config: &Configuration, path: &Path) -> anyhow::Result<bool> {
        self(config, path)
    }
}

/// A resolved `file-filter` reference.
#[derive(Clone)]
pub struct FileFilter {
    reference: String,
    predicate: Arc<dyn PathPredicate>,
}

impl FileFilter {
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// # Errors
    ///
    /// Whatever the predicate returns.
    pub fn include(&self, config: &Configuration, path: &Path) -> anyhow::Result<bool> {
        self.predicate.include(config, path)
    }
}

impl fmt::Debug for FileFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileFilter")
            .field("reference", &self.reference)
            .finish_non_exhaustive()
    }
}

/// Named predicates that `file-filter = "module:callable"` can refer to.
#[derive(Clone, Default)]
pub struct HookRegistry {
    hooks: BTreeMap<String, Arc<dyn PathPredicate>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `predicate` under `reference`, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `reference` is not `module:callable`.
    pub fn register<P>(&mut self, reference: &str, predicate: P) -> Result<(), ConfigError>
    where
        P: PathPredicate + 'static,
    {
        validate_reference(reference)?;
        self.hooks
            .insert(reference.to_string(), Arc::new(predicate));
        Ok(())
    }

    /// Merge another registry into this one; entries in `other` win.
    pub fn extend(&mut self, other: HookRegistry) {
        self.hooks.extend(other.hooks);
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.hooks.contains_key(reference)
    }

    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.hooks.keys().map(String::as_str)
    }

    /// # Errors
    ///
    /// Returns a configuration error for malformed or unregistered
    /// references.
    pub fn resolve(&self, reference: &str) -> Result<FileFilter, ConfigError> {
        validate_reference(reference)?;
        let predicate = self
            .hooks
            .get(reference)
            .ok_or_else(|| ConfigError::UnknownHook {
                reference: reference.to_string(),
            })?;
        Ok(FileFilter {
            reference: reference.to_string(),
            predicate: Arc::clone(predicate),
        })
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.hooks.keys()).finish()
    }
}

fn validate_reference(reference: &str) -> Result<(), ConfigError> {
    match reference.split_once(':') {
        Some((module, callable))
            if !module.trim().is_empty()
                && !callable.trim().is_empty()
                && !callable.contains(':') =>
        {
            Ok(())
        }
        _ => Err(ConfigError::MalformedHookReference {
            reference: reference.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accept_all(_: &Configuration, _: &Path) -> anyhow::Result<bool> {
        Ok(true)
    }

    #[test]
    fn registered_hooks_resolve_by_reference() {
        let mut registry = HookRegistry::new();
        registry.register("tools.filters:all", accept_all).unwrap();
        let filter = registry.resolve("tools.filters:all").unwrap();
        assert_eq!(filter.reference(), "tools.filters:all");
    }

    #[test]
    fn unregistered_reference_is_unknown() {
        let registry = HookRegistry::new();
        assert_eq!(
            registry.resolve("tools.filters:missing").unwrap_err(),
            ConfigError::UnknownHook {
                reference: "tools.filters:missing".to_string()
            }
        );
    }

    #[test]
    fn malformed_references_are_rejected() {
        let mut registry = HookRegistry::new();
        for reference in ["filters", ":all", "tools:", "a:b:c"] {
            assert!(matches!(
                registry.register(reference, accept_all),
                Err(ConfigError::MalformedHookReference { .. })
            ));
        }
    }

    #[test]
    fn extend_prefers_incoming_entries() {
        let mut base = HookRegistry::new();
        base.register("a:one", accept_all).unwrap();
        let mut extra = HookRegistry::new();
        extra.register("b:two", accept_all).unwrap();
        base.extend(extra);
        assert_eq!(base.references().collect::<Vec<_>>(), vec!["a:one", "b:two"]);
    }
}
