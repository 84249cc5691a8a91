//! PEP 517 hooks.
//!
//! A [`Backend`] owns everything a build call may consult besides the
//! project tree: the explicit project root, the registered file filters and
//! an environment snapshot taken when the backend was created. Each hook
//! resolves a fresh [`Configuration`] and nothing carries over between calls.

use std::path::{Path, PathBuf};

use pxb_domain::{
    resolve_config, BuildKind, BuildSettings, ConfigSettings, Configuration, EnvSnapshot,
    HookRegistry, ResolveRequest,
};
use tracing::debug;

use super::distribution::{write_prepared_metadata, write_sdist, write_wheel};
use super::error::{BackendError, Result};
use super::filter::builtin_hooks;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendVariant {
    /// Builds both sdists and wheels.
    Complete,
    /// Only builds wheels; `build_sdist` reports [`BackendError::Unsupported`].
    WheelOnly,
}

pub struct Backend {
    project_root: PathBuf,
    variant: BackendVariant,
    hooks: HookRegistry,
    env: EnvSnapshot,
}

impl Backend {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            variant: BackendVariant::Complete,
            hooks: builtin_hooks(),
            env: EnvSnapshot::capture(),
        }
    }

    pub fn wheel_only(project_root: impl Into<PathBuf>) -> Self {
        Self::new(project_root).with_variant(BackendVariant::WheelOnly)
    }

    #[must_use]
    pub fn with_variant(mut self, variant: BackendVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Add embedder-supplied filters on top of the built-ins.
    #[must_use]
    pub fn with_hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks.extend(hooks);
        self
    }

    #[must_use]
    pub fn with_env(mut self, env: EnvSnapshot) -> Self {
        self.env = env;
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn variant(&self) -> BackendVariant {
        self.variant
    }

    /// Extra requirements for `build_sdist`; none, once settings validate.
    pub fn get_requires_for_build_sdist(&self, settings: &ConfigSettings) -> Result<Vec<String>> {
        BuildSettings::from_config_settings(settings)?;
        Ok(Vec::new())
    }

    /// Extra requirements for `build_wheel`; none, once settings validate.
    pub fn get_requires_for_build_wheel(&self, settings: &ConfigSettings) -> Result<Vec<String>> {
        BuildSettings::from_config_settings(settings)?;
        Ok(Vec::new())
    }

    pub fn build_sdist(&self, out_dir: &Path, settings: &ConfigSettings) -> Result<String> {
        if self.variant == BackendVariant::WheelOnly {
            return Err(BackendError::Unsupported {
                operation: "build_sdist",
            });
        }
        let config = self.resolve(BuildKind::Sdist, settings)?;
        debug!(out_dir = %out_dir.display(), "building sdist");
        write_sdist(&config, out_dir)
    }

    pub fn build_wheel(
        &self,
        out_dir: &Path,
        settings: &ConfigSettings,
        metadata_dir: Option<&Path>,
    ) -> Result<String> {
        let config = self.resolve(BuildKind::Wheel, settings)?;
        debug!(
            out_dir = %out_dir.display(),
            metadata_dir = ?metadata_dir,
            "building wheel"
        );
        write_wheel(&config, out_dir, metadata_dir)
    }

    pub fn prepare_metadata_for_build_wheel(
        &self,
        metadata_dir: &Path,
        settings: &ConfigSettings,
    ) -> Result<String> {
        let config = self.resolve(BuildKind::Wheel, settings)?;
        write_prepared_metadata(&config, metadata_dir)
    }

    fn resolve(&self, kind: BuildKind, settings: &ConfigSettings) -> Result<Configuration> {
        debug!(root = %self.project_root.display(), kind = kind.section(), "resolving configuration");
        Ok(resolve_config(&ResolveRequest {
            project_root: &self.project_root,
            kind,
            settings,
            hooks: &self.hooks,
            env: &self.env,
        })?)
    }
}
