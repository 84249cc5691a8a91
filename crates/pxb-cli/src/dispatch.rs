use std::path::{Path, PathBuf};

use pxb_core::{Backend, BackendError, ConfigSettings, ExecutionOutcome};
use serde_json::json;
use tracing::debug;

use crate::cli::{Command, PxbCli};

/// Run one hook and fold its result into an outcome.
pub fn dispatch(cli: &PxbCli, project_root: PathBuf) -> ExecutionOutcome {
    let settings: ConfigSettings = cli.config_settings.iter().cloned().collect();
    let backend = if cli.wheel_only {
        Backend::wheel_only(project_root)
    } else {
        Backend::new(project_root)
    };
    debug!(
        command = cli.command.name(),
        root = %backend.project_root().display(),
        variant = ?backend.variant(),
        "dispatching"
    );
    run(&backend, &cli.command, &settings).unwrap_or_else(|err| ExecutionOutcome::from_error(&err))
}

fn run(
    backend: &Backend,
    command: &Command,
    settings: &ConfigSettings,
) -> Result<ExecutionOutcome, BackendError> {
    match command {
        Command::GetRequiresForBuildSdist => Ok(requirements(
            &backend.get_requires_for_build_sdist(settings)?,
        )),
        Command::GetRequiresForBuildWheel => Ok(requirements(
            &backend.get_requires_for_build_wheel(settings)?,
        )),
        Command::BuildSdist { out_dir } => {
            let name = backend.build_sdist(out_dir, settings)?;
            Ok(artifact(&name, out_dir))
        }
        Command::BuildWheel {
            out_dir,
            metadata_directory,
        } => {
            let name = backend.build_wheel(out_dir, settings, metadata_directory.as_deref())?;
            Ok(artifact(&name, out_dir))
        }
        Command::PrepareMetadataForBuildWheel { metadata_dir } => {
            let dist_info = backend.prepare_metadata_for_build_wheel(metadata_dir, settings)?;
            Ok(ExecutionOutcome::success(
                dist_info.clone(),
                json!({
                    "dist_info": dist_info,
                    "path": metadata_dir.join(&dist_info).display().to_string(),
                }),
            ))
        }
    }
}

fn requirements(requires: &[String]) -> ExecutionOutcome {
    ExecutionOutcome::success(requires.join("\n"), json!({ "requires": requires }))
}

fn artifact(name: &str, out_dir: &Path) -> ExecutionOutcome {
    ExecutionOutcome::success(
        name,
        json!({
            "artifact": name,
            "path": out_dir.join(name).display().to_string(),
        }),
    )
}
