use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

pub const PXB_HELP_TEMPLATE: &str =
    "{before-help}\nUsage:\n    {usage}\n\nCommands:\n{subcommands}\n\nGlobal options:\n{options}\n";

pub const PXB_BEFORE_HELP: &str = concat!(
    "pxb ",
    env!("CARGO_PKG_VERSION"),
    " – Python build backend\n\n",
    "Runs the PEP 517 hooks against a project directory. Artifact names and\n",
    "requirements go to stdout; logs go to stderr.\n",
);

#[derive(Parser, Debug)]
#[command(
    name = "pxb",
    author,
    version,
    disable_help_subcommand = true,
    before_help = PXB_BEFORE_HELP,
    help_template = PXB_HELP_TEMPLATE
)]
#[allow(clippy::struct_excessive_bools)]
pub struct PxbCli {
    #[arg(
        long,
        value_name = "DIR",
        help = "Project directory containing pyproject.toml (default: current directory)",
        global = true
    )]
    pub project_root: Option<PathBuf>,
    #[arg(
        short = 'C',
        long = "config-setting",
        value_name = "KEY[=VALUE]",
        value_parser = parse_config_setting,
        help = "Pass a config setting to the backend (repeatable)",
        global = true
    )]
    pub config_settings: Vec<(String, String)>,
    #[arg(long, help = "Behave as a wheel-only backend", global = true)]
    pub wheel_only: bool,
    #[arg(
        short,
        long,
        help = "Suppress human output (errors still print to stderr)",
        global = true
    )]
    pub quiet: bool,
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        help = "Increase logging (-vv reaches trace)",
        global = true
    )]
    pub verbose: u8,
    #[arg(long, help = "Force trace logging regardless of -v/-q", global = true)]
    pub trace: bool,
    #[arg(
        long,
        help = "Emit {status,message,details} JSON envelopes",
        global = true
    )]
    pub json: bool,
    #[arg(long, help = "Disable colored human output", global = true)]
    pub no_color: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    #[command(about = "List extra requirements for building an sdist")]
    GetRequiresForBuildSdist,
    #[command(about = "List extra requirements for building a wheel")]
    GetRequiresForBuildWheel,
    #[command(about = "Build a source distribution into OUT_DIR")]
    BuildSdist {
        #[arg(value_name = "OUT_DIR")]
        out_dir: PathBuf,
    },
    #[command(about = "Build a wheel into OUT_DIR")]
    BuildWheel {
        #[arg(value_name = "OUT_DIR")]
        out_dir: PathBuf,
        #[arg(
            long,
            value_name = "DIR",
            help = "Metadata prepared earlier by prepare-metadata-for-build-wheel"
        )]
        metadata_directory: Option<PathBuf>,
    },
    #[command(about = "Write the wheel's .dist-info directory into DIR")]
    PrepareMetadataForBuildWheel {
        #[arg(value_name = "DIR")]
        metadata_dir: PathBuf,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetRequiresForBuildSdist => "get-requires-for-build-sdist",
            Self::GetRequiresForBuildWheel => "get-requires-for-build-wheel",
            Self::BuildSdist { .. } => "build-sdist",
            Self::BuildWheel { .. } => "build-wheel",
            Self::PrepareMetadataForBuildWheel { .. } => "prepare-metadata-for-build-wheel",
        }
    }
}

/// `KEY=VALUE`, or a bare `KEY` meaning an empty value.
fn parse_config_setting(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw.split_once('=').unwrap_or((raw, ""));
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("config setting '{raw}' has an empty key"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        PxbCli::command().debug_assert();
    }

    #[test]
    fn config_settings_accept_bare_keys() {
        let cli = PxbCli::parse_from([
            "pxb",
            "-C",
            "exclude-tests",
            "--config-setting",
            "flavor=fast",
            "build-sdist",
            "dist",
        ]);
        assert_eq!(
            cli.config_settings,
            vec![
                ("exclude-tests".to_string(), String::new()),
                ("flavor".to_string(), "fast".to_string()),
            ]
        );
        assert_eq!(cli.command.name(), "build-sdist");
    }

    #[test]
    fn empty_keys_are_rejected() {
        assert!(PxbCli::try_parse_from(["pxb", "-C", "=x", "build-wheel", "dist"]).is_err());
    }
}
