use std::env;

use clap::Parser;
use color_eyre::{eyre::WrapErr, Result};
use tracing_subscriber::EnvFilter;

mod cli;
mod dispatch;
mod output;
mod style;

use cli::PxbCli;
use output::{emit_output, OutputOptions};

const LOG_ENV: &str = "PXB_LOG";

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = PxbCli::parse();
    init_tracing(cli.trace, cli.verbose, cli.quiet);

    let project_root = match &cli.project_root {
        Some(root) => root.clone(),
        None => env::current_dir().wrap_err("cannot determine the current directory")?,
    };
    let outcome = dispatch::dispatch(&cli, project_root);
    let opts = OutputOptions {
        quiet: cli.quiet,
        json: cli.json,
        no_color: cli.no_color,
    };
    let code = emit_output(&opts, cli.command.name(), &outcome)?;

    if code == 0 {
        Ok(())
    } else {
        std::process::exit(code);
    }
}

fn init_tracing(trace: bool, verbose: u8, quiet: bool) {
    let level = if trace {
        "trace"
    } else if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "pxb={level},pxb_core={level},pxb_domain={level},pxb_cli={level}"
        ))
    });
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
