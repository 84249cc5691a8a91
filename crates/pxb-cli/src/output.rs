use std::io::IsTerminal;

use color_eyre::Result;
use pxb_core::{CommandStatus, ExecutionOutcome};
use serde_json::Value;

use crate::style::Style;

#[derive(Clone, Copy, Debug)]
pub struct OutputOptions {
    pub quiet: bool,
    pub json: bool,
    pub no_color: bool,
}

/// Print `outcome` and return the process exit code.
///
/// Successful human output is the bare result on stdout so front ends can
/// read it; failures go to stderr.
pub fn emit_output(
    opts: &OutputOptions,
    operation: &str,
    outcome: &ExecutionOutcome,
) -> Result<i32> {
    let code = outcome.status.exit_code();

    if opts.json {
        let payload = pxb_core::to_json_response(operation, outcome);
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(code);
    }

    if outcome.status == CommandStatus::Ok {
        if !opts.quiet && !outcome.message.is_empty() {
            println!("{}", outcome.message);
        }
        return Ok(code);
    }

    let style = Style::new(opts.no_color, std::io::stderr().is_terminal());
    let message = pxb_core::format_status_message(operation, &outcome.message);
    eprintln!("{}", style.status(outcome.status, &message));
    for cause in causes_from_details(&outcome.details) {
        eprintln!("{}", style.dim(&format!("  caused by: {cause}")));
    }
    if let Some(hint) = hint_from_details(&outcome.details) {
        eprintln!("{}", style.info(&format!("Hint: {hint}")));
    }
    Ok(code)
}

fn hint_from_details(details: &Value) -> Option<&str> {
    details
        .as_object()
        .and_then(|map| map.get("hint"))
        .and_then(Value::as_str)
}

fn causes_from_details(details: &Value) -> Vec<&str> {
    details
        .get("causes")
        .and_then(Value::as_array)
        .map(|causes| causes.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}
