use std::error::Error as _;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::BackendError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub status: CommandStatus,
    pub message: String,
    #[serde(default)]
    pub details: Value,
}

impl ExecutionOutcome {
    pub fn success(message: impl Into<String>, details: Value) -> Self {
        Self {
            status: CommandStatus::Ok,
            message: message.into(),
            details,
        }
    }

    pub fn failure(message: impl Into<String>, details: Value) -> Self {
        Self {
            status: CommandStatus::Failure,
            message: message.into(),
            details,
        }
    }

    pub fn user_error(message: impl Into<String>, details: Value) -> Self {
        Self {
            status: CommandStatus::UserError,
            message: message.into(),
            details,
        }
    }

    pub fn unsupported(message: impl Into<String>, details: Value) -> Self {
        Self {
            status: CommandStatus::Unsupported,
            message: message.into(),
            details,
        }
    }

    /// Classify a failed hook for front ends.
    pub fn from_error(err: &BackendError) -> Self {
        let message = err.to_string();
        let mut details = json!({ "reason": reason(err) });
        let causes = causes(err);
        if !causes.is_empty() {
            details["causes"] = json!(causes);
        }
        if let Some(hint) = hint(err) {
            details["hint"] = json!(hint);
        }
        if err.is_unsupported() {
            Self::unsupported(message, details)
        } else if err.is_config_error() {
            Self::user_error(message, details)
        } else {
            Self::failure(message, details)
        }
    }
}

fn reason(err: &BackendError) -> &'static str {
    match err {
        BackendError::Config(_) => "invalid_config",
        BackendError::Descriptor(_) => "invalid_descriptor",
        BackendError::Unsupported { .. } => "unsupported",
        BackendError::Io(_) => "io",
        BackendError::Archive(_) => "archive",
        BackendError::Hook(_) => "file_filter",
        BackendError::DuplicatePath { .. } => "duplicate_path",
    }
}

fn hint(err: &BackendError) -> Option<&'static str> {
    match err {
        BackendError::Descriptor(_) => Some("Fix pyproject.toml and rerun the command."),
        BackendError::Unsupported { .. } => {
            Some("Build the sdist with a backend that supports it.")
        }
        _ => None,
    }
}

fn causes(err: &BackendError) -> Vec<String> {
    let mut causes = Vec::new();
    if let BackendError::Hook(hook) = err {
        causes.extend(hook.chain().skip(1).map(ToString::to_string));
        return causes;
    }
    let mut source = err.source();
    while let Some(cause) = source {
        causes.push(cause.to_string());
        source = cause.source();
    }
    causes
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CommandStatus {
    Ok,
    UserError,
    Unsupported,
    Failure,
}

impl CommandStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::UserError => 1,
            Self::Failure => 2,
            Self::Unsupported => 3,
        }
    }
}

#[must_use]
pub fn to_json_response(operation: &str, outcome: &ExecutionOutcome) -> Value {
    let status = match outcome.status {
        CommandStatus::Ok => "ok",
        CommandStatus::UserError => "user-error",
        CommandStatus::Unsupported => "unsupported",
        CommandStatus::Failure => "error",
    };
    let details = match &outcome.details {
        Value::Object(_) => outcome.details.clone(),
        Value::Null => json!({}),
        other => json!({ "value": other }),
    };
    json!({
        "status": status,
        "message": format_status_message(operation, &outcome.message),
        "details": details,
    })
}

#[must_use]
pub fn format_status_message(operation: &str, message: &str) -> String {
    let prefix = format!("pxb {operation}");
    if message.is_empty() {
        prefix
    } else if message.starts_with(&prefix) {
        message.to_string()
    } else {
        format!("{prefix}: {message}")
    }
}
