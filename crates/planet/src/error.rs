//! CLI error types with miette diagnostics.
//!
//! Maps operation failures and config errors into user-facing errors with
//! actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use planet_config::ConfigError;
use planet_core::OperationFailure;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const REJECTED: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const PROTOCOL: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Switch ───────────────────────────────────────────────────────
    #[error("{operation}: could not reach {device}")]
    #[diagnostic(
        code(planet::connection_failed),
        help(
            "Check that the switch is powered on and reachable.\n\
             Failed on endpoint {endpoint}: {message}\n\
             A slow switch may need a longer --timeout."
        )
    )]
    ConnectionFailed {
        operation: String,
        device: String,
        endpoint: String,
        message: String,
    },

    #[error("{operation}: {message}")]
    #[diagnostic(
        code(planet::protocol),
        help(
            "The switch answered HTTP {status}.\n\
             Wrong credentials usually show up as 401; run with --trace to see the exchange."
        )
    )]
    Protocol {
        operation: String,
        status: i64,
        message: String,
    },

    #[error("{operation}: {message}")]
    #[diagnostic(code(planet::operation_failed))]
    OperationFailed { operation: String, message: String },

    #[error("The switch did not acknowledge: {action}")]
    #[diagnostic(
        code(planet::rejected),
        help("Nothing was saved. Check the values against the switch's limits and retry.")
    )]
    Rejected { action: String },

    // ── Device selection ─────────────────────────────────────────────
    #[error("No device selected")]
    #[diagnostic(
        code(planet::no_device),
        help(
            "Pass --device <name> or --address <host>, or set default_device in {path}.\n\
             Add one with: planet config add-device <name> --address <host>"
        )
    )]
    NoDevice { path: String },

    #[error("Device '{name}' not found in configuration")]
    #[diagnostic(
        code(planet::unknown_device),
        help(
            "Configured devices: {available}\n\
             Add one with: planet config add-device {name} --address <host>"
        )
    )]
    UnknownDevice { name: String, available: String },

    #[error("No password available for {device}")]
    #[diagnostic(
        code(planet::no_credentials),
        help(
            "Pass --password, set PLANET_PASSWORD, or configure password_env / the keyring\n\
             for the device entry."
        )
    )]
    NoCredentials { device: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(planet::validation))]
    Validation { field: String, reason: String },

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(planet::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(planet::config))]
    Config(ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(planet::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(planet::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Protocol { .. } => exit_code::PROTOCOL,
            Self::Rejected { .. } => exit_code::REJECTED,
            Self::NoDevice { .. }
            | Self::UnknownDevice { .. }
            | Self::NoCredentials { .. }
            | Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── OperationFailure → CliError mapping ──────────────────────────────

impl From<OperationFailure> for CliError {
    fn from(failure: OperationFailure) -> Self {
        let OperationFailure {
            operation,
            message,
            code,
            context,
        } = failure;
        let operation = operation.to_string();

        match (context, code) {
            (Some(context), _) => CliError::ConnectionFailed {
                operation,
                device: context.device,
                endpoint: context.endpoint,
                message,
            },
            (None, Some(status)) => CliError::Protocol {
                operation,
                status,
                message,
            },
            (None, None) => CliError::OperationFailed { operation, message },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::UnknownDevice { name } => CliError::UnknownDevice {
                name,
                available: "(see: planet config show)".into(),
            },
            ConfigError::NoCredentials { device } => CliError::NoCredentials { device },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use planet_core::{FailureContext, Operation};

    use super::*;

    fn failure(code: Option<i64>, context: Option<FailureContext>) -> OperationFailure {
        OperationFailure {
            operation: Operation::SystemInfo,
            message: "boom".into(),
            code,
            context,
        }
    }

    #[test]
    fn failures_map_to_exit_codes() {
        let connection = CliError::from(failure(
            Some(111),
            Some(FailureContext {
                endpoint: "/".into(),
                device: "lab @ http://10.0.0.2/".into(),
            }),
        ));
        assert_eq!(connection.exit_code(), exit_code::CONNECTION);

        let protocol = CliError::from(failure(Some(401), None));
        assert_eq!(protocol.exit_code(), exit_code::PROTOCOL);

        let general = CliError::from(failure(None, None));
        assert_eq!(general.exit_code(), exit_code::GENERAL);
        assert_eq!(general.to_string(), "system_info: boom");
    }
}
