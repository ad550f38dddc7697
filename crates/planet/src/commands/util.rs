//! Shared helpers for command handlers.

use std::io::IsTerminal;

use planet_core::OperationResult;

use crate::error::CliError;

/// Unwrap an operation's data or turn its failure into a CLI error.
pub fn data<T>(result: OperationResult<T>) -> Result<T, CliError> {
    result.into_result().map_err(CliError::from)
}

/// A write the switch didn't acknowledge is a distinct, non-fatal exit.
pub fn require_ack(acknowledged: bool, action: &str) -> Result<(), CliError> {
    if acknowledged {
        Ok(())
    } else {
        Err(CliError::Rejected {
            action: action.into(),
        })
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}
