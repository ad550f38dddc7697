// ── Operation results ──
//
// Every public operation hands back an `OperationResult`. Failures carry
// the operation name, a message, and optionally a numeric code and the
// endpoint/device that failed. Nothing below `Planet::guard` escapes as a
// raw error.

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Names of the public operations, as they appear in results and logs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    SystemInfo,
    SystemResources,
    NetworkConfig,
    UpdateSystemInfo,
    BandwidthControl,
    SetPortBandwidth,
    SfpInfo,
    PortLinkStatus,
    Vlans,
    SetCredentials,
    Save,
    Reboot,
    Backup,
    Snapshot,
}

/// Where a connection failure happened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FailureContext {
    pub endpoint: String,
    pub device: String,
}

/// The error arm of [`OperationResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{operation} failed: {message}")]
pub struct OperationFailure {
    pub operation: Operation,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<FailureContext>,
}

/// Uniform outcome of a device operation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum OperationResult<T> {
    Success {
        operation: Operation,
        data: T,
        timestamp: DateTime<Utc>,
    },
    Failure(OperationFailure),
}

impl<T> OperationResult<T> {
    pub fn success(operation: Operation, data: T) -> Self {
        Self::Success {
            operation,
            data,
            timestamp: Utc::now(),
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Self::Success { operation, .. } => *operation,
            Self::Failure(failure) => failure.operation,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data, .. } => Some(data),
            Self::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&OperationFailure> {
        match self {
            Self::Success { .. } => None,
            Self::Failure(failure) => Some(failure),
        }
    }

    pub fn into_result(self) -> Result<T, OperationFailure> {
        match self {
            Self::Success { data, .. } => Ok(data),
            Self::Failure(failure) => Err(failure),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn failure_serialises_flat_with_outcome_tag() {
        let result: OperationResult<bool> = OperationResult::Failure(OperationFailure {
            operation: Operation::Backup,
            message: "Unexpected backup status value \"busy\".".into(),
            code: None,
            context: None,
        });
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({
                "outcome": "failure",
                "operation": "backup",
                "message": "Unexpected backup status value \"busy\"."
            })
        );
    }

    #[test]
    fn success_carries_data_and_timestamp() {
        let result = OperationResult::success(Operation::Save, true);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["outcome"], "success");
        assert_eq!(value["operation"], "save");
        assert_eq!(value["data"], true);
        assert!(value["timestamp"].is_string());
        assert!(result.into_result().unwrap());
    }

    #[test]
    fn operation_names_are_snake_case() {
        assert_eq!(Operation::SetPortBandwidth.to_string(), "set_port_bandwidth");
        assert_eq!(
            "port_link_status".parse::<Operation>().unwrap(),
            Operation::PortLinkStatus
        );
    }
}
