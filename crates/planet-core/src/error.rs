// ── Core error types ──
//
// Errors raised inside an operation before the guard turns them into an
// `OperationFailure`. The `From<planet_api::Error>` impl folds transport
// failures into the connection/protocol split callers reason about.

use thiserror::Error;

use crate::result::FailureContext;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Transport ────────────────────────────────────────────────────
    /// DNS, TCP, TLS, or timeout failure talking to the switch.
    #[error("Unable to reach {device} (endpoint {endpoint}): {message}")]
    ConnectionFailed {
        device: String,
        endpoint: String,
        code: Option<i32>,
        message: String,
    },

    /// The switch answered with an HTTP error status.
    #[error("{message}")]
    Protocol { status: u16, message: String },

    // ── Device behaviour ─────────────────────────────────────────────
    /// Well-formed response that doesn't say what it should.
    #[error("{message}")]
    Application { message: String },

    // ── Caller input ─────────────────────────────────────────────────
    #[error("Unknown device: {id}")]
    UnknownDevice { id: String },

    #[error("Invalid {field}: {reason}")]
    InvalidArgument { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn application(message: impl Into<String>) -> Self {
        Self::Application {
            message: message.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Transport-level failure (the only kind credential rotation retries).
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. })
    }

    /// Numeric code for the failure record: OS error code or HTTP status.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::ConnectionFailed { code, .. } => code.map(i64::from),
            Self::Protocol { status, .. } => Some(i64::from(*status)),
            _ => None,
        }
    }

    /// Endpoint and device, for connection failures.
    pub fn context(&self) -> Option<FailureContext> {
        match self {
            Self::ConnectionFailed {
                device, endpoint, ..
            } => Some(FailureContext {
                endpoint: endpoint.clone(),
                device: device.clone(),
            }),
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<planet_api::Error> for CoreError {
    fn from(err: planet_api::Error) -> Self {
        match err {
            planet_api::Error::Connection {
                device,
                endpoint,
                code,
                message,
                ..
            } => CoreError::ConnectionFailed {
                device,
                endpoint,
                code,
                message,
            },
            planet_api::Error::Http {
                status,
                device,
                endpoint,
            } => CoreError::Protocol {
                status,
                message: format!("{device} answered HTTP {status} on {endpoint}"),
            },
            planet_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid device address: {e}"),
            },
            other @ (planet_api::Error::CookieJar { .. } | planet_api::Error::ClientBuild(_)) => {
                CoreError::Internal(other.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_code_is_http_status() {
        let err = CoreError::Protocol {
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(err.code(), Some(500));
        assert!(err.context().is_none());
        assert!(!err.is_connection());
    }

    #[test]
    fn connection_failure_carries_context() {
        let err = CoreError::ConnectionFailed {
            device: "lab @ http://10.0.0.2/".into(),
            endpoint: "/cgi-bin/save.cgi".into(),
            code: Some(111),
            message: "connection refused".into(),
        };
        assert_eq!(err.code(), Some(111));
        let ctx = err.context().unwrap_or_default();
        assert_eq!(ctx.endpoint, "/cgi-bin/save.cgi");
        assert!(err.is_connection());
    }
}
