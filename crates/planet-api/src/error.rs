use std::path::PathBuf;

use thiserror::Error;

/// Why a request never produced an HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionErrorKind {
    /// The per-request timeout elapsed.
    Timeout,
    /// DNS, TCP connect, or TLS handshake failed.
    Connect,
    /// The response body could not be read to completion.
    Body,
    /// Anything else reqwest reports before a status line arrives.
    Request,
}

impl ConnectionErrorKind {
    fn classify(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect
        } else if err.is_body() || err.is_decode() {
            Self::Body
        } else {
            Self::Request
        }
    }
}

/// Top-level error type for the `planet-api` crate.
///
/// Transport-level failures ([`Error::Connection`]) are kept apart from
/// the device answering with an HTTP error status ([`Error::Http`]). A
/// 200 response whose body the caller does not like is never an error
/// here; that judgement belongs to `planet-core`.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// The device could not be reached (DNS, TCP, TLS, timeout).
    #[error("Unable to reach {device} (endpoint {endpoint}): {message}")]
    Connection {
        device: String,
        endpoint: String,
        kind: ConnectionErrorKind,
        /// Low-level OS error code, when the failure carries one.
        code: Option<i32>,
        message: String,
        #[source]
        source: reqwest::Error,
    },

    /// The device answered with HTTP status >= 400.
    #[error("Planet API responded with HTTP {status} for {device} (endpoint {endpoint})")]
    Http {
        status: u16,
        device: String,
        endpoint: String,
    },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Session ─────────────────────────────────────────────────────
    /// The on-disk cookie jar could not be read or written.
    #[error("Cookie jar {} is unusable: {source}", path.display())]
    CookieJar {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl Error {
    /// Wrap a reqwest failure that happened before any response arrived.
    pub(crate) fn connection(device: &str, endpoint: &str, source: reqwest::Error) -> Self {
        let kind = ConnectionErrorKind::classify(&source);
        let code = os_error_code(&source);
        let message = describe_chain(&source);
        Self::Connection {
            device: device.to_owned(),
            endpoint: endpoint.to_owned(),
            kind,
            code,
            message,
            source,
        }
    }

    /// Returns `true` for transport-level failures (retry candidates).
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    /// Returns `true` if the device answered 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Http { status: 404, .. })
    }

    /// HTTP status for protocol failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Walk the source chain looking for an `io::Error` with a raw OS code.
fn os_error_code(err: &reqwest::Error) -> Option<i32> {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = current {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            if let Some(code) = io.raw_os_error() {
                return Some(code);
            }
        }
        current = e.source();
    }
    None
}

/// reqwest's top-level message is terse ("error sending request"); the
/// useful part usually lives further down the chain.
fn describe_chain(err: &reqwest::Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut current = std::error::Error::source(err);
    while let Some(e) = current {
        let text = e.to_string();
        if !parts.iter().any(|p| p.contains(&text)) {
            parts.push(text);
        }
        current = e.source();
    }
    parts.join(": ")
}
