// ── Runtime configuration ──
//
// How the `Planet` facade talks to switches. Built by the CLI (or any
// embedding caller) and handed in; core never reads config files.

use std::path::PathBuf;

use planet_api::{Diagnostics, TransportConfig};

use crate::retry::RetryPolicy;

/// Configuration for a [`Planet`](crate::Planet) instance.
#[derive(Debug, Clone, Default)]
pub struct PlanetConfig {
    /// Directory for per-device cookie jars. `None` uses the system temp dir.
    pub cookie_dir: Option<PathBuf>,
    /// HTTP client settings shared by every device session.
    pub transport: TransportConfig,
    /// Retry policy for the save that follows a credential change.
    pub credential_retry: RetryPolicy,
}

impl PlanetConfig {
    pub fn with_cookie_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cookie_dir = Some(dir.into());
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.transport.diagnostics = diagnostics;
        self
    }

    pub fn with_credential_retry(mut self, policy: RetryPolicy) -> Self {
        self.credential_retry = policy;
        self
    }
}
