// Device identity and connection profile
//
// A profile says *how* to reach a switch; a key says *which* session
// state belongs to it. Named devices are keyed by their identifier,
// inline profiles by a fingerprint of their contents.

use std::fmt;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use url::Url;

/// Per-request timeout used when a profile doesn't specify one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection parameters for one switch.
#[derive(Debug, Clone)]
pub struct DeviceProfile {
    /// Web-management root, e.g. `http://192.168.0.100`.
    pub base_url: Url,
    pub username: String,
    pub password: SecretString,
    pub timeout: Duration,
}

impl DeviceProfile {
    pub fn new(base_url: Url, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            base_url,
            username: username.into(),
            password,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Same address and timeout, new credentials.
    pub fn with_credentials(&self, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            base_url: self.base_url.clone(),
            username: username.into(),
            password,
            timeout: self.timeout,
        }
    }

    /// Base URL without the trailing slash `Url` always renders.
    pub fn base(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }
}

/// Stable identity of a device's session state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceKey(String);

impl DeviceKey {
    /// Key for a device registered under `id`.
    pub fn named(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Key for an inline profile: a digest of everything that identifies it.
    ///
    /// Changing the credentials changes the key, so a rotated inline
    /// profile never reuses the old session.
    pub fn for_profile(profile: &DeviceProfile) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(profile.base_url.as_str().as_bytes());
        hasher.update([0]);
        hasher.update(profile.username.as_bytes());
        hasher.update([0]);
        hasher.update(profile.password.expose_secret().as_bytes());
        hasher.update([0]);
        hasher.update(profile.timeout.as_millis().to_le_bytes());
        Self(format!("inline-{}", hex::encode(hasher.finalize())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short filesystem-safe fingerprint used to name the cookie jar.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        hex::encode(&digest[..8])
    }
}

impl fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A resolved target: profile plus the key its session lives under.
#[derive(Debug, Clone)]
pub struct Device {
    pub key: DeviceKey,
    pub profile: DeviceProfile,
    /// Human identifier for messages (registered name, or the address).
    pub name: String,
}

impl Device {
    /// A device registered under `id`.
    pub fn named(id: impl Into<String>, profile: DeviceProfile) -> Self {
        let id = id.into();
        Self {
            key: DeviceKey::named(id.clone()),
            profile,
            name: id,
        }
    }

    /// A one-off device described only by its profile.
    pub fn inline(profile: DeviceProfile) -> Self {
        Self {
            key: DeviceKey::for_profile(&profile),
            name: profile.base().to_owned(),
            profile,
        }
    }

    /// `"<name> @ <base_url>"`, used in error messages and diagnostics.
    pub fn label(&self) -> String {
        format!("{} @ {}", self.name, self.profile.base_url)
    }
}
