//! Shared configuration for PLANET switch tools.
//!
//! TOML device entries, credential resolution (env + plaintext + keyring),
//! and translation to `planet_core` types. The CLI layers its global-flag
//! overrides on top of what this crate resolves.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use planet_core::{DeviceProfile, Diagnostics, PlanetConfig};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Keyring service every stored password lives under.
pub const KEYRING_SERVICE: &str = "planet";

/// Prefix for environment overrides, e.g. `PLANET_DEFAULTS__TIMEOUT=5`.
pub const ENV_PREFIX: &str = "PLANET_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no device named '{name}' in the config file")]
    UnknownDevice { name: String },

    #[error("no password configured for device '{device}'")]
    NoCredentials { device: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level `config.toml`.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Device used when no `--device` or `--address` is given.
    pub default_device: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named switches, `[devices.<name>]`.
    #[serde(default)]
    pub devices: BTreeMap<String, DeviceEntry>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Where session cookie jars are kept. Unset uses the cache dir.
    pub cookie_dir: Option<PathBuf>,

    /// Trace every exchange with the switch.
    #[serde(default)]
    pub diagnostics: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
            cookie_dir: None,
            diagnostics: false,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    10
}
fn default_username() -> String {
    "admin".into()
}

/// One `[devices.<name>]` table.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceEntry {
    /// Host, host:port, or full URL of the web UI.
    pub address: String,

    #[serde(default = "default_username")]
    pub username: String,

    /// Plaintext password (prefer `password_env` or the keyring).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Environment variable holding the password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    /// Override the default timeout, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl Config {
    pub fn device(&self, name: &str) -> Result<&DeviceEntry, ConfigError> {
        self.devices.get(name).ok_or_else(|| ConfigError::UnknownDevice {
            name: name.to_owned(),
        })
    }
}

// ── Config file path ────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "planet-switch", "planet")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default cookie-jar directory when `defaults.cookie_dir` is unset.
pub fn default_cookie_dir() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".cache").join("cookies"),
        |dirs| dirs.cache_dir().join("cookies"),
    )
}

fn dirs_fallback(kind: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(kind);
    p.push("planet");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from the canonical path plus the environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load `path` (a missing file is fine) with `PLANET_` env overrides on top.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist or is broken.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(device: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{device}/password"))
}

/// Resolve a device password without CLI flags.
///
/// Order: the entry's `password_env` variable, the plaintext `password`,
/// then the system keyring.
pub fn resolve_password(entry: &DeviceEntry, device: &str) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = entry.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Some(ref pw) = entry.password {
        return Ok(SecretString::from(pw.clone()));
    }

    if let Ok(keyring) = keyring_entry(device) {
        if let Ok(pw) = keyring.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    Err(ConfigError::NoCredentials {
        device: device.into(),
    })
}

/// Store `password` in the system keyring for `device`.
pub fn store_password(device: &str, password: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(device)?.set_password(password.expose_secret())?;
    Ok(())
}

// ── Translation to core types ───────────────────────────────────────

/// Parse a device address. A bare host or `host:port` means plain HTTP.
pub fn parse_address(address: &str) -> Result<Url, ConfigError> {
    let trimmed = address.trim();
    let candidate = if trimmed.contains("://") {
        trimmed.to_owned()
    } else {
        format!("http://{trimmed}")
    };
    let url = Url::parse(&candidate).map_err(|e| ConfigError::Validation {
        field: "address".into(),
        reason: format!("{address}: {e}"),
    })?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::Validation {
            field: "address".into(),
            reason: format!("{address}: missing host"),
        });
    }
    Ok(url)
}

/// Build a `DeviceProfile` from a config entry, no CLI overrides.
pub fn device_profile(
    entry: &DeviceEntry,
    name: &str,
    defaults: &Defaults,
) -> Result<DeviceProfile, ConfigError> {
    let url = parse_address(&entry.address)?;
    let password = resolve_password(entry, name)?;
    let timeout = Duration::from_secs(entry.timeout.unwrap_or(defaults.timeout));
    Ok(DeviceProfile::new(url, entry.username.clone(), password).with_timeout(timeout))
}

/// Facade settings from the `[defaults]` table.
pub fn planet_config(cfg: &Config) -> PlanetConfig {
    let cookie_dir = cfg
        .defaults
        .cookie_dir
        .clone()
        .unwrap_or_else(default_cookie_dir);
    let config = PlanetConfig::default().with_cookie_dir(cookie_dir);
    if cfg.defaults.diagnostics {
        config.with_diagnostics(Diagnostics::enabled())
    } else {
        config
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SAMPLE: &str = r#"
default_device = "core"

[defaults]
output = "json"
timeout = 5

[devices.core]
address = "192.168.0.100"
password = "admin"

[devices.edge]
address = "https://10.1.1.2:8443"
username = "ops"
password_env = "PLANET_TEST_UNSET_EDGE_PASSWORD"
password = "fallback"
timeout = 20
"#;

    fn write_sample(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        path
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.defaults.output, "table");
        assert_eq!(cfg.defaults.timeout, 10);
        assert!(cfg.devices.is_empty());
    }

    #[test]
    fn devices_resolve_to_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&write_sample(&dir)).unwrap();
        assert_eq!(cfg.default_device.as_deref(), Some("core"));

        let core = device_profile(cfg.device("core").unwrap(), "core", &cfg.defaults).unwrap();
        assert_eq!(core.base(), "http://192.168.0.100");
        assert_eq!(core.username, "admin");
        assert_eq!(core.password.expose_secret(), "admin");
        assert_eq!(core.timeout, Duration::from_secs(5));

        let edge = device_profile(cfg.device("edge").unwrap(), "edge", &cfg.defaults).unwrap();
        assert_eq!(edge.base(), "https://10.1.1.2:8443");
        assert_eq!(edge.username, "ops");
        assert_eq!(edge.password.expose_secret(), "fallback");
        assert_eq!(edge.timeout, Duration::from_secs(20));
    }

    #[test]
    fn unknown_device_is_reported() {
        let cfg = Config::default();
        assert!(matches!(
            cfg.device("nope"),
            Err(ConfigError::UnknownDevice { name }) if name == "nope"
        ));
    }

    #[test]
    fn save_then_load_keeps_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.devices.insert(
            "lab".into(),
            DeviceEntry {
                address: "10.0.0.2".into(),
                username: "admin".into(),
                password: None,
                password_env: Some("LAB_PW".into()),
                timeout: None,
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("[devices.lab]"));
        assert!(!written.contains("password ="));

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.devices["lab"].password_env.as_deref(), Some("LAB_PW"));
    }

    #[test]
    fn addresses_are_normalized() {
        assert_eq!(parse_address("10.0.0.2").unwrap().as_str(), "http://10.0.0.2/");
        assert_eq!(
            parse_address(" switch.lan:8080 ").unwrap().as_str(),
            "http://switch.lan:8080/"
        );
        assert!(parse_address("http://").is_err());
    }

    #[test]
    fn defaults_feed_the_facade_config() {
        let mut cfg = Config::default();
        cfg.defaults.cookie_dir = Some(PathBuf::from("/var/tmp/planet"));
        cfg.defaults.diagnostics = true;
        let planet = planet_config(&cfg);
        assert_eq!(planet.cookie_dir, Some(PathBuf::from("/var/tmp/planet")));
        assert!(planet.transport.diagnostics.is_enabled());
    }
}
