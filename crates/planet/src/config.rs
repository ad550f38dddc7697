//! Turns the config file plus global flags into a ready `Planet` facade
//! and the target every command runs against.
//!
//! Core never sees these types; it receives a built `PlanetConfig` and a
//! `DeviceProfile`.

use std::io::IsTerminal;
use std::time::Duration;

use planet_config::{Config, device_profile, parse_address, planet_config};
use planet_core::{DeviceProfile, DeviceTarget, Diagnostics, Planet};
use secrecy::SecretString;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Default login of a factory-fresh switch.
const DEFAULT_USERNAME: &str = "admin";

/// Name of the device a command should run against, if any.
pub fn active_device_name(global: &GlobalOpts, cfg: &Config) -> Option<String> {
    global.device.clone().or_else(|| cfg.default_device.clone())
}

/// Build the facade and resolve the target from flags and the config file.
///
/// `--address` wins and describes an inline device. Otherwise the named
/// device (flag, then `default_device`) is registered with any flag
/// overrides applied.
pub fn connect(global: &GlobalOpts, cfg: &Config) -> Result<(Planet, DeviceTarget), CliError> {
    let mut settings = planet_config(cfg);
    if global.trace {
        settings = settings.with_diagnostics(Diagnostics::enabled());
    }
    let planet = Planet::new(settings);

    if let Some(ref address) = global.address {
        let profile = inline_profile(address, global, cfg)?;
        return Ok((planet, DeviceTarget::Inline(profile)));
    }

    let name = active_device_name(global, cfg).ok_or_else(|| CliError::NoDevice {
        path: planet_config::config_path().display().to_string(),
    })?;
    let profile = named_profile(&name, global, cfg)?;
    planet.register_device(&name, profile).map_err(|e| CliError::Validation {
        field: "device".into(),
        reason: e.to_string(),
    })?;
    Ok((planet, DeviceTarget::Named(name)))
}

fn named_profile(name: &str, global: &GlobalOpts, cfg: &Config) -> Result<DeviceProfile, CliError> {
    let entry = cfg.device(name).map_err(|_| CliError::UnknownDevice {
        name: name.into(),
        available: available_devices(cfg),
    })?;

    // Flag credentials replace the entry's, so don't insist on a stored
    // password when one was given on the command line.
    let mut entry = entry.clone();
    if let Some(ref password) = global.password {
        entry.password = Some(password.clone());
        entry.password_env = None;
    }
    if let Some(ref username) = global.username {
        entry.username.clone_from(username);
    }
    if let Some(timeout) = global.timeout {
        entry.timeout = Some(timeout);
    }
    device_profile(&entry, name, &cfg.defaults).map_err(CliError::from)
}

fn inline_profile(address: &str, global: &GlobalOpts, cfg: &Config) -> Result<DeviceProfile, CliError> {
    let url = parse_address(address)?;
    let username = global.username.clone().unwrap_or_else(|| DEFAULT_USERNAME.into());
    let password = match global.password {
        Some(ref pw) => SecretString::from(pw.clone()),
        None => prompt_password(&format!("Password for {username}@{address}: "), address)?,
    };
    let timeout = Duration::from_secs(global.timeout.unwrap_or(cfg.defaults.timeout));
    Ok(DeviceProfile::new(url, username, password).with_timeout(timeout))
}

/// Read a password from the terminal; refuse when there is none.
pub fn prompt_password(prompt: &str, device: &str) -> Result<SecretString, CliError> {
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NoCredentials {
            device: device.into(),
        });
    }
    let password = rpassword::prompt_password(prompt)?;
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok(SecretString::from(password))
}

pub fn available_devices(cfg: &Config) -> String {
    if cfg.devices.is_empty() {
        "(none)".into()
    } else {
        cfg.devices.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}
