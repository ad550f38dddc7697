// ── Device registry ──
//
// Named devices registered once and reused across calls. Inline targets
// bypass the registry and are keyed by their profile fingerprint.

use dashmap::DashMap;
use planet_api::{Device, DeviceProfile};
use secrecy::SecretString;
use tracing::debug;

use crate::error::CoreError;

/// What an operation runs against.
#[derive(Debug, Clone)]
pub enum DeviceTarget {
    /// A device registered under this identifier.
    Named(String),
    /// A one-off profile supplied with the call.
    Inline(DeviceProfile),
}

impl From<&str> for DeviceTarget {
    fn from(id: &str) -> Self {
        Self::Named(id.to_owned())
    }
}

impl From<String> for DeviceTarget {
    fn from(id: String) -> Self {
        Self::Named(id)
    }
}

impl From<DeviceProfile> for DeviceTarget {
    fn from(profile: DeviceProfile) -> Self {
        Self::Inline(profile)
    }
}

/// Concurrent map of device identifier to connection profile.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: DashMap<String, DeviceProfile>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a named device.
    pub fn register(&self, id: &str, profile: DeviceProfile) -> Result<(), CoreError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(CoreError::invalid("device id", "must not be empty"));
        }
        debug!(device = id, address = %profile.base_url, "registered device");
        self.devices.insert(id.to_owned(), profile);
        Ok(())
    }

    pub fn unregister(&self, id: &str) -> Option<DeviceProfile> {
        self.devices.remove(id).map(|(_, profile)| profile)
    }

    pub fn get(&self, id: &str) -> Option<DeviceProfile> {
        self.devices.get(id).map(|entry| entry.value().clone())
    }

    /// Registered identifiers, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.devices.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Swap the stored credentials of a named device. Returns the new
    /// profile, or `None` if `id` isn't registered.
    pub fn update_credentials(
        &self,
        id: &str,
        username: &str,
        password: SecretString,
    ) -> Option<DeviceProfile> {
        let mut entry = self.devices.get_mut(id)?;
        let updated = entry.with_credentials(username, password);
        *entry = updated.clone();
        Some(updated)
    }

    /// Turn a target into a concrete device.
    pub fn resolve(&self, target: &DeviceTarget) -> Result<Device, CoreError> {
        match target {
            DeviceTarget::Named(id) => self
                .get(id)
                .map(|profile| Device::named(id.clone(), profile))
                .ok_or_else(|| CoreError::UnknownDevice { id: id.clone() }),
            DeviceTarget::Inline(profile) => Ok(Device::inline(profile.clone())),
        }
    }
}
