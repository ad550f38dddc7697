// ── System-level records ──

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::{AsRefStr, Display, EnumString};

/// Identity and firmware details from `sysinfo.cgi`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SystemInfo {
    pub mac: Option<String>,
    pub fwversion: Option<String>,
    pub sysdate: Option<String>,
    pub uptime: Option<String>,
    pub fwdate: Option<String>,
    pub devicename: Option<String>,
    pub comment: Option<String>,
    pub location: Option<String>,
    pub contact: Option<String>,
}

/// Writable system-info text fields and their firmware length limits.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display, AsRefStr,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SystemField {
    #[strum(to_string = "devicename", serialize = "name")]
    DeviceName,
    Comment,
    Location,
    Contact,
}

impl SystemField {
    /// Longest value the firmware stores for this field.
    pub fn max_len(self) -> usize {
        match self {
            Self::DeviceName => 15,
            Self::Comment | Self::Location | Self::Contact => 25,
        }
    }
}

/// Memory and CPU load from `cpuinfo.cgi`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SystemResources {
    pub ram_usage_kb: Option<i64>,
    pub cpu_usage_percent: Option<i64>,
    /// `"<n>K"`, as the web UI shows it.
    pub free_memory_display: Option<String>,
    /// `"<n>%"`, as the web UI shows it.
    pub cpu_usage_display: Option<String>,
}

impl SystemResources {
    pub fn new(ram_usage_kb: Option<i64>, cpu_usage_percent: Option<i64>) -> Self {
        Self {
            ram_usage_kb,
            cpu_usage_percent,
            free_memory_display: ram_usage_kb.map(|n| format!("{n}K")),
            cpu_usage_display: cpu_usage_percent.map(|n| format!("{n}%")),
        }
    }
}

/// Statically configured IPv4 settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StaticIpv4 {
    pub ip: Option<String>,
    pub subnet: Option<String>,
    pub gateway: Option<String>,
}

/// DHCP client state and the lease it holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DhcpSettings {
    pub enabled: Option<bool>,
    pub ip: Option<String>,
    pub subnet: Option<String>,
    pub gateway: Option<String>,
}

/// Management-interface addressing from `ip.cgi`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NetworkConfig {
    #[serde(rename = "static")]
    pub static_ipv4: StaticIpv4,
    pub dhcp: DhcpSettings,
}

/// Path the firmware writes its configuration archive to.
pub const BACKUP_ARCHIVE_PATH: &str = "/tmp/current.tar.gz";

/// Raw configuration archive pulled off the switch.
///
/// Persisting and hashing it is the caller's business.
#[derive(Debug, Clone, Serialize)]
pub struct BackupArchive {
    pub source_path: String,
    #[serde(skip)]
    pub bytes: Bytes,
    pub size: usize,
    pub fetched_at: DateTime<Utc>,
}

impl BackupArchive {
    pub fn new(bytes: Bytes) -> Self {
        Self {
            source_path: BACKUP_ARCHIVE_PATH.to_owned(),
            size: bytes.len(),
            bytes,
            fetched_at: Utc::now(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn resources_render_display_strings() {
        let r = SystemResources::new(Some(51200), Some(7));
        assert_eq!(r.free_memory_display.as_deref(), Some("51200K"));
        assert_eq!(r.cpu_usage_display.as_deref(), Some("7%"));
        assert_eq!(SystemResources::new(None, None), SystemResources::default());
    }

    #[test]
    fn system_field_parses_wire_names() {
        assert_eq!("devicename".parse::<SystemField>().unwrap(), SystemField::DeviceName);
        assert_eq!("name".parse::<SystemField>().unwrap(), SystemField::DeviceName);
        assert_eq!(SystemField::DeviceName.as_ref(), "devicename");
        assert_eq!(SystemField::Location.max_len(), 25);
    }
}
