// ── System operations ──
//
// Identity, load, and addressing reads, plus the text-field writes on
// the system-information page.

use indexmap::IndexMap;
use planet_api::DeviceRequest;
use planet_api::codec::{decode_positional, encode_read_selector};
use tracing::debug;

use crate::convert::{normalize_system_value, numeric};
use crate::model::{
    DhcpSettings, NetworkConfig, StaticIpv4, SystemField, SystemInfo, SystemResources,
};
use crate::planet::Planet;
use crate::registry::DeviceTarget;
use crate::result::{Operation, OperationResult};

const SYSINFO_PATH: &str = "/cgi-bin/sysinfo.cgi";
const CPUINFO_PATH: &str = "/cgi-bin/cpuinfo.cgi";
const IP_PATH: &str = "/cgi-bin/ip.cgi";

/// Requested in this order; the response is positional.
const SYSTEM_INFO_FIELDS: [&str; 9] = [
    "mac",
    "fwversion",
    "sysdate",
    "uptime",
    "fwdate",
    "devicename",
    "comment",
    "location",
    "contact",
];

const NETWORK_FIELDS: [&str; 7] = [
    "address",
    "submask",
    "gateway",
    "dhcpc",
    "dhcp_IP",
    "dhcp_submask",
    "dhcp_gateway",
];

impl Planet {
    /// MAC, firmware, clock, uptime, and the editable text fields.
    pub async fn system_info(&self, target: &DeviceTarget) -> OperationResult<SystemInfo> {
        Self::guard(Operation::SystemInfo, async {
            let device = self.connect(target).await?;
            let request = DeviceRequest::get(SYSINFO_PATH)
                .raw_query(encode_read_selector(&SYSTEM_INFO_FIELDS))
                .read_from("system_info.htm");
            let body = self.fetch_text(&device, request).await?;

            let mut values = decode_positional(&body, &SYSTEM_INFO_FIELDS);
            let mut take = |field: &str| values.swap_remove(field).flatten();
            Ok(SystemInfo {
                mac: take("mac"),
                fwversion: take("fwversion"),
                sysdate: take("sysdate"),
                uptime: take("uptime"),
                fwdate: take("fwdate"),
                devicename: take("devicename"),
                comment: take("comment"),
                location: take("location"),
                contact: take("contact"),
            })
        })
        .await
    }

    /// Memory usage and CPU load. The body is a bare `<ramKB>=<cpu%>`.
    pub async fn system_resources(
        &self,
        target: &DeviceTarget,
    ) -> OperationResult<SystemResources> {
        Self::guard(Operation::SystemResources, async {
            let device = self.connect(target).await?;
            let request = DeviceRequest::get(CPUINFO_PATH).read_from("system_monitor.htm");
            let body = self.fetch_text(&device, request).await?;
            Ok(parse_resources(body.trim()))
        })
        .await
    }

    /// Static and DHCP addressing of the management interface.
    pub async fn network_config(&self, target: &DeviceTarget) -> OperationResult<NetworkConfig> {
        Self::guard(Operation::NetworkConfig, async {
            let device = self.connect(target).await?;
            let request = DeviceRequest::get(IP_PATH)
                .raw_query(encode_read_selector(&NETWORK_FIELDS))
                .read_from("ip_config.htm");
            let body = self.fetch_text(&device, request).await?;

            let mut values = decode_positional(&body, &NETWORK_FIELDS);
            let mut take = |field: &str| values.swap_remove(field).flatten();
            Ok(NetworkConfig {
                static_ipv4: StaticIpv4 {
                    ip: take("address"),
                    subnet: take("submask"),
                    gateway: take("gateway"),
                },
                dhcp: DhcpSettings {
                    enabled: take("dhcpc").map(|v| v == "1"),
                    ip: take("dhcp_IP"),
                    subnet: take("dhcp_submask"),
                    gateway: take("dhcp_gateway"),
                },
            })
        })
        .await
    }

    /// Write system-info text fields, one request per field, then save.
    ///
    /// Values are scrubbed and cut to the firmware's length limits first.
    /// Every write must be acknowledged before the save is attempted; any
    /// rejection (or an empty field set) yields `false`.
    pub async fn update_system_info(
        &self,
        target: &DeviceTarget,
        fields: &IndexMap<SystemField, String>,
    ) -> OperationResult<bool> {
        Self::guard(Operation::UpdateSystemInfo, async {
            let device = self.connect(target).await?;
            if fields.is_empty() {
                return Ok(false);
            }

            let normalized: IndexMap<String, String> = fields
                .iter()
                .map(|(field, value)| {
                    (
                        field.to_string(),
                        normalize_system_value(value, field.max_len()),
                    )
                })
                .collect();
            debug!(device = %device.key, fields = ?normalized, "updating system info fields");

            let mut all_acknowledged = true;
            for (field, value) in &normalized {
                let single = IndexMap::from([(field.clone(), value.clone())]);
                let acknowledged = self
                    .write_fields(&device, SYSINFO_PATH, "sysinfo.htm", &single)
                    .await?;
                all_acknowledged &= acknowledged;
            }

            if !all_acknowledged {
                return Ok(false);
            }
            self.commit(&device).await
        })
        .await
    }

    /// Rename the switch. Shorthand for a one-field `update_system_info`.
    pub async fn set_device_name(&self, target: &DeviceTarget, name: &str) -> OperationResult<bool> {
        let fields = IndexMap::from([(SystemField::DeviceName, name.to_owned())]);
        self.update_system_info(target, &fields).await
    }
}

fn parse_resources(body: &str) -> SystemResources {
    if body.is_empty() {
        return SystemResources::default();
    }
    let (ram, cpu) = match body.split_once('=') {
        Some((ram, cpu)) => (ram, Some(cpu)),
        None => (body, None),
    };
    SystemResources::new(numeric(ram), cpu.and_then(numeric))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resources_parse_ram_and_cpu() {
        let r = parse_resources("51200=7");
        assert_eq!(r.ram_usage_kb, Some(51200));
        assert_eq!(r.cpu_usage_percent, Some(7));
        assert_eq!(r.free_memory_display.as_deref(), Some("51200K"));
    }

    #[test]
    fn resources_tolerate_missing_halves() {
        assert_eq!(parse_resources(""), SystemResources::default());
        let ram_only = parse_resources("2048");
        assert_eq!(ram_only.ram_usage_kb, Some(2048));
        assert_eq!(ram_only.cpu_usage_percent, None);
        let cpu_only = parse_resources("=12");
        assert_eq!(cpu_only.ram_usage_kb, None);
        assert_eq!(cpu_only.cpu_usage_display.as_deref(), Some("12%"));
    }
}
