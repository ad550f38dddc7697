// ── Per-port records ──

use std::collections::BTreeMap;

use serde::Serialize;

/// Ingress/egress rate limits for one port, in kbps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BandwidthLimit {
    pub ingress_rate: Option<i64>,
    pub egress_rate: Option<i64>,
}

/// Bandwidth limits keyed by 1-based port index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BandwidthTable {
    pub ports: BTreeMap<u32, BandwidthLimit>,
}

/// Negotiated link state of one port.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinkStatus {
    pub auto_negotiation: Option<bool>,
    pub flow_control: Option<bool>,
    pub asymmetric_flow: Option<bool>,
    pub duplex_full: Option<bool>,
    pub speed_mbps: Option<i64>,
    pub link_up: Option<bool>,
    pub link_time_seconds: Option<i64>,
}

impl LinkStatus {
    /// Fill in fields `self` doesn't know from `derived`. Known fields
    /// are never overwritten.
    pub fn merge_missing(&mut self, derived: &LinkStatus) {
        fn fill<T: Copy>(slot: &mut Option<T>, other: Option<T>) {
            if slot.is_none() {
                *slot = other;
            }
        }
        fill(&mut self.auto_negotiation, derived.auto_negotiation);
        fill(&mut self.flow_control, derived.flow_control);
        fill(&mut self.asymmetric_flow, derived.asymmetric_flow);
        fill(&mut self.duplex_full, derived.duplex_full);
        fill(&mut self.speed_mbps, derived.speed_mbps);
        fill(&mut self.link_up, derived.link_up);
        fill(&mut self.link_time_seconds, derived.link_time_seconds);
    }
}

/// Link state keyed by 1-based port index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkStatusTable {
    pub ports: BTreeMap<u32, LinkStatus>,
}

/// Transceiver details from `sfp_info.cgi`. Empty values are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SfpInfo {
    pub port: Option<String>,
    #[serde(rename = "type")]
    pub module_type: Option<String>,
    pub speed: Option<String>,
    pub wave_length_nm: Option<String>,
    pub distance_m: Option<String>,
    pub temperature_c: Option<String>,
    pub voltage_v: Option<String>,
    pub current_ma: Option<String>,
    pub tx_power_dbm: Option<String>,
    pub rx_power_dbm: Option<String>,
    pub vendor_name: Option<String>,
    pub vendor_oui: Option<String>,
    pub vendor_part_number: Option<String>,
    pub vendor_revision: Option<String>,
    pub vendor_serial: Option<String>,
    pub date_code: Option<String>,
}

/// Everything known about one port after aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PortRecord {
    pub port_index: u32,
    pub bandwidth: Option<BandwidthLimit>,
    pub link_status: Option<LinkStatus>,
    pub sfp_info: Option<SfpInfo>,
}
