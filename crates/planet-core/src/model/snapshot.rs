// ── Whole-switch snapshot ──

use std::collections::BTreeMap;

use serde::Serialize;

use super::port::PortRecord;
use super::system::{NetworkConfig, SystemInfo, SystemResources};
use super::vlan::VlanRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NetworkSection {
    pub ipv4: NetworkConfig,
    pub vlans: Vec<VlanRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SystemSection {
    pub details: SystemInfo,
    pub resources: SystemResources,
    pub network: NetworkSection,
}

/// System-wide section plus one record per port, ordered by port index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SwitchSnapshot {
    pub system: SystemSection,
    pub ports: BTreeMap<u32, PortRecord>,
}
