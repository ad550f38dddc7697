// ── Domain model ──
//
// Typed shapes of what the switch reports. Every field the firmware may
// leave out is an `Option`; serialised nulls mean "not reported".

pub mod port;
pub mod snapshot;
pub mod system;
pub mod vlan;

// ── Re-exports ──────────────────────────────────────────────────────

pub use port::{BandwidthLimit, BandwidthTable, LinkStatus, LinkStatusTable, PortRecord, SfpInfo};
pub use snapshot::{NetworkSection, SwitchSnapshot, SystemSection};
pub use system::{
    BackupArchive, DhcpSettings, NetworkConfig, StaticIpv4, SystemField, SystemInfo,
    SystemResources,
};
pub use vlan::VlanRecord;
