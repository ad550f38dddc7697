// planet-core: Typed operations over the PLANET switch field protocol.

pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod ops;
pub mod planet;
pub mod registry;
pub mod result;
pub mod retry;
pub mod snapshot;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::PlanetConfig;
pub use error::CoreError;
pub use ops::maintenance::CredentialUpdate;
pub use ops::vlans::{DEFAULT_VLAN_COUNT, DEFAULT_VLAN_START, MAX_VLAN_BATCH};
pub use planet::Planet;
pub use registry::{DeviceRegistry, DeviceTarget};
pub use result::{FailureContext, Operation, OperationFailure, OperationResult};
pub use retry::RetryPolicy;
pub use snapshot::{DEFAULT_SFP_PORT, merge_ports};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    BackupArchive, BandwidthLimit, BandwidthTable, DhcpSettings, LinkStatus, LinkStatusTable,
    NetworkConfig, NetworkSection, PortRecord, SfpInfo, StaticIpv4, SwitchSnapshot, SystemField,
    SystemInfo, SystemResources, SystemSection, VlanRecord,
};

// Connection types callers need to build targets.
pub use planet_api::{DeviceProfile, Diagnostics, DiagnosticSink, SessionStore, TransportConfig};
