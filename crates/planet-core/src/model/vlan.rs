// ── VLAN table entries ──

use serde::Serialize;

/// One 802.1Q VLAN as reported by `vlan.cgi`.
///
/// Port lists are kept in the firmware's own notation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VlanRecord {
    pub name: Option<String>,
    pub vid: Option<i64>,
    pub state: Option<String>,
    pub member_ports: Option<String>,
    pub tagged_ports: Option<String>,
    pub untagged_ports: Option<String>,
    pub forbidden_ports: Option<String>,
    pub priority: Option<i64>,
    pub gvrp_enabled: Option<bool>,
    pub age_seconds: Option<i64>,
    pub dynamic_members: Option<String>,
}
