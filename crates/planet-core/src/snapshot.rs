// ── Switch snapshot ──
//
// Runs every read in a fixed order and folds the per-port tables into
// one record per port. The first failing read is returned as-is.

use std::collections::BTreeMap;

use crate::convert::{flag, numeric};
use crate::model::{
    BandwidthTable, LinkStatus, LinkStatusTable, NetworkSection, PortRecord, SfpInfo,
    SwitchSnapshot, SystemSection,
};
use crate::ops::vlans::{DEFAULT_VLAN_COUNT, DEFAULT_VLAN_START};
use crate::planet::Planet;
use crate::registry::DeviceTarget;
use crate::result::{Operation, OperationResult};

/// Port the SFP cage sits on when the module doesn't report one.
pub const DEFAULT_SFP_PORT: u32 = 3;

/// Unwrap a sub-read or return its failure unchanged.
macro_rules! read_or_return {
    ($read:expr) => {
        match $read.await {
            OperationResult::Success { data, .. } => data,
            OperationResult::Failure(failure) => return OperationResult::Failure(failure),
        }
    };
}

impl Planet {
    /// Everything the switch reports, merged per port.
    pub async fn snapshot(&self, target: &DeviceTarget) -> OperationResult<SwitchSnapshot> {
        if let Err(e) = self.connect(target).await {
            return Self::failure(Operation::Snapshot, &e);
        }

        let details = read_or_return!(self.system_info(target));
        let resources = read_or_return!(self.system_resources(target));
        let ipv4 = read_or_return!(self.network_config(target));
        let bandwidth = read_or_return!(self.bandwidth_control(target));
        let sfp = read_or_return!(self.sfp_info(target));
        let links = read_or_return!(self.port_link_status(target));
        let vlans = read_or_return!(self.vlans(target, DEFAULT_VLAN_START, DEFAULT_VLAN_COUNT));

        OperationResult::success(
            Operation::Snapshot,
            SwitchSnapshot {
                system: SystemSection {
                    details,
                    resources,
                    network: NetworkSection { ipv4, vlans },
                },
                ports: merge_ports(&bandwidth, &links, sfp.as_ref()),
            },
        )
    }
}

/// Build one record per port from the bandwidth and link tables, then
/// fold the SFP module (if any) into the port it reports.
///
/// Link fields read from the SFP page only fill gaps: a value the port
/// table reported is never replaced.
pub fn merge_ports(
    bandwidth: &BandwidthTable,
    links: &LinkStatusTable,
    sfp: Option<&SfpInfo>,
) -> BTreeMap<u32, PortRecord> {
    let mut ports: BTreeMap<u32, PortRecord> = bandwidth
        .ports
        .keys()
        .chain(links.ports.keys())
        .map(|&index| {
            let record = PortRecord {
                port_index: index,
                bandwidth: bandwidth.ports.get(&index).copied(),
                link_status: links.ports.get(&index).copied(),
                sfp_info: None,
            };
            (index, record)
        })
        .collect();

    if let Some(sfp) = sfp {
        let index = sfp_port(sfp);
        let record = ports.entry(index).or_insert_with(|| PortRecord {
            port_index: index,
            ..PortRecord::default()
        });
        let derived = sfp_link_status(sfp);
        match record.link_status.as_mut() {
            Some(explicit) => explicit.merge_missing(&derived),
            None => record.link_status = Some(derived),
        }
        record.sfp_info = Some(sfp.clone());
    }

    ports
}

/// Port index the SFP module reports, or [`DEFAULT_SFP_PORT`].
pub fn sfp_port(sfp: &SfpInfo) -> u32 {
    sfp.port
        .as_deref()
        .and_then(numeric)
        .and_then(|n| u32::try_from(n).ok())
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_SFP_PORT)
}

fn sfp_link_status(sfp: &SfpInfo) -> LinkStatus {
    LinkStatus {
        speed_mbps: sfp.speed.as_deref().and_then(numeric),
        link_up: sfp.port.as_deref().and_then(flag),
        ..LinkStatus::default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::BandwidthLimit;

    fn link(speed: i64, up: bool) -> LinkStatus {
        LinkStatus {
            speed_mbps: Some(speed),
            link_up: Some(up),
            duplex_full: Some(true),
            ..LinkStatus::default()
        }
    }

    fn tables() -> (BandwidthTable, LinkStatusTable) {
        let bandwidth = BandwidthTable {
            ports: BTreeMap::from([(
                1,
                BandwidthLimit {
                    ingress_rate: Some(1000),
                    egress_rate: Some(2000),
                },
            )]),
        };
        let links = LinkStatusTable {
            ports: BTreeMap::from([(1, link(1000, true)), (2, link(100, false))]),
        };
        (bandwidth, links)
    }

    #[test]
    fn ports_are_the_union_of_both_tables() {
        let (bandwidth, links) = tables();
        let ports = merge_ports(&bandwidth, &links, None);
        assert_eq!(ports.keys().copied().collect::<Vec<_>>(), [1, 2]);
        assert!(ports[&1].bandwidth.is_some());
        assert!(ports[&2].bandwidth.is_none());
        assert_eq!(ports[&2].link_status, Some(link(100, false)));
    }

    #[test]
    fn sfp_on_port_zero_lands_on_default_port() {
        let (bandwidth, links) = tables();
        let sfp = SfpInfo {
            port: Some("0".into()),
            speed: Some("1000".into()),
            ..SfpInfo::default()
        };
        let ports = merge_ports(&bandwidth, &links, Some(&sfp));

        assert_eq!(ports.keys().copied().collect::<Vec<_>>(), [1, 2, 3]);
        let sfp_port = &ports[&DEFAULT_SFP_PORT];
        assert_eq!(sfp_port.port_index, 3);
        assert_eq!(sfp_port.sfp_info.as_ref(), Some(&sfp));
        assert_eq!(sfp_port.bandwidth, None);
        let status = sfp_port.link_status.unwrap();
        assert_eq!(status.speed_mbps, Some(1000));
        assert_eq!(status.link_up, Some(false));
        assert_eq!(status.duplex_full, None);
    }

    #[test]
    fn explicit_link_fields_win_over_sfp() {
        let (bandwidth, links) = tables();
        let sfp = SfpInfo {
            port: Some("2".into()),
            speed: Some("10000".into()),
            ..SfpInfo::default()
        };
        let ports = merge_ports(&bandwidth, &links, Some(&sfp));

        assert_eq!(ports.len(), 2);
        let status = ports[&2].link_status.unwrap();
        assert_eq!(status.speed_mbps, Some(100));
        assert_eq!(status.link_up, Some(false));
        assert_eq!(status.duplex_full, Some(true));
        assert!(ports[&2].sfp_info.is_some());
    }

    #[test]
    fn derived_nulls_never_erase_known_fields() {
        let bandwidth = BandwidthTable::default();
        let links = LinkStatusTable {
            ports: BTreeMap::from([(
                3,
                LinkStatus {
                    speed_mbps: None,
                    link_time_seconds: Some(3600),
                    ..LinkStatus::default()
                },
            )]),
        };
        let sfp = SfpInfo {
            port: None,
            speed: Some("1000Mbps".into()),
            ..SfpInfo::default()
        };
        let ports = merge_ports(&bandwidth, &links, Some(&sfp));

        let status = ports[&3].link_status.unwrap();
        assert_eq!(status.speed_mbps, Some(1000));
        assert_eq!(status.link_time_seconds, Some(3600));
        assert_eq!(status.link_up, None);
    }

    #[test]
    fn sfp_port_parsing() {
        let with = |port: Option<&str>| SfpInfo {
            port: port.map(str::to_owned),
            ..SfpInfo::default()
        };
        assert_eq!(sfp_port(&with(Some("5"))), 5);
        assert_eq!(sfp_port(&with(Some("-1"))), DEFAULT_SFP_PORT);
        assert_eq!(sfp_port(&with(Some("n/a"))), DEFAULT_SFP_PORT);
        assert_eq!(sfp_port(&with(None)), DEFAULT_SFP_PORT);
    }
}
