// ── Port operations ──
//
// Bandwidth limits, link state, and the SFP transceiver page. The table
// endpoints return one `key=value&...` line per port, numbered by slot.

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;
use planet_api::DeviceRequest;
use planet_api::codec::{
    decode_key_value_line, decode_positional, encode_read_selector, split_entries,
};
use tracing::debug;

use crate::convert::{int_param, is_one};
use crate::error::CoreError;
use crate::model::{BandwidthLimit, BandwidthTable, LinkStatus, LinkStatusTable, SfpInfo};
use crate::planet::Planet;
use crate::registry::DeviceTarget;
use crate::result::{Operation, OperationResult};

const BANDWIDTH_PATH: &str = "/cgi-bin/bandwidth.cgi";
const PORT_STATUS_PATH: &str = "/cgi-bin/port_current.cgi";
const SFP_PATH: &str = "/cgi-bin/sfp_info.cgi";

const BANDWIDTH_FIELDS: [&str; 2] = ["bandwidth_1", "bandwidth_2"];
const PORT_STATUS_FIELDS: [&str; 2] = ["port_1", "port_2"];

/// Requested in this order; the response is positional.
const SFP_FIELDS: [&str; 16] = [
    "identify",
    "type",
    "cu_speed",
    "wave_length",
    "distance",
    "temperature",
    "voltage",
    "current",
    "tx_power",
    "rx_power",
    "vendor_name",
    "vendor_oui",
    "vendor_pn",
    "vendor_rev",
    "vendor_sn",
    "date_code",
];

impl Planet {
    /// Per-port ingress/egress limits.
    pub async fn bandwidth_control(&self, target: &DeviceTarget) -> OperationResult<BandwidthTable> {
        Self::guard(Operation::BandwidthControl, async {
            let device = self.connect(target).await?;
            let request = DeviceRequest::get(BANDWIDTH_PATH)
                .raw_query(encode_read_selector(&BANDWIDTH_FIELDS))
                .read_from("bandwidth.htm");
            let body = self.fetch_text(&device, request).await?;
            Ok(BandwidthTable {
                ports: decode_port_table(&body, |params| BandwidthLimit {
                    ingress_rate: int_param(params, "in_rate"),
                    egress_rate: int_param(params, "e_rate"),
                }),
            })
        })
        .await
    }

    /// Set one port's limits (kbps), then save. Negative rates become 0.
    pub async fn set_port_bandwidth(
        &self,
        target: &DeviceTarget,
        port: u32,
        ingress_kbps: i64,
        egress_kbps: i64,
    ) -> OperationResult<bool> {
        Self::guard(Operation::SetPortBandwidth, async {
            if port < 1 {
                return Err(CoreError::invalid("port", "port index must be 1 or greater"));
            }
            let device = self.connect(target).await?;

            let field = format!("bandwidth_{port}");
            let value = format!(
                "ingress_rate={}&egress_rate={}",
                ingress_kbps.max(0),
                egress_kbps.max(0)
            );
            let pairs = IndexMap::from([(field, value)]);
            self.write_and_commit(&device, BANDWIDTH_PATH, "bandwidth.htm", &pairs)
                .await
        })
        .await
    }

    /// Transceiver details. `None` when the firmware has no SFP page (404).
    pub async fn sfp_info(&self, target: &DeviceTarget) -> OperationResult<Option<SfpInfo>> {
        Self::guard(Operation::SfpInfo, async {
            let device = self.connect(target).await?;
            let request = DeviceRequest::get(SFP_PATH)
                .raw_query(encode_read_selector(&SFP_FIELDS))
                .read_from("sfp_status.htm");

            let body = match self.client().request_text(&device, &request).await {
                Ok(body) => body,
                Err(e) if e.is_not_found() => {
                    debug!(device = %device.key, "SFP info endpoint missing, no modules");
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            };
            Ok(Some(decode_sfp(&body)))
        })
        .await
    }

    /// Negotiated speed, duplex, flow control, and link state per port.
    pub async fn port_link_status(
        &self,
        target: &DeviceTarget,
    ) -> OperationResult<LinkStatusTable> {
        Self::guard(Operation::PortLinkStatus, async {
            let device = self.connect(target).await?;
            let request = DeviceRequest::get(PORT_STATUS_PATH)
                .raw_query(encode_read_selector(&PORT_STATUS_FIELDS))
                .read_from("port_status.htm");
            let body = self.fetch_text(&device, request).await?;
            Ok(LinkStatusTable {
                ports: decode_port_table(&body, |params| LinkStatus {
                    auto_negotiation: is_one(params, "an"),
                    flow_control: is_one(params, "pause"),
                    asymmetric_flow: is_one(params, "asym"),
                    duplex_full: is_one(params, "duplex"),
                    speed_mbps: int_param(params, "speed"),
                    link_up: is_one(params, "link"),
                    link_time_seconds: int_param(params, "time"),
                }),
            })
        })
        .await
    }
}

/// One record per non-empty slot, keyed by slot position + 1. Empty slots
/// leave a gap rather than renumbering the ports after them.
fn decode_port_table<T>(
    body: &str,
    build: impl Fn(&HashMap<String, String>) -> T,
) -> BTreeMap<u32, T> {
    split_entries(body)
        .into_iter()
        .filter_map(|(index, line)| {
            let port = u32::try_from(index + 1).ok()?;
            Some((port, build(&decode_key_value_line(line))))
        })
        .collect()
}

fn decode_sfp(body: &str) -> SfpInfo {
    let mut values = decode_positional(body, &SFP_FIELDS);
    let mut take = |field: &str| {
        values
            .swap_remove(field)
            .flatten()
            .filter(|value| !value.is_empty())
    };
    SfpInfo {
        port: take("identify"),
        module_type: take("type"),
        speed: take("cu_speed"),
        wave_length_nm: take("wave_length"),
        distance_m: take("distance"),
        temperature_c: take("temperature"),
        voltage_v: take("voltage"),
        current_ma: take("current"),
        tx_power_dbm: take("tx_power"),
        rx_power_dbm: take("rx_power"),
        vendor_name: take("vendor_name"),
        vendor_oui: take("vendor_oui"),
        vendor_part_number: take("vendor_pn"),
        vendor_revision: take("vendor_rev"),
        vendor_serial: take("vendor_sn"),
        date_code: take("date_code"),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn bandwidth_lines_are_numbered_by_slot() {
        let table = decode_port_table(
            "in_rate=1000&e_rate=2000$;in_rate=500&e_rate=500$;",
            |p| (int_param(p, "in_rate"), int_param(p, "e_rate")),
        );
        assert_eq!(
            table,
            BTreeMap::from([(1, (Some(1000), Some(2000))), (2, (Some(500), Some(500)))])
        );
    }

    #[test]
    fn empty_slots_keep_later_port_numbers() {
        let table = decode_port_table("$;link=1$;", |p| is_one(p, "link"));
        assert_eq!(table, BTreeMap::from([(2, Some(true))]));
    }

    #[test]
    fn sfp_empty_values_are_none() {
        let sfp = decode_sfp("1$;1000BASE-SX$;1000$;850$;$;$;");
        assert_eq!(sfp.port.as_deref(), Some("1"));
        assert_eq!(sfp.module_type.as_deref(), Some("1000BASE-SX"));
        assert_eq!(sfp.wave_length_nm.as_deref(), Some("850"));
        assert_eq!(sfp.distance_m, None);
        assert_eq!(sfp.date_code, None);
    }
}
