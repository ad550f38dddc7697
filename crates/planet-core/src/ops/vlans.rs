// ── VLAN table ──

use planet_api::DeviceRequest;
use planet_api::codec::{decode_key_value_line, encode_read_selector, split_entries};

use crate::convert::{int_param, is_one};
use crate::model::VlanRecord;
use crate::planet::Planet;
use crate::registry::DeviceTarget;
use crate::result::{Operation, OperationResult};

const VLAN_PATH: &str = "/cgi-bin/vlan.cgi";

/// Most table entries fetched in one request.
pub const MAX_VLAN_BATCH: u32 = 128;

/// Default window used by callers (and the snapshot): entries 1..=32.
pub const DEFAULT_VLAN_START: u32 = 1;
pub const DEFAULT_VLAN_COUNT: u32 = 32;

impl Planet {
    /// Read `count` VLAN table entries starting at `start` (1-based).
    ///
    /// `start` is raised to 1 and `count` clamped to `1..=128`. Slots the
    /// firmware reports as `ERROR` (unused rows) are skipped.
    pub async fn vlans(
        &self,
        target: &DeviceTarget,
        start: u32,
        count: u32,
    ) -> OperationResult<Vec<VlanRecord>> {
        Self::guard(Operation::Vlans, async {
            let device = self.connect(target).await?;
            let request = DeviceRequest::get(VLAN_PATH)
                .raw_query(encode_read_selector(vlan_selector(start, count).as_slice()))
                .read_from("vlan_config.htm");
            let body = self.fetch_text(&device, request).await?;
            Ok(decode_vlans(&body))
        })
        .await
    }
}

fn vlan_selector(start: u32, count: u32) -> Vec<String> {
    let start = start.max(1);
    let count = count.clamp(1, MAX_VLAN_BATCH);
    (0..count)
        .map(|offset| format!("tagentry_{}", start.saturating_add(offset)))
        .collect()
}

fn decode_vlans(body: &str) -> Vec<VlanRecord> {
    split_entries(body)
        .into_iter()
        .filter(|(_, entry)| !entry.to_ascii_uppercase().contains("ERROR"))
        .map(|(_, entry)| decode_key_value_line(entry))
        .filter(|params| !params.is_empty())
        .map(|params| VlanRecord {
            name: params.get("name").cloned(),
            vid: int_param(&params, "vid"),
            state: params.get("state").cloned(),
            member_ports: params.get("mem").cloned(),
            tagged_ports: params.get("tag").cloned(),
            untagged_ports: params.get("untag").cloned(),
            forbidden_ports: params.get("forbidden").cloned(),
            priority: int_param(&params, "priority"),
            gvrp_enabled: is_one(&params, "gvrp"),
            age_seconds: int_param(&params, "time"),
            dynamic_members: params.get("dymem").cloned(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn selector_is_clamped() {
        assert_eq!(vlan_selector(0, 2), ["tagentry_1", "tagentry_2"]);
        assert_eq!(vlan_selector(5, 0), ["tagentry_5"]);
        assert_eq!(vlan_selector(1, 500).len(), 128);
    }

    #[test]
    fn error_slots_are_skipped() {
        let body = "name=default&vid=1&mem=1-10&gvrp=0$;ERROR$;name=mgmt&vid=100&tag=1,2&time=30$;";
        let vlans = decode_vlans(body);
        assert_eq!(vlans.len(), 2);
        assert_eq!(vlans[0].name.as_deref(), Some("default"));
        assert_eq!(vlans[0].vid, Some(1));
        assert_eq!(vlans[0].member_ports.as_deref(), Some("1-10"));
        assert_eq!(vlans[0].gvrp_enabled, Some(false));
        assert_eq!(vlans[1].vid, Some(100));
        assert_eq!(vlans[1].tagged_ports.as_deref(), Some("1,2"));
        assert_eq!(vlans[1].age_seconds, Some(30));
        assert_eq!(vlans[1].priority, None);
    }
}
