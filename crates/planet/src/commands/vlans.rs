//! VLAN command handler.

use planet_core::{DeviceTarget, MAX_VLAN_BATCH, Planet, VlanRecord};
use tabled::Tabled;

use crate::cli::{GlobalOpts, VlansArgs};
use crate::error::CliError;
use crate::output::{self, flag_word, or_dash};

use super::util;

#[derive(Tabled)]
struct VlanRow {
    #[tabled(rename = "VID")]
    vid: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Members")]
    members: String,
    #[tabled(rename = "Tagged")]
    tagged: String,
    #[tabled(rename = "Untagged")]
    untagged: String,
    #[tabled(rename = "GVRP")]
    gvrp: String,
}

impl From<&VlanRecord> for VlanRow {
    fn from(v: &VlanRecord) -> Self {
        Self {
            vid: or_dash(v.vid),
            name: or_dash(v.name.as_deref()),
            members: or_dash(v.member_ports.as_deref()),
            tagged: or_dash(v.tagged_ports.as_deref()),
            untagged: or_dash(v.untagged_ports.as_deref()),
            gvrp: flag_word(v.gvrp_enabled, "on", "off"),
        }
    }
}

pub async fn handle(
    planet: &Planet,
    target: &DeviceTarget,
    args: &VlansArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if args.count > MAX_VLAN_BATCH {
        tracing::warn!(
            requested = args.count,
            max = MAX_VLAN_BATCH,
            "VLAN count clamped"
        );
    }
    let vlans = util::data(planet.vlans(target, args.start, args.count).await)?;
    let out = output::render_list(&global.output, &vlans, |v| VlanRow::from(v))?;
    output::print_output(&out, global.quiet);
    Ok(())
}
