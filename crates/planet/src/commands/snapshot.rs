//! Snapshot handler: one merged view of the whole switch.

use planet_core::{DeviceTarget, Planet, PortRecord, SwitchSnapshot};
use tabled::{Table, Tabled, settings::Style};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output::{self, detail_lines, flag_word, or_dash};

use super::util;

#[derive(Tabled)]
struct PortRow {
    #[tabled(rename = "Port")]
    port: u32,
    #[tabled(rename = "Link")]
    link: String,
    #[tabled(rename = "Speed")]
    speed: String,
    #[tabled(rename = "Ingress")]
    ingress: String,
    #[tabled(rename = "Egress")]
    egress: String,
    #[tabled(rename = "SFP")]
    sfp: String,
}

impl From<&PortRecord> for PortRow {
    fn from(p: &PortRecord) -> Self {
        let link = p.link_status.unwrap_or_default();
        let bandwidth = p.bandwidth.unwrap_or_default();
        Self {
            port: p.port_index,
            link: flag_word(link.link_up, "up", "down"),
            speed: link.speed_mbps.map_or_else(|| "-".into(), |m| format!("{m}M")),
            ingress: or_dash(bandwidth.ingress_rate),
            egress: or_dash(bandwidth.egress_rate),
            sfp: p
                .sfp_info
                .as_ref()
                .map_or_else(|| "-".into(), |s| or_dash(s.module_type.as_deref())),
        }
    }
}

fn summary(snapshot: &SwitchSnapshot) -> String {
    let details = &snapshot.system.details;
    let network = &snapshot.system.network;
    let header = detail_lines(&[
        ("Name", or_dash(details.devicename.as_deref())),
        ("MAC", or_dash(details.mac.as_deref())),
        ("Firmware", or_dash(details.fwversion.as_deref())),
        ("Uptime", or_dash(details.uptime.as_deref())),
        ("IP", or_dash(network.ipv4.static_ipv4.ip.as_deref())),
        ("CPU", or_dash(snapshot.system.resources.cpu_usage_display.as_deref())),
        ("VLANs", network.vlans.len().to_string()),
    ]);

    let rows: Vec<PortRow> = snapshot.ports.values().map(PortRow::from).collect();
    let ports = Table::new(rows).with(Style::rounded()).to_string();
    format!("{header}\n\n{ports}")
}

pub async fn handle(
    planet: &Planet,
    target: &DeviceTarget,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let snapshot = util::data(planet.snapshot(target).await)?;
    let out = output::render_single(&global.output, &snapshot, summary)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
