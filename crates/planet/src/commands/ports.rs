//! Port command handlers.

use planet_core::{BandwidthLimit, DeviceTarget, LinkStatus, Planet, SfpInfo};
use tabled::Tabled;

use crate::cli::{GlobalOpts, PortsArgs, PortsCommand};
use crate::error::CliError;
use crate::output::{self, detail_lines, flag_word, or_dash};

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct BandwidthRow {
    #[tabled(rename = "Port")]
    port: u32,
    #[tabled(rename = "Ingress (kbps)")]
    ingress: String,
    #[tabled(rename = "Egress (kbps)")]
    egress: String,
}

#[derive(Tabled)]
struct LinkRow {
    #[tabled(rename = "Port")]
    port: u32,
    #[tabled(rename = "Link")]
    link: String,
    #[tabled(rename = "Speed")]
    speed: String,
    #[tabled(rename = "Duplex")]
    duplex: String,
    #[tabled(rename = "Autoneg")]
    autoneg: String,
    #[tabled(rename = "Flow Ctrl")]
    flow: String,
    #[tabled(rename = "Up For")]
    up_for: String,
}

/// Table rows need the port number next to each value.
#[derive(serde::Serialize)]
struct Numbered<T> {
    port: u32,
    #[serde(flatten)]
    value: T,
}

fn bandwidth_row(entry: &Numbered<BandwidthLimit>) -> BandwidthRow {
    BandwidthRow {
        port: entry.port,
        ingress: rate(entry.value.ingress_rate),
        egress: rate(entry.value.egress_rate),
    }
}

fn rate(kbps: Option<i64>) -> String {
    match kbps {
        Some(0) => "unlimited".into(),
        other => or_dash(other),
    }
}

fn link_row(entry: &Numbered<LinkStatus>) -> LinkRow {
    let s = &entry.value;
    LinkRow {
        port: entry.port,
        link: flag_word(s.link_up, "up", "down"),
        speed: s.speed_mbps.map_or_else(|| "-".into(), |m| format!("{m}M")),
        duplex: flag_word(s.duplex_full, "full", "half"),
        autoneg: flag_word(s.auto_negotiation, "on", "off"),
        flow: flag_word(s.flow_control, "on", "off"),
        up_for: s.link_time_seconds.map_or_else(|| "-".into(), |t| format!("{t}s")),
    }
}

pub(crate) fn sfp_detail(sfp: &SfpInfo) -> String {
    detail_lines(&[
        ("Port", or_dash(sfp.port.as_deref())),
        ("Type", or_dash(sfp.module_type.as_deref())),
        ("Speed", or_dash(sfp.speed.as_deref())),
        ("Wavelength", or_dash(sfp.wave_length_nm.as_deref())),
        ("Distance", or_dash(sfp.distance_m.as_deref())),
        ("Temperature", or_dash(sfp.temperature_c.as_deref())),
        ("Voltage", or_dash(sfp.voltage_v.as_deref())),
        ("Current", or_dash(sfp.current_ma.as_deref())),
        ("TX power", or_dash(sfp.tx_power_dbm.as_deref())),
        ("RX power", or_dash(sfp.rx_power_dbm.as_deref())),
        ("Vendor", or_dash(sfp.vendor_name.as_deref())),
        ("Part number", or_dash(sfp.vendor_part_number.as_deref())),
        ("Serial", or_dash(sfp.vendor_serial.as_deref())),
        ("Date code", or_dash(sfp.date_code.as_deref())),
    ])
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    planet: &Planet,
    target: &DeviceTarget,
    args: PortsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        PortsCommand::Bandwidth => {
            let table = util::data(planet.bandwidth_control(target).await)?;
            let rows: Vec<_> = table
                .ports
                .into_iter()
                .map(|(port, value)| Numbered { port, value })
                .collect();
            let out = output::render_list(&global.output, &rows, bandwidth_row)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PortsCommand::SetBandwidth {
            port,
            ingress,
            egress,
        } => {
            let saved =
                util::data(planet.set_port_bandwidth(target, port, ingress, egress).await)?;
            util::require_ack(saved, &format!("bandwidth change on port {port}"))?;
            output::success(&format!("Port {port} bandwidth updated and saved"), global.quiet);
            Ok(())
        }

        PortsCommand::Status => {
            let table = util::data(planet.port_link_status(target).await)?;
            let rows: Vec<_> = table
                .ports
                .into_iter()
                .map(|(port, value)| Numbered { port, value })
                .collect();
            let out = output::render_list(&global.output, &rows, link_row)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PortsCommand::Sfp => {
            let sfp = util::data(planet.sfp_info(target).await)?;
            let out = output::render_single(&global.output, &sfp, |sfp| {
                sfp.as_ref()
                    .map_or_else(|| "No SFP module reported".into(), sfp_detail)
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
