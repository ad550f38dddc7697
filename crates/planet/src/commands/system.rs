//! System command handlers.

use indexmap::IndexMap;
use planet_core::{
    DeviceTarget, NetworkConfig, Planet, SystemField, SystemInfo, SystemResources,
};

use crate::cli::{GlobalOpts, SystemArgs, SystemCommand};
use crate::error::CliError;
use crate::output::{self, detail_lines, flag_word, or_dash};

use super::util;

fn info_detail(info: &SystemInfo) -> String {
    detail_lines(&[
        ("Name", or_dash(info.devicename.as_deref())),
        ("MAC", or_dash(info.mac.as_deref())),
        ("Firmware", or_dash(info.fwversion.as_deref())),
        ("Built", or_dash(info.fwdate.as_deref())),
        ("Clock", or_dash(info.sysdate.as_deref())),
        ("Uptime", or_dash(info.uptime.as_deref())),
        ("Comment", or_dash(info.comment.as_deref())),
        ("Location", or_dash(info.location.as_deref())),
        ("Contact", or_dash(info.contact.as_deref())),
    ])
}

fn resources_detail(r: &SystemResources) -> String {
    detail_lines(&[
        ("Memory", or_dash(r.free_memory_display.as_deref())),
        ("CPU", or_dash(r.cpu_usage_display.as_deref())),
    ])
}

fn network_detail(n: &NetworkConfig) -> String {
    detail_lines(&[
        ("IP", or_dash(n.static_ipv4.ip.as_deref())),
        ("Subnet", or_dash(n.static_ipv4.subnet.as_deref())),
        ("Gateway", or_dash(n.static_ipv4.gateway.as_deref())),
        ("DHCP", flag_word(n.dhcp.enabled, "enabled", "disabled")),
        ("DHCP IP", or_dash(n.dhcp.ip.as_deref())),
        ("DHCP subnet", or_dash(n.dhcp.subnet.as_deref())),
        ("DHCP gateway", or_dash(n.dhcp.gateway.as_deref())),
    ])
}

pub async fn handle(
    planet: &Planet,
    target: &DeviceTarget,
    args: SystemArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        SystemCommand::Info => {
            let info = util::data(planet.system_info(target).await)?;
            let out = output::render_single(&global.output, &info, info_detail)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SystemCommand::Resources => {
            let resources = util::data(planet.system_resources(target).await)?;
            let out = output::render_single(&global.output, &resources, resources_detail)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SystemCommand::Network => {
            let network = util::data(planet.network_config(target).await)?;
            let out = output::render_single(&global.output, &network, network_detail)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SystemCommand::Update {
            name,
            comment,
            location,
            contact,
        } => {
            let fields: IndexMap<SystemField, String> = [
                (SystemField::DeviceName, name),
                (SystemField::Comment, comment),
                (SystemField::Location, location),
                (SystemField::Contact, contact),
            ]
            .into_iter()
            .filter_map(|(field, value)| value.map(|v| (field, v)))
            .collect();

            let saved = util::data(planet.update_system_info(target, &fields).await)?;
            util::require_ack(saved, "system info update")?;
            output::success("System info updated and saved", global.quiet);
            Ok(())
        }
    }
}
