//! Command dispatch: bridges CLI args -> `Planet` operations -> output.

pub mod config_cmd;
pub mod maintenance;
pub mod ports;
pub mod snapshot;
pub mod system;
pub mod util;
pub mod vlans;

use planet_core::{DeviceTarget, Planet};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a switch-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    planet: &Planet,
    target: &DeviceTarget,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::System(args) => system::handle(planet, target, args, global).await,
        Command::Ports(args) => ports::handle(planet, target, args, global).await,
        Command::Vlans(args) => vlans::handle(planet, target, &args, global).await,
        Command::Save => maintenance::save(planet, target, global).await,
        Command::Reboot => maintenance::reboot(planet, target, global).await,
        Command::Credentials(args) => {
            maintenance::credentials(planet, target, args, global).await
        }
        Command::Backup(args) => maintenance::backup(planet, target, &args, global).await,
        Command::Snapshot => snapshot::handle(planet, target, global).await,
        // Config and Completions never reach a switch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "handled before connecting".into(),
        }),
    }
}
