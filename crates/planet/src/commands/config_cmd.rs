//! Config subcommand handlers.

use planet_config::{Config, DeviceEntry};
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output::{self, or_dash};

// ── Views ───────────────────────────────────────────────────────────

/// What `config show` prints. Passwords never leave the file.
#[derive(Serialize)]
struct ConfigView {
    path: String,
    default_device: Option<String>,
    output: String,
    timeout: u64,
    cookie_dir: Option<String>,
    diagnostics: bool,
    devices: Vec<DeviceView>,
}

#[derive(Serialize, Tabled)]
struct DeviceView {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "User")]
    username: String,
    #[tabled(rename = "Password")]
    password_source: String,
    #[tabled(skip)]
    timeout: Option<u64>,
    #[serde(skip)]
    #[tabled(rename = "Timeout")]
    timeout_display: String,
}

fn password_source(entry: &DeviceEntry) -> String {
    match (&entry.password_env, &entry.password) {
        (Some(var), _) => format!("env:{var}"),
        (None, Some(_)) => "config file".into(),
        (None, None) => "keyring".into(),
    }
}

fn view(cfg: &Config) -> ConfigView {
    ConfigView {
        path: planet_config::config_path().display().to_string(),
        default_device: cfg.default_device.clone(),
        output: cfg.defaults.output.clone(),
        timeout: cfg.defaults.timeout,
        cookie_dir: cfg
            .defaults
            .cookie_dir
            .as_ref()
            .map(|p| p.display().to_string()),
        diagnostics: cfg.defaults.diagnostics,
        devices: cfg
            .devices
            .iter()
            .map(|(name, entry)| DeviceView {
                name: name.clone(),
                address: entry.address.clone(),
                username: entry.username.clone(),
                password_source: password_source(entry),
                timeout: entry.timeout,
                timeout_display: entry
                    .timeout
                    .map_or_else(|| "default".into(), |t| format!("{t}s")),
            })
            .collect(),
    }
}

fn view_detail(v: &ConfigView) -> String {
    let header = output::detail_lines(&[
        ("Config", v.path.clone()),
        ("Default device", or_dash(v.default_device.as_deref())),
        ("Timeout", format!("{}s", v.timeout)),
        ("Cookie dir", or_dash(v.cookie_dir.as_deref())),
    ]);
    if v.devices.is_empty() {
        return format!("{header}\n\nNo devices configured. Run: planet config add-device <name> --address <host>");
    }
    let table = Table::new(&v.devices).with(Style::rounded()).to_string();
    format!("{header}\n\n{table}")
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&planet_config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = planet_config::load_config()?;
            let out = output::render_single(&global.output, &view(&cfg), view_detail)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::AddDevice {
            name,
            password_env,
            keyring,
            default,
        } => {
            let address = global.address.clone().ok_or_else(|| CliError::Validation {
                field: "address".into(),
                reason: "pass --address <host> for the new device".into(),
            })?;
            // Fail on a bad address before anything is written.
            planet_config::parse_address(&address)?;

            if keyring {
                let password =
                    config::prompt_password(&format!("Password for '{name}': "), &name)?;
                planet_config::store_password(&name, &password)?;
                output::success("Password stored in system keyring", global.quiet);
            }

            let mut cfg = planet_config::load_config()?;
            let entry = DeviceEntry {
                address,
                username: global.username.clone().unwrap_or_else(|| "admin".into()),
                password: if keyring || password_env.is_some() {
                    None
                } else {
                    global.password.clone()
                },
                password_env,
                timeout: global.timeout,
            };
            if entry.password.is_none() && entry.password_env.is_none() && !keyring {
                tracing::warn!(
                    device = %name,
                    "no password source given; the keyring will be consulted at connect time"
                );
            }

            cfg.devices.insert(name.clone(), entry);
            if default || cfg.default_device.is_none() {
                cfg.default_device = Some(name.clone());
            }
            planet_config::save_config(&cfg)?;

            output::success(
                &format!(
                    "Device '{name}' saved to {}",
                    planet_config::config_path().display()
                ),
                global.quiet,
            );
            Ok(())
        }
    }
}
