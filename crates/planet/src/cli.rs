//! Clap derive structures for the `planet` CLI.
//!
//! Defines the command tree and global flags. Also compiled by `build.rs`
//! for man pages, so it must only depend on clap.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// planet -- manage PLANET web-managed switches from the command line
#[derive(Debug, Parser)]
#[command(
    name = "planet",
    version,
    about = "Manage PLANET web-managed switches from the command line",
    long_about = "Reads and writes the configuration of PLANET managed switches through\n\
        their web-management CGI endpoints: system details, port bandwidth and\n\
        link state, SFP modules, VLANs, backups, and credentials.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configured device to use
    #[arg(long, short = 'd', env = "PLANET_DEVICE", global = true)]
    pub device: Option<String>,

    /// Switch address (host, host:port, or URL); bypasses the config file
    #[arg(long, short = 'a', env = "PLANET_ADDRESS", global = true)]
    pub address: Option<String>,

    /// Login user (overrides the device entry)
    #[arg(long, short = 'u', env = "PLANET_USERNAME", global = true)]
    pub username: Option<String>,

    /// Login password (overrides the device entry)
    #[arg(long, env = "PLANET_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "PLANET_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Request timeout in seconds
    #[arg(long, env = "PLANET_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Log every request and response exchanged with the switch
    #[arg(long, global = true)]
    pub trace: bool,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// System details, resources, and addressing
    #[command(alias = "sys")]
    System(SystemArgs),

    /// Port bandwidth, link state, and SFP modules
    #[command(alias = "port")]
    Ports(PortsArgs),

    /// List VLAN table entries
    Vlans(VlansArgs),

    /// Save the running configuration to flash
    Save,

    /// Restart the switch
    Reboot,

    /// Change the switch's web login
    Credentials(CredentialsArgs),

    /// Download a configuration backup archive
    Backup(BackupArgs),

    /// Everything the switch reports, merged per port
    #[command(alias = "snap")]
    Snapshot,

    /// Manage the CLI configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SYSTEM
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SystemArgs {
    #[command(subcommand)]
    pub command: SystemCommand,
}

#[derive(Debug, Subcommand)]
pub enum SystemCommand {
    /// MAC, firmware, clock, uptime, and descriptive fields
    Info,

    /// Memory and CPU load
    Resources,

    /// Static and DHCP addressing of the management interface
    Network,

    /// Change descriptive fields, then save
    #[command(group(
        ArgGroup::new("fields")
            .required(true)
            .multiple(true)
            .args(["name", "comment", "location", "contact"])
    ))]
    Update {
        /// Device name (max 15 characters)
        #[arg(long)]
        name: Option<String>,

        /// Comment (max 25 characters)
        #[arg(long)]
        comment: Option<String>,

        /// Location (max 25 characters)
        #[arg(long)]
        location: Option<String>,

        /// Contact (max 25 characters)
        #[arg(long)]
        contact: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PORTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PortsArgs {
    #[command(subcommand)]
    pub command: PortsCommand,
}

#[derive(Debug, Subcommand)]
pub enum PortsCommand {
    /// Per-port ingress/egress limits
    #[command(alias = "bw")]
    Bandwidth,

    /// Set one port's limits, then save
    SetBandwidth {
        /// Port number (1-based)
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        port: u32,

        /// Ingress limit in kbps (0 = unlimited)
        #[arg(long, default_value = "0")]
        ingress: i64,

        /// Egress limit in kbps (0 = unlimited)
        #[arg(long, default_value = "0")]
        egress: i64,
    },

    /// Negotiated speed, duplex, and link state per port
    Status,

    /// SFP transceiver details
    Sfp,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  VLANS / MAINTENANCE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct VlansArgs {
    /// First table entry (1-based)
    #[arg(long, default_value = "1")]
    pub start: u32,

    /// Number of entries to read (1-128)
    #[arg(long, default_value = "32")]
    pub count: u32,
}

#[derive(Debug, Args)]
pub struct CredentialsArgs {
    /// New login user
    #[arg(long)]
    pub new_username: String,

    /// New login password (prompted when omitted)
    #[arg(long)]
    pub new_password: Option<String>,
}

#[derive(Debug, Args)]
pub struct BackupArgs {
    /// Directory to write the archive into (default: current directory)
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Display the loaded configuration
    Show,

    /// Add or replace a device entry from --address, --username, and --timeout
    AddDevice {
        /// Device name used with --device
        name: String,

        /// Read the password from this environment variable
        #[arg(long, conflicts_with = "keyring")]
        password_env: Option<String>,

        /// Prompt for the password and store it in the system keyring
        #[arg(long)]
        keyring: bool,

        /// Make this the default device
        #[arg(long)]
        default: bool,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
