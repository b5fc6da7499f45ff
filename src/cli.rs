// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::default_config_path;

/// Command-line arguments for `hvctl`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "hvctl",
    version,
    about = "Create, start, stop and remove a local Hyper-V VM.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// A missing file is not an error; built-in defaults are used instead.
    #[arg(long, value_name = "PATH", default_value_os_t = default_config_path())]
    pub config: PathBuf,

    /// Directory containing `disk.vhdx`. Overrides `[driver].state_dir`.
    #[arg(long, value_name = "DIR")]
    pub state_dir: Option<PathBuf>,

    /// Match the VM name exactly instead of as a prefix when checking
    /// whether it exists.
    #[arg(long)]
    pub exact_name_match: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `HVDRIVER_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: VmCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum VmCommand {
    /// Create and configure a new VM; prints its GUID.
    Create(CreateArgs),
    /// Print the commands `create` would run, without running them.
    Plan(CreateArgs),
    /// Start an existing VM.
    Start(NameArg),
    /// Power off a VM (no-op if it does not exist).
    Stop(NameArg),
    /// Remove a VM (no-op if it does not exist).
    Destroy(NameArg),
    /// Print `absent`, `stopped` or `running`.
    Status(NameArg),
    /// Print `true` if the VM is running, `false` otherwise.
    Running(NameArg),
}

#[derive(Debug, Clone, Args)]
pub struct NameArg {
    /// VM name. Defaults to `[vm].name`.
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct CreateArgs {
    #[command(flatten)]
    pub name: NameArg,

    /// Processor count. Defaults to `[vm].cpus`.
    #[arg(long, value_name = "N")]
    pub cpus: Option<u32>,

    /// Startup memory in MB. Defaults to `[vm].memory_mb`.
    #[arg(long, value_name = "MB")]
    pub memory_mb: Option<u64>,

    /// Boot image attached as a DVD drive. Defaults to `[vm].efi_path`.
    #[arg(long, value_name = "PATH")]
    pub efi_path: Option<PathBuf>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
