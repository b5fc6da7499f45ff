// src/lib.rs

pub mod cli;
pub mod config;
pub mod driver;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod types;

use anyhow::{Context, Result, bail};

use crate::cli::{CliArgs, CreateArgs, NameArg, VmCommand};
use crate::config::{ConfigFile, RawConfigFile, load_or_default};
use crate::driver::HypervDriver;
use crate::exec::PowerShellExecutor;
use crate::types::{NameMatch, VmSpec};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI overrides
/// - the PowerShell executor
/// - the driver call for the chosen subcommand
///
/// Results go to stdout; diagnostics go through `tracing` to stderr.
pub async fn run(args: CliArgs) -> Result<()> {
    let raw = load_or_default(&args.config)
        .with_context(|| format!("loading config {}", args.config.display()))?;
    let cfg = ConfigFile::try_from(apply_overrides(raw, &args))?;

    let executor = PowerShellExecutor::new(cfg.powershell());
    let driver = HypervDriver::new(executor, cfg.driver_config());

    match &args.command {
        VmCommand::Create(create) => {
            let name = vm_name(&cfg, &create.name);
            let spec = resolve_spec(&cfg, create)?;
            let handle = driver.create(&name, &spec).await?;
            println!("{handle}");
        }
        VmCommand::Plan(create) => {
            let name = vm_name(&cfg, &create.name);
            let spec = resolve_spec(&cfg, create)?;
            let plan = driver.plan(&name, &spec)?;
            println!("hvctl plan for vm '{name}'");
            print!("{plan}");
        }
        VmCommand::Start(n) => driver.start(&vm_name(&cfg, n)).await?,
        VmCommand::Stop(n) => driver.stop(&vm_name(&cfg, n)).await?,
        VmCommand::Destroy(n) => driver.destroy(&vm_name(&cfg, n)).await?,
        VmCommand::Status(n) => {
            let status = driver.status(&vm_name(&cfg, n)).await?;
            println!("{status}");
        }
        VmCommand::Running(n) => {
            let running = driver.is_running(&vm_name(&cfg, n)).await?;
            println!("{running}");
        }
    }

    Ok(())
}

/// Command-line flags take precedence over the config file.
fn apply_overrides(mut raw: RawConfigFile, args: &CliArgs) -> RawConfigFile {
    if let Some(dir) = &args.state_dir {
        raw.driver.state_dir = Some(dir.clone());
    }
    if args.exact_name_match {
        raw.driver.name_match = NameMatch::Exact;
    }
    raw
}

fn vm_name(cfg: &ConfigFile, arg: &NameArg) -> String {
    arg.name.clone().unwrap_or_else(|| cfg.vm().name.clone())
}

fn resolve_spec(cfg: &ConfigFile, args: &CreateArgs) -> Result<VmSpec> {
    let Some(spec) = cfg.vm_spec(args.cpus, args.memory_mb, args.efi_path.clone()) else {
        bail!("no firmware image: pass --efi-path or set [vm].efi_path");
    };
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    fn parse(argv: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn cli_overrides_config() {
        let args = parse(&["hvctl", "--state-dir", "/cli", "--exact-name-match", "status"]);
        let mut raw = RawConfigFile::default();
        raw.driver.state_dir = Some(PathBuf::from("/file"));

        let raw = apply_overrides(raw, &args);
        assert_eq!(raw.driver.state_dir, Some(PathBuf::from("/cli")));
        assert_eq!(raw.driver.name_match, NameMatch::Exact);
    }

    #[test]
    fn spec_falls_back_to_config_defaults() {
        let mut raw = RawConfigFile::default();
        raw.driver.state_dir = Some(PathBuf::from("/state"));
        raw.vm.efi_path = Some(PathBuf::from("/img/efi.iso"));
        let cfg = ConfigFile::try_from(raw).unwrap();

        let args = parse(&["hvctl", "create", "--cpus", "8"]);
        let VmCommand::Create(create) = &args.command else {
            panic!("expected create");
        };

        let spec = resolve_spec(&cfg, create).unwrap();
        assert_eq!(spec, VmSpec::new(8, 4096, "/img/efi.iso"));
        assert_eq!(vm_name(&cfg, &create.name), "cfdev");
    }

    #[test]
    fn spec_without_firmware_is_an_error() {
        let mut raw = RawConfigFile::default();
        raw.driver.state_dir = Some(PathBuf::from("/state"));
        let cfg = ConfigFile::try_from(raw).unwrap();

        let args = parse(&["hvctl", "plan", "--name", "devbox"]);
        let VmCommand::Plan(create) = &args.command else {
            panic!("expected plan");
        };
        let err = resolve_spec(&cfg, create).unwrap_err();
        assert!(err.to_string().contains("--efi-path"));
    }
}
