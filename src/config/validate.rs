// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{DriverError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::DriverError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        let state_dir = raw.driver.state_dir.unwrap_or_default();
        Ok(ConfigFile::new_unchecked(
            state_dir,
            raw.driver.powershell,
            raw.driver.name_match,
            raw.vm,
        ))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_driver_section(cfg)?;
    validate_vm_section(cfg)?;
    Ok(())
}

fn validate_driver_section(cfg: &RawConfigFile) -> Result<()> {
    match cfg.driver.state_dir {
        None => {
            return Err(DriverError::ConfigError(
                "[driver].state_dir is required (set it in the config file or pass --state-dir)"
                    .to_string(),
            ));
        }
        Some(ref dir) if dir.as_os_str().is_empty() => {
            return Err(DriverError::ConfigError(
                "[driver].state_dir must not be empty".to_string(),
            ));
        }
        Some(_) => {}
    }

    if cfg.driver.powershell.trim().is_empty() {
        return Err(DriverError::ConfigError(
            "[driver].powershell must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_vm_section(cfg: &RawConfigFile) -> Result<()> {
    if cfg.vm.name.trim().is_empty() {
        return Err(DriverError::ConfigError(
            "[vm].name must not be empty".to_string(),
        ));
    }
    if cfg.vm.cpus == 0 {
        return Err(DriverError::ConfigError(
            "[vm].cpus must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.vm.memory_mb == 0 {
        return Err(DriverError::ConfigError(
            "[vm].memory_mb must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}
