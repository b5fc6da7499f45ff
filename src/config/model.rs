// src/config/model.rs

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::driver::DriverConfig;
use crate::exec::DEFAULT_POWERSHELL;
use crate::types::{NameMatch, VmSpec};

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [driver]
/// state_dir = 'C:\ProgramData\cfdev'
/// powershell = "powershell.exe"
/// name_match = "prefix"
///
/// [vm]
/// name = "cfdev"
/// cpus = 4
/// memory_mb = 4096
/// efi_path = 'C:\ProgramData\cfdev\cfdev-efi.iso'
/// ```
///
/// All sections are optional and have reasonable defaults, except that a
/// state directory must be supplied either here or on the command line.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub driver: DriverSection,

    #[serde(default)]
    pub vm: VmSection,
}

/// `[driver]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct DriverSection {
    /// Directory containing `disk.vhdx`.
    #[serde(default)]
    pub state_dir: Option<PathBuf>,

    /// PowerShell executable used to run cmdlets.
    #[serde(default = "default_powershell")]
    pub powershell: String,

    /// `"prefix"` (default) or `"exact"`.
    #[serde(default)]
    pub name_match: NameMatch,
}

fn default_powershell() -> String {
    DEFAULT_POWERSHELL.to_string()
}

impl Default for DriverSection {
    fn default() -> Self {
        Self {
            state_dir: None,
            powershell: default_powershell(),
            name_match: NameMatch::default(),
        }
    }
}

/// `[vm]` section: defaults for the CLI's create and lifecycle commands.
#[derive(Debug, Clone, Deserialize)]
pub struct VmSection {
    #[serde(default = "default_vm_name")]
    pub name: String,

    #[serde(default = "default_cpus")]
    pub cpus: u32,

    #[serde(default = "default_memory_mb")]
    pub memory_mb: u64,

    /// Boot image; if `None`, it must be passed to `create` explicitly.
    #[serde(default)]
    pub efi_path: Option<PathBuf>,
}

fn default_vm_name() -> String {
    "cfdev".to_string()
}

fn default_cpus() -> u32 {
    4
}

fn default_memory_mb() -> u64 {
    4096
}

impl Default for VmSection {
    fn default() -> Self {
        Self {
            name: default_vm_name(),
            cpus: default_cpus(),
            memory_mb: default_memory_mb(),
            efi_path: None,
        }
    }
}

/// Validated configuration.
///
/// Built from a [`RawConfigFile`] via `TryFrom`, which guarantees a
/// non-empty state directory and sane VM defaults.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    state_dir: PathBuf,
    powershell: String,
    name_match: NameMatch,
    vm: VmSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        state_dir: PathBuf,
        powershell: String,
        name_match: NameMatch,
        vm: VmSection,
    ) -> Self {
        Self {
            state_dir,
            powershell,
            name_match,
            vm,
        }
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn powershell(&self) -> &str {
        &self.powershell
    }

    pub fn name_match(&self) -> NameMatch {
        self.name_match
    }

    pub fn vm(&self) -> &VmSection {
        &self.vm
    }

    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig::new(self.state_dir.clone()).with_name_match(self.name_match)
    }

    /// VM spec from the `[vm]` defaults, with any given values taking
    /// precedence. `None` if no boot image is configured or given.
    pub fn vm_spec(
        &self,
        cpus: Option<u32>,
        memory_mb: Option<u64>,
        efi_path: Option<PathBuf>,
    ) -> Option<VmSpec> {
        let efi_path = efi_path.or_else(|| self.vm.efi_path.clone())?;
        Some(VmSpec::new(
            cpus.unwrap_or(self.vm.cpus),
            memory_mb.unwrap_or(self.vm.memory_mb),
            efi_path,
        ))
    }
}
