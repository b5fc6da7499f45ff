#![allow(dead_code)]

use std::path::PathBuf;

use hvdriver::config::{ConfigFile, RawConfigFile};
use hvdriver::driver::{DriverConfig, HypervDriver};
use hvdriver::types::{NameMatch, VmSpec};

use crate::fake_executor::FakeExecutor;

/// State directory used by drivers built in tests.
pub const STATE_DIR: &str = "/state";

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        let mut config = RawConfigFile::default();
        config.driver.state_dir = Some(PathBuf::from(STATE_DIR));
        Self { config }
    }

    pub fn state_dir(mut self, dir: &str) -> Self {
        self.config.driver.state_dir = Some(PathBuf::from(dir));
        self
    }

    pub fn name_match(mut self, mode: NameMatch) -> Self {
        self.config.driver.name_match = mode;
        self
    }

    pub fn vm_name(mut self, name: &str) -> Self {
        self.config.vm.name = name.to_string();
        self
    }

    pub fn efi_path(mut self, path: &str) -> Self {
        self.config.vm.efi_path = Some(PathBuf::from(path));
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Driver over `exec` with the default test state directory.
pub fn fake_driver(exec: &FakeExecutor) -> HypervDriver<FakeExecutor> {
    HypervDriver::new(exec.clone(), DriverConfig::new(STATE_DIR))
}

/// Driver over `exec` using exact name matching.
pub fn exact_driver(exec: &FakeExecutor) -> HypervDriver<FakeExecutor> {
    HypervDriver::new(
        exec.clone(),
        DriverConfig::new(STATE_DIR).with_name_match(NameMatch::Exact),
    )
}

/// `VmSpec` used throughout the scenario tests.
pub fn devbox_spec() -> VmSpec {
    VmSpec::new(4, 4096, "/img/efi.iso")
}
