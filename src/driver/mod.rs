// src/driver/mod.rs

//! Hyper-V VM lifecycle driver.
//!
//! The driver is stateless: the hypervisor's inventory is the only source of
//! truth, and existence and running state are re-queried on every call.
//! Every operation issues its commands one at a time through an
//! [`Executor`] and waits for each before issuing the next.
//!
//! - [`commands`] builds the individual cmdlet invocations.
//! - [`plan`] holds the step labels and the create sequence.

pub mod commands;
pub mod plan;

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::errors::{DriverError, Result};
use crate::exec::{Executor, PsCommand};
use crate::types::{NameMatch, VmHandle, VmSpec, VmStatus, parse_status};

pub use plan::{CreatePlan, CreateStep, create_plan};

/// Settings the driver needs from the surrounding configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Directory holding the primary disk image.
    pub state_dir: PathBuf,
    pub name_match: NameMatch,
}

impl DriverConfig {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
            name_match: NameMatch::default(),
        }
    }

    pub fn with_name_match(mut self, name_match: NameMatch) -> Self {
        self.name_match = name_match;
        self
    }

    /// `<state_dir>/disk.vhdx`
    pub fn disk_path(&self) -> PathBuf {
        self.state_dir.join(commands::DISK_FILE_NAME)
    }
}

/// Drives a single Hyper-V VM through its lifecycle.
///
/// Callers are responsible for not running overlapping operations on the
/// same VM name.
#[derive(Debug)]
pub struct HypervDriver<E> {
    executor: E,
    config: DriverConfig,
}

impl<E: Executor> HypervDriver<E> {
    pub fn new(executor: E, config: DriverConfig) -> Self {
        Self { executor, config }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// The commands `create` would issue, without issuing them.
    pub fn plan(&self, name: &str, spec: &VmSpec) -> Result<CreatePlan> {
        validate_spec(name, spec)?;
        Ok(create_plan(name, spec, &self.config.disk_path()))
    }

    /// Create and configure a new, stopped VM and return its GUID.
    ///
    /// Stops at the first failing step; the error carries that step's label.
    /// Removing the default network adapter is the one step allowed to fail.
    pub async fn create(&self, name: &str, spec: &VmSpec) -> Result<VmHandle> {
        let plan = self.plan(name, spec)?;

        info!(
            vm = name,
            cpus = spec.cpus,
            memory_mb = spec.memory_mb,
            efi = %spec.efi_path.display(),
            "creating vm"
        );

        let mut output = String::new();
        for step in &plan.steps {
            match self.run(step.label, &step.command).await {
                Ok(out) => output = out,
                Err(err) if !step.fatal => {
                    warn!(vm = name, step = step.label, error = %err, "ignoring failed step");
                    output.clear();
                }
                Err(err) => return Err(err),
            }
        }

        let handle = VmHandle::from_output(&output);
        info!(vm = name, guid = %handle, "vm created");
        Ok(handle)
    }

    /// Start an existing VM. Fails with `NotFound` if the VM is absent.
    pub async fn start(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        if !self.exists(name).await? {
            return Err(DriverError::NotFound(name.to_string()));
        }

        self.run(plan::STARTING_VM, &commands::start_vm(name)).await?;
        info!(vm = name, "vm started");
        Ok(())
    }

    /// Power off a VM. An absent VM is not an error.
    pub async fn stop(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        if !self.exists(name).await? {
            debug!(vm = name, "vm absent, nothing to stop");
            return Ok(());
        }

        self.run(plan::STOPPING_VM, &commands::stop_vm(name)).await?;
        info!(vm = name, "vm stopped");
        Ok(())
    }

    /// Remove a VM from the inventory. An absent VM is not an error.
    pub async fn destroy(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        if !self.exists(name).await? {
            debug!(vm = name, "vm absent, nothing to remove");
            return Ok(());
        }

        self.run(plan::REMOVING_VM, &commands::remove_vm(name)).await?;
        info!(vm = name, "vm removed");
        Ok(())
    }

    /// Current state of the VM. The state query is skipped when the VM is
    /// absent.
    pub async fn status(&self, name: &str) -> Result<VmStatus> {
        validate_name(name)?;
        if !self.exists(name).await? {
            return Ok(VmStatus::Absent);
        }

        let output = self.run(plan::GETTING_STATE, &commands::vm_state(name)).await?;
        Ok(parse_status(&output))
    }

    pub async fn is_running(&self, name: &str) -> Result<bool> {
        Ok(self.status(name).await?.is_running())
    }

    /// Any non-empty output from the lookup counts as existing, including
    /// output that is only whitespace.
    ///
    /// With `NameMatch::Prefix` this also reports `foo` as existing when only
    /// `foobar` is present.
    async fn exists(&self, name: &str) -> Result<bool> {
        let output = self
            .run(plan::GETTING_VMS, &commands::find_vm(name, self.config.name_match))
            .await?;
        Ok(!output.is_empty())
    }

    async fn run(&self, step: &'static str, cmd: &PsCommand) -> Result<String> {
        debug!(step, cmd = %cmd, "issuing command");
        self.executor
            .output(cmd)
            .await
            .map_err(|e| DriverError::command(step, e))
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(DriverError::InvalidSpec(
            "vm name must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_spec(name: &str, spec: &VmSpec) -> Result<()> {
    validate_name(name)?;
    if spec.cpus == 0 {
        return Err(DriverError::InvalidSpec(
            "cpu count must be >= 1 (got 0)".to_string(),
        ));
    }
    if spec.memory_mb == 0 {
        return Err(DriverError::InvalidSpec(
            "memory must be >= 1 MB (got 0)".to_string(),
        ));
    }
    if spec.efi_path.as_os_str().is_empty() {
        return Err(DriverError::InvalidSpec(
            "firmware image path must not be empty".to_string(),
        ));
    }
    Ok(())
}
