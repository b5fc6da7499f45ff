// src/driver/plan.rs

//! Step labels and the ordered command sequence for VM creation.

use std::fmt;
use std::path::Path;

use crate::exec::PsCommand;
use crate::types::VmSpec;

use super::commands;

pub const CREATING_VM: &str = "creating new vm";
pub const SETTING_PROPERTIES: &str = "setting vm properties";
pub const ADDING_DVD: &str = "adding dvd drive";
pub const REMOVING_ADAPTER: &str = "removing network adapter";
pub const ADDING_VHD: &str = "adding vhd";
pub const SETTING_FIRMWARE: &str = "setting firmware";
pub const SETTING_COM_PORT: &str = "setting com port";
pub const FETCHING_HANDLE: &str = "fetching VM handle";
pub const GETTING_VMS: &str = "getting vms";
pub const GETTING_STATE: &str = "getting vm state";
pub const STARTING_VM: &str = "start-vm";
pub const STOPPING_VM: &str = "stopping vm";
pub const REMOVING_VM: &str = "removing vm";

/// One command issued while creating a VM.
#[derive(Debug, Clone)]
pub struct CreateStep {
    pub label: &'static str,
    pub command: PsCommand,
    /// A failing non-fatal step is logged and creation carries on.
    pub fatal: bool,
}

/// Everything create issues, in order. The final step's output is the GUID.
#[derive(Debug, Clone)]
pub struct CreatePlan {
    pub steps: Vec<CreateStep>,
}

impl CreatePlan {
    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.steps.iter().map(|s| s.label)
    }
}

impl fmt::Display for CreatePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            let note = if step.fatal { "" } else { " (best effort)" };
            writeln!(f, "{:>2}. {}{}", i + 1, step.label, note)?;
            writeln!(f, "      {}", step.command)?;
        }
        Ok(())
    }
}

fn step(label: &'static str, command: PsCommand) -> CreateStep {
    CreateStep {
        label,
        command,
        fatal: true,
    }
}

/// Build the creation sequence for `name`, with the primary disk at `disk`.
pub fn create_plan(name: &str, spec: &VmSpec, disk: &Path) -> CreatePlan {
    let steps = vec![
        step(CREATING_VM, commands::new_vm(name)),
        step(SETTING_PROPERTIES, commands::set_vm(name, spec)),
        step(ADDING_DVD, commands::add_dvd_drive(name, &spec.efi_path)),
        CreateStep {
            label: REMOVING_ADAPTER,
            command: commands::remove_network_adapter(name),
            fatal: false,
        },
        step(ADDING_VHD, commands::add_hard_disk(name, disk)),
        step(SETTING_FIRMWARE, commands::set_firmware(name)),
        step(SETTING_COM_PORT, commands::set_com_port(name)),
        step(FETCHING_HANDLE, commands::vm_guid(name)),
    ];
    CreatePlan { steps }
}
