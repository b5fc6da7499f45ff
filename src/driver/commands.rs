// src/driver/commands.rs

//! Hyper-V cmdlet invocations used by the driver.
//!
//! One function per command. The fixed parameters the VM is created with
//! live here as named constants.

use std::path::Path;

use crate::exec::PsCommand;
use crate::types::{NameMatch, VmSpec};

/// VM generation; 2 boots via UEFI.
pub const GENERATION: u8 = 2;

/// File name of the primary disk inside the state directory.
pub const DISK_FILE_NAME: &str = "disk.vhdx";

pub const COM_PORT_NUMBER: u8 = 1;

/// Named pipe the guest's first COM port is wired to.
pub const COM_PIPE_PATH: &str = r"\\.\pipe\cfdev-com";

pub const AUTOMATIC_START_ACTION: &str = "Nothing";
pub const AUTOMATIC_STOP_ACTION: &str = "ShutDown";
pub const CHECKPOINT_TYPE: &str = "Disabled";
pub const SECURE_BOOT: &str = "Off";

pub fn new_vm(name: &str) -> PsCommand {
    PsCommand::hyperv("New-VM")
        .param("Name", name)
        .bare("Generation", GENERATION)
        .switch("NoVHD")
}

pub fn set_vm(name: &str, spec: &VmSpec) -> PsCommand {
    PsCommand::hyperv("Set-VM")
        .param("Name", name)
        .bare("AutomaticStartAction", AUTOMATIC_START_ACTION)
        .bare("AutomaticStopAction", AUTOMATIC_STOP_ACTION)
        .bare("CheckpointType", CHECKPOINT_TYPE)
        .bare("MemoryStartupBytes", format!("{}MB", spec.memory_mb))
        .switch("StaticMemory")
        .bare("ProcessorCount", spec.cpus)
}

pub fn add_dvd_drive(name: &str, image: &Path) -> PsCommand {
    PsCommand::hyperv("Add-VMDvdDrive")
        .param("VMName", name)
        .param("Path", image.to_string_lossy())
}

pub fn remove_network_adapter(name: &str) -> PsCommand {
    PsCommand::hyperv("Remove-VMNetworkAdapter").param("VMName", name)
}

pub fn add_hard_disk(name: &str, disk: &Path) -> PsCommand {
    PsCommand::hyperv("Add-VMHardDiskDrive")
        .param("VMName", name)
        .param("Path", disk.to_string_lossy())
}

/// Disable secure boot and boot from the VM's DVD drive first.
pub fn set_firmware(name: &str) -> PsCommand {
    PsCommand::hyperv("Set-VMFirmware")
        .param("VMName", name)
        .bare("EnableSecureBoot", SECURE_BOOT)
        .expr(
            "FirstBootDevice",
            PsCommand::hyperv("Get-VMDvdDrive").param("VMName", name),
        )
}

pub fn set_com_port(name: &str) -> PsCommand {
    PsCommand::hyperv("Set-VMComPort")
        .param("VMName", name)
        .bare("Number", COM_PORT_NUMBER)
        .param("Path", COM_PIPE_PATH)
}

/// Prints the VM's GUID.
pub fn vm_guid(name: &str) -> PsCommand {
    PsCommand::hyperv("Get-VM")
        .param("Name", name)
        .member("Id")
        .member("Guid")
}

/// Prints something for every matching VM, nothing when none match.
///
/// In prefix mode the name is used as a wildcard pattern. In exact mode a
/// missing VM would make `Get-VM` fail, so the error is silenced and the
/// empty output reports absence instead.
pub fn find_vm(name: &str, mode: NameMatch) -> PsCommand {
    match mode {
        NameMatch::Prefix => PsCommand::hyperv("Get-VM").param("Name", format!("{name}*")),
        NameMatch::Exact => PsCommand::hyperv("Get-VM")
            .param("Name", name)
            .bare("ErrorAction", "SilentlyContinue"),
    }
}

pub fn vm_state(name: &str) -> PsCommand {
    PsCommand::hyperv("Get-VM")
        .param("Name", name)
        .pipe(PsCommand::new("format-list").bare("Property", "State"))
}

pub fn start_vm(name: &str) -> PsCommand {
    PsCommand::hyperv("Start-VM").param("Name", name)
}

/// Hard power-off, no guest shutdown.
pub fn stop_vm(name: &str) -> PsCommand {
    PsCommand::hyperv("Stop-VM").param("Name", name).switch("TurnOff")
}

pub fn remove_vm(name: &str) -> PsCommand {
    PsCommand::hyperv("Remove-VM").param("Name", name).switch("Force")
}
