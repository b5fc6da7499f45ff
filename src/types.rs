use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

/// Substring the hypervisor prints for a VM whose state is running.
pub const RUNNING_MARKER: &str = "Running";

/// Observed state of a VM in the hypervisor's inventory.
///
/// This is never cached by the driver; every value is the result of a fresh
/// query.
///
/// - `Absent`: no VM matched the existence query.
/// - `Stopped`: the VM exists but its state text is anything other than
///   running (off, saved, paused, or empty output).
/// - `Running`: the VM exists and its state text contains [`RUNNING_MARKER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmStatus {
    Absent,
    Stopped,
    Running,
}

impl VmStatus {
    pub fn is_running(self) -> bool {
        self == VmStatus::Running
    }
}

impl fmt::Display for VmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VmStatus::Absent => "absent",
            VmStatus::Stopped => "stopped",
            VmStatus::Running => "running",
        };
        f.write_str(s)
    }
}

/// Interpret the state query output for a VM that is known to exist.
///
/// Only the presence of [`RUNNING_MARKER`] matters; any other content,
/// including empty output, means the VM is not running.
pub fn parse_status(state_output: &str) -> VmStatus {
    if state_output.contains(RUNNING_MARKER) {
        VmStatus::Running
    } else {
        VmStatus::Stopped
    }
}

/// Hypervisor-assigned GUID of a VM, as returned by create.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VmHandle(String);

impl VmHandle {
    /// Build a handle from raw query output, trimming surrounding whitespace.
    pub fn from_output(output: &str) -> Self {
        VmHandle(output.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VmHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for VmHandle {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Parameters for creating a VM. Not retained after the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmSpec {
    pub cpus: u32,
    pub memory_mb: u64,
    /// Boot image attached as a DVD drive.
    pub efi_path: PathBuf,
}

impl VmSpec {
    pub fn new(cpus: u32, memory_mb: u64, efi_path: impl Into<PathBuf>) -> Self {
        Self {
            cpus,
            memory_mb,
            efi_path: efi_path.into(),
        }
    }
}

/// How the existence check matches VM names.
///
/// `Prefix` issues a wildcard query (`name*`), so a VM named `foo` is also
/// reported as existing when only `foobar` is present. `Exact` matches the
/// literal name only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameMatch {
    Prefix,
    Exact,
}

impl Default for NameMatch {
    fn default() -> Self {
        NameMatch::Prefix
    }
}

impl FromStr for NameMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "prefix" => Ok(NameMatch::Prefix),
            "exact" => Ok(NameMatch::Exact),
            other => Err(format!(
                "invalid name match mode: {other} (expected \"prefix\" or \"exact\")"
            )),
        }
    }
}
