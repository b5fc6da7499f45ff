// src/exec/backend.rs

//! Pluggable command executor abstraction.
//!
//! The driver talks to an `Executor` instead of spawning processes itself.
//! This makes it easy to swap in a fake executor in tests while keeping the
//! production implementation here.
//!
//! - `PowerShellExecutor` is the default implementation used by `hvctl`.
//!   It runs each command through `powershell -Command` and captures stdout.
//! - Tests can provide their own `Executor` that, for example, records which
//!   commands were issued and returns scripted output.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;
use std::sync::Arc;

use tokio::process::Command;
use tracing::trace;

use crate::errors::ExecError;

use super::command::PsCommand;

/// Default PowerShell executable.
pub const DEFAULT_POWERSHELL: &str = "powershell.exe";

/// Prepended to every script so that non-terminating cmdlet errors still
/// produce a non-zero exit status.
const STRICT_PREAMBLE: &str = "$ErrorActionPreference = 'Stop'; ";

/// Trait abstracting how a command is run.
///
/// Contract: on success the captured stdout is returned as text (possibly
/// empty); on failure an `ExecError` is returned and no output is available.
pub trait Executor: Send + Sync {
    fn output<'a>(
        &'a self,
        cmd: &'a PsCommand,
    ) -> Pin<Box<dyn Future<Output = Result<String, ExecError>> + Send + 'a>>;
}

impl<E: Executor + ?Sized> Executor for Arc<E> {
    fn output<'a>(
        &'a self,
        cmd: &'a PsCommand,
    ) -> Pin<Box<dyn Future<Output = Result<String, ExecError>> + Send + 'a>> {
        (**self).output(cmd)
    }
}

/// Real executor used in production.
///
/// Each call spawns a fresh, non-interactive PowerShell process and waits for
/// it to exit. No timeout is applied.
#[derive(Debug, Clone)]
pub struct PowerShellExecutor {
    program: String,
}

impl PowerShellExecutor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The argument list passed to the PowerShell executable for `cmd`.
    pub fn args_for(cmd: &PsCommand) -> Vec<String> {
        vec![
            "-NoProfile".to_string(),
            "-NonInteractive".to_string(),
            "-Command".to_string(),
            format!("{STRICT_PREAMBLE}{cmd}"),
        ]
    }
}

impl Default for PowerShellExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_POWERSHELL)
    }
}

impl Executor for PowerShellExecutor {
    fn output<'a>(
        &'a self,
        cmd: &'a PsCommand,
    ) -> Pin<Box<dyn Future<Output = Result<String, ExecError>> + Send + 'a>> {
        Box::pin(async move {
            trace!(program = %self.program, cmd = %cmd, "running powershell");

            let out = Command::new(&self.program)
                .args(Self::args_for(cmd))
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .output()
                .await?;

            if !out.status.success() {
                return Err(ExecError::Failed {
                    code: out.status.code(),
                    stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
                });
            }

            String::from_utf8(out.stdout).map_err(|_| ExecError::NonUtf8)
        })
    }
}
