// src/errors.rs

//! Crate-wide error types.
//!
//! Two layers:
//! - [`ExecError`]: what an executor reports when a command could not be run
//!   or exited unsuccessfully.
//! - [`DriverError`]: what the VM driver reports to its caller. External-call
//!   failures are wrapped with the static label of the step that failed.

use thiserror::Error;

/// Failure of a single command invocation.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("spawning powershell: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("exit status {}: {stderr}", display_code(.code))]
    Failed { code: Option<i32>, stderr: String },

    #[error("command output is not valid UTF-8")]
    NonUtf8,

    #[error("{0}")]
    Other(String),
}

fn display_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "unknown".to_string(), |c| c.to_string())
}

#[derive(Error, Debug)]
pub enum DriverError {
    /// An executor call failed during the named step.
    #[error("{step}: {source}")]
    Command {
        step: &'static str,
        #[source]
        source: ExecError,
    },

    #[error("hyperv vm with name {0} does not exist")]
    NotFound(String),

    #[error("invalid vm spec: {0}")]
    InvalidSpec(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl DriverError {
    /// Wrap an executor failure with the label of the step that issued it.
    pub fn command(step: &'static str, source: ExecError) -> Self {
        DriverError::Command { step, source }
    }

    /// The step label, if this error came from an executor call.
    pub fn step(&self) -> Option<&'static str> {
        match self {
            DriverError::Command { step, .. } => Some(step),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DriverError>;
