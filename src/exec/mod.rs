// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`command`] builds PowerShell commands as typed cmdlet + parameter
//!   lists and renders them with safe quoting.
//! - [`backend`] provides the `Executor` trait and the concrete
//!   `PowerShellExecutor` used in production, which tests can replace with a
//!   fake implementation.

pub mod backend;
pub mod command;

pub use backend::{DEFAULT_POWERSHELL, Executor, PowerShellExecutor};
pub use command::{PsArg, PsCommand, PsValue};
