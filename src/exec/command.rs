// src/exec/command.rs

//! Typed PowerShell command builder.
//!
//! Commands are assembled as a cmdlet plus an ordered parameter list instead
//! of formatted strings. Caller-supplied values (VM names, paths) are always
//! rendered as single-quoted PowerShell literals, so a name containing spaces,
//! `;` or `$` cannot change the shape of the command. Bare tokens are only
//! used for values this crate controls (numbers, enum words, variables).

use std::fmt;

/// Module prefix used for every Hyper-V cmdlet, so that a same-named cmdlet
/// from another module (e.g. VMware PowerCLI's `Get-VM`) is never picked up.
pub const HYPERV_MODULE: &str = "Hyper-V";

/// A parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PsValue {
    /// Rendered as a single-quoted string literal.
    Literal(String),
    /// Rendered verbatim. Only for values built by this crate.
    Bare(String),
    /// Rendered as a parenthesised sub-expression.
    Expr(Box<PsCommand>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PsArg {
    /// `-Name`
    Switch(String),
    /// `-Name value`
    Param(String, PsValue),
}

/// A single PowerShell pipeline, optionally followed by member access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PsCommand {
    module: Option<String>,
    cmdlet: String,
    args: Vec<PsArg>,
    pipe: Option<Box<PsCommand>>,
    members: Vec<String>,
}

impl PsCommand {
    /// An unqualified cmdlet, e.g. `format-list`.
    pub fn new(cmdlet: impl Into<String>) -> Self {
        Self {
            module: None,
            cmdlet: cmdlet.into(),
            args: Vec::new(),
            pipe: None,
            members: Vec::new(),
        }
    }

    /// A cmdlet qualified with the Hyper-V module, e.g. `Hyper-V\Get-VM`.
    pub fn hyperv(cmdlet: impl Into<String>) -> Self {
        Self {
            module: Some(HYPERV_MODULE.to_string()),
            ..Self::new(cmdlet)
        }
    }

    /// Add a parameter whose value is quoted as a string literal.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.args
            .push(PsArg::Param(name.into(), PsValue::Literal(value.into())));
        self
    }

    /// Add a parameter whose value is emitted verbatim.
    pub fn bare(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.args
            .push(PsArg::Param(name.into(), PsValue::Bare(value.to_string())));
        self
    }

    /// Add a parameter whose value is the result of another command.
    pub fn expr(mut self, name: impl Into<String>, value: PsCommand) -> Self {
        self.args
            .push(PsArg::Param(name.into(), PsValue::Expr(Box::new(value))));
        self
    }

    pub fn switch(mut self, name: impl Into<String>) -> Self {
        self.args.push(PsArg::Switch(name.into()));
        self
    }

    /// Pipe this command's output into `next`.
    pub fn pipe(mut self, next: PsCommand) -> Self {
        let tail = match self.pipe.take() {
            Some(tail) => (*tail).pipe(next),
            None => next,
        };
        self.pipe = Some(Box::new(tail));
        self
    }

    /// Access a property of the pipeline result, e.g. `(…).Id`.
    pub fn member(mut self, name: impl Into<String>) -> Self {
        self.members.push(name.into());
        self
    }

    /// Cmdlet name without module prefix.
    pub fn cmdlet(&self) -> &str {
        &self.cmdlet
    }

    pub fn args(&self) -> &[PsArg] {
        &self.args
    }

    /// The command this one pipes into, if any.
    pub fn piped(&self) -> Option<&PsCommand> {
        self.pipe.as_deref()
    }

    /// Properties accessed on the result, outermost last.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Value of a named parameter, as passed to the builder.
    pub fn value(&self, name: &str) -> Option<&PsValue> {
        self.args.iter().find_map(|arg| match arg {
            PsArg::Param(n, v) if n.eq_ignore_ascii_case(name) => Some(v),
            _ => None,
        })
    }

    /// Render to the text passed to `powershell -Command`.
    pub fn render(&self) -> String {
        self.to_string()
    }

    fn fmt_pipeline(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(module) = &self.module {
            write!(f, "{module}\\")?;
        }
        f.write_str(&self.cmdlet)?;
        for arg in &self.args {
            match arg {
                PsArg::Switch(name) => write!(f, " -{name}")?,
                PsArg::Param(name, value) => write!(f, " -{name} {value}")?,
            }
        }
        if let Some(next) = &self.pipe {
            write!(f, " | {next}")?;
        }
        Ok(())
    }
}

impl fmt::Display for PsCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // ((Get-VM -Name 'x').Id).Guid
        for _ in &self.members {
            f.write_str("(")?;
        }
        self.fmt_pipeline(f)?;
        for member in &self.members {
            write!(f, ").{member}")?;
        }
        Ok(())
    }
}

impl fmt::Display for PsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PsValue::Literal(s) => f.write_str(&quote(s)),
            PsValue::Bare(s) => f.write_str(s),
            PsValue::Expr(cmd) => write!(f, "({cmd})"),
        }
    }
}

/// Quote `s` as a PowerShell single-quoted string.
///
/// PowerShell accepts the typographic single quotes as quote characters too,
/// so those are doubled along with the ASCII one.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        if matches!(c, '\'' | '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}') {
            out.push(c);
        }
        out.push(c);
    }
    out.push('\'');
    out
}
