use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use hvdriver::errors::ExecError;
use hvdriver::exec::{Executor, PsCommand};
use tracing::debug;

/// Which kind of command a scripted response applies to.
///
/// `Get-VM` is used for three different queries, so those are told apart by
/// shape rather than by cmdlet name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// Any command with this cmdlet name (other than `Get-VM`).
    Cmdlet(&'static str),
    /// The existence lookup (`Get-VM -Name …`, no pipe, no member access).
    FindVm,
    /// The state query (`Get-VM … | format-list -Property State`).
    VmState,
    /// The GUID query (`((Get-VM …).Id).Guid`).
    VmGuid,
}

impl Call {
    pub fn matches(&self, cmd: &PsCommand) -> bool {
        let is_get_vm = cmd.cmdlet() == "Get-VM";
        match self {
            Call::Cmdlet(name) => !is_get_vm && cmd.cmdlet() == *name,
            Call::FindVm => is_get_vm && cmd.piped().is_none() && cmd.members().is_empty(),
            Call::VmState => is_get_vm && cmd.piped().is_some(),
            Call::VmGuid => is_get_vm && !cmd.members().is_empty(),
        }
    }
}

#[derive(Debug, Clone)]
enum Response {
    Output(String),
    Fail(String),
}

impl Response {
    fn into_result(self) -> Result<String, ExecError> {
        match self {
            Response::Output(out) => Ok(out),
            Response::Fail(msg) => Err(ExecError::Other(msg)),
        }
    }
}

#[derive(Debug, Default)]
struct Script {
    once: Vec<(Call, Response)>,
    sticky: Vec<(Call, Response)>,
    calls: Vec<PsCommand>,
}

/// A fake executor that:
/// - records every command it is asked to run
/// - answers from a script of per-call responses
/// - returns empty output for anything unscripted.
///
/// Clones share the same script and call log, so a test can hand one clone
/// to the driver and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct FakeExecutor {
    script: Arc<Mutex<Script>>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer `call` with `output`.
    pub fn respond(self, call: Call, output: &str) -> Self {
        self.push(call, Response::Output(output.to_string()), false)
    }

    /// Always fail `call` with `message`.
    pub fn fail(self, call: Call, message: &str) -> Self {
        self.push(call, Response::Fail(message.to_string()), false)
    }

    /// Answer the next matching call with `output`, then fall back.
    pub fn respond_once(self, call: Call, output: &str) -> Self {
        self.push(call, Response::Output(output.to_string()), true)
    }

    /// Fail the next matching call with `message`, then fall back.
    pub fn fail_once(self, call: Call, message: &str) -> Self {
        self.push(call, Response::Fail(message.to_string()), true)
    }

    /// Script an existing VM whose state query prints `state`.
    pub fn with_vm(self, name: &str, state: &str) -> Self {
        self.respond(
            Call::FindVm,
            &format!("\r\nName   State\r\n----   -----\r\n{name} {state}\r\n"),
        )
        .respond(Call::VmState, &format!("\r\n\r\nState : {state}\r\n\r\n"))
    }

    /// Every command issued so far, in order.
    pub fn calls(&self) -> Vec<PsCommand> {
        self.script.lock().unwrap().calls.clone()
    }

    /// Rendered text of every command issued so far.
    pub fn rendered(&self) -> Vec<String> {
        self.calls().iter().map(PsCommand::render).collect()
    }

    /// Cmdlet names of every command issued so far.
    pub fn cmdlets(&self) -> Vec<String> {
        self.calls().iter().map(|c| c.cmdlet().to_string()).collect()
    }

    /// How many issued commands match `call`.
    pub fn count(&self, call: &Call) -> usize {
        self.calls().iter().filter(|c| call.matches(c)).count()
    }

    fn push(self, call: Call, response: Response, once: bool) -> Self {
        {
            let mut script = self.script.lock().unwrap();
            if once {
                script.once.push((call, response));
            } else {
                script.sticky.push((call, response));
            }
        }
        self
    }

    fn answer(&self, cmd: &PsCommand) -> Result<String, ExecError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(cmd.clone());
        debug!(cmd = %cmd, "fake executor call");

        if let Some(pos) = script.once.iter().position(|(c, _)| c.matches(cmd)) {
            let (_, response) = script.once.remove(pos);
            return response.into_result();
        }

        // Later registrations override earlier ones.
        match script.sticky.iter().rev().find(|(c, _)| c.matches(cmd)) {
            Some((_, response)) => response.clone().into_result(),
            None => Ok(String::new()),
        }
    }
}

impl Executor for FakeExecutor {
    fn output<'a>(
        &'a self,
        cmd: &'a PsCommand,
    ) -> Pin<Box<dyn Future<Output = Result<String, ExecError>> + Send + 'a>> {
        let result = self.answer(cmd);
        Box::pin(async move { result })
    }
}
