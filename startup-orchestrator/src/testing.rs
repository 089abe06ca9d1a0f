//! Test doubles shared by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{ProbeError, Result, StartupError};
use crate::probe::{ReadinessProbe, ReadinessResult};
use crate::runtime::{CommandLine, CommandRunner, ExitReport, ProcessHandle};

pub(crate) enum Reply {
    Stdout(String),
    Fail(i32, String),
}

#[derive(Debug, Default)]
pub(crate) struct HandleState {
    pub exit: Option<ExitReport>,
    /// Poll from which `exit` is reported; the first when unset.
    pub exit_on_poll: usize,
    pub polls: usize,
    pub released: bool,
}

/// Records commands instead of running them. Blocking replies are keyed by the
/// last argument of the command (the RPC method).
#[derive(Default)]
pub(crate) struct MockRunner {
    replies: Mutex<HashMap<String, Reply>>,
    executed: Mutex<Vec<String>>,
    launched: Mutex<Vec<String>>,
    process: Arc<Mutex<HandleState>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, method: &str, reply: Reply) {
        self.replies.lock().unwrap().insert(method.to_string(), reply);
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    pub fn launched(&self) -> Vec<String> {
        self.launched.lock().unwrap().clone()
    }

    /// Shared state of every handle this runner hands out.
    pub fn process(&self) -> Arc<Mutex<HandleState>> {
        self.process.clone()
    }

    pub fn exit_process(&self, exit_code: Option<i32>, stderr: &str) {
        self.exit_process_on_poll(1, exit_code, stderr);
    }

    /// The process is seen alive until the `poll`th liveness check.
    pub fn exit_process_on_poll(&self, poll: usize, exit_code: Option<i32>, stderr: &str) {
        let mut state = self.process.lock().unwrap();
        state.exit_on_poll = poll;
        state.exit = Some(ExitReport {
            exit_code,
            stderr: stderr.to_string(),
        });
    }
}

impl CommandRunner for MockRunner {
    fn execute(&self, command: &CommandLine) -> Result<String> {
        self.executed.lock().unwrap().push(command.to_string());
        let method = command.arguments().last().cloned().unwrap_or_default();
        match self.replies.lock().unwrap().get(&method) {
            Some(Reply::Stdout(out)) => Ok(out.clone()),
            Some(Reply::Fail(code, stderr)) => Err(StartupError::ProcessFailed {
                exit_code: Some(*code),
                command: command.to_string(),
                stderr: stderr.clone(),
            }),
            None => Err(StartupError::ProcessFailed {
                exit_code: Some(1),
                command: command.to_string(),
                stderr: "error: couldn't connect to server".to_string(),
            }),
        }
    }

    fn launch(&self, command: &CommandLine) -> Result<Box<dyn ProcessHandle>> {
        self.launched.lock().unwrap().push(command.to_string());
        Ok(Box::new(MockHandle {
            command: command.clone(),
            state: self.process.clone(),
        }))
    }
}

pub(crate) struct MockHandle {
    command: CommandLine,
    state: Arc<Mutex<HandleState>>,
}

impl ProcessHandle for MockHandle {
    fn command(&self) -> &CommandLine {
        &self.command
    }

    fn poll_exit(&mut self) -> Result<Option<ExitReport>> {
        let mut state = self.state.lock().unwrap();
        state.polls += 1;
        if state.polls < state.exit_on_poll {
            return Ok(None);
        }
        Ok(state.exit.clone())
    }

    fn release(self: Box<Self>) -> Result<()> {
        self.state.lock().unwrap().released = true;
        Ok(())
    }
}

/// Answers from a script, repeating the last answer once exhausted.
pub(crate) struct ScriptedProbe {
    script: Mutex<VecDeque<ReadinessResult>>,
    last: Mutex<ReadinessResult>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedProbe {
    pub fn new(script: Vec<ReadinessResult>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(unreachable()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn always(result: ReadinessResult) -> Self {
        Self::new(vec![result])
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

impl ReadinessProbe for ScriptedProbe {
    fn name(&self) -> &str {
        "scripted"
    }

    fn check(&self) -> ReadinessResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            *last = next;
        }
        last.clone()
    }
}

pub(crate) fn unreachable() -> ReadinessResult {
    ReadinessResult::Unknown(ProbeError::TransportUnreachable(
        "Connection refused".to_string(),
    ))
}

pub(crate) fn count(calls: &Arc<AtomicUsize>) -> usize {
    calls.load(Ordering::SeqCst)
}
