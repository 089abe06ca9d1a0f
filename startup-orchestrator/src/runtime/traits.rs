use crate::error::Result;
use std::fmt;

/// A program plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Program and arguments joined by single spaces, no quoting.
    pub fn joined(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

/// How a launched process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitReport {
    pub exit_code: Option<i32>,
    pub stderr: String,
}

/// The abstraction over "where commands run".
/// Implemented for the local host and for a remote host reached over ssh.
/// Probes and launchers only ever see this trait.
pub trait CommandRunner: Send + Sync {
    /// Runs the command to completion and returns its standard output.
    ///
    /// A non-zero exit status fails with `StartupError::ProcessFailed`
    /// carrying the captured standard error.
    fn execute(&self, command: &CommandLine) -> Result<String>;

    /// Starts the command without waiting for it.
    /// Standard error is captured on the returned handle; standard output is not.
    fn launch(&self, command: &CommandLine) -> Result<Box<dyn ProcessHandle>>;
}

/// A process started by `CommandRunner::launch`.
pub trait ProcessHandle: Send {
    /// The command line of the transport process actually spawned.
    fn command(&self) -> &CommandLine;

    /// Non-blocking liveness check. `Some` once the process has exited.
    fn poll_exit(&mut self) -> Result<Option<ExitReport>>;

    /// Called once the service is ready. Local children keep running,
    /// remote transports are torn down.
    fn release(self: Box<Self>) -> Result<()>;
}
