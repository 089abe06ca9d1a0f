use super::process::{self, LaunchedProcess, OnReady};
use super::target::RemoteHost;
use super::traits::{CommandLine, CommandRunner, ProcessHandle};
use crate::error::Result;
use crate::report::Reporter;

/// Runs commands on a remote host, one `ssh -i <key> <user>@<host> "<command>"`
/// invocation per command.
///
/// The remote command line is the local one joined with spaces; nothing is quoted.
/// Liveness of a launched remote command is the liveness of the local ssh process.
pub struct RemoteSession {
    host: RemoteHost,
    ssh_binary: String,
    reporter: Reporter,
}

impl RemoteSession {
    pub fn new(host: RemoteHost, ssh_binary: impl Into<String>, reporter: Reporter) -> Self {
        Self {
            host,
            ssh_binary: ssh_binary.into(),
            reporter,
        }
    }

    /// The local transport command that runs `command` on the remote host.
    pub fn wrap(&self, command: &CommandLine) -> CommandLine {
        CommandLine::new(self.ssh_binary.as_str())
            .arg("-i")
            .arg(self.host.credential_path().to_string_lossy())
            .arg(self.host.destination())
            .arg(command.joined())
    }
}

impl CommandRunner for RemoteSession {
    fn execute(&self, command: &CommandLine) -> Result<String> {
        let transport = self.wrap(command);
        self.reporter.trace(format!("Running {}...", transport));
        process::run_blocking(&transport)
    }

    fn launch(&self, command: &CommandLine) -> Result<Box<dyn ProcessHandle>> {
        let transport = self.wrap(command);
        self.reporter.trace(format!("Running {}...", transport));
        let process = LaunchedProcess::spawn(transport, OnReady::Terminate)?;
        Ok(Box::new(process))
    }
}
