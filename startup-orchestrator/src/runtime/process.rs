use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::warn;

use super::traits::{CommandLine, ExitReport, ProcessHandle};
use crate::error::{Result, StartupError};

/// How long to wait for the stderr pipe to drain once the process has exited.
/// A grandchild holding the pipe open must not stall the wait loop.
const STDERR_DRAIN_GRACE: Duration = Duration::from_millis(500);
const TERMINATE_GRACE: Duration = Duration::from_secs(2);

/// What happens to the process once the service it started is ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnReady {
    /// The process is the service itself and keeps running.
    Detach,
    /// The process is only a transport (ssh) and is terminated.
    Terminate,
}

/// Runs a command to completion, capturing stdout and stderr.
pub(crate) fn run_blocking(command: &CommandLine) -> Result<String> {
    let output = Command::new(command.program())
        .args(command.arguments())
        .stdin(Stdio::null())
        .output()
        .map_err(|source| StartupError::Spawn {
            command: command.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(StartupError::ProcessFailed {
            exit_code: output.status.code(),
            command: command.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// A child process started without waiting, with its stderr collected in the background.
pub struct LaunchedProcess {
    command: CommandLine,
    child: Child,
    stderr: Arc<Mutex<Vec<u8>>>,
    drain: Option<JoinHandle<()>>,
    on_ready: OnReady,
}

impl LaunchedProcess {
    /// Spawns the command. Stdout goes to our stdout, stderr is captured.
    pub fn spawn(command: CommandLine, on_ready: OnReady) -> Result<Self> {
        let mut child = Command::new(command.program())
            .args(command.arguments())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| StartupError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let stderr = Arc::new(Mutex::new(Vec::new()));
        // The service must never block on a full stderr pipe while we poll it.
        let drain = child.stderr.take().map(|mut pipe| {
            let sink = Arc::clone(&stderr);
            thread::spawn(move || {
                let mut chunk = [0u8; 4096];
                loop {
                    match pipe.read(&mut chunk) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => sink
                            .lock()
                            .unwrap_or_else(|poisoned| poisoned.into_inner())
                            .extend_from_slice(&chunk[..n]),
                    }
                }
            })
        });

        Ok(Self {
            command,
            child,
            stderr,
            drain,
            on_ready,
        })
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Everything the process wrote to stderr so far.
    pub fn captured_stderr(&self) -> String {
        let bytes = self
            .stderr
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        String::from_utf8_lossy(&bytes).trim_end().to_string()
    }

    /// Sends SIGTERM (a hard kill elsewhere) and reaps the process if it goes away promptly.
    pub fn terminate(&mut self) -> Result<()> {
        // Once reaped the pid may belong to someone else.
        if let Ok(Some(_)) = self.child.try_wait() {
            return Ok(());
        }
        #[cfg(unix)]
        {
            let rc = unsafe { libc::kill(self.child.id() as libc::pid_t, libc::SIGTERM) };
            if rc != 0 {
                let source = std::io::Error::last_os_error();
                // Already gone.
                if source.raw_os_error() != Some(libc::ESRCH) {
                    return Err(StartupError::Terminate {
                        command: self.command.to_string(),
                        source,
                    });
                }
            }
        }
        #[cfg(not(unix))]
        {
            self.child
                .kill()
                .map_err(|source| StartupError::Terminate {
                    command: self.command.to_string(),
                    source,
                })?;
        }

        let deadline = Instant::now() + TERMINATE_GRACE;
        while Instant::now() < deadline {
            match self.child.try_wait() {
                Ok(Some(_)) | Err(_) => return Ok(()),
                Ok(None) => thread::sleep(Duration::from_millis(20)),
            }
        }
        warn!(
            "Runtime: '{}' (PID {}) still running after SIGTERM",
            self.command,
            self.child.id()
        );
        Ok(())
    }

    fn wait_for_drain(&mut self) {
        let Some(handle) = self.drain.take() else {
            return;
        };
        let deadline = Instant::now() + STDERR_DRAIN_GRACE;
        while !handle.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        if handle.is_finished() {
            let _ = handle.join();
        } else {
            self.drain = Some(handle);
        }
    }
}

impl ProcessHandle for LaunchedProcess {
    fn command(&self) -> &CommandLine {
        &self.command
    }

    fn poll_exit(&mut self) -> Result<Option<ExitReport>> {
        let status = self
            .child
            .try_wait()
            .map_err(|source| StartupError::Wait {
                command: self.command.to_string(),
                source,
            })?;

        match status {
            Some(status) => {
                self.wait_for_drain();
                Ok(Some(ExitReport {
                    exit_code: status.code(),
                    stderr: self.captured_stderr(),
                }))
            }
            None => Ok(None),
        }
    }

    fn release(mut self: Box<Self>) -> Result<()> {
        match self.on_ready {
            OnReady::Detach => Ok(()),
            OnReady::Terminate => self.terminate(),
        }
    }
}
