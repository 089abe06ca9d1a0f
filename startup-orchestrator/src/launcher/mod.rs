//! Start-or-confirm launchers and the readiness wait loop they share.

pub mod alert_system;
pub mod node;
pub mod service;

pub use alert_system::AlertSystemLauncher;
pub use node::NodeLauncher;
pub use service::ServiceSpec;

use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Result, StartupError};
use crate::probe::{ReadinessProbe, ReadinessResult};
use crate::report::Reporter;
use crate::runtime::ProcessHandle;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Cadence and budget of a wait loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    interval: Duration,
    timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT)
    }
}

impl PollPolicy {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Upper bound on probe attempts: one per interval in the budget, at least one.
    pub fn max_attempts(&self) -> u32 {
        let interval = self.interval.as_millis().max(1);
        let attempts = self.timeout.as_millis() / interval;
        attempts.clamp(1, u32::MAX as u128) as u32
    }
}

/// How a start-or-confirm operation finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Ready on the first probe; nothing was launched or awaited.
    AlreadyReady,
    /// Something was already running; we only waited for it.
    AwaitedRunning { attempts: u32 },
    /// We launched the service and it became ready.
    Launched { attempts: u32 },
}

/// A service that can be started or confirmed as already running.
pub trait ServiceLauncher {
    fn service_name(&self) -> &str;

    /// Blocks until the service is ready, launching it if nothing answers.
    fn start(&self) -> Result<StartOutcome>;
}

/// One wait loop over a probe.
pub struct WaitLoop<'a> {
    pub service: &'a str,
    pub phase: &'a str,
    pub probe: &'a dyn ReadinessProbe,
    pub policy: PollPolicy,
    pub reporter: Reporter,
}

impl WaitLoop<'_> {
    /// Polls until the probe reports `Ready`.
    ///
    /// When `process` is given it is checked before every probe, and again before a
    /// `Ready` is accepted. Its death is fatal immediately, whatever the probe said.
    /// Returns the number of probe attempts made.
    pub fn run(&self, mut process: Option<&mut dyn ProcessHandle>) -> Result<u32> {
        let deadline = Instant::now() + self.policy.timeout();
        let max_attempts = self.policy.max_attempts();

        for attempt in 1..=max_attempts {
            ensure_alive(process.as_deref_mut())?;

            match self.probe.check() {
                ReadinessResult::Ready => {
                    ensure_alive(process.as_deref_mut())?;
                    return Ok(attempt);
                }
                ReadinessResult::NotReady => self
                    .reporter
                    .trace(format!("{}: {} not reached yet", self.service, self.phase)),
                ReadinessResult::Unknown(cause) => self.reporter.recoverable(
                    &format!("{}: {} probe failed", self.service, self.probe.name()),
                    &cause,
                ),
            }

            if attempt == max_attempts || Instant::now() + self.policy.interval() > deadline {
                break;
            }
            self.reporter.trace("Retrying...");
            thread::sleep(self.policy.interval());
        }

        Err(StartupError::TimeoutExceeded {
            service: self.service.to_string(),
            phase: self.phase.to_string(),
            timeout: self.policy.timeout(),
        })
    }
}

fn ensure_alive(process: Option<&mut (dyn ProcessHandle + '_)>) -> Result<()> {
    let Some(handle) = process else {
        return Ok(());
    };
    match handle.poll_exit()? {
        Some(exit) => Err(StartupError::ProcessExitedUnexpectedly {
            exit_code: exit.exit_code,
            command: handle.command().to_string(),
            stderr: exit.stderr,
        }),
        None => Ok(()),
    }
}

/// Hands a launched process back once its service is ready. A failed teardown of a
/// transport is not worth failing the startup for.
pub(crate) fn release(handle: Box<dyn ProcessHandle>, reporter: Reporter) {
    let command = handle.command().to_string();
    if let Err(e) = handle.release() {
        log::warn!("Runtime: failed to release '{}': {}", command, e);
    } else {
        reporter.trace(format!("Released '{}'", command));
    }
}
