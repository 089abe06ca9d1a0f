use std::sync::Arc;

use super::{release, ServiceLauncher, ServiceSpec, StartOutcome, WaitLoop};
use crate::error::{Result, StartupError};
use crate::probe::{HealthProbe, ReadinessProbe, ReadinessResult};
use crate::report::Reporter;
use crate::runtime::CommandRunner;

/// Brings up the Alert System Microservice and waits until its health endpoint
/// reports `synced`.
pub struct AlertSystemLauncher {
    spec: ServiceSpec,
    runner: Arc<dyn CommandRunner>,
    probe: Box<dyn ReadinessProbe>,
    reporter: Reporter,
}

impl AlertSystemLauncher {
    pub fn new(
        spec: ServiceSpec,
        runner: Arc<dyn CommandRunner>,
        probe: Box<dyn ReadinessProbe>,
        reporter: Reporter,
    ) -> Self {
        Self {
            spec,
            runner,
            probe,
            reporter,
        }
    }

    /// Probes the health endpoint at the spec's contact address.
    pub fn with_health_probe(
        spec: ServiceSpec,
        runner: Arc<dyn CommandRunner>,
        reporter: Reporter,
    ) -> Result<Self> {
        let address = spec.address().ok_or_else(|| {
            StartupError::Argument(format!("No contact address for the {}", spec.name()))
        })?;
        let probe = HealthProbe::new(address, reporter)?;
        Ok(Self::new(spec, runner, Box::new(probe), reporter))
    }

    fn wait_loop(&self) -> WaitLoop<'_> {
        WaitLoop {
            service: self.spec.name(),
            phase: "sync",
            probe: self.probe.as_ref(),
            policy: self.spec.policy(),
            reporter: self.reporter,
        }
    }
}

impl ServiceLauncher for AlertSystemLauncher {
    fn service_name(&self) -> &str {
        self.spec.name()
    }

    fn start(&self) -> Result<StartOutcome> {
        let name = self.spec.name();
        self.reporter
            .trace(format!("Checking if the {} has already started...", name));

        match self.probe.check() {
            ReadinessResult::Ready => {
                self.reporter.status(format!("{} has already started", name));
                Ok(StartOutcome::AlreadyReady)
            }
            ReadinessResult::NotReady => {
                self.reporter.status(format!(
                    "{} has already started, waiting to be synced...",
                    name
                ));
                let attempts = self.wait_loop().run(None)?;
                Ok(StartOutcome::AwaitedRunning { attempts })
            }
            ReadinessResult::Unknown(cause) => {
                self.reporter
                    .recoverable(&format!("{} is not contactable", name), &cause);
                self.reporter.status(format!("Starting the {}...", name));

                let mut handle = self.runner.launch(&self.spec.command_line())?;
                self.reporter
                    .trace(format!("Waiting for the {} to be synced...", name));
                let waited = self.wait_loop().run(Some(handle.as_mut()));
                // Released on failure too, so an ssh transport never outlives us.
                release(handle, self.reporter);

                Ok(StartOutcome::Launched { attempts: waited? })
            }
        }
    }
}
