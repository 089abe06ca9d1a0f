use std::sync::Arc;

use super::{release, ServiceLauncher, ServiceSpec, StartOutcome, WaitLoop};
use crate::error::Result;
use crate::probe::{
    InitCompleteProbe, ReadinessProbe, ReadinessResult, RpcClient, RpcReachabilityProbe,
};
use crate::report::Reporter;
use crate::runtime::{CommandRunner, ProcessHandle};

/// Brings up the BSV node. Readiness is a two-phase gate: the RPC interface must
/// answer `getblockcount` before `getinfo.initcomplete` is polled.
pub struct NodeLauncher {
    spec: ServiceSpec,
    runner: Arc<dyn CommandRunner>,
    reachability: Box<dyn ReadinessProbe>,
    initialization: Box<dyn ReadinessProbe>,
    reporter: Reporter,
}

impl NodeLauncher {
    /// Uses `rpc` for both phases of the gate.
    pub fn new(
        spec: ServiceSpec,
        runner: Arc<dyn CommandRunner>,
        rpc: RpcClient,
        reporter: Reporter,
    ) -> Self {
        Self::with_probes(
            spec,
            runner,
            Box::new(RpcReachabilityProbe::new(rpc.clone())),
            Box::new(InitCompleteProbe::new(rpc)),
            reporter,
        )
    }

    pub fn with_probes(
        spec: ServiceSpec,
        runner: Arc<dyn CommandRunner>,
        reachability: Box<dyn ReadinessProbe>,
        initialization: Box<dyn ReadinessProbe>,
        reporter: Reporter,
    ) -> Self {
        Self {
            spec,
            runner,
            reachability,
            initialization,
            reporter,
        }
    }

    fn wait_for_rpc(&self, process: &mut dyn ProcessHandle) -> Result<u32> {
        self.reporter.trace("Waiting for RPC connection...");
        WaitLoop {
            service: self.spec.name(),
            phase: "RPC connection",
            probe: self.reachability.as_ref(),
            policy: self.spec.policy(),
            reporter: self.reporter,
        }
        .run(Some(process))
    }

    /// RPC already answered, so the process is alive; no death checks here.
    fn wait_for_initialization(&self) -> Result<u32> {
        self.reporter.trace("Waiting for node initialization...");
        WaitLoop {
            service: self.spec.name(),
            phase: "initialization",
            probe: self.initialization.as_ref(),
            policy: self.spec.policy(),
            reporter: self.reporter,
        }
        .run(None)
    }
}

impl ServiceLauncher for NodeLauncher {
    fn service_name(&self) -> &str {
        self.spec.name()
    }

    fn start(&self) -> Result<StartOutcome> {
        let name = self.spec.name();
        self.reporter
            .trace(format!("Checking if the {} has already started...", name));

        let probe = self.reachability.check();
        if probe.is_ready() {
            self.reporter.status(format!(
                "The {} has already started, waiting for initialization...",
                name
            ));
            let attempts = self.wait_for_initialization()?;
            return Ok(if attempts == 1 {
                StartOutcome::AlreadyReady
            } else {
                StartOutcome::AwaitedRunning { attempts }
            });
        }

        self.reporter.trace(format!("{} has not started yet", name));
        if let ReadinessResult::Unknown(cause) = &probe {
            self.reporter.recoverable("Exception was", cause);
        }
        self.reporter.status(format!("Starting the {}...", name));

        let mut handle = self.runner.launch(&self.spec.command_line())?;
        let waited = self
            .wait_for_rpc(handle.as_mut())
            .and_then(|rpc| Ok(rpc + self.wait_for_initialization()?));
        // Released on failure too, so an ssh transport never outlives us.
        release(handle, self.reporter);

        Ok(StartOutcome::Launched { attempts: waited? })
    }
}
