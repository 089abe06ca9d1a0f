use std::time::Duration;

use thiserror::Error;

use crate::args::Settings;
use crate::config::OrchestratorConfig;
use crate::error::{Result, StartupError};
use crate::launcher::{
    AlertSystemLauncher, NodeLauncher, PollPolicy, ServiceLauncher, ServiceSpec,
};
use crate::probe::RpcClient;
use crate::report::Reporter;
use crate::runtime::CommandLine;

pub const ALERT_SYSTEM: &str = "Alert System Microservice";
pub const BSV_NODE: &str = "BSV node";

/// A launcher failed; the services after it were not attempted.
#[derive(Error, Debug)]
#[error("Failed to start the {service}: {source}")]
pub struct ServiceFailure {
    pub service: String,
    pub source: StartupError,
}

/// Runs launchers strictly in order, stopping at the first failure.
pub struct Orchestrator {
    launchers: Vec<Box<dyn ServiceLauncher>>,
    reporter: Reporter,
}

impl Orchestrator {
    pub fn new(launchers: Vec<Box<dyn ServiceLauncher>>, reporter: Reporter) -> Self {
        Self {
            launchers,
            reporter,
        }
    }

    /// The Alert System Microservice first, then the BSV node.
    pub fn from_settings(
        settings: &Settings,
        config: &OrchestratorConfig,
        reporter: Reporter,
    ) -> Result<Self> {
        // 1. Alert System Microservice
        let asm_runner = settings.asm_target.runner(&config.ssh_binary, reporter);
        let port = settings.asm_port.unwrap_or(config.alert_system.port);
        let asm_spec = ServiceSpec::new(ALERT_SYSTEM, config.alert_system.binary.as_str())
            .with_address(format!("{}:{}", settings.asm_target.contact_host(), port))
            .with_policy(PollPolicy::new(
                config.poll_interval(),
                Duration::from_secs(config.alert_system.timeout_secs),
            ));
        let asm = AlertSystemLauncher::with_health_probe(asm_spec, asm_runner, reporter)?;

        // 2. BSV node; its options go to both bitcoind and bitcoin-cli
        let node_runner = settings.node_target.runner(&config.ssh_binary, reporter);
        let node_spec = ServiceSpec::new(BSV_NODE, config.node.daemon.as_str())
            .with_args(settings.node_options.clone())
            .with_policy(PollPolicy::new(
                config.poll_interval(),
                Duration::from_secs(config.node.timeout_secs),
            ));
        let rpc = RpcClient::new(
            node_runner.clone(),
            CommandLine::new(config.node.cli.as_str()).args(settings.node_options.iter().cloned()),
            reporter,
        );
        let node = NodeLauncher::new(node_spec, node_runner, rpc, reporter);

        Ok(Self::new(vec![Box::new(asm), Box::new(node)], reporter))
    }

    pub fn service_names(&self) -> Vec<&str> {
        self.launchers.iter().map(|l| l.service_name()).collect()
    }

    pub fn run(&self) -> std::result::Result<(), ServiceFailure> {
        for launcher in &self.launchers {
            let outcome = launcher.start().map_err(|source| ServiceFailure {
                service: launcher.service_name().to_string(),
                source,
            })?;
            self.reporter
                .trace(format!("{}: {:?}", launcher.service_name(), outcome));
            self.reporter
                .status(format!("{} is up and running", launcher.service_name()));
        }
        Ok(())
    }
}
