use std::time::Duration;

use super::PollPolicy;
use crate::runtime::CommandLine;

/// Immutable description of one service to bring up.
#[derive(Debug, Clone)]
pub struct ServiceSpec {
    name: String,
    binary: String,
    args: Vec<String>,
    address: Option<String>,
    policy: PollPolicy,
}

impl ServiceSpec {
    pub fn new(name: impl Into<String>, binary: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            binary: binary.into(),
            args: Vec::new(),
            address: None,
            policy: PollPolicy::default(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// `host:port` the service listens on, for services probed over the network.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    pub fn timeout(&self) -> Duration {
        self.policy.timeout()
    }

    /// The command that starts the service.
    pub fn command_line(&self) -> CommandLine {
        CommandLine::new(self.binary.as_str()).args(self.args.iter().cloned())
    }
}
