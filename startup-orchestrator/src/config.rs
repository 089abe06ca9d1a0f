use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "startup";
pub const ENV_PREFIX: &str = "STARTUP";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub alert_system: AlertSystemConfig,
    pub node: NodeConfig,

    /// Delay between readiness probes.
    pub poll_interval_ms: u64,
    pub ssh_binary: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct AlertSystemConfig {
    pub binary: String,
    pub port: u16,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct NodeConfig {
    pub daemon: String,
    pub cli: String,
    pub timeout_secs: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            alert_system: AlertSystemConfig::default(),
            node: NodeConfig::default(),
            poll_interval_ms: 1000,
            ssh_binary: "ssh".to_string(),
        }
    }
}

impl Default for AlertSystemConfig {
    fn default() -> Self {
        Self {
            binary: "alert-system".to_string(),
            port: 3000,
            timeout_secs: 60,
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            daemon: "bitcoind".to_string(),
            cli: "bitcoin-cli".to_string(),
            timeout_secs: 60,
        }
    }
}

impl OrchestratorConfig {
    /// Defaults, then the config file, then `STARTUP_*` environment variables
    /// (`STARTUP_NODE__TIMEOUT_SECS=120`).
    ///
    /// An explicit `path` must exist; the default `startup.toml` is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .context("Failed to read configuration")?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
