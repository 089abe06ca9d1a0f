use clap::Parser;
use std::path::PathBuf;

use crate::error::Result;
use crate::runtime::{ExecutionTarget, RemoteHost};

const EXAMPLE: &str = "Example:\n  start-services --bsv-host bsvhost.com --bsv-user bsv_usr1 \
--bsv-pk-path /home/bsv_usr1/.ssh/id_ed25519 --verbose -- -datadir=/data/bsv";

/// Starts the Alert System Microservice and then the BSV node, waiting until both are ready.
#[derive(Parser, Debug, Clone)]
#[command(name = "start-services", version, after_help = EXAMPLE)]
pub struct Cli {
    /// Alert System Microservice HTTP port (3000 by default)
    #[arg(long, value_name = "PORT")]
    pub asm_port: Option<u16>,

    /// IP or hostname of the remote Alert System Microservice
    #[arg(long, value_name = "HOST")]
    pub asm_host: Option<String>,

    /// Username for the Alert System Microservice SSH connection
    #[arg(long, value_name = "USER")]
    pub asm_user: Option<String>,

    /// Private key file for the Alert System Microservice SSH connection
    #[arg(long, value_name = "PK")]
    pub asm_pk_path: Option<PathBuf>,

    /// IP or hostname of the remote BSV node
    #[arg(long, value_name = "HOST")]
    pub bsv_host: Option<String>,

    /// Username for the BSV node SSH connection
    #[arg(long, value_name = "USER")]
    pub bsv_user: Option<String>,

    /// Private key file for the BSV node SSH connection
    #[arg(long, value_name = "PK")]
    pub bsv_pk_path: Option<PathBuf>,

    /// Configuration file (startup.toml in the working directory by default)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Prints out details during the startup
    #[arg(short, long)]
    pub verbose: bool,

    /// Additional bitcoind and bitcoin-cli parameters as -key or -key=value
    #[arg(last = true, value_name = "BSV OPTIONS")]
    pub node_options: Vec<String>,
}

/// Validated command line input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub asm_port: Option<u16>,
    pub asm_target: ExecutionTarget,
    pub node_target: ExecutionTarget,
    pub node_options: Vec<String>,
    pub config_path: Option<PathBuf>,
    pub verbose: bool,
}

impl Cli {
    /// Checks the SSH triples; each must be complete or absent.
    pub fn into_settings(self) -> Result<Settings> {
        let asm_remote = RemoteHost::from_parts(
            "Alert System Microservice",
            self.asm_host,
            self.asm_user,
            self.asm_pk_path,
        )?;
        let node_remote =
            RemoteHost::from_parts("BSV", self.bsv_host, self.bsv_user, self.bsv_pk_path)?;

        Ok(Settings {
            asm_port: self.asm_port,
            asm_target: ExecutionTarget::from_remote(asm_remote),
            node_target: ExecutionTarget::from_remote(node_remote),
            node_options: self.node_options,
            config_path: self.config,
            verbose: self.verbose,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StartupError;

    fn parse(args: &[&str]) -> Result<Settings> {
        let argv = std::iter::once("start-services").chain(args.iter().copied());
        Cli::try_parse_from(argv).unwrap().into_settings()
    }

    #[test]
    fn test_no_arguments_runs_everything_locally() {
        let settings = parse(&[]).unwrap();
        assert_eq!(settings.asm_target, ExecutionTarget::Local);
        assert_eq!(settings.node_target, ExecutionTarget::Local);
        assert_eq!(settings.asm_port, None);
        assert!(settings.node_options.is_empty());
        assert!(!settings.verbose);
    }

    #[test]
    fn test_full_remote_triple_and_pass_through_options() {
        let settings = parse(&[
            "--bsv-host",
            "bsvhost.com",
            "--bsv-user",
            "bsv_usr1",
            "--bsv-pk-path",
            "/home/bsv_usr1/.ssh/id_ed25519",
            "-v",
            "--",
            "-datadir=/data/bsv",
            "-txindex",
        ])
        .unwrap();

        match &settings.node_target {
            ExecutionTarget::Remote(remote) => {
                assert_eq!(remote.destination(), "bsv_usr1@bsvhost.com");
            }
            other => panic!("expected remote target, got {:?}", other),
        }
        assert_eq!(settings.asm_target, ExecutionTarget::Local);
        assert_eq!(settings.node_options, vec!["-datadir=/data/bsv", "-txindex"]);
        assert!(settings.verbose);
    }

    #[test]
    fn test_incomplete_triple_is_rejected() {
        let err = parse(&["--asm-host", "asmhost", "--asm-user", "asm"]).unwrap_err();
        match err {
            StartupError::Argument(msg) => assert!(msg.contains("Alert System Microservice")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_port_must_be_numeric() {
        let result = Cli::try_parse_from(["start-services", "--asm-port", "http"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_port_and_config_path() {
        let settings = parse(&["--asm-port", "3100", "--config", "/etc/startup.toml"]).unwrap();
        assert_eq!(settings.asm_port, Some(3100));
        assert_eq!(settings.config_path, Some(PathBuf::from("/etc/startup.toml")));
    }
}
