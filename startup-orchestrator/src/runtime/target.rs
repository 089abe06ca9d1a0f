use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::local::LocalRunner;
use super::remote::RemoteSession;
use super::traits::CommandRunner;
use crate::error::{Result, StartupError};
use crate::report::Reporter;

/// Key-authenticated ssh destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteHost {
    host: String,
    user: String,
    credential_path: PathBuf,
}

impl RemoteHost {
    pub fn new(host: impl Into<String>, user: impl Into<String>, credential_path: PathBuf) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            credential_path,
        }
    }

    /// Builds a host from optional parts. All three or none must be given.
    pub fn from_parts(
        label: &str,
        host: Option<String>,
        user: Option<String>,
        credential_path: Option<PathBuf>,
    ) -> Result<Option<Self>> {
        match (host, user, credential_path) {
            (None, None, None) => Ok(None),
            (Some(host), Some(user), Some(credential_path)) => {
                Ok(Some(Self::new(host, user, credential_path)))
            }
            _ => Err(StartupError::Argument(format!(
                "Not all {} SSH parameters were provided.",
                label
            ))),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn credential_path(&self) -> &Path {
        &self.credential_path
    }

    /// `user@host`
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }
}

/// Where a service's commands run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExecutionTarget {
    #[default]
    Local,
    Remote(RemoteHost),
}

impl ExecutionTarget {
    pub fn from_remote(remote: Option<RemoteHost>) -> Self {
        remote.map_or(ExecutionTarget::Local, ExecutionTarget::Remote)
    }

    /// Host name used to contact the service over the network.
    pub fn contact_host(&self) -> &str {
        match self {
            ExecutionTarget::Local => "localhost",
            ExecutionTarget::Remote(remote) => remote.host(),
        }
    }

    /// Builds the runner for this target.
    pub fn runner(&self, ssh_binary: &str, reporter: Reporter) -> Arc<dyn CommandRunner> {
        match self {
            ExecutionTarget::Local => Arc::new(LocalRunner::new(reporter)),
            ExecutionTarget::Remote(remote) => {
                Arc::new(RemoteSession::new(remote.clone(), ssh_binary, reporter))
            }
        }
    }
}
