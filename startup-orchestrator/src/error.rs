use std::time::Duration;
use thiserror::Error;

/// Recoverable failure while asking a service whether it is ready.
///
/// These never abort a wait loop; they only mean "not contactable yet".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// Nothing answered, or the transport failed before a response arrived.
    #[error("transport unreachable: {0}")]
    TransportUnreachable(String),

    /// The service answered with something we could not interpret.
    #[error("malformed response ({reason}): {raw}")]
    MalformedResponse { reason: String, raw: String },
}

/// Fatal errors that abort the startup sequence.
#[derive(Error, Debug)]
pub enum StartupError {
    /// A blocking command finished with a non-zero exit status.
    #[error("Command '{command}' failed with {}", describe_exit(.exit_code))]
    ProcessFailed {
        exit_code: Option<i32>,
        command: String,
        stderr: String,
    },

    /// A launched service (or its transport) died before it became ready.
    #[error("Process '{command}' exited before becoming ready, {}", describe_exit(.exit_code))]
    ProcessExitedUnexpectedly {
        exit_code: Option<i32>,
        command: String,
        stderr: String,
    },

    /// The polling budget was exhausted.
    #[error("{service}: {phase} timeout exceeded after {}s", .timeout.as_secs())]
    TimeoutExceeded {
        service: String,
        phase: String,
        timeout: Duration,
    },

    /// The executable could not be started at all.
    #[error("Failed to start '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    /// Querying the state of a launched process failed.
    #[error("Failed to query process '{command}': {source}")]
    Wait {
        command: String,
        source: std::io::Error,
    },

    /// Terminating the transport process failed.
    #[error("Failed to terminate '{command}': {source}")]
    Terminate {
        command: String,
        source: std::io::Error,
    },

    /// The HTTP client used for health checks could not be built.
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Malformed or incomplete command line input.
    #[error("{0}")]
    Argument(String),
}

impl StartupError {
    /// Captured standard error of the failed process, if any was collected.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            StartupError::ProcessFailed { stderr, .. }
            | StartupError::ProcessExitedUnexpectedly { stderr, .. }
                if !stderr.is_empty() =>
            {
                Some(stderr.as_str())
            }
            _ => None,
        }
    }

    /// Exit code of the failed process, `None` when killed by a signal or not applicable.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            StartupError::ProcessFailed { exit_code, .. }
            | StartupError::ProcessExitedUnexpectedly { exit_code, .. } => *exit_code,
            _ => None,
        }
    }
}

fn describe_exit(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// A specialized Result type for startup operations.
pub type Result<T> = std::result::Result<T, StartupError>;
