use super::process::{self, LaunchedProcess, OnReady};
use super::traits::{CommandLine, CommandRunner, ProcessHandle};
use crate::error::Result;
use crate::report::Reporter;

/// Runs commands as direct children of the orchestrator using `std::process`.
pub struct LocalRunner {
    reporter: Reporter,
}

impl LocalRunner {
    pub fn new(reporter: Reporter) -> Self {
        Self { reporter }
    }
}

impl CommandRunner for LocalRunner {
    fn execute(&self, command: &CommandLine) -> Result<String> {
        self.reporter.trace(format!("Running {}...", command));
        process::run_blocking(command)
    }

    fn launch(&self, command: &CommandLine) -> Result<Box<dyn ProcessHandle>> {
        self.reporter.trace(format!("Running {}...", command));
        let process = LaunchedProcess::spawn(command.clone(), OnReady::Detach)?;
        self.reporter
            .trace(format!("Runtime: '{}' started (PID {})", command, process.id()));
        Ok(Box::new(process))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::error::StartupError;

    #[test]
    fn test_execute_captures_stdout() {
        let runner = LocalRunner::new(Reporter::quiet());
        let out = runner
            .execute(&CommandLine::new("sh").arg("-c").arg("printf '{\"initcomplete\": true}'"))
            .unwrap();
        assert_eq!(out, "{\"initcomplete\": true}");
    }

    #[test]
    fn test_execute_non_zero_exit_fails() {
        let runner = LocalRunner::new(Reporter::quiet());
        let err = runner
            .execute(&CommandLine::new("sh").arg("-c").arg("exit 7"))
            .unwrap_err();
        assert!(matches!(
            err,
            StartupError::ProcessFailed {
                exit_code: Some(7),
                ..
            }
        ));
    }

    #[test]
    fn test_launch_returns_live_handle() {
        let runner = LocalRunner::new(Reporter::quiet());
        let mut handle = runner
            .launch(&CommandLine::new("sh").arg("-c").arg("sleep 1"))
            .unwrap();
        assert_eq!(handle.command().program(), "sh");
        assert!(handle.poll_exit().unwrap().is_none());
    }
}
