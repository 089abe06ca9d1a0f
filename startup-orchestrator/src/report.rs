use log::info;
use std::fmt::Display;

use crate::error::StartupError;

/// Carries the verbosity chosen at startup to every component that reports progress.
///
/// Diagnostic traces go through the `log` facade and are only emitted when verbose.
/// Status lines and fatal errors are always printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reporter {
    verbose: bool,
}

impl Reporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Reporter that never emits diagnostic traces.
    pub fn quiet() -> Self {
        Self { verbose: false }
    }

    /// Diagnostic trace, verbose only.
    pub fn trace(&self, message: impl Display) {
        if self.verbose {
            info!("{}", message);
        }
    }

    /// A failure that will be retried. Verbose only.
    pub fn recoverable(&self, context: &str, cause: &dyn Display) {
        if self.verbose {
            info!("{}: {}", context, cause);
        }
    }

    /// User-facing progress line.
    pub fn status(&self, message: impl Display) {
        println!("{}", message);
    }

    /// Fatal failure, printed to stderr regardless of verbosity or log filter.
    pub fn fatal(&self, context: &str, err: &StartupError) {
        eprintln!("{}", fatal_message(context, err));
    }
}

/// The failure line, followed by the captured stderr when there is any.
fn fatal_message(context: &str, err: &StartupError) -> String {
    match err.stderr() {
        Some(stderr) => format!("{}: {}\nError: {}", context, err, stderr),
        None => format!("{}: {}", context, err),
    }
}
