//! Brings up the Alert System Microservice and then the BSV node, locally or over ssh,
//! blocking until each reports ready.
//!
//! The pieces, leaves first:
//! - `runtime`: where commands run (`LocalRunner`, `RemoteSession`) behind `CommandRunner`.
//! - `probe`: readiness checks (HTTP health, node RPC).
//! - `launcher`: start-or-confirm state machines and the shared wait loop.
//! - `orchestrator`: runs the launchers in order.

pub mod args;
pub mod config;
pub mod error;
pub mod launcher;
pub mod orchestrator;
pub mod probe;
pub mod report;
pub mod runtime;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ProbeError, Result, StartupError};
