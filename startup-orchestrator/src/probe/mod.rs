//! Readiness probes.
//!
//! A probe answers one question, "is the service ready?", with three possible answers.
//! `Unknown` means the question could not be answered (nothing listening, garbage
//! response) and is never treated as an error by the launchers.

pub mod http;
pub mod rpc;

pub use http::HealthProbe;
pub use rpc::{InitCompleteProbe, RpcClient, RpcReachabilityProbe};

use crate::error::ProbeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessResult {
    Ready,
    NotReady,
    Unknown(ProbeError),
}

impl ReadinessResult {
    pub fn is_ready(&self) -> bool {
        matches!(self, ReadinessResult::Ready)
    }

    /// True when the service itself answered, ready or not.
    pub fn is_definitive(&self) -> bool {
        !matches!(self, ReadinessResult::Unknown(_))
    }
}

pub trait ReadinessProbe: Send + Sync {
    /// Short description used in diagnostics, e.g. "health".
    fn name(&self) -> &str;

    fn check(&self) -> ReadinessResult;
}
