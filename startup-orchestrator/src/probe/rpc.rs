use std::sync::Arc;

use serde_json::Value;

use super::{ReadinessProbe, ReadinessResult};
use crate::error::{ProbeError, StartupError};
use crate::runtime::{CommandLine, CommandRunner};
use crate::report::Reporter;

/// Issues node RPCs through the client binary (`bitcoin-cli`), locally or remotely.
#[derive(Clone)]
pub struct RpcClient {
    runner: Arc<dyn CommandRunner>,
    base: CommandLine,
    reporter: Reporter,
}

impl RpcClient {
    /// `base` is the client binary plus any connection options, e.g.
    /// `bitcoin-cli -datadir=/data/bsv`.
    pub fn new(runner: Arc<dyn CommandRunner>, base: CommandLine, reporter: Reporter) -> Self {
        Self {
            runner,
            base,
            reporter,
        }
    }

    /// Runs `<base> <method> <params...>` and decodes its stdout as JSON.
    pub fn call(&self, method: &str, params: &[&str]) -> Result<Value, ProbeError> {
        let command = self
            .base
            .clone()
            .arg(method)
            .args(params.iter().copied());

        let output = self.runner.execute(&command).map_err(describe_failure)?;

        decode_json(&output).map_err(|err| {
            self.reporter
                .trace(format!("{} returned:\n{}", command, output));
            err
        })
    }
}

fn describe_failure(err: StartupError) -> ProbeError {
    match err.stderr() {
        Some(stderr) => ProbeError::TransportUnreachable(format!("{}: {}", err, stderr)),
        None => ProbeError::TransportUnreachable(err.to_string()),
    }
}

/// Decodes client output. Numbers keep their exact textual value, so block heights
/// and amounts never pass through floating point.
pub fn decode_json(raw: &str) -> Result<Value, ProbeError> {
    serde_json::from_str(raw.trim()).map_err(|e| ProbeError::MalformedResponse {
        reason: format!("not a JSON string: {}", e),
        raw: raw.to_string(),
    })
}

/// Ready as soon as `getblockcount` answers with any JSON value.
pub struct RpcReachabilityProbe {
    client: RpcClient,
}

impl RpcReachabilityProbe {
    pub fn new(client: RpcClient) -> Self {
        Self { client }
    }
}

impl ReadinessProbe for RpcReachabilityProbe {
    fn name(&self) -> &str {
        "getblockcount"
    }

    fn check(&self) -> ReadinessResult {
        match self.client.call("getblockcount", &[]) {
            Ok(_) => ReadinessResult::Ready,
            Err(cause) => ReadinessResult::Unknown(cause),
        }
    }
}

/// Reads `initcomplete` from `getinfo`.
pub struct InitCompleteProbe {
    client: RpcClient,
}

impl InitCompleteProbe {
    pub fn new(client: RpcClient) -> Self {
        Self { client }
    }
}

impl ReadinessProbe for InitCompleteProbe {
    fn name(&self) -> &str {
        "getinfo"
    }

    fn check(&self) -> ReadinessResult {
        let info = match self.client.call("getinfo", &[]) {
            Ok(info) => info,
            Err(cause) => return ReadinessResult::Unknown(cause),
        };

        match info.get("initcomplete").and_then(Value::as_bool) {
            Some(true) => ReadinessResult::Ready,
            Some(false) => ReadinessResult::NotReady,
            None => ReadinessResult::Unknown(ProbeError::MalformedResponse {
                reason: "missing boolean field 'initcomplete'".to_string(),
                raw: info.to_string(),
            }),
        }
    }
}
