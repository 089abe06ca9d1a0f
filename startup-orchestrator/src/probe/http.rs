use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::Value;

use super::{ReadinessProbe, ReadinessResult};
use crate::error::{ProbeError, Result};
use crate::report::Reporter;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Polls `GET http://<address>/health` and reads the boolean `synced` field.
pub struct HealthProbe {
    url: String,
    client: Client,
    reporter: Reporter,
}

impl HealthProbe {
    /// `address` is `host:port`. Requests go straight to it; proxy settings from the
    /// environment are ignored.
    pub fn new(address: &str, reporter: Reporter) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .no_proxy()
            .build()?;
        Ok(Self {
            url: format!("http://{}/health", address),
            client,
            reporter,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn request(&self) -> std::result::Result<bool, ProbeError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| ProbeError::TransportUnreachable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| ProbeError::TransportUnreachable(e.to_string()))?;

        if status != StatusCode::OK {
            return Err(ProbeError::MalformedResponse {
                reason: format!("health response is {}", status),
                raw: body,
            });
        }
        parse_synced(&body)
    }
}

/// Extracts `synced` from a health body.
pub fn parse_synced(body: &str) -> std::result::Result<bool, ProbeError> {
    let health: Value =
        serde_json::from_str(body).map_err(|e| ProbeError::MalformedResponse {
            reason: format!("not a JSON document: {}", e),
            raw: body.to_string(),
        })?;

    match health.get("synced") {
        Some(Value::Bool(synced)) => Ok(*synced),
        Some(_) => Err(ProbeError::MalformedResponse {
            reason: "'synced' is not a boolean".to_string(),
            raw: body.to_string(),
        }),
        None => Err(ProbeError::MalformedResponse {
            reason: "missing 'synced' field".to_string(),
            raw: body.to_string(),
        }),
    }
}

impl ReadinessProbe for HealthProbe {
    fn name(&self) -> &str {
        "health"
    }

    fn check(&self) -> ReadinessResult {
        match self.request() {
            Ok(true) => ReadinessResult::Ready,
            Ok(false) => ReadinessResult::NotReady,
            Err(cause) => {
                self.reporter.recoverable(
                    &format!("Exception while requesting {}", self.url),
                    &cause,
                );
                ReadinessResult::Unknown(cause)
            }
        }
    }
}
