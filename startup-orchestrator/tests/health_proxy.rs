mod common;

use axum::http::StatusCode;
use common::{HealthServer, SYNCED};
use startup_orchestrator::probe::{HealthProbe, ReadinessProbe, ReadinessResult};
use startup_orchestrator::report::Reporter;

// Own test binary: the proxy variables are process-wide.
#[test]
fn test_proxy_environment_is_bypassed() {
    let server = HealthServer::start(vec![(StatusCode::OK, SYNCED)]);
    for var in ["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"] {
        std::env::set_var(var, "http://127.0.0.1:9");
    }
    std::env::remove_var("NO_PROXY");
    std::env::remove_var("no_proxy");

    let probe = HealthProbe::new(&server.address(), Reporter::quiet()).unwrap();

    assert_eq!(probe.check(), ReadinessResult::Ready);
    assert_eq!(server.hits(), 1);
}
