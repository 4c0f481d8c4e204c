//! Health and metrics endpoint integration tests
//!
//! - GET /health - Health with upstream configuration status
//! - GET /health/live - Liveness probe
//! - GET /metrics - Prometheus exposition

use serde_json::Value;

use crate::common::{constants, RelayTestHarness};

#[tokio::test]
async fn test_health_reports_healthy_with_credential() {
    let harness = RelayTestHarness::new().await;

    let response = harness.server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["timestamp"].is_string());
    assert_eq!(body["upstream"]["provider"], "gemini");
    assert_eq!(body["upstream"]["model"], constants::TEST_MODEL);
    assert_eq!(body["upstream"]["credential_configured"], true);
}

#[tokio::test]
async fn test_health_reports_degraded_without_credential() {
    let harness = RelayTestHarness::without_credential().await;

    let response = harness.server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["upstream"]["credential_configured"], false);
}

#[tokio::test]
async fn test_liveness() {
    let harness = RelayTestHarness::without_credential().await;

    let response = harness.server.get("/health/live").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_metrics_endpoint_renders() {
    let harness = RelayTestHarness::new().await;

    harness.server.get("/metrics").await.assert_status_ok();
}
