//! Health check endpoints
//!
//! - `/health` - Health with upstream configuration status
//! - `/health/live` - Liveness probe

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::AppState;

/// Health status enum
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Upstream configuration as seen by the relay
#[derive(Debug, Serialize)]
pub struct UpstreamCheck {
    pub provider: &'static str,
    pub model: String,
    pub credential_configured: bool,
}

/// Full health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub timestamp: String,
    pub upstream: UpstreamCheck,
}

/// Simple health response for liveness
#[derive(Debug, Serialize)]
pub struct SimpleHealthResponse {
    pub status: HealthStatus,
}

/// Full health check endpoint
///
/// Reports `degraded` while no API key is configured: the relay is up but
/// every chat request will be refused.
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let gemini = state.relay.client().config();
    let credential_configured = gemini.has_credential();

    let response = HealthResponse {
        status: if credential_configured {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        upstream: UpstreamCheck {
            provider: "gemini",
            model: gemini.model.clone(),
            credential_configured,
        },
    };

    (StatusCode::OK, Json(response))
}

/// Liveness probe endpoint
pub async fn liveness_check() -> (StatusCode, Json<SimpleHealthResponse>) {
    (
        StatusCode::OK,
        Json(SimpleHealthResponse {
            status: HealthStatus::Healthy,
        }),
    )
}
