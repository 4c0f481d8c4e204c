//! Prometheus metrics endpoint
//!
//! Exposes relay metrics in Prometheus format for monitoring.

use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;

/// Global Prometheus handle for metrics export
static PROMETHEUS_HANDLE: Lazy<PrometheusHandle> = Lazy::new(|| {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
});

/// Initialize metrics (call once at startup)
pub fn init_metrics() {
    // Force initialization of the lazy static
    let _ = &*PROMETHEUS_HANDLE;

    register_metrics();
}

/// Register all custom metrics
fn register_metrics() {
    metrics::describe_counter!(
        "relay_requests_total",
        "Total number of chat relay requests processed"
    );
    metrics::describe_counter!(
        "relay_stream_deltas_total",
        "Total text deltas observed in relayed streams"
    );
    metrics::describe_histogram!(
        "relay_request_duration_seconds",
        "Time until the upstream response started, in seconds"
    );
}

/// Prometheus metrics endpoint handler
pub async fn prometheus_metrics() -> impl IntoResponse {
    PROMETHEUS_HANDLE.render()
}

/// Record a relay request
pub fn record_request(mode: &str, outcome: &str, duration_secs: f64) {
    metrics::counter!(
        "relay_requests_total",
        "mode" => mode.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
    metrics::histogram!("relay_request_duration_seconds", "mode" => mode.to_string())
        .record(duration_secs);
}

/// Record deltas seen in one relayed stream
pub fn record_stream_deltas(count: u64) {
    metrics::counter!("relay_stream_deltas_total").increment(count);
}
