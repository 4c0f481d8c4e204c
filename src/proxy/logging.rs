//! Request logging utilities for upstream relaying
//!
//! Provides structured logging with correlation IDs for tracing a chat
//! request from the inbound handler through the upstream call and stream.

use std::time::Instant;
use tracing::{debug, error, info, warn, Span};
use uuid::Uuid;

/// Context for tracking a request through the system
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique identifier for this request (for log correlation)
    pub trace_id: String,
    /// When the request started
    pub start_time: Instant,
    /// Upstream provider handling this request
    pub provider: String,
    /// Upstream endpoint being called
    pub endpoint: String,
    /// Model being used
    pub model: Option<String>,
    /// Whether this is a streaming request
    pub streaming: bool,
}

impl RequestContext {
    /// Create a new request context
    pub fn new(provider: &str, endpoint: &str) -> Self {
        Self {
            trace_id: Uuid::new_v4().to_string()[..8].to_string(), // Short ID for readability
            start_time: Instant::now(),
            provider: provider.to_string(),
            endpoint: endpoint.to_string(),
            model: None,
            streaming: false,
        }
    }

    /// Set the model for this request
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Mark this as a streaming request
    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    /// Get elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u128 {
        self.start_time.elapsed().as_millis()
    }

    /// Log request initiation
    pub fn log_request_start(&self, request_kind: &str, messages: usize) {
        info!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            endpoint = %self.endpoint,
            model = ?self.model,
            streaming = %self.streaming,
            request_kind = %request_kind,
            messages = %messages,
            "Request started"
        );
    }

    /// Log request being sent to upstream
    pub fn log_upstream_request(&self, url: &str, body_size: Option<usize>) {
        debug!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            url = %url,
            body_size = ?body_size,
            elapsed_ms = %self.elapsed_ms(),
            "Sending request to upstream"
        );
    }

    /// Log response received from upstream
    pub fn log_upstream_response(&self, status: u16, content_type: Option<&str>) {
        info!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            endpoint = %self.endpoint,
            status = %status,
            content_type = ?content_type,
            elapsed_ms = %self.elapsed_ms(),
            "Response received from upstream"
        );
    }

    /// Log successful completion of a non-streamed request
    pub fn log_request_complete(&self, text_len: usize) {
        info!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            endpoint = %self.endpoint,
            model = ?self.model,
            text_len = %text_len,
            elapsed_ms = %self.elapsed_ms(),
            "Request completed successfully"
        );
    }

    /// Log stream started
    pub fn log_stream_started(&self) {
        info!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            endpoint = %self.endpoint,
            elapsed_ms = %self.elapsed_ms(),
            "Streaming response started"
        );
    }

    /// Log stream ended
    pub fn log_stream_ended(&self, deltas: usize, text_len: usize, skipped_frames: usize) {
        info!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            endpoint = %self.endpoint,
            deltas = %deltas,
            text_len = %text_len,
            skipped_frames = %skipped_frames,
            elapsed_ms = %self.elapsed_ms(),
            "Streaming response ended"
        );
    }

    /// Log a warning condition
    pub fn log_warning(&self, message: &str) {
        warn!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            endpoint = %self.endpoint,
            elapsed_ms = %self.elapsed_ms(),
            message = %message,
            "Warning during request"
        );
    }

    /// Log caller cancellation
    pub fn log_aborted(&self, deltas_delivered: usize) {
        info!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            endpoint = %self.endpoint,
            deltas_delivered = %deltas_delivered,
            elapsed_ms = %self.elapsed_ms(),
            "Request aborted by caller"
        );
    }

    /// Log request failure
    pub fn log_error(&self, error: &str) {
        error!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            endpoint = %self.endpoint,
            model = ?self.model,
            streaming = %self.streaming,
            elapsed_ms = %self.elapsed_ms(),
            error = %error,
            "Request failed"
        );
    }

    /// Log connection error (specific for debugging connectivity issues)
    pub fn log_connection_error(&self, error: &str, url: &str) {
        error!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            url = %url,
            elapsed_ms = %self.elapsed_ms(),
            error = %error,
            "Connection to upstream failed"
        );
    }

    /// Create a tracing span for this request
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "relay_request",
            trace_id = %self.trace_id,
            provider = %self.provider,
            endpoint = %self.endpoint,
            model = ?self.model,
            streaming = %self.streaming,
        )
    }
}
