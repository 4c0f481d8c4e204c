//! Mock Gemini API for testing
//!
//! Provides wiremock-based mocks for the two Gemini endpoints the relay uses:
//! - POST /v1beta/models/{model}:generateContent - Single response
//! - POST /v1beta/models/{model}:streamGenerateContent?alt=sse - SSE stream
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::mocks::gemini::{GeminiTestData, MockGemini};
//!
//! #[tokio::test]
//! async fn test_with_gemini_mock() {
//!     let gemini = MockGemini::start().await;
//!     gemini.mock_stream(&["He", "llo"]).await;
//!
//!     // Use gemini.base_url() as GEMINI_API_URL
//! }
//! ```

use std::time::Duration;

use serde_json::{json, Value};
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockServer, Request, ResponseTemplate,
};

use crate::common::constants;

/// Mock Gemini server wrapper
pub struct MockGemini {
    server: MockServer,
}

impl MockGemini {
    /// Start a new mock Gemini server
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Base URL to configure as `GEMINI_API_URL`
    pub fn base_url(&self) -> String {
        format!("{}/v1beta", self.server.uri())
    }

    fn generate_path() -> String {
        format!("/v1beta/models/{}:generateContent", constants::TEST_MODEL)
    }

    fn stream_path() -> String {
        format!(
            "/v1beta/models/{}:streamGenerateContent",
            constants::TEST_MODEL
        )
    }

    // =========================================================================
    // generateContent
    // =========================================================================

    /// Mock a successful single response whose candidate has the given parts
    pub async fn mock_generate(&self, parts: &[&str]) {
        self.mock_generate_json(GeminiTestData::response(parts)).await;
    }

    /// Mock a successful single response with an arbitrary JSON body
    pub async fn mock_generate_json(&self, body: Value) {
        Mock::given(method("POST"))
            .and(path(Self::generate_path()))
            .and(header("x-goog-api-key", constants::TEST_API_KEY))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mock an upstream error on generateContent
    pub async fn mock_generate_error(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path(Self::generate_path()))
            .respond_with(ResponseTemplate::new(status).set_body_json(GeminiTestData::error(status)))
            .mount(&self.server)
            .await;
    }

    /// Mock a 200 on generateContent with a body that is not JSON
    pub async fn mock_generate_not_json(&self) {
        Mock::given(method("POST"))
            .and(path(Self::generate_path()))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<html>oops</html>", "text/html"))
            .mount(&self.server)
            .await;
    }

    // =========================================================================
    // streamGenerateContent
    // =========================================================================

    /// Mock a successful SSE stream with one frame per delta plus `[DONE]`
    pub async fn mock_stream(&self, deltas: &[&str]) {
        self.mock_stream_raw(GeminiTestData::sse_body(deltas)).await;
    }

    /// Mock a successful SSE stream with a raw body
    pub async fn mock_stream_raw(&self, body: String) {
        self.mock_stream_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .await;
    }

    /// Mock a stream endpoint that only starts answering after `delay`
    pub async fn mock_stream_delayed(&self, deltas: &[&str], delay: Duration) {
        self.mock_stream_with(
            ResponseTemplate::new(200)
                .set_body_raw(GeminiTestData::sse_body(deltas), "text/event-stream")
                .set_delay(delay),
        )
        .await;
    }

    /// Mock a stream endpoint that answers with a single JSON body
    pub async fn mock_stream_as_json(&self, parts: &[&str]) {
        self.mock_stream_with(ResponseTemplate::new(200).set_body_json(GeminiTestData::response(parts)))
            .await;
    }

    /// Mock an upstream error on streamGenerateContent
    pub async fn mock_stream_error(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path(Self::stream_path()))
            .respond_with(ResponseTemplate::new(status).set_body_json(GeminiTestData::error(status)))
            .mount(&self.server)
            .await;
    }

    async fn mock_stream_with(&self, template: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path(Self::stream_path()))
            .and(query_param("alt", "sse"))
            .and(header("x-goog-api-key", constants::TEST_API_KEY))
            .respond_with(template)
            .mount(&self.server)
            .await;
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// All requests received so far
    pub async fn requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// JSON body of the only request received
    pub async fn single_request_body(&self) -> Value {
        let requests = self.requests().await;
        assert_eq!(requests.len(), 1, "expected exactly one upstream request");
        serde_json::from_slice(&requests[0].body).expect("upstream body should be JSON")
    }
}

/// Builders for Gemini payloads
pub struct GeminiTestData;

impl GeminiTestData {
    /// `generateContent` body with one candidate holding `parts`
    pub fn response(parts: &[&str]) -> Value {
        let parts: Vec<Value> = parts.iter().map(|t| json!({ "text": t })).collect();
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": parts },
                "finishReason": "STOP"
            }]
        })
    }

    /// One SSE frame carrying `text`
    pub fn sse_frame(text: &str) -> String {
        format!("data: {}\n\n", Self::response(&[text]))
    }

    /// A full SSE body: one frame per delta, then `[DONE]`
    pub fn sse_body(deltas: &[&str]) -> String {
        let mut body: String = deltas.iter().map(|d| Self::sse_frame(d)).collect();
        body.push_str("data: [DONE]\n\n");
        body
    }

    /// Google-style error body
    pub fn error(status: u16) -> Value {
        json!({
            "error": {
                "code": status,
                "message": "mock upstream failure",
                "status": "MOCK_ERROR"
            }
        })
    }
}
