//! Chat endpoint integration tests
//!
//! Tests for POST /api/chat/gemini:
//! - SSE passthrough (default) and its response headers
//! - JSON mode with upstream status passthrough
//! - Error responses (missing credential, invalid body, upstream failures)
//! - Outbound request hygiene

use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{constants, RelayTestHarness};
use crate::mocks::GeminiTestData;

const ROUTE: &str = "/api/chat/gemini";

fn chat_body() -> Value {
    json!({
        "messages": [{"role": "user", "content": "Say hello"}],
        "stream": true
    })
}

// =============================================================================
// SSE Mode
// =============================================================================

#[tokio::test]
async fn test_sse_mode_passes_stream_through() {
    let harness = RelayTestHarness::new().await;
    harness.gemini.mock_stream(&["He", "llo"]).await;

    let response = harness.server.post(ROUTE).json(&chat_body()).await;

    response.assert_status_ok();
    assert_eq!(response.text(), GeminiTestData::sse_body(&["He", "llo"]));
}

#[tokio::test]
async fn test_sse_mode_response_headers() {
    let harness = RelayTestHarness::new().await;
    harness.gemini.mock_stream(&["x"]).await;

    let response = harness.server.post(ROUTE).json(&chat_body()).await;

    response.assert_status_ok();
    assert_eq!(
        response.header(header::CONTENT_TYPE),
        "text/event-stream; charset=utf-8"
    );
    assert_eq!(
        response.header(header::CACHE_CONTROL),
        "no-cache, no-transform"
    );
    assert_eq!(response.header("x-accel-buffering"), "no");
}

#[tokio::test]
async fn test_sse_mode_upstream_error_keeps_status() {
    let harness = RelayTestHarness::new().await;
    harness.gemini.mock_stream_error(429).await;

    let response = harness.server.post(ROUTE).json(&chat_body()).await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UPSTREAM_HTTP_ERROR");
}

#[tokio::test]
async fn test_stream_format_is_not_forwarded() {
    let harness = RelayTestHarness::new().await;
    harness.gemini.mock_stream(&["x"]).await;

    let mut body = chat_body();
    body["streamFormat"] = json!("sse");
    harness.server.post(ROUTE).json(&body).await.assert_status_ok();

    let upstream = harness.gemini.single_request_body().await;
    assert!(upstream.get("streamFormat").is_none());
    assert_eq!(
        upstream["contents"],
        json!([{"role": "user", "parts": [{"text": "Say hello"}]}])
    );
}

#[tokio::test]
async fn test_unknown_role_is_relayed_as_user_turn() {
    let harness = RelayTestHarness::new().await;
    harness.gemini.mock_stream(&["ok"]).await;

    let response = harness
        .server
        .post(ROUTE)
        .json(&json!({
            "messages": [
                {"role": "user", "content": "call the tool"},
                {"role": "tool", "content": "42"}
            ],
            "stream": true
        }))
        .await;

    response.assert_status_ok();
    let upstream = harness.gemini.single_request_body().await;
    assert_eq!(
        upstream["contents"],
        json!([
            {"role": "user", "parts": [{"text": "call the tool"}]},
            {"role": "user", "parts": [{"text": "42"}]}
        ])
    );
}

#[tokio::test]
async fn test_caller_headers_are_not_forwarded() {
    let harness = RelayTestHarness::new().await;
    harness.gemini.mock_stream(&["x"]).await;

    harness
        .server
        .post(ROUTE)
        .add_header(
            HeaderName::from_static("x-goog-api-key"),
            HeaderValue::from_static("caller-supplied-key"),
        )
        .add_header(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer caller-token"),
        )
        .json(&chat_body())
        .await
        .assert_status_ok();

    let requests = harness.gemini.requests().await;
    assert_eq!(requests.len(), 1);
    let headers = &requests[0].headers;
    assert_eq!(
        headers.get("x-goog-api-key").unwrap().to_str().unwrap(),
        constants::TEST_API_KEY
    );
    assert!(headers.get("authorization").is_none());
}

// =============================================================================
// JSON Mode
// =============================================================================

#[tokio::test]
async fn test_json_mode_returns_upstream_body() {
    let harness = RelayTestHarness::new().await;
    harness.gemini.mock_generate(&["hello"]).await;

    let response = harness
        .server
        .post(ROUTE)
        .json(&json!({
            "streamFormat": "json",
            "messages": [{"role": "user", "content": "hi"}]
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body, GeminiTestData::response(&["hello"]));
}

#[tokio::test]
async fn test_json_mode_passes_upstream_status() {
    let harness = RelayTestHarness::new().await;
    harness.gemini.mock_generate_error(400).await;

    let response = harness
        .server
        .post(ROUTE)
        .json(&json!({
            "streamFormat": "json",
            "messages": [{"role": "user", "content": "hi"}]
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body, GeminiTestData::error(400));
}

#[tokio::test]
async fn test_json_mode_non_json_upstream_is_bad_gateway() {
    let harness = RelayTestHarness::new().await;
    harness.gemini.mock_generate_not_json().await;

    let response = harness
        .server
        .post(ROUTE)
        .json(&json!({
            "streamFormat": "json",
            "messages": [{"role": "user", "content": "hi"}]
        }))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_UPSTREAM_RESPONSE");
}

// =============================================================================
// Request Errors
// =============================================================================

#[tokio::test]
async fn test_missing_credential_is_401_without_upstream_call() {
    let harness = RelayTestHarness::without_credential().await;
    harness.gemini.mock_stream(&["never"]).await;

    let response = harness.server.post(ROUTE).json(&chat_body()).await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "MISSING_CREDENTIAL");
    assert!(harness.gemini.requests().await.is_empty());
}

#[tokio::test]
async fn test_invalid_json_is_400() {
    let harness = RelayTestHarness::new().await;

    let response = harness.server.post(ROUTE).text("{not json").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(harness.gemini.requests().await.is_empty());
}

#[tokio::test]
async fn test_unknown_stream_format_is_400() {
    let harness = RelayTestHarness::new().await;

    let response = harness
        .server
        .post(ROUTE)
        .json(&json!({
            "streamFormat": "websocket",
            "messages": [{"role": "user", "content": "hi"}]
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_object_body_is_400() {
    let harness = RelayTestHarness::new().await;

    let response = harness.server.post(ROUTE).json(&json!(["hi"])).await;

    response.assert_status(StatusCode::BAD_REQUEST);
}
