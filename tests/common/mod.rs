//! Common test utilities for the chat relay
//!
//! Shared fixtures used by the integration tests: configuration pointing at
//! a [`MockGemini`] server and a ready-to-use `axum-test` server.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use chat_relay::{routes, AppState, ChatRelay, Config, GeminiConfig};

use crate::mocks::MockGemini;

/// Test configuration constants
pub mod constants {
    /// API key the relay is configured with
    pub const TEST_API_KEY: &str = "test-gemini-api-key";
    /// Model name used in upstream URLs
    pub const TEST_MODEL: &str = "gemini-test";
}

/// Gemini settings pointing at `mock`, with or without a credential
pub fn gemini_config(mock: &MockGemini, with_key: bool) -> GeminiConfig {
    let key = with_key.then(|| constants::TEST_API_KEY.to_string());
    GeminiConfig::new(mock.base_url(), key).with_model(constants::TEST_MODEL)
}

/// Relay talking to `mock`
pub fn relay_for(mock: &MockGemini) -> ChatRelay {
    ChatRelay::new(reqwest::Client::new(), gemini_config(mock, true))
}

/// Full application config pointing at `mock`
pub fn app_config(mock: &MockGemini, with_key: bool) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        gemini: gemini_config(mock, with_key),
        upstream_timeout_seconds: 30,
        log_json: false,
    }
}

/// Test harness: mock upstream plus the relay router under `axum-test`
pub struct RelayTestHarness {
    pub server: TestServer,
    pub gemini: MockGemini,
}

impl RelayTestHarness {
    /// Harness with an API key configured
    pub async fn new() -> Self {
        Self::build(true).await
    }

    /// Harness whose relay has no API key
    pub async fn without_credential() -> Self {
        Self::build(false).await
    }

    async fn build(with_key: bool) -> Self {
        let gemini = MockGemini::start().await;
        let state = Arc::new(
            AppState::new(app_config(&gemini, with_key)).expect("Failed to build app state"),
        );
        let app = routes::create_router(state);
        let server = TestServer::new(app).expect("Failed to create test server");

        Self { server, gemini }
    }
}
