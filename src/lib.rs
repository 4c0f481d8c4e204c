//! Chat Relay - Gemini chat request normalizer and stream relay
//!
//! This library converts provider-agnostic chat requests into Gemini's
//! native body, forwards them upstream and relays the answer either as a
//! single text or as incremental deltas with cooperative cancellation.

pub mod chat;
pub mod config;
pub mod error;
pub mod proxy;
pub mod relay;
pub mod routes;
pub mod streaming;

use std::time::{Duration, Instant};

use anyhow::Result;

pub use crate::chat::{ChatCompletionRequest, ChatMessage, InboundRequest};
pub use crate::config::{Config, GeminiConfig};
pub use crate::error::{AppError, RelayError};
pub use crate::relay::ChatRelay;

/// Build the pooled upstream HTTP client
pub fn build_http_client(timeout_seconds: u64) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .pool_max_idle_per_host(100)
        .timeout(Duration::from_secs(timeout_seconds))
        .build()?)
}

/// Application state shared across all request handlers
pub struct AppState {
    pub config: Config,
    pub http_client: reqwest::Client,
    pub start_time: Instant,
    /// Relay to the Gemini API, sharing `http_client`
    pub relay: ChatRelay,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config) -> Result<Self> {
        // Initialize HTTP client with connection pooling
        let http_client = build_http_client(config.upstream_timeout_seconds)?;
        let relay = ChatRelay::new(http_client.clone(), config.gemini.clone());

        Ok(Self {
            config,
            http_client,
            start_time: Instant::now(),
            relay,
        })
    }
}
