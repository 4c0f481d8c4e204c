//! Configuration management for the chat relay
//!
//! Configuration is loaded from environment variables. The upstream settings
//! are grouped into [`GeminiConfig`] so the relay can be constructed with an
//! explicit value (and pointed at a mock server in tests).

use anyhow::{Context, Result};
use std::env;

/// Default Gemini REST endpoint
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model used for both generate and stream endpoints
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Upstream provider settings handed to [`crate::relay::ChatRelay`]
#[derive(Clone)]
pub struct GeminiConfig {
    /// Base URL, without trailing slash (e.g. `.../v1beta`)
    pub api_url: String,
    /// Server-held API key. Never taken from the caller.
    pub api_key: Option<String>,
    /// Model name used to build the generate/stream URLs
    pub model: String,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiConfig {
    /// Create a config for the given base URL and key with the default model
    pub fn new(api_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: DEFAULT_GEMINI_MODEL.to_string(),
        }
    }

    /// Override the model name
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// URL of the single-response endpoint
    pub fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_url, self.model)
    }

    /// URL of the SSE streaming endpoint
    pub fn stream_url(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.api_url, self.model
        )
    }

    /// Whether an API key is present and non-empty
    pub fn has_credential(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    /// Upstream Gemini settings
    pub gemini: GeminiConfig,

    /// Overall timeout for a single upstream request, streams included
    pub upstream_timeout_seconds: u64,

    /// Emit logs as JSON lines instead of the human-readable format
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("GEMINI_API_URL").unwrap_or_else(|| DEFAULT_GEMINI_API_URL.to_string());
        let api_key = lookup("GEMINI_API_KEY").filter(|k| !k.trim().is_empty());
        let model = lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());

        Ok(Self {
            host: lookup("RELAY_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("RELAY_PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .context("Invalid RELAY_PORT")?,

            gemini: GeminiConfig::new(api_url, api_key).with_model(model),

            upstream_timeout_seconds: lookup("RELAY_UPSTREAM_TIMEOUT_SECONDS")
                .unwrap_or_else(|| "300".to_string())
                .parse()
                .context("Invalid RELAY_UPSTREAM_TIMEOUT_SECONDS")?,

            log_json: lookup("RELAY_LOG_JSON")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        })
    }
}
