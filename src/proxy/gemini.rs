//! Gemini upstream client
//!
//! Issues the POST to `generateContent` or `streamGenerateContent` with the
//! server-held API key. Status codes are not interpreted here; callers use
//! [`GeminiClient::error_for_status`] when a non-2xx must become an error.

use bytes::Bytes;
use futures::Stream;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::pin::Pin;
use tracing::instrument;

use super::headers::build_default_headers;
use super::logging::RequestContext;
use crate::{config::GeminiConfig, error::RelayError};

/// Stream type for streaming responses from the upstream
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

/// Longest upstream error body kept for logs
const MAX_ERROR_BODY_LEN: usize = 2048;

/// Upstream endpoint selected per request mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Single JSON response
    Generate,
    /// Server-sent events
    StreamGenerate,
}

impl Endpoint {
    /// Name used in logs and metrics
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::Generate => "generateContent",
            Endpoint::StreamGenerate => "streamGenerateContent",
        }
    }
}

/// Gemini REST client
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(client: reqwest::Client, config: GeminiConfig) -> Self {
        Self { client, config }
    }

    /// Upstream settings this client was built with
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Check if the client is configured with an API key
    pub fn is_configured(&self) -> bool {
        self.config.has_credential()
    }

    /// Fail fast when no API key is configured
    pub fn ensure_configured(&self) -> Result<(), RelayError> {
        if self.is_configured() {
            Ok(())
        } else {
            Err(RelayError::MissingCredential)
        }
    }

    /// Full URL of an endpoint
    pub fn url(&self, endpoint: Endpoint) -> String {
        match endpoint {
            Endpoint::Generate => self.config.generate_url(),
            Endpoint::StreamGenerate => self.config.stream_url(),
        }
    }

    /// POST a JSON body to an endpoint; any status is returned as-is
    #[instrument(skip_all, fields(trace_id = %ctx.trace_id, endpoint = endpoint.name()))]
    pub async fn post(
        &self,
        endpoint: Endpoint,
        body: &Value,
        ctx: &RequestContext,
    ) -> Result<reqwest::Response, RelayError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(RelayError::MissingCredential)?;

        let headers = build_default_headers(api_key).map_err(|_| RelayError::MissingCredential)?;
        let url = self.url(endpoint);
        let payload = serde_json::to_vec(body).map_err(crate::chat::TranslationError::from)?;

        ctx.log_upstream_request(&url, Some(payload.len()));

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .body(payload)
            .send()
            .await
            .map_err(|e| {
                ctx.log_connection_error(&e.to_string(), &url);
                RelayError::from(e)
            })?;

        ctx.log_upstream_response(
            response.status().as_u16(),
            response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
        );

        Ok(response)
    }

    /// Turn a non-2xx response into [`RelayError::UpstreamHttp`]
    pub async fn error_for_status(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, RelayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let mut body = response.text().await.unwrap_or_default();
        if body.len() > MAX_ERROR_BODY_LEN {
            let mut cut = MAX_ERROR_BODY_LEN;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }

        Err(RelayError::UpstreamHttp { status, body })
    }

    /// Read a whole response body as JSON; an unparseable body becomes `Null`
    pub async fn read_json(
        response: reqwest::Response,
        ctx: &RequestContext,
    ) -> Result<Value, RelayError> {
        let bytes = response.bytes().await?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(value),
            Err(e) => {
                ctx.log_warning(&format!("Upstream body is not valid JSON: {}", e));
                Ok(Value::Null)
            }
        }
    }

    /// Body of a successful streaming response as a byte stream
    pub fn into_byte_stream(response: reqwest::Response) -> ByteStream {
        Box::pin(response.bytes_stream())
    }
}
