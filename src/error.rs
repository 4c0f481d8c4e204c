//! Error types for the chat relay
//!
//! `RelayError` is what the relay itself returns; `AppError` wraps it for the
//! HTTP layer and renders every failure as `{ success: false, error, code }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chat::TranslationError;

/// Failures of a single relay call
#[derive(Debug, Error)]
pub enum RelayError {
    /// No API key configured; raised before any network call
    #[error("Gemini API key is not configured")]
    MissingCredential,

    /// Upstream answered with a non-2xx status
    #[error("Upstream returned HTTP {status}")]
    UpstreamHttp {
        status: StatusCode,
        /// Upstream body, kept for logs only
        body: String,
    },

    /// Transport failure, before or during the response body
    #[error("Network error: {0}")]
    Network(String),

    /// Caller cancelled the request
    #[error("Request aborted")]
    Aborted,

    /// The request body could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] TranslationError),
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        RelayError::Network(err.to_string())
    }
}

impl RelayError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            RelayError::MissingCredential => "MISSING_CREDENTIAL",
            RelayError::UpstreamHttp { .. } => "UPSTREAM_HTTP_ERROR",
            RelayError::Network(_) => "NETWORK_ERROR",
            RelayError::Aborted => "ABORTED",
            RelayError::InvalidRequest(_) => "INVALID_REQUEST",
        }
    }

    /// HTTP status reported to callers of the HTTP surface
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::MissingCredential => StatusCode::UNAUTHORIZED,
            RelayError::UpstreamHttp { status, .. } => {
                if status.is_client_error() || status.is_server_error() {
                    *status
                } else {
                    StatusCode::BAD_GATEWAY
                }
            }
            RelayError::Network(_) => StatusCode::BAD_GATEWAY,
            // 499 Client Closed Request, as used by nginx
            RelayError::Aborted => {
                StatusCode::from_u16(499).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            RelayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Short message safe to show to callers
    pub fn public_message(&self) -> String {
        match self {
            RelayError::Network(_) => "Upstream service unreachable".to_string(),
            other => other.to_string(),
        }
    }
}

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Relay(#[from] RelayError),

    /// Upstream answered 2xx with a body that is not JSON
    #[error("Invalid upstream response: {0}")]
    BadGateway(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            code: code.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Relay(err) => (err.status_code(), err.code(), err.public_message()),
            AppError::BadGateway(_) => (
                StatusCode::BAD_GATEWAY,
                "INVALID_UPSTREAM_RESPONSE",
                "Upstream returned an invalid response".to_string(),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error".to_string(),
            ),
        };

        (status, Json(ErrorResponse::new(message, code))).into_response()
    }
}
