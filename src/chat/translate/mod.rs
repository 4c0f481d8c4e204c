//! Translation layer between the relay's request shape and provider formats
//!
//! This module provides the `MessageTranslator` trait and its Gemini
//! implementation. Translators build the upstream request body and extract
//! text from the upstream's single-response bodies.

pub mod gemini;

use thiserror::Error;

use super::request::InboundRequest;

/// Errors that can occur during message translation
#[derive(Debug, Error)]
pub enum TranslationError {
    /// JSON serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Trait for translating between the relay's request shape and a provider's
///
/// Implementations must be pure: no I/O, no shared state.
pub trait MessageTranslator {
    /// Provider name for logging
    fn provider(&self) -> &'static str;

    /// Build the provider-native JSON body for `request`
    ///
    /// Provider-shaped requests are returned unchanged.
    fn translate_request(
        &self,
        request: &InboundRequest,
    ) -> Result<serde_json::Value, TranslationError>;

    /// Extract the response text from a complete (non-streamed) response
    ///
    /// Unexpected shapes yield an empty string.
    fn extract_text(&self, response: &serde_json::Value) -> String;
}

pub use gemini::{normalize, GeminiTranslator};
