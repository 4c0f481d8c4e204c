//! Chat request types and provider translation
//!
//! This module defines the provider-agnostic request shape accepted by the
//! relay, the Gemini wire types, and the translator between them.

pub mod gemini;
pub mod request;
pub mod translate;
pub mod types;

// Re-export key types for convenience
pub use gemini::{GeminiRequest, GenerateContentResponse, StreamFrame};
pub use request::{ChatCompletionRequest, InboundRequest, RelayEnvelope, StreamFormat};
pub use translate::{GeminiTranslator, MessageTranslator, TranslationError};
pub use types::{ChatMessage, Content, ContentPart, ImageUrl, Role};
