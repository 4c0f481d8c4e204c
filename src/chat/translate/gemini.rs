//! Gemini translator implementation
//!
//! Maps the provider-agnostic chat request onto Gemini's `contents` /
//! `generationConfig` body. Gemini only knows `user` and `model` turns, so
//! `assistant` becomes `model` and every other role becomes `user`. Turn
//! ordering is not validated; the provider rejects what it does not accept.

use serde_json::Value;
use tracing::warn;

use super::{MessageTranslator, TranslationError};
use crate::chat::gemini::{
    GeminiContent, GeminiPart, GeminiRequest, GeminiRole, GenerateContentResponse,
    GenerationConfig,
};
use crate::chat::request::{ChatCompletionRequest, InboundRequest};
use crate::chat::types::{ChatMessage, Content, ContentPart, Role};

/// Separator between part texts of a single (non-streamed) response
pub const RESPONSE_PART_SEPARATOR: &str = "\n";

/// Gemini API translator
#[derive(Debug, Clone, Copy, Default)]
pub struct GeminiTranslator;

impl GeminiTranslator {
    /// Create a new Gemini translator
    pub fn new() -> Self {
        Self
    }
}

fn map_role(role: Role) -> GeminiRole {
    match role {
        Role::Assistant => GeminiRole::Model,
        Role::User | Role::System | Role::Other => GeminiRole::User,
    }
}

fn map_content(content: &Content) -> Vec<GeminiPart> {
    match content {
        Content::Parts(parts) => parts
            .iter()
            .map(|part| match part {
                ContentPart::ImageUrl { image_url } => GeminiPart::image(image_url.url.clone()),
                ContentPart::Text { text } => GeminiPart::text(text.clone()),
            })
            .collect(),
        scalar => vec![GeminiPart::text(scalar.as_text())],
    }
}

fn map_message(message: &ChatMessage) -> GeminiContent {
    GeminiContent {
        role: map_role(message.role),
        parts: map_content(&message.content),
    }
}

/// Convert a provider-agnostic request into a Gemini request body
pub fn normalize(request: &ChatCompletionRequest) -> GeminiRequest {
    GeminiRequest {
        contents: request.messages.iter().map(map_message).collect(),
        generation_config: GenerationConfig {
            temperature: request.temperature,
            max_output_tokens: request.max_tokens.clone(),
            top_p: request.top_p,
            top_k: request.top_k.clone(),
        },
    }
}

impl MessageTranslator for GeminiTranslator {
    fn provider(&self) -> &'static str {
        "gemini"
    }

    fn translate_request(&self, request: &InboundRequest) -> Result<Value, TranslationError> {
        match request {
            InboundRequest::Provider(body) => Ok(Value::Object(body.clone())),
            InboundRequest::Generic(request) => Ok(serde_json::to_value(normalize(request))?),
        }
    }

    fn extract_text(&self, response: &Value) -> String {
        match serde_json::from_value::<GenerateContentResponse>(response.clone()) {
            Ok(parsed) => {
                if !parsed.has_parts() {
                    warn!(
                        provider = self.provider(),
                        "Upstream response has no candidate parts, returning empty text"
                    );
                }
                parsed.joined_text(RESPONSE_PART_SEPARATOR)
            }
            Err(e) => {
                warn!(
                    provider = self.provider(),
                    error = %e,
                    "Unexpected upstream response shape, returning empty text"
                );
                String::new()
            }
        }
    }
}
