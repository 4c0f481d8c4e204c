//! Gemini wire types
//!
//! Request bodies for `generateContent` / `streamGenerateContent` and a
//! lenient view over their responses. Every response level is optional so
//! that frames without text deserialize cleanly and yield nothing.

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// MIME type sent for every image part
pub const IMAGE_MIME_TYPE: &str = "image/*";

/// Role of a Gemini conversation turn
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GeminiRole {
    User,
    Model,
}

/// Inline file reference
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    pub mime_type: String,
    pub data: String,
}

/// One part of a Gemini turn
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum GeminiPart {
    Text {
        text: String,
    },
    FileData {
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
}

impl GeminiPart {
    pub fn text(text: impl Into<String>) -> Self {
        GeminiPart::Text { text: text.into() }
    }

    pub fn image(url: impl Into<String>) -> Self {
        GeminiPart::FileData {
            file_data: FileData {
                mime_type: IMAGE_MIME_TYPE.to_string(),
                data: url.into(),
            },
        }
    }
}

/// One conversation turn
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeminiContent {
    pub role: GeminiRole,
    pub parts: Vec<GeminiPart>,
}

/// Sampling parameters; unset fields are omitted from the body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<Number>,
}

/// Body of a `generateContent` call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    pub generation_config: GenerationConfig,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

/// A `generateContent` response, also the payload of every SSE frame
#[derive(Debug, Clone, Deserialize, Default)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// Payload of one `data:` line in a streamed response
pub type StreamFrame = GenerateContentResponse;

impl GenerateContentResponse {
    /// Texts of `candidates[0].content.parts[*]`, in order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| content.parts.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|part| part.text.as_deref())
    }

    /// Whether the first candidate carries any part at all
    pub fn has_parts(&self) -> bool {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .is_some_and(|content| !content.parts.is_empty())
    }

    /// Texts joined with `separator`; empty texts still take a slot
    pub fn joined_text(&self, separator: &str) -> String {
        self.texts().collect::<Vec<_>>().join(separator)
    }

    /// Per-frame delta: all part texts concatenated
    pub fn delta(&self) -> String {
        self.texts().collect()
    }
}
