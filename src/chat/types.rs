//! Core message types for chat requests
//!
//! Defines roles, message content and content parts in the provider-agnostic
//! shape callers send to the relay.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a message participant
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System message providing instructions or context
    System,
    /// User message from the human
    User,
    /// Assistant message from the AI
    Assistant,
    /// Any other role (`tool`, `developer`, ...); sent upstream as a user turn
    #[serde(other)]
    Other,
}

/// Image URL reference for multimodal content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ImageUrl {
    /// URL of the image (data URL or HTTP URL)
    #[serde(default)]
    pub url: String,
}

/// A part of multimodal content
///
/// Any part whose `type` is not `image_url` is read as text; a missing `text`
/// field yields an empty string. A bare string element is its own text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case", from = "RawContentPart")]
pub enum ContentPart {
    /// Text content
    Text {
        /// The text content
        text: String,
    },
    /// Image URL reference
    ImageUrl {
        /// The image URL details
        image_url: ImageUrl,
    },
}

/// Loose wire form of a content part, folded into [`ContentPart`]
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawContentPart {
    Object {
        #[serde(rename = "type", default)]
        kind: String,
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        image_url: Option<ImageUrl>,
    },
    Bare(Value),
}

impl From<RawContentPart> for ContentPart {
    fn from(raw: RawContentPart) -> Self {
        match raw {
            RawContentPart::Object {
                kind, image_url, ..
            } if kind == "image_url" => ContentPart::ImageUrl {
                image_url: image_url.unwrap_or_default(),
            },
            RawContentPart::Object { text, .. } => ContentPart::Text {
                text: text.unwrap_or_default(),
            },
            RawContentPart::Bare(Value::String(text)) => ContentPart::Text { text },
            // No `text` field to read
            RawContentPart::Bare(_) => ContentPart::Text {
                text: String::new(),
            },
        }
    }
}

/// Message content - plain text, multimodal parts, or any other JSON scalar
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Content {
    /// Simple text content
    Text(String),
    /// Multimodal content with text and/or images
    Parts(Vec<ContentPart>),
    /// Numbers, booleans, null and objects are stringified when sent upstream
    Scalar(Value),
}

impl Default for Content {
    fn default() -> Self {
        Content::Scalar(Value::Null)
    }
}

impl Content {
    /// Render non-part content as a single text value
    ///
    /// For `Parts`, concatenates the text parts and ignores images.
    pub fn as_text(&self) -> String {
        match self {
            Content::Text(text) => text.clone(),
            Content::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::ImageUrl { .. } => None,
                })
                .collect::<Vec<_>>()
                .join(""),
            Content::Scalar(Value::Null) => String::new(),
            Content::Scalar(Value::String(s)) => s.clone(),
            Content::Scalar(other) => other.to_string(),
        }
    }
}

/// A chat message with role and content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// The role of the message author
    pub role: Role,
    /// The content of the message
    #[serde(default)]
    pub content: Content,
}

impl ChatMessage {
    /// Plain-text message
    pub fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Content::Text(content.into()),
        }
    }
}
