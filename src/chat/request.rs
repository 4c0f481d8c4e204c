//! Request types accepted by the relay
//!
//! An inbound body is either a provider-agnostic [`ChatCompletionRequest`] or
//! an already provider-shaped body. The two are told apart once, when the
//! body is parsed, and carried as [`InboundRequest`] from then on.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

use super::types::ChatMessage;

/// Key whose presence marks a body as already provider-shaped
const PROVIDER_CONTENTS_KEY: &str = "contents";

/// Key carrying the HTTP response format selector
const STREAM_FORMAT_KEY: &str = "streamFormat";

/// Chat completion request in the provider-agnostic shape
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ChatCompletionRequest {
    /// Messages in the conversation, in order
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Maximum tokens to generate, forwarded as given (`1024.0` stays a float)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<Number>,
    /// Nucleus sampling parameter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Top-k sampling parameter, forwarded as given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<Number>,
    /// Whether to stream the response
    #[serde(default)]
    pub stream: bool,
}

impl ChatCompletionRequest {
    /// Create a request from messages with no sampling parameters
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    /// Set the stream flag
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }
}

/// A request as received by the relay
#[derive(Debug, Clone, PartialEq)]
pub enum InboundRequest {
    /// Body already in the provider's native shape; forwarded unchanged
    Provider(Map<String, Value>),
    /// Provider-agnostic request that must be normalized
    Generic(ChatCompletionRequest),
}

impl InboundRequest {
    /// Resolve a JSON object into one of the two request variants
    pub fn from_map(map: Map<String, Value>) -> Result<Self, serde_json::Error> {
        let provider_shaped = map
            .get(PROVIDER_CONTENTS_KEY)
            .is_some_and(|contents| !contents.is_null());

        if provider_shaped {
            Ok(InboundRequest::Provider(map))
        } else {
            serde_json::from_value(Value::Object(map)).map(InboundRequest::Generic)
        }
    }

    /// Resolve any JSON value; non-objects are rejected
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        match value {
            Value::Object(map) => Self::from_map(map),
            other => Err(serde::de::Error::custom(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Whether the caller asked for a streamed response
    ///
    /// Provider-shaped bodies carry no stream flag and are never streamed by
    /// [`crate::relay::ChatRelay::send`].
    pub fn wants_stream(&self) -> bool {
        match self {
            InboundRequest::Provider(_) => false,
            InboundRequest::Generic(request) => request.stream,
        }
    }

    /// Number of conversation entries, for logging
    pub fn message_count(&self) -> usize {
        match self {
            InboundRequest::Provider(map) => map
                .get(PROVIDER_CONTENTS_KEY)
                .and_then(Value::as_array)
                .map_or(0, Vec::len),
            InboundRequest::Generic(request) => request.messages.len(),
        }
    }

    /// Short label of the variant, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            InboundRequest::Provider(_) => "provider",
            InboundRequest::Generic(_) => "generic",
        }
    }
}

impl From<ChatCompletionRequest> for InboundRequest {
    fn from(request: ChatCompletionRequest) -> Self {
        InboundRequest::Generic(request)
    }
}

impl<'de> Deserialize<'de> for InboundRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        InboundRequest::from_value(value).map_err(serde::de::Error::custom)
    }
}

/// Response format requested from the HTTP endpoint
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StreamFormat {
    /// Server-sent events, relayed verbatim
    #[default]
    Sse,
    /// Single JSON body with the upstream status code
    Json,
}

impl std::fmt::Display for StreamFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamFormat::Sse => write!(f, "sse"),
            StreamFormat::Json => write!(f, "json"),
        }
    }
}

/// Body of `POST /api/chat/gemini`
///
/// `streamFormat` is removed before the rest of the body is resolved, so it
/// never reaches the upstream provider.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayEnvelope {
    /// Requested response format
    pub stream_format: StreamFormat,
    /// The chat request itself
    pub request: InboundRequest,
}

impl RelayEnvelope {
    /// Split a raw JSON body into format selector and request
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let mut map = match value {
            Value::Object(map) => map,
            other => {
                return Err(serde::de::Error::custom(format!(
                    "expected a JSON object, got {}",
                    json_kind(&other)
                )))
            }
        };

        let stream_format = match map.remove(STREAM_FORMAT_KEY) {
            None | Some(Value::Null) => StreamFormat::default(),
            Some(format) => serde_json::from_value(format)?,
        };

        Ok(Self {
            stream_format,
            request: InboundRequest::from_map(map)?,
        })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
