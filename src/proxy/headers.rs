//! Header utilities for upstream requests
//!
//! Outbound requests carry only the server-held API key and a JSON content
//! type. Caller headers are never forwarded.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue, CONTENT_TYPE};

/// Header carrying the Gemini API key
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Build the headers for every upstream request
pub fn build_default_headers(api_key: &str) -> Result<HeaderMap, InvalidHeaderValue> {
    let mut headers = HeaderMap::new();

    let mut key = HeaderValue::from_str(api_key)?;
    key.set_sensitive(true);
    headers.insert(HeaderName::from_static(API_KEY_HEADER), key);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Ok(headers)
}

/// Whether a response content type announces an SSE stream
pub fn is_event_stream(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_ascii_lowercase().starts_with("text/event-stream"))
        .unwrap_or(false)
}
