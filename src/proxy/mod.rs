//! Proxy module
//!
//! Handles request forwarding to the upstream Gemini API.

pub mod gemini;
pub mod headers;
pub mod logging;

pub use gemini::{ByteStream, Endpoint, GeminiClient};
pub use logging::RequestContext;
