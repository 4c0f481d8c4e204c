//! Mock infrastructure for testing external services
//!
//! This module provides a wiremock-based stand-in for the Gemini API so the
//! relay can be exercised end to end without network access.

pub mod gemini;

pub use gemini::*;
