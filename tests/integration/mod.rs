//! Integration tests for the chat relay
//!
//! These tests verify the complete request/response flow, from the inbound
//! chat request through normalization to the mocked Gemini upstream.

mod chat_route;
mod health;
