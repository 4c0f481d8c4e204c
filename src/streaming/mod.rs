//! SSE (Server-Sent Events) streaming utilities
//!
//! Provides buffering and parsing helpers for decoding the SSE stream of a
//! Gemini `streamGenerateContent?alt=sse` response into text deltas.

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::chat::gemini::StreamFrame;

/// Prefix of an SSE data line
pub const DATA_PREFIX: &str = "data:";

/// Sentinel payload some providers send to mark the end of a stream
pub const DONE_SENTINEL: &str = "[DONE]";

/// Buffer for accumulating incomplete SSE lines across chunk boundaries.
///
/// SSE data arrives as byte chunks that may not align with line boundaries.
/// This buffer accumulates raw bytes until a complete line (ending with `\n`)
/// is available. Decoding happens per complete line, so a multi-byte UTF-8
/// character split across two reads is reassembled before decoding.
///
/// # Example
/// ```
/// use chat_relay::streaming::SseLineBuffer;
///
/// let mut buffer = SseLineBuffer::new();
///
/// // First chunk contains partial line
/// let lines1 = buffer.feed(b"data: {\"text\":\"hel");
/// assert!(lines1.is_empty()); // No complete lines yet
///
/// // Second chunk completes the line
/// let lines2 = buffer.feed(b"lo\"}\n");
/// assert_eq!(lines2, vec!["data: {\"text\":\"hello\"}"]);
/// ```
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    /// Bytes after the last newline seen so far
    incomplete: Vec<u8>,
}

impl SseLineBuffer {
    /// Create a new empty buffer
    pub fn new() -> Self {
        Self {
            incomplete: Vec::new(),
        }
    }

    /// Feed bytes into the buffer and return any complete lines.
    ///
    /// Complete lines are those ending with `\n`. The newline is stripped
    /// and empty lines are dropped. Invalid UTF-8 is replaced with U+FFFD.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.incomplete.extend_from_slice(bytes);

        let mut complete_lines = Vec::new();
        let mut start = 0;

        while let Some(offset) = self.incomplete[start..].iter().position(|b| *b == b'\n') {
            let end = start + offset;
            let line = &self.incomplete[start..end];

            // SSE uses blank lines as event separators
            if !line.is_empty() {
                complete_lines.push(String::from_utf8_lossy(line).into_owned());
            }
            start = end + 1;
        }

        self.incomplete.drain(..start);
        complete_lines
    }

    /// Check if there's any incomplete data remaining in the buffer.
    ///
    /// Useful for detecting truncated streams at end of response.
    pub fn has_incomplete(&self) -> bool {
        !self.incomplete.is_empty()
    }

    /// Get any remaining incomplete data.
    pub fn remaining(&self) -> String {
        String::from_utf8_lossy(&self.incomplete).into_owned()
    }
}

/// Classification of one complete SSE line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseLine<'a> {
    /// Blank, comment, or a non-`data:` field
    Skip,
    /// The `[DONE]` sentinel
    Done,
    /// Payload of a `data:` line, trimmed
    Data(&'a str),
}

/// Classify a complete line
pub fn parse_sse_line(line: &str) -> SseLine<'_> {
    let line = line.trim();
    if line.is_empty() {
        return SseLine::Skip;
    }

    match line.strip_prefix(DATA_PREFIX) {
        Some(payload) => {
            let payload = payload.trim();
            if payload == DONE_SENTINEL {
                SseLine::Done
            } else {
                SseLine::Data(payload)
            }
        }
        None => SseLine::Skip,
    }
}

/// Errors raised while decoding a single frame.
///
/// These never end a stream: the decoder logs and skips the frame.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Payload of a `data:` line is not a valid frame
    #[error("Malformed SSE frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Parse the payload of a `data:` line
pub fn parse_frame(payload: &str) -> Result<StreamFrame, FrameError> {
    Ok(serde_json::from_str(payload)?)
}

/// Incremental decoder from raw SSE bytes to text deltas.
///
/// Only complete lines are ever parsed. Each frame yields the concatenation of
/// its `candidates[0].content.parts[*].text`; frames without text, malformed
/// frames and `[DONE]` yield nothing.
#[derive(Debug, Default)]
pub struct DeltaDecoder {
    lines: SseLineBuffer,
    frames: usize,
    skipped: usize,
}

impl DeltaDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes and return the deltas it completes, in order
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut deltas = Vec::new();

        for line in self.lines.feed(bytes) {
            let payload = match parse_sse_line(&line) {
                SseLine::Data(payload) => payload,
                SseLine::Skip | SseLine::Done => continue,
            };

            match parse_frame(payload) {
                Ok(frame) => {
                    self.frames += 1;
                    let delta = frame.delta();
                    if !delta.is_empty() {
                        deltas.push(delta);
                    }
                }
                Err(e) => {
                    self.skipped += 1;
                    debug!(
                        error = %e,
                        payload_len = payload.len(),
                        "Skipping malformed SSE frame"
                    );
                }
            }
        }

        deltas
    }

    /// Number of frames parsed so far
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Number of malformed frames skipped so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// End of stream: returns the unterminated trailing line, if any.
    ///
    /// That line is never parsed since it may hold incomplete JSON.
    pub fn finish(self) -> Option<String> {
        if self.lines.has_incomplete() {
            let rest = self.lines.remaining();
            if !rest.trim().is_empty() {
                return Some(rest);
            }
        }
        None
    }
}

/// SSE error event structure for stream errors.
#[derive(Debug, Serialize)]
struct SseErrorEvent {
    error: SseErrorDetails,
}

#[derive(Debug, Serialize)]
struct SseErrorDetails {
    message: String,
    #[serde(rename = "type")]
    error_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

/// Format an error as an SSE error event.
///
/// Lets clients receive error information before the stream closes.
pub fn format_error_event(message: &str, code: Option<&str>) -> Bytes {
    let event = SseErrorEvent {
        error: SseErrorDetails {
            message: message.to_string(),
            error_type: "stream_error".to_string(),
            code: code.map(|c| c.to_string()),
        },
    };
    let json = serde_json::to_string(&event).unwrap_or_else(|_| {
        r#"{"error":{"message":"stream error","type":"stream_error"}}"#.to_string()
    });
    Bytes::from(format!("data: {}\n\n", json))
}
