//! Cancellable SSE read loop
//!
//! Reads an upstream byte stream chunk by chunk, decodes deltas, appends them
//! to the accumulated text and hands each one to the caller's callback.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::error::RelayError;
use crate::streaming::DeltaDecoder;

/// Accumulated state of one streamed response
///
/// The accumulated text is always the in-order concatenation of every delta
/// handed to the callback.
#[derive(Debug, Default)]
pub struct SseAccumulator {
    decoder: DeltaDecoder,
    text: String,
    deltas: usize,
}

impl SseAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume `stream` until it ends, fails, or `cancel` fires.
    ///
    /// Cancellation is checked while waiting for each chunk and before each
    /// delta is emitted, so no callback runs after the token fires. Deltas
    /// delivered before a failure or cancellation stay delivered.
    pub async fn consume<S, E, F>(
        &mut self,
        mut stream: S,
        cancel: &CancellationToken,
        on_delta: &mut F,
    ) -> Result<(), RelayError>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: std::fmt::Display,
        F: FnMut(&str),
    {
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RelayError::Aborted),
                chunk = stream.next() => chunk,
            };

            let bytes = match next {
                None => return Ok(()),
                Some(Ok(bytes)) => bytes,
                Some(Err(e)) => return Err(RelayError::Network(e.to_string())),
            };

            for delta in self.decoder.feed(&bytes) {
                if cancel.is_cancelled() {
                    return Err(RelayError::Aborted);
                }
                self.text.push_str(&delta);
                self.deltas += 1;
                on_delta(&delta);
            }
        }
    }

    /// Text accumulated so far
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of deltas delivered
    pub fn deltas(&self) -> usize {
        self.deltas
    }

    /// Number of malformed frames skipped
    pub fn skipped(&self) -> usize {
        self.decoder.skipped()
    }

    /// Finish the stream, returning the text and any unterminated trailing line
    pub fn finish(self) -> (String, Option<String>) {
        (self.text, self.decoder.finish())
    }
}
