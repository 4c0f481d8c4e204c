//! Chat relay
//!
//! Turns an [`InboundRequest`] into an upstream call and returns the response
//! text, either all at once ([`ChatRelay::complete`]) or delta by delta
//! ([`ChatRelay::stream`]).
//!
//! Streaming runs `Idle -> RequestSent -> (NonStreamFallback | Streaming) ->
//! Closed`. Every stage races the caller's [`CancellationToken`]; a fired
//! token ends the call with [`RelayError::Aborted`], never with partial text.
//! Deltas already handed to the callback before a failure or cancellation
//! are not retracted.

pub mod accumulator;

use serde_json::Value;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

pub use accumulator::SseAccumulator;

use crate::chat::{GeminiTranslator, InboundRequest, MessageTranslator};
use crate::config::GeminiConfig;
use crate::error::RelayError;
use crate::proxy::headers::is_event_stream;
use crate::proxy::{Endpoint, GeminiClient, RequestContext};

/// Race `fut` against cancellation
async fn abortable<T, Fut>(cancel: &CancellationToken, fut: Fut) -> Result<T, RelayError>
where
    Fut: Future<Output = Result<T, RelayError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(RelayError::Aborted),
        result = fut => result,
    }
}

fn log_failure(ctx: &RequestContext, error: &RelayError, deltas_delivered: usize) {
    match error {
        RelayError::Aborted => ctx.log_aborted(deltas_delivered),
        other => ctx.log_error(&other.to_string()),
    }
}

/// Relay between callers and the Gemini API
#[derive(Debug, Clone)]
pub struct ChatRelay {
    client: GeminiClient,
    translator: GeminiTranslator,
}

impl ChatRelay {
    /// Create a relay from a shared HTTP client and explicit upstream config
    pub fn new(http_client: reqwest::Client, config: GeminiConfig) -> Self {
        Self::from_client(GeminiClient::new(http_client, config))
    }

    pub fn from_client(client: GeminiClient) -> Self {
        Self {
            client,
            translator: GeminiTranslator::new(),
        }
    }

    /// Underlying upstream client
    pub fn client(&self) -> &GeminiClient {
        &self.client
    }

    /// Request context for a call to `endpoint`
    pub fn context(&self, endpoint: Endpoint) -> RequestContext {
        RequestContext::new(self.translator.provider(), endpoint.name())
            .with_model(self.client.config().model.clone())
            .with_streaming(endpoint == Endpoint::StreamGenerate)
    }

    /// Build the upstream body, failing fast when no credential is configured
    pub fn prepare(&self, request: &InboundRequest) -> Result<Value, RelayError> {
        self.client.ensure_configured()?;
        Ok(self.translator.translate_request(request)?)
    }

    /// Send `request` to `endpoint` and return the raw upstream response.
    ///
    /// The status code is not checked.
    pub async fn open(
        &self,
        endpoint: Endpoint,
        request: &InboundRequest,
        ctx: &RequestContext,
    ) -> Result<reqwest::Response, RelayError> {
        ctx.log_request_start(request.kind(), request.message_count());
        let body = self.prepare(request)?;
        self.client.post(endpoint, &body, ctx).await
    }

    /// Send `request` and dispatch on its stream flag
    pub async fn send<F>(
        &self,
        request: &InboundRequest,
        cancel: &CancellationToken,
        on_delta: F,
    ) -> Result<String, RelayError>
    where
        F: FnMut(&str),
    {
        if request.wants_stream() {
            self.stream(request, cancel, on_delta).await
        } else {
            self.complete(request, cancel).await
        }
    }

    /// Non-streaming call: the part texts of the single response joined with `\n`
    pub async fn complete(
        &self,
        request: &InboundRequest,
        cancel: &CancellationToken,
    ) -> Result<String, RelayError> {
        let ctx = self.context(Endpoint::Generate);
        let result = abortable(cancel, async {
            let response = self.open(Endpoint::Generate, request, &ctx).await?;
            let response = GeminiClient::error_for_status(response).await?;
            let value = GeminiClient::read_json(response, &ctx).await?;
            Ok(self.translator.extract_text(&value))
        }
        .instrument(ctx.create_span()))
        .await;

        match &result {
            Ok(text) => ctx.log_request_complete(text.len()),
            Err(e) => log_failure(&ctx, e, 0),
        }
        result
    }

    /// Streaming call.
    ///
    /// Each non-empty delta is appended to the result and then passed to
    /// `on_delta`, in arrival order. If the upstream answers with a single
    /// JSON body instead of an event stream, its text is extracted as in
    /// [`ChatRelay::complete`] and `on_delta` is called exactly once.
    pub async fn stream<F>(
        &self,
        request: &InboundRequest,
        cancel: &CancellationToken,
        mut on_delta: F,
    ) -> Result<String, RelayError>
    where
        F: FnMut(&str),
    {
        let ctx = self.context(Endpoint::StreamGenerate);

        let response = match abortable(cancel, async {
            let response = self.open(Endpoint::StreamGenerate, request, &ctx).await?;
            GeminiClient::error_for_status(response).await
        }
        .instrument(ctx.create_span()))
        .await
        {
            Ok(response) => response,
            Err(e) => {
                log_failure(&ctx, &e, 0);
                return Err(e);
            }
        };

        if !is_event_stream(response.headers()) {
            ctx.log_warning("Upstream answered without an event stream, reading single response");
            let value = match abortable(cancel, GeminiClient::read_json(response, &ctx)).await {
                Ok(value) => value,
                Err(e) => {
                    log_failure(&ctx, &e, 0);
                    return Err(e);
                }
            };
            let text = self.translator.extract_text(&value);
            if cancel.is_cancelled() {
                ctx.log_aborted(0);
                return Err(RelayError::Aborted);
            }
            on_delta(&text);
            ctx.log_request_complete(text.len());
            return Ok(text);
        }

        ctx.log_stream_started();
        let mut accumulator = SseAccumulator::new();
        let outcome = accumulator
            .consume(GeminiClient::into_byte_stream(response), cancel, &mut on_delta)
            .await;

        match outcome {
            Ok(()) => {
                ctx.log_stream_ended(
                    accumulator.deltas(),
                    accumulator.text().len(),
                    accumulator.skipped(),
                );
                let (text, unterminated) = accumulator.finish();
                if let Some(rest) = unterminated {
                    ctx.log_warning(&format!(
                        "Discarding {} bytes of unterminated trailing SSE data",
                        rest.len()
                    ));
                }
                Ok(text)
            }
            Err(e) => {
                log_failure(&ctx, &e, accumulator.deltas());
                Err(e)
            }
        }
    }
}
