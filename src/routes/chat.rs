//! Gemini chat endpoint
//!
//! `POST /api/chat/gemini` forwards a chat request to Gemini and answers
//! either with the upstream SSE stream passed through verbatim (default) or
//! with the upstream JSON body (`"streamFormat": "json"`).

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::{Stream, StreamExt};
use serde_json::Value;
use tracing::Instrument;

use crate::{
    chat::{InboundRequest, RelayEnvelope, StreamFormat},
    error::{AppError, RelayError},
    proxy::{Endpoint, GeminiClient, RequestContext},
    routes::metrics::{record_request, record_stream_deltas},
    streaming::{format_error_event, DeltaDecoder},
    AppState,
};

/// Metrics outcome label for an upstream status
fn outcome_label(status: StatusCode) -> &'static str {
    if status.is_success() {
        "success"
    } else {
        "upstream_error"
    }
}

/// Handle a chat request
///
/// The credential check runs first so a misconfigured relay answers 401
/// without reading the body or contacting the upstream.
pub async fn gemini_chat(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, AppError> {
    let start_time = Instant::now();

    state.relay.client().ensure_configured()?;

    let value: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)))?;
    let envelope = RelayEnvelope::from_value(value)
        .map_err(|e| AppError::BadRequest(format!("Invalid chat request: {}", e)))?;

    let mode = envelope.stream_format;
    let result = match mode {
        StreamFormat::Sse => relay_sse(&state, envelope.request, start_time).await,
        StreamFormat::Json => relay_json(&state, envelope.request, start_time).await,
    };

    if let Err(e) = &result {
        let outcome = match e {
            AppError::Relay(RelayError::UpstreamHttp { .. }) => "upstream_error",
            _ => "error",
        };
        record_request(
            &mode.to_string(),
            outcome,
            start_time.elapsed().as_secs_f64(),
        );
    }

    result
}

/// JSON mode: return the upstream body with the upstream status
async fn relay_json(
    state: &AppState,
    request: InboundRequest,
    start_time: Instant,
) -> Result<Response, AppError> {
    let ctx = state.relay.context(Endpoint::Generate);
    let response = state
        .relay
        .open(Endpoint::Generate, &request, &ctx)
        .instrument(ctx.create_span())
        .await?;
    let status = response.status();

    let bytes = response.bytes().await.map_err(RelayError::from)?;
    let value: Value = match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        Err(e) => {
            ctx.log_error(&format!("Upstream body is not JSON: {}", e));
            return Err(AppError::BadGateway(e.to_string()));
        }
    };

    if status.is_success() {
        ctx.log_request_complete(bytes.len());
    } else {
        ctx.log_error(&format!("Upstream returned HTTP {}", status));
    }
    record_request(
        "json",
        outcome_label(status),
        start_time.elapsed().as_secs_f64(),
    );

    Ok((status, Json(value)).into_response())
}

/// SSE mode: pass the upstream event stream through unchanged
async fn relay_sse(
    state: &AppState,
    request: InboundRequest,
    start_time: Instant,
) -> Result<Response, AppError> {
    let ctx = state.relay.context(Endpoint::StreamGenerate);
    let response = state
        .relay
        .open(Endpoint::StreamGenerate, &request, &ctx)
        .instrument(ctx.create_span())
        .await?;
    let response = match GeminiClient::error_for_status(response).await {
        Ok(response) => response,
        Err(e) => {
            ctx.log_error(&e.to_string());
            return Err(e.into());
        }
    };

    // Final delta metrics are recorded when the stream completes
    record_request("sse", "success", start_time.elapsed().as_secs_f64());
    ctx.log_stream_started();

    let body = Body::from_stream(passthrough(GeminiClient::into_byte_stream(response), ctx));

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream; charset=utf-8")
        .header(header::CACHE_CONTROL, "no-cache, no-transform")
        .header(header::CONNECTION, "keep-alive")
        .header("X-Accel-Buffering", "no")
        .body(body)
        .map_err(|e| AppError::Internal(e.into()))?)
}

/// Forward upstream chunks verbatim while tapping them for deltas.
///
/// A transport error ends the stream after one SSE error event. Dropping the
/// returned stream (caller disconnect) drops the upstream response too.
fn passthrough<S, E>(
    mut upstream: S,
    ctx: RequestContext,
) -> impl Stream<Item = Result<Bytes, std::io::Error>>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: std::fmt::Display,
{
    async_stream::stream! {
        let mut decoder = DeltaDecoder::new();
        let mut deltas = 0usize;
        let mut text_len = 0usize;

        while let Some(chunk) = upstream.next().await {
            match chunk {
                Ok(bytes) => {
                    for delta in decoder.feed(&bytes) {
                        deltas += 1;
                        text_len += delta.len();
                    }
                    yield Ok::<Bytes, std::io::Error>(bytes);
                }
                Err(e) => {
                    ctx.log_error(&format!("Upstream stream interrupted: {}", e));
                    yield Ok::<Bytes, std::io::Error>(format_error_event(
                        "Upstream stream interrupted",
                        Some("NETWORK_ERROR"),
                    ));
                    break;
                }
            }
        }

        ctx.log_stream_ended(deltas, text_len, decoder.skipped());
        record_stream_deltas(deltas as u64);
    }
}
