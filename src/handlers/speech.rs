use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::{Method, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::synthesis::SpeechRequestBody;
use crate::errors::relay_error::{RelayError, RelayResult};
use crate::state::AppState;

/// `/text-to-speech` relay endpoint.
///
/// Accepts any method. `OPTIONS` is answered immediately with an empty 200 so
/// browser preflights succeed even when the relay is not configured; everything
/// else is parsed as a JSON [`SpeechRequestBody`] and relayed to the synthesizer.
///
/// Success returns the raw MP3 bytes with `Content-Type: audio/mpeg`. Failures
/// return the `{error, details?}` envelope from [`RelayError`].
pub async fn text_to_speech(
    State(state): State<Arc<AppState>>,
    method: Method,
    body: Bytes,
) -> RelayResult<Response> {
    if method == Method::OPTIONS {
        return Ok(StatusCode::OK.into_response());
    }

    let request_id = Uuid::new_v4();
    let started = Instant::now();

    let request: SpeechRequestBody = serde_json::from_slice(&body).map_err(|e| {
        debug!(%request_id, error = %e, "Rejected unparsable request body");
        RelayError::validation(format!("Invalid JSON body: {e}"))
    })?;

    debug!(
        %request_id,
        language = request.language.as_deref().unwrap_or_default(),
        voice = request.voice.as_deref().unwrap_or_default(),
        text_chars = request.text.as_deref().map(|t| t.chars().count()).unwrap_or_default(),
        "Relaying synthesis request"
    );

    let audio = state.synthesizer.relay(request).await.inspect_err(|e| {
        debug!(%request_id, error = %e, "Synthesis failed");
    })?;

    info!(
        %request_id,
        bytes = audio.data.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Text-to-speech request completed"
    );

    Ok(([(CONTENT_TYPE, audio.content_type)], audio.data).into_response())
}
