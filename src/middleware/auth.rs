use crate::errors::relay_error::RelayError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::{HeaderMap, Method, header::AUTHORIZATION};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Header browsers send alongside `Authorization` when calling the relay
pub const APIKEY_HEADER: &str = "apikey";

/// Extract the client key from request headers
///
/// Sources, in order:
/// 1. `Authorization: Bearer <key>`
/// 2. `apikey: <key>`
fn extract_key(headers: &HeaderMap) -> Option<&str> {
    if let Some(token) = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
    {
        return Some(token.trim());
    }

    headers
        .get(APIKEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
}

fn keys_match(presented: &str, expected: &str) -> bool {
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Relay key middleware
///
/// Passes every request through when no relay key is configured. Preflight
/// `OPTIONS` requests are never checked so browsers can read the CORS headers.
/// Any other request must carry the configured key or gets a 401 envelope.
pub async fn relay_auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, RelayError> {
    let Some(expected) = state.config.relay_api_key.as_deref() else {
        return Ok(next.run(request).await);
    };

    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let verdict = extract_key(request.headers()).map(|presented| keys_match(presented, expected));
    match verdict {
        Some(true) => Ok(next.run(request).await),
        Some(false) => {
            tracing::warn!(path = %request.uri().path(), "Rejected request with invalid relay key");
            Err(RelayError::Unauthorized)
        }
        None => {
            tracing::warn!(path = %request.uri().path(), "Rejected request without relay key");
            Err(RelayError::Unauthorized)
        }
    }
}
