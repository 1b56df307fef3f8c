use axum::{
    Router,
    routing::{any, get},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{speech, voices};
use crate::state::AppState;
use std::sync::Arc;

/// Create the API router with protected routes
///
/// Note: the relay key middleware is applied by `create_app` once state is available
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Any method: OPTIONS preflights are answered by the handler itself
        .route("/text-to-speech", any(speech::text_to_speech))
        .route("/voices", get(voices::list_voices))
        .layer(TraceLayer::new_for_http())
}
