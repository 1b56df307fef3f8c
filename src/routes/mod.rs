//! Router assembly
//!
//! `create_app` builds the full application router used by the binary and the
//! integration tests, including per-IP rate limiting and security headers.

pub mod api;

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, middleware, response::IntoResponse, response::Response, routing::get};
use http::{HeaderValue, Method, header};
use tower_governor::{
    GovernorError, GovernorLayer, governor::GovernorConfigBuilder,
    key_extractor::SmartIpKeyExtractor,
};
use tower_http::{catch_panic::CatchPanicLayer, set_header::SetResponseHeaderLayer};

use crate::config::ServerConfig;
use crate::errors::relay_error::RelayError;
use crate::handlers;
use crate::middleware::relay_auth_middleware;
use crate::state::AppState;

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization, X-Client-Info, Apikey";

/// Rates at or above this many requests per second turn the limiter off
pub const RATE_LIMIT_DISABLED_AT: u32 = 100_000;

/// Methods counted against the per-IP quota; preflights are never limited
const RATE_LIMITED_METHODS: [Method; 6] = [
    Method::GET,
    Method::HEAD,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
];

/// Build the application router with state applied.
///
/// Layer order (outer to inner): cross-origin headers -> security headers ->
/// rate limit -> catch-panic -> relay key -> handler. Cross-origin headers
/// therefore land on every response, including 401s, 429s and recovered panics.
pub fn create_app(state: Arc<AppState>) -> Router {
    let protected_routes = api::create_api_router().layer(middleware::from_fn_with_state(
        state.clone(),
        relay_auth_middleware,
    ));

    let public_routes = Router::new().route("/", get(handlers::api::health_check));

    let app = public_routes
        .merge(protected_routes)
        .with_state(state.clone())
        .layer(CatchPanicLayer::custom(panic_response));

    with_rate_limit(app, &state.config)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        ))
}

/// Interval after which one request of quota is replenished
pub fn replenish_period(requests_per_second: u32) -> Duration {
    Duration::from_secs(1) / requests_per_second.max(1)
}

/// Apply the per-IP limiter unless the configured rate disables it
fn with_rate_limit(app: Router, config: &ServerConfig) -> Router {
    let rps = config.rate_limit_requests_per_second;
    if rps >= RATE_LIMIT_DISABLED_AT {
        tracing::info!(rps, "Rate limiting disabled");
        return app;
    }

    let Some(governor_config) = GovernorConfigBuilder::default()
        .period(replenish_period(rps))
        .burst_size(config.rate_limit_burst_size)
        .methods(RATE_LIMITED_METHODS.to_vec())
        .key_extractor(SmartIpKeyExtractor)
        .finish()
    else {
        tracing::warn!(
            rps,
            burst = config.rate_limit_burst_size,
            "Invalid rate limit settings, limiter not applied"
        );
        return app;
    };

    tracing::info!(rps, burst = config.rate_limit_burst_size, "Rate limiting enabled");
    app.layer(GovernorLayer::new(governor_config).error_handler(rate_limited_response))
}

fn rate_limited_response(error: GovernorError) -> Response {
    match error {
        GovernorError::TooManyRequests { wait_time, headers } => {
            let mut response = RelayError::RateLimited {
                retry_after_secs: wait_time,
            }
            .into_response();
            if let Some(headers) = headers {
                response.headers_mut().extend(headers);
            }
            response
        }
        GovernorError::UnableToExtractKey => {
            RelayError::unknown("unable to determine client address").into_response()
        }
        GovernorError::Other { msg, .. } => {
            RelayError::unknown(msg.unwrap_or_else(|| "rate limiter failure".to_string()))
                .into_response()
        }
    }
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!(panic = message, "Request handler panicked");

    RelayError::unknown("request handler panicked").into_response()
}
