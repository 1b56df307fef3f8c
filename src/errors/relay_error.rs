use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{error, warn};

use crate::core::signer::SignerError;
use crate::core::token::TokenError;

/// Result type for relay operations
pub type RelayResult<T> = Result<T, RelayError>;

/// Message returned when any of `text`, `language` or `voice` is absent
pub const MISSING_FIELDS_MESSAGE: &str = "Missing required fields: text, language, voice";

/// Message returned when no service account credential is configured
pub const CREDENTIALS_NOT_CONFIGURED_MESSAGE: &str = "Google Cloud credentials not configured. \
     Please set GCP_SERVICE_ACCOUNT_JSON environment variable.";

/// Every way a single relay invocation can fail.
///
/// Each variant maps to a status code and a JSON envelope of the form
/// `{"error": "...", "details": ...}`. `details` is only present when there is
/// something useful for diagnostics.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The caller sent an incomplete or out-of-range request
    #[error("{0}")]
    Validation(String),

    /// The deployment is missing something the relay needs
    #[error("{0}")]
    Configuration(String),

    /// The configured service account key could not be used for signing
    #[error("Invalid service account credentials: {0}")]
    Credential(#[from] SignerError),

    /// The OAuth token endpoint refused the assertion or could not be reached
    #[error("Failed to obtain access token: {0}")]
    Auth(#[from] TokenError),

    /// The synthesis API answered with a non-success status
    #[error("Google Cloud TTS API error (status {status})")]
    Upstream { status: u16, details: Value },

    /// The relay API key did not match
    #[error("Invalid API key")]
    Unauthorized,

    /// The caller exhausted its per-IP request quota
    #[error("Too many requests, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Anything not covered above
    #[error("Internal server error: {0}")]
    Unknown(String),
}

impl RelayError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn missing_fields() -> Self {
        Self::Validation(MISSING_FIELDS_MESSAGE.to_string())
    }

    pub fn credentials_not_configured() -> Self {
        Self::Configuration(CREDENTIALS_NOT_CONFIGURED_MESSAGE.to_string())
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown(message.into())
    }

    /// HTTP status this error is reported with
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Configuration(_) | Self::Credential(_) | Self::Auth(_) | Self::Unknown(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// JSON body reported to the caller
    pub fn envelope(&self) -> Value {
        match self {
            Self::Validation(message) | Self::Configuration(message) => {
                json!({ "error": message })
            }
            Self::Credential(e) => json!({
                "error": "Invalid service account credentials",
                "details": e.to_string(),
            }),
            Self::Auth(e) => json!({
                "error": "Failed to obtain access token",
                "details": e.details(),
            }),
            Self::Upstream { details, .. } => json!({
                "error": "Google Cloud TTS API error",
                "details": details,
            }),
            Self::Unauthorized => json!({ "error": "Invalid API key" }),
            Self::RateLimited { retry_after_secs } => json!({
                "error": "Too many requests",
                "details": format!("Retry after {retry_after_secs}s"),
            }),
            Self::Unknown(message) => json!({
                "error": "Internal server error",
                "details": message,
            }),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(status = %status, error = %self, "Relay request failed");
        } else {
            warn!(status = %status, error = %self, "Relay request rejected");
        }

        (status, Json(self.envelope())).into_response()
    }
}
