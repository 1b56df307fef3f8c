//! OAuth2 JWT-bearer token exchange.
//!
//! A signed assertion is POSTed to the token endpoint as
//! `grant_type=urn:ietf:params:oauth:grant-type:jwt-bearer&assertion=<jwt>` and the
//! `access_token` field of the JSON response is returned. Tokens are never cached:
//! each relay invocation mints its own.

use std::fmt;

use jsonwebtoken::get_current_timestamp;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;

/// Google OAuth2 token endpoint
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Grant type for service-account assertions
pub const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Token lifetime assumed when the endpoint omits `expires_in`
const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("token endpoint returned status {status}")]
    Rejected { status: u16, body: String },

    #[error("invalid token response: {0}")]
    InvalidResponse(String),
}

impl TokenError {
    /// Diagnostic payload for the error envelope
    pub fn details(&self) -> Value {
        match self {
            Self::Rejected { status, body } => json!({ "status": status, "body": body }),
            other => Value::String(other.to_string()),
        }
    }
}

/// Short-lived bearer token
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub value: String,
    pub expires_at_epoch_seconds: u64,
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"[REDACTED]")
            .field("expires_at_epoch_seconds", &self.expires_at_epoch_seconds)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

/// Exchange a signed assertion for an access token.
///
/// A non-success status is reported as [`TokenError::Rejected`]. The assertion is
/// bound to its `iat`/`exp`, so callers must re-sign rather than replay it.
pub async fn exchange(
    client: &Client,
    token_url: &str,
    assertion: &str,
) -> Result<AccessToken, TokenError> {
    let response = client
        .post(token_url)
        .form(&[
            ("grant_type", JWT_BEARER_GRANT_TYPE),
            ("assertion", assertion),
        ])
        .send()
        .await
        .map_err(TokenError::Transport)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TokenError::Rejected {
            status: status.as_u16(),
            body,
        });
    }

    let body = response.text().await.map_err(TokenError::Transport)?;
    let token_response: TokenResponse = serde_json::from_str(&body)
        .map_err(|e| TokenError::InvalidResponse(e.to_string()))?;

    if token_response.access_token.is_empty() {
        return Err(TokenError::InvalidResponse(
            "access_token is empty".to_string(),
        ));
    }

    let expires_in = if token_response.expires_in > 0 {
        token_response.expires_in
    } else {
        DEFAULT_EXPIRES_IN_SECS
    };

    debug!(expires_in, "Access token obtained");

    Ok(AccessToken {
        value: token_response.access_token,
        expires_at_epoch_seconds: get_current_timestamp() + expires_in,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_exchange_posts_jwt_bearer_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains(
                "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
            ))
            .and(body_string_contains("assertion=header.claims.signature"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "ya29.token",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let before = get_current_timestamp();
        let token = exchange(
            &Client::new(),
            &format!("{}/token", server.uri()),
            "header.claims.signature",
        )
        .await
        .unwrap();

        assert_eq!(token.value, "ya29.token");
        assert!(token.expires_at_epoch_seconds >= before + 3599);
    }

    #[tokio::test]
    async fn test_exchange_defaults_expiry_when_missing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "access_token": "t" })),
            )
            .mount(&server)
            .await;

        let before = get_current_timestamp();
        let token = exchange(&Client::new(), &server.uri(), "a.b.c").await.unwrap();
        assert!(token.expires_at_epoch_seconds >= before + DEFAULT_EXPIRES_IN_SECS);
    }

    #[tokio::test]
    async fn test_exchange_non_success_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .expect(1)
            .mount(&server)
            .await;

        let err = exchange(&Client::new(), &server.uri(), "a.b.c")
            .await
            .unwrap_err();

        match err {
            TokenError::Rejected { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "invalid_grant");
            }
            other => panic!("Expected Rejected, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_exchange_without_access_token_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "foo": "bar" })))
            .mount(&server)
            .await;

        let err = exchange(&Client::new(), &server.uri(), "a.b.c")
            .await
            .unwrap_err();
        assert!(matches!(err, TokenError::InvalidResponse(_)));
    }

    #[test]
    fn test_access_token_debug_is_redacted() {
        let token = AccessToken {
            value: "ya29.secret".to_string(),
            expires_at_epoch_seconds: 10,
        };
        assert!(!format!("{token:?}").contains("ya29.secret"));
    }
}
