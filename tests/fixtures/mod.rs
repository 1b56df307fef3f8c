//! Test Fixtures Module
//!
//! Shared helpers for the relay integration tests:
//! - Server configuration pointed at a stub upstream
//! - Service account credentials backed by the RSA keys in `keys/`
//! - Google token and synthesis endpoint stubs

// Not every test binary uses every helper
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use serde_json::json;
use speech_relay::{AppState, ServerConfig, ServiceAccountCredential, create_app};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const PRIVATE_KEY: &str = include_str!("keys/service_account_key.pem");
pub const PUBLIC_KEY: &str = include_str!("keys/service_account_pub.pem");

pub const CLIENT_EMAIL: &str = "relay@example-project.iam.gserviceaccount.com";
pub const ACCESS_TOKEN: &str = "ya29.test-access-token";

pub const TOKEN_PATH: &str = "/token";
pub const SYNTHESIS_PATH: &str = "/v1/text:synthesize";

pub fn credential() -> ServiceAccountCredential {
    ServiceAccountCredential::new(CLIENT_EMAIL, PRIVATE_KEY)
}

/// Minimal configuration with both Google endpoints on `upstream`
pub fn test_config(upstream: &str, credential: Option<ServiceAccountCredential>) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        tls: None,
        service_account: credential,
        token_url: Some(format!("{upstream}{TOKEN_PATH}")),
        synthesis_url: format!("{upstream}{SYNTHESIS_PATH}"),
        relay_api_key: None,
        rate_limit_requests_per_second: 100000,
        rate_limit_burst_size: 10,
        voice_catalog_path: None,
    }
}

pub fn app_with(config: ServerConfig) -> Router {
    let state: Arc<AppState> = AppState::new(config).unwrap();
    create_app(state)
}

/// Token endpoint answering with [`ACCESS_TOKEN`], expected `calls` times
pub async fn mount_token(server: &MockServer, calls: u64) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": ACCESS_TOKEN,
            "token_type": "Bearer",
            "expires_in": 3599
        })))
        .expect(calls)
        .mount(server)
        .await;
}

/// Synthesis endpoint answering with `audio_content`, expected `calls` times
pub async fn mount_synthesis(server: &MockServer, audio_content: &str, calls: u64) {
    Mock::given(method("POST"))
        .and(path(SYNTHESIS_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "audioContent": audio_content })),
        )
        .expect(calls)
        .mount(server)
        .await;
}

/// Fails the test on drop if anything reaches `server`
pub async fn forbid_upstream(server: &MockServer) {
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}
