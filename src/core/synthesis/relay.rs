//! Google Cloud Text-to-Speech relay.
//!
//! # API Reference
//!
//! - Token: `POST https://oauth2.googleapis.com/token` (JWT-bearer grant)
//! - Synthesis: `POST https://texttospeech.googleapis.com/v1/text:synthesize`
//! - Output: MP3, returned base64-encoded in `audioContent`
//!
//! Every call signs a new assertion and fetches a new access token. There are no
//! retries and no timeouts beyond the HTTP client defaults.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, info};

use super::messages::{SynthesisRequest, SynthesizeRequest, SynthesizeResponse};
use super::{SpeechSynthesizer, SynthesizedAudio};
use crate::core::audio::{AUDIO_MPEG, decode_audio_content};
use crate::core::credentials::ServiceAccountCredential;
use crate::core::signer::assertion_for;
use crate::core::token::{self, AccessToken, DEFAULT_TOKEN_URL};
use crate::errors::relay_error::{RelayError, RelayResult};

/// Google Cloud TTS synthesis endpoint
pub const DEFAULT_SYNTHESIS_URL: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";

/// Relay that forwards synthesis requests to Google Cloud TTS on behalf of a
/// service account.
///
/// The credential is optional so the relay can be built from a deployment that has
/// not been given one yet; such a relay rejects every request with a configuration
/// error without contacting upstream.
pub struct GoogleSpeechRelay {
    client: Client,
    credential: Option<ServiceAccountCredential>,
    /// Explicit token endpoint; falls back to the credential's `token_uri`, then
    /// to [`DEFAULT_TOKEN_URL`]
    token_url: Option<String>,
    synthesis_url: String,
}

impl GoogleSpeechRelay {
    pub fn new(credential: Option<ServiceAccountCredential>) -> Self {
        Self {
            client: Client::new(),
            credential,
            token_url: None,
            synthesis_url: DEFAULT_SYNTHESIS_URL.to_string(),
        }
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = Some(token_url.into());
        self
    }

    pub fn with_synthesis_url(mut self, synthesis_url: impl Into<String>) -> Self {
        self.synthesis_url = synthesis_url.into();
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    fn token_url_for<'a>(&'a self, credential: &'a ServiceAccountCredential) -> &'a str {
        self.token_url
            .as_deref()
            .or(credential.token_uri.as_deref())
            .unwrap_or(DEFAULT_TOKEN_URL)
    }

    /// Sign a fresh assertion and exchange it for an access token.
    async fn access_token(&self, credential: &ServiceAccountCredential) -> RelayResult<AccessToken> {
        let token_url = self.token_url_for(credential);
        let assertion = assertion_for(credential, token_url)?;

        debug!(token_url = %token_url, "Exchanging service account assertion");
        Ok(token::exchange(&self.client, token_url, &assertion).await?)
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleSpeechRelay {
    async fn synthesize(&self, request: SynthesisRequest) -> RelayResult<SynthesizedAudio> {
        let credential = self
            .credential
            .as_ref()
            .ok_or_else(RelayError::credentials_not_configured)?;

        let token = self.access_token(credential).await?;

        debug!(
            language = %request.language_code,
            voice = %request.voice_name,
            text_len = request.text.len(),
            "Synthesizing text with Google Cloud TTS"
        );

        let payload = SynthesizeRequest::from(&request);
        let response = self
            .client
            .post(&self.synthesis_url)
            .bearer_auth(&token.value)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Google Cloud TTS request failed");
                RelayError::unknown(format!("Synthesis request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let details = serde_json::from_str::<Value>(&body).unwrap_or(Value::String(body));
            return Err(RelayError::Upstream {
                status: status.as_u16(),
                details,
            });
        }

        let body: SynthesizeResponse = response
            .json()
            .await
            .map_err(|e| RelayError::unknown(format!("Invalid synthesis response: {e}")))?;

        let data = decode_audio_content(&body.audio_content)
            .map_err(|e| RelayError::unknown(format!("Invalid audio content: {e}")))?;

        info!(
            language = %request.language_code,
            voice = %request.voice_name,
            audio_bytes = data.len(),
            "Synthesis completed"
        );

        Ok(SynthesizedAudio {
            data,
            content_type: AUDIO_MPEG,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::synthesis::SpeechRequestBody;
    use bytes::Bytes;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PRIVATE_KEY: &str = include_str!("../../../tests/fixtures/keys/service_account_key.pem");

    fn credential() -> ServiceAccountCredential {
        ServiceAccountCredential::new("relay@demo.iam.gserviceaccount.com", PRIVATE_KEY)
    }

    fn request() -> SynthesisRequest {
        SynthesisRequest {
            text: "Hello".to_string(),
            language_code: "en-US".to_string(),
            voice_name: "en-US-Standard-C".to_string(),
            speaking_rate: Some(1.0),
            pitch_semitones: Some(0.0),
        }
    }

    fn relay_for(server: &MockServer, credential: Option<ServiceAccountCredential>) -> GoogleSpeechRelay {
        GoogleSpeechRelay::new(credential)
            .with_token_url(format!("{}/token", server.uri()))
            .with_synthesis_url(format!("{}/v1/text:synthesize", server.uri()))
    }

    async fn mount_token(server: &MockServer, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "test-access-token",
                "expires_in": 3600
            })))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_synthesize_decodes_audio() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("POST"))
            .and(path("/v1/text:synthesize"))
            .and(header("authorization", "Bearer test-access-token"))
            .and(body_json(json!({
                "input": { "text": "Hello" },
                "voice": { "languageCode": "en-US", "name": "en-US-Standard-C" },
                "audioConfig": { "audioEncoding": "MP3", "speakingRate": 1.0, "pitch": 0.0 }
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "audioContent": "QUJD" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let audio = relay_for(&server, Some(credential()))
            .synthesize(request())
            .await
            .unwrap();

        assert_eq!(audio.data, Bytes::from_static(b"ABC"));
        assert_eq!(audio.content_type, AUDIO_MPEG);
    }

    #[tokio::test]
    async fn test_missing_credential_never_calls_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = relay_for(&server, None)
            .synthesize(request())
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_token_rejection_skips_synthesis() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized_client"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/text:synthesize"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = relay_for(&server, Some(credential()))
            .synthesize(request())
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Auth(_)));
    }

    #[tokio::test]
    async fn test_upstream_error_keeps_status_and_body() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        let upstream_error = json!({
            "error": { "code": 400, "message": "Voice 'x' does not exist.", "status": "INVALID_ARGUMENT" }
        });
        Mock::given(method("POST"))
            .and(path("/v1/text:synthesize"))
            .respond_with(ResponseTemplate::new(400).set_body_json(upstream_error.clone()))
            .mount(&server)
            .await;

        let err = relay_for(&server, Some(credential()))
            .synthesize(request())
            .await
            .unwrap_err();

        match err {
            RelayError::Upstream { status, details } => {
                assert_eq!(status, 400);
                assert_eq!(details, upstream_error);
            }
            other => panic!("Expected Upstream error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_upstream_plain_text_error_body() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("POST"))
            .and(path("/v1/text:synthesize"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let err = relay_for(&server, Some(credential()))
            .synthesize(request())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RelayError::Upstream { status: 503, details: Value::String(ref s) } if s == "unavailable"
        ));
    }

    #[tokio::test]
    async fn test_invalid_key_is_credential_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let broken = ServiceAccountCredential::new("a@b.c", "not a pem");
        let err = relay_for(&server, Some(broken))
            .synthesize(request())
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Credential(_)));
    }

    #[tokio::test]
    async fn test_credential_token_uri_is_used_without_override() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/custom-token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "access_token": "t" })),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/text:synthesize"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "audioContent": "QUJD" })),
            )
            .mount(&server)
            .await;

        let mut credential = credential();
        credential.token_uri = Some(format!("{}/custom-token", server.uri()));
        let relay = GoogleSpeechRelay::new(Some(credential))
            .with_synthesis_url(format!("{}/v1/text:synthesize", server.uri()));

        assert!(relay.synthesize(request()).await.is_ok());
    }

    #[tokio::test]
    async fn test_each_request_fetches_its_own_token() {
        let server = MockServer::start().await;
        mount_token(&server, 2).await;
        Mock::given(method("POST"))
            .and(path("/v1/text:synthesize"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "audioContent": "QUJD" })),
            )
            .expect(2)
            .mount(&server)
            .await;

        let relay = relay_for(&server, Some(credential()));
        relay.synthesize(request()).await.unwrap();
        relay.synthesize(request()).await.unwrap();
    }

    #[tokio::test]
    async fn test_relay_validates_before_anything_else() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        // No credential either: validation must win over the configuration check.
        let err = relay_for(&server, None)
            .relay(SpeechRequestBody {
                text: Some("Hello".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Validation(_)));
    }
}
