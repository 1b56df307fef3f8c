use bytes::Bytes;
use reqwest::{Client, header::CONTENT_TYPE};
use serde_json::Value;
use thiserror::Error;

use super::artifact::AudioArtifact;
use crate::config::env::{RELAY_API_KEY, var};
use crate::core::audio::AUDIO_MPEG;
use crate::core::synthesis::SpeechRequestBody;

pub const RELAY_BASE_URL: &str = "RELAY_BASE_URL";

pub const MISSING_CONFIGURATION_MESSAGE: &str = "Relay configuration is missing";
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to generate audio";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Relay configuration is missing")]
    MissingConfiguration,

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The relay answered with a non-success status; `message` is what the form shows
    #[error("{message}")]
    Rejected { status: u16, message: String },
}

/// Where the form sends its requests
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

impl ClientConfig {
    /// Read `RELAY_BASE_URL` and `RELAY_API_KEY`
    pub fn from_env() -> Self {
        Self {
            base_url: var(RELAY_BASE_URL),
            api_key: var(RELAY_API_KEY),
        }
    }
}

/// HTTP client for the relay's `/text-to-speech` endpoint
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl RelayClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let (Some(base_url), Some(api_key)) = (config.base_url, config.api_key) else {
            return Err(ClientError::MissingConfiguration);
        };

        Ok(Self {
            client: Client::new(),
            endpoint: format!("{}/text-to-speech", base_url.trim_end_matches('/')),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Post the form payload and return the audio on success
    pub async fn generate(&self, body: &SpeechRequestBody) -> Result<AudioArtifact, ClientError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("apikey", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = rejection_message(&response.bytes().await.unwrap_or_default());
            tracing::warn!(status = status.as_u16(), %message, "Relay rejected generation");
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or(AUDIO_MPEG)
            .to_string();
        let data = response.bytes().await?;

        tracing::debug!(bytes = data.len(), "Relay returned audio");
        Ok(AudioArtifact::new(data, content_type))
    }
}

/// The envelope's `error` string, or the generic failure message
fn rejection_message(body: &Bytes) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|envelope| {
            envelope
                .get("error")
                .and_then(Value::as_str)
                .filter(|message| !message.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str) -> ClientConfig {
        ClientConfig {
            base_url: Some(base_url.to_string()),
            api_key: Some("client-key".to_string()),
        }
    }

    fn body() -> SpeechRequestBody {
        SpeechRequestBody {
            text: Some("Hello".to_string()),
            language: Some("en-US".to_string()),
            voice: Some("en-US-Standard-C".to_string()),
            speed: Some(1.0),
            pitch: Some(0.0),
        }
    }

    #[test]
    fn test_missing_configuration() {
        let err = RelayClient::new(ClientConfig::default()).unwrap_err();
        assert_eq!(err.to_string(), "Relay configuration is missing");

        let partial = ClientConfig {
            base_url: Some("http://localhost:3001".to_string()),
            api_key: None,
        };
        assert!(matches!(
            RelayClient::new(partial),
            Err(ClientError::MissingConfiguration)
        ));
    }

    #[test]
    fn test_endpoint_trailing_slash() {
        let client = RelayClient::new(config("http://localhost:3001/")).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:3001/text-to-speech");
    }

    #[test]
    fn test_rejection_message() {
        assert_eq!(
            rejection_message(&Bytes::from_static(br#"{"error":"Missing required fields: text, language, voice"}"#)),
            "Missing required fields: text, language, voice"
        );
        assert_eq!(rejection_message(&Bytes::from_static(b"{}")), GENERIC_FAILURE_MESSAGE);
        assert_eq!(rejection_message(&Bytes::from_static(b"<html>")), GENERIC_FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn test_generate_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/text-to-speech"))
            .and(header("authorization", "Bearer client-key"))
            .and(header("apikey", "client-key"))
            .and(body_json(serde_json::json!({
                "text": "Hello",
                "language": "en-US",
                "voice": "en-US-Standard-C",
                "speed": 1.0,
                "pitch": 0.0
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "audio/mpeg")
                    .set_body_bytes(b"ABC".to_vec()),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = RelayClient::new(config(&server.uri())).unwrap();
        let audio = client.generate(&body()).await.unwrap();

        assert_eq!(audio.data().as_ref(), b"ABC");
        assert_eq!(audio.content_type(), "audio/mpeg");
    }

    #[tokio::test]
    async fn test_generate_surfaces_envelope_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/text-to-speech"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": "Google Cloud credentials not configured. Please set GCP_SERVICE_ACCOUNT_JSON environment variable."
            })))
            .mount(&server)
            .await;

        let client = RelayClient::new(config(&server.uri())).unwrap();
        let err = client.generate(&body()).await.unwrap_err();

        match err {
            ClientError::Rejected { status, message } => {
                assert_eq!(status, 500);
                assert!(message.starts_with("Google Cloud credentials not configured"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_generic_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = RelayClient::new(config(&server.uri())).unwrap();
        let err = client.generate(&body()).await.unwrap_err();
        assert_eq!(err.to_string(), GENERIC_FAILURE_MESSAGE);
    }
}
