mod messages;
mod relay;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

pub use messages::{
    AudioConfig, PITCH_RANGE, SPEAKING_RATE_RANGE, SpeechRequestBody, SynthesisInput,
    SynthesisRequest, SynthesizeRequest, SynthesizeResponse, VoiceSelectionParams,
};
pub use relay::{DEFAULT_SYNTHESIS_URL, GoogleSpeechRelay};

use crate::errors::relay_error::RelayResult;

/// Audio returned by a successful synthesis
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedAudio {
    pub data: Bytes,
    pub content_type: &'static str,
}

/// Turns a validated request into audio bytes.
///
/// `GoogleSpeechRelay` is the production implementation; the HTTP entry point only
/// sees this trait.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, request: SynthesisRequest) -> RelayResult<SynthesizedAudio>;

    /// Validate an inbound body and synthesize it. Invalid bodies never reach
    /// [`SpeechSynthesizer::synthesize`].
    async fn relay(&self, body: SpeechRequestBody) -> RelayResult<SynthesizedAudio> {
        let request = SynthesisRequest::validate(body)?;
        self.synthesize(request).await
    }
}

/// Shared handle used by the application state
pub type SharedSynthesizer = Arc<dyn SpeechSynthesizer>;
