//! Relay request types and Google Cloud TTS wire messages.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::core::audio::AUDIO_ENCODING_MP3;
use crate::errors::relay_error::{RelayError, RelayResult};

/// Accepted speaking rates (1.0 is normal speed)
pub const SPEAKING_RATE_RANGE: RangeInclusive<f64> = 0.25..=4.0;

/// Accepted pitch shift in semitones
pub const PITCH_RANGE: RangeInclusive<f64> = -20.0..=20.0;

/// JSON body of `POST /text-to-speech` as sent by the form.
///
/// Every field is optional on the wire so that a missing field surfaces as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeechRequestBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
}

/// A validated synthesis request
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    pub text: String,
    pub language_code: String,
    pub voice_name: String,
    pub speaking_rate: Option<f64>,
    pub pitch_semitones: Option<f64>,
}

impl SynthesisRequest {
    /// Validate an inbound body.
    ///
    /// `text`, `language` and `voice` must be present and non-empty. Prosody values
    /// are optional but must be finite and inside their ranges when given.
    pub fn validate(body: SpeechRequestBody) -> RelayResult<Self> {
        let SpeechRequestBody {
            text,
            language,
            voice,
            speed,
            pitch,
        } = body;

        let (Some(text), Some(language_code), Some(voice_name)) = (
            text.filter(|s| !s.is_empty()),
            language.filter(|s| !s.is_empty()),
            voice.filter(|s| !s.is_empty()),
        ) else {
            return Err(RelayError::missing_fields());
        };

        if let Some(rate) = speed {
            check_range("speed", rate, &SPEAKING_RATE_RANGE)?;
        }
        if let Some(semitones) = pitch {
            check_range("pitch", semitones, &PITCH_RANGE)?;
        }

        Ok(Self {
            text,
            language_code,
            voice_name,
            speaking_rate: speed,
            pitch_semitones: pitch,
        })
    }
}

fn check_range(name: &str, value: f64, range: &RangeInclusive<f64>) -> RelayResult<()> {
    if value.is_finite() && range.contains(&value) {
        Ok(())
    } else {
        Err(RelayError::validation(format!(
            "{name} must be between {} and {}",
            range.start(),
            range.end()
        )))
    }
}

/// Body of `POST v1/text:synthesize`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizeRequest {
    pub input: SynthesisInput,
    pub voice: VoiceSelectionParams,
    pub audio_config: AudioConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesisInput {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSelectionParams {
    pub language_code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioConfig {
    pub audio_encoding: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaking_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
}

impl From<&SynthesisRequest> for SynthesizeRequest {
    fn from(request: &SynthesisRequest) -> Self {
        Self {
            input: SynthesisInput {
                text: request.text.clone(),
            },
            voice: VoiceSelectionParams {
                language_code: request.language_code.clone(),
                name: request.voice_name.clone(),
            },
            audio_config: AudioConfig {
                audio_encoding: AUDIO_ENCODING_MP3.to_string(),
                speaking_rate: request.speaking_rate,
                pitch: request.pitch_semitones,
            },
        }
    }
}

/// Successful response of `v1/text:synthesize`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizeResponse {
    pub audio_content: String,
}
