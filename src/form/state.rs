//! Form model behind the front end.
//!
//! Holds what the user has entered, the in-flight flag, the last error and the
//! last generated audio. Transitions:
//!
//! ```text
//! idle --begin_generation--> loading --complete_success--> idle (audio set)
//!                                    --complete_failure--> idle (error set)
//! ```

use thiserror::Error;

use super::artifact::AudioArtifact;
use super::catalog::VoiceCatalog;
use crate::core::synthesis::{PITCH_RANGE, SPEAKING_RATE_RANGE, SpeechRequestBody};

pub const DEFAULT_LANGUAGE: &str = "en-US";
pub const DEFAULT_VOICE: &str = "en-US-Standard-C";
pub const DEFAULT_SPEED: f64 = 1.0;
pub const DEFAULT_PITCH: f64 = 0.0;

pub const EMPTY_TEXT_MESSAGE: &str = "Please enter some text to convert";

/// Why a generation could not start
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateRefused {
    #[error("Please enter some text to convert")]
    EmptyText,
    #[error("A generation is already in progress")]
    InFlight,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    text: String,
    language: String,
    voice: String,
    speed: f64,
    pitch: f64,
    audio: Option<AudioArtifact>,
    loading: bool,
    error: Option<String>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            text: String::new(),
            language: DEFAULT_LANGUAGE.to_string(),
            voice: DEFAULT_VOICE.to_string(),
            speed: DEFAULT_SPEED,
            pitch: DEFAULT_PITCH,
            audio: None,
            loading: false,
            error: None,
        }
    }
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Character count shown under the text box
    pub fn text_chars(&self) -> usize {
        self.text.chars().count()
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn voice(&self) -> &str {
        &self.voice
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    pub fn audio(&self) -> Option<&AudioArtifact> {
        self.audio.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Switch language and select its first catalog voice.
    ///
    /// The voice becomes empty when the catalog has no voices for `code`.
    pub fn set_language(&mut self, code: impl Into<String>, catalog: &VoiceCatalog) {
        let code = code.into();
        self.voice = catalog.first_voice(&code).unwrap_or_default().to_string();
        self.language = code;
    }

    pub fn set_voice(&mut self, voice: impl Into<String>) {
        self.voice = voice.into();
    }

    /// Clamped to the slider range (0.25 to 4.0)
    pub fn set_speed(&mut self, speed: f64) {
        if speed.is_finite() {
            self.speed = speed.clamp(*SPEAKING_RATE_RANGE.start(), *SPEAKING_RATE_RANGE.end());
        }
    }

    /// Clamped to the slider range (-20 to 20)
    pub fn set_pitch(&mut self, pitch: f64) {
        if pitch.is_finite() {
            self.pitch = pitch.clamp(*PITCH_RANGE.start(), *PITCH_RANGE.end());
        }
    }

    /// False while a generation is in flight or when the text is blank
    pub fn can_generate(&self) -> bool {
        !self.loading && !self.text.trim().is_empty()
    }

    /// Start a generation and return the payload to send to the relay.
    ///
    /// Blank text records [`EMPTY_TEXT_MESSAGE`] as the form error and leaves the
    /// rest of the state alone.
    pub fn begin_generation(&mut self) -> Result<SpeechRequestBody, GenerateRefused> {
        if self.loading {
            return Err(GenerateRefused::InFlight);
        }
        if self.text.trim().is_empty() {
            self.error = Some(EMPTY_TEXT_MESSAGE.to_string());
            return Err(GenerateRefused::EmptyText);
        }

        self.loading = true;
        self.error = None;
        self.audio = None;

        Ok(SpeechRequestBody {
            text: Some(self.text.clone()),
            language: Some(self.language.clone()),
            voice: Some(self.voice.clone()),
            speed: Some(self.speed),
            pitch: Some(self.pitch),
        })
    }

    pub fn complete_success(&mut self, audio: AudioArtifact) {
        self.audio = Some(audio);
        self.loading = false;
    }

    pub fn complete_failure(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.audio = None;
        self.loading = false;
    }
}
