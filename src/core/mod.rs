//! Relay core: credential signing, token exchange and the synthesis relay.
//!
//! - `credentials` - service account key loading
//! - `signer` - RS256 JWT assertion signing
//! - `token` - JWT-bearer token exchange
//! - `synthesis` - request validation and the Google Cloud TTS relay
//! - `audio` - audio payload decoding

pub mod audio;
pub mod credentials;
pub mod signer;
pub mod synthesis;
pub mod token;

pub use audio::{AUDIO_MPEG, decode_audio_content, encode_audio_content};
pub use credentials::ServiceAccountCredential;
pub use signer::{AssertionClaims, SignerError, assertion_for, sign_assertion};
pub use synthesis::{
    DEFAULT_SYNTHESIS_URL, GoogleSpeechRelay, SharedSynthesizer, SpeechRequestBody,
    SpeechSynthesizer, SynthesisRequest, SynthesizedAudio,
};
pub use token::{AccessToken, DEFAULT_TOKEN_URL, TokenError, exchange};
