use base64::{Engine as _, engine::general_purpose::STANDARD};
use bytes::Bytes;

/// Content type of synthesized audio
pub const AUDIO_MPEG: &str = "audio/mpeg";

/// Upstream audio encoding requested for every synthesis
pub const AUDIO_ENCODING_MP3: &str = "MP3";

/// Decode the base64 `audioContent` field of a synthesis response.
pub fn decode_audio_content(encoded: &str) -> Result<Bytes, base64::DecodeError> {
    STANDARD.decode(encoded.trim()).map(Bytes::from)
}

/// Inverse of [`decode_audio_content`]
pub fn encode_audio_content(audio: &[u8]) -> String {
    STANDARD.encode(audio)
}
