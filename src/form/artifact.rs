use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;

use crate::core::synthesis::SynthesizedAudio;

/// Audio produced by the last successful generation
#[derive(Debug, Clone, PartialEq)]
pub struct AudioArtifact {
    data: Bytes,
    content_type: String,
}

impl AudioArtifact {
    pub fn new(data: Bytes, content_type: impl Into<String>) -> Self {
        Self {
            data,
            content_type: content_type.into(),
        }
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write the audio into `dir` as `voice-<unix-millis>.mp3`
    pub async fn download(&self, dir: &Path) -> std::io::Result<PathBuf> {
        let path = dir.join(download_file_name(unix_millis()));
        tokio::fs::write(&path, &self.data).await?;
        tracing::info!(path = %path.display(), bytes = self.data.len(), "Saved audio");
        Ok(path)
    }
}

impl From<SynthesizedAudio> for AudioArtifact {
    fn from(audio: SynthesizedAudio) -> Self {
        Self::new(audio.data, audio.content_type)
    }
}

pub fn download_file_name(millis: u128) -> String {
    format!("voice-{millis}.mp3")
}

/// Line printed after a download telling the user how to listen to it
pub fn playback_hint(path: &Path) -> String {
    format!(
        "Play it with any MP3 player, e.g. `ffplay -nodisp -autoexit {}`",
        path.display()
    )
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::audio::AUDIO_MPEG;
    use tempfile::TempDir;

    #[test]
    fn test_download_file_name() {
        assert_eq!(download_file_name(1700000000123), "voice-1700000000123.mp3");
    }

    #[test]
    fn test_playback_hint_names_file() {
        let hint = playback_hint(Path::new("/tmp/voice-1700000000123.mp3"));
        assert!(hint.ends_with("/tmp/voice-1700000000123.mp3`"));
    }

    #[tokio::test]
    async fn test_download_writes_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let artifact = AudioArtifact::new(Bytes::from_static(b"ID3\x03audio"), AUDIO_MPEG);

        let path = artifact.download(temp_dir.path()).await.unwrap();

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("voice-"));
        assert!(name.ends_with(".mp3"));
        assert_eq!(std::fs::read(&path).unwrap(), b"ID3\x03audio");
    }

    #[test]
    fn test_from_synthesized_audio() {
        let artifact = AudioArtifact::from(SynthesizedAudio {
            data: Bytes::from_static(b"ABC"),
            content_type: AUDIO_MPEG,
        });
        assert_eq!(artifact.len(), 3);
        assert_eq!(artifact.content_type(), "audio/mpeg");
    }
}
