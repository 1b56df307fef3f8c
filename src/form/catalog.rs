use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::env::{VOICE_CATALOG_PATH, var};

/// Catalog compiled into the binary; used when no override file is configured.
pub const EMBEDDED_CATALOG: &str = include_str!("../../data/voice_catalog.yaml");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read voice catalog {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse voice catalog: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Voice catalog has no languages")]
    Empty,

    #[error("Voice catalog lists language '{0}' more than once")]
    DuplicateLanguage(String),
}

/// A selectable voice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceOption {
    /// Upstream voice name, e.g. `en-US-Standard-C`
    pub name: String,
    /// Human readable label, e.g. `Standard C (Female)`
    pub label: String,
}

/// A language and the voices offered for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageEntry {
    /// BCP-47 code, e.g. `en-US`
    pub code: String,
    /// Display name, e.g. `English (US)`
    pub name: String,
    #[serde(default)]
    pub voices: Vec<VoiceOption>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    languages: Vec<LanguageEntry>,
}

/// Languages and voices offered by the form, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceCatalog {
    languages: Vec<LanguageEntry>,
}

impl VoiceCatalog {
    /// The catalog shipped with the binary
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_yaml(EMBEDDED_CATALOG)
    }

    /// Load the override file when given, the embedded catalog otherwise
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::embedded(),
        }
    }

    /// Like [`VoiceCatalog::load`], falling back to `VOICE_CATALOG_PATH` when no
    /// path is given
    pub fn resolve(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::load(var(VOICE_CATALOG_PATH).map(PathBuf::from).as_deref()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path).map_err(|e| CatalogError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(contents)?;
        if file.languages.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for language in &file.languages {
            if !seen.insert(language.code.as_str()) {
                return Err(CatalogError::DuplicateLanguage(language.code.clone()));
            }
        }

        Ok(Self {
            languages: file.languages,
        })
    }

    pub fn languages(&self) -> &[LanguageEntry] {
        &self.languages
    }

    pub fn language(&self, code: &str) -> Option<&LanguageEntry> {
        self.languages.iter().find(|language| language.code == code)
    }

    /// Voices for `code`; empty for unknown languages
    pub fn voices(&self, code: &str) -> &[VoiceOption] {
        self.language(code)
            .map(|language| language.voices.as_slice())
            .unwrap_or_default()
    }

    /// Voice selected when the form switches to `code`
    pub fn first_voice(&self, code: &str) -> Option<&str> {
        self.voices(code).first().map(|voice| voice.name.as_str())
    }

    pub fn contains_voice(&self, code: &str, voice: &str) -> bool {
        self.voices(code).iter().any(|option| option.name == voice)
    }
}
