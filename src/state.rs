use std::sync::Arc;

use crate::config::ServerConfig;
use crate::core::synthesis::{GoogleSpeechRelay, SharedSynthesizer};
use crate::form::catalog::{CatalogError, VoiceCatalog};

/// State shared by every request handler
pub struct AppState {
    pub config: ServerConfig,
    pub synthesizer: SharedSynthesizer,
    pub catalog: VoiceCatalog,
}

impl AppState {
    /// Build the state from configuration, wiring a `GoogleSpeechRelay` with the
    /// configured credential and endpoints.
    pub fn new(config: ServerConfig) -> Result<Arc<Self>, CatalogError> {
        let mut relay = GoogleSpeechRelay::new(config.service_account.clone())
            .with_synthesis_url(config.synthesis_url.clone());
        if let Some(token_url) = &config.token_url {
            relay = relay.with_token_url(token_url.clone());
        }

        if !relay.has_credential() {
            tracing::warn!(
                "No Google Cloud service account configured; synthesis requests will fail"
            );
        }

        Self::with_synthesizer(config, Arc::new(relay))
    }

    /// Build the state around an existing synthesizer
    pub fn with_synthesizer(
        config: ServerConfig,
        synthesizer: SharedSynthesizer,
    ) -> Result<Arc<Self>, CatalogError> {
        let catalog = VoiceCatalog::load(config.voice_catalog_path.as_deref())?;
        Ok(Arc::new(Self {
            config,
            synthesizer,
            catalog,
        }))
    }
}
