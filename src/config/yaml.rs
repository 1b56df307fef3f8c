use serde::Deserialize;
use std::path::Path;

use crate::errors::config_error::{ConfigError, ConfigResult};

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Values present here
/// override environment variables.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 3001
///   tls:
///     cert_path: "/etc/speech-relay/cert.pem"
///     key_path: "/etc/speech-relay/key.pem"
///
/// google:
///   # Inline JSON or a path to the service account key file
///   service_account: "/etc/speech-relay/service-account.json"
///   token_url: "https://oauth2.googleapis.com/token"
///   synthesis_url: "https://texttospeech.googleapis.com/v1/text:synthesize"
///
/// security:
///   api_key: "relay-client-key"
///   rate_limit_requests_per_second: 60
///   rate_limit_burst_size: 10
///
/// catalog:
///   path: "/etc/speech-relay/voice_catalog.yaml"
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub google: Option<GoogleYaml>,
    pub security: Option<SecurityYaml>,
    pub catalog: Option<CatalogYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub tls: Option<TlsYaml>,
}

/// TLS configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TlsYaml {
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

/// Google Cloud settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GoogleYaml {
    /// Service account credentials - can be:
    /// - Path to service account JSON file
    /// - Inline JSON content (for secrets management)
    pub service_account: Option<String>,
    pub token_url: Option<String>,
    pub synthesis_url: Option<String>,
}

/// Security configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SecurityYaml {
    /// Key clients must present to use the relay
    pub api_key: Option<String>,
    /// Maximum requests per second per IP address
    pub rate_limit_requests_per_second: Option<u32>,
    /// Maximum burst size for rate limiting
    pub rate_limit_burst_size: Option<u32>,
}

/// Voice catalog location from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CatalogYaml {
    pub path: Option<String>,
}

impl YamlConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or the YAML is malformed.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_str(&contents)
    }

    /// Parse configuration from a YAML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(contents: &str) -> ConfigResult<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }
}
