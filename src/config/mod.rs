//! Configuration module for the speech relay
//!
//! Configuration comes from `.env` files, environment variables and an optional
//! YAML file. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//!
//! # Example
//! ```rust,no_run
//! use speech_relay::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config = ServerConfig::from_file(&PathBuf::from("config.yaml"))?;
//!
//! println!("Relay listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

pub mod env;
mod merge;
mod validation;
mod yaml;

pub use yaml::YamlConfig;

use crate::core::credentials::ServiceAccountCredential;
use crate::errors::config_error::ConfigResult;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3001;

/// TLS configuration for HTTPS
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// Path to the TLS certificate file (PEM format)
    pub cert_path: PathBuf,
    /// Path to the TLS private key file (PEM format)
    pub key_path: PathBuf,
}

/// Server configuration
///
/// Secret fields are zeroized on drop, so build variants in tests by mutating
/// fields rather than with struct update syntax.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Optional TLS settings; plain HTTP when absent
    pub tls: Option<TlsConfig>,

    /// Parsed Google service account. `None` makes every synthesis request
    /// fail with the credentials-not-configured error.
    pub service_account: Option<ServiceAccountCredential>,
    /// Token endpoint override; falls back to the credential's `token_uri`
    pub token_url: Option<String>,
    pub synthesis_url: String,

    /// Key clients must present. When unset the relay is open.
    pub relay_api_key: Option<String>,

    pub rate_limit_requests_per_second: u32,
    pub rate_limit_burst_size: u32,

    /// Voice catalog override for the form front-end
    pub voice_catalog_path: Option<PathBuf>,
}

impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut key) = self.relay_api_key {
            key.zeroize();
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// `.env` is expected to have been loaded by `main` already.
    pub fn from_env() -> ConfigResult<Self> {
        let config = merge::merge_config(None)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a YAML file, with environment variables as the base
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let yaml_config = YamlConfig::from_file(path)?;
        let config = merge::merge_config(Some(yaml_config))?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Socket address string for binding
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_tls_enabled(&self) -> bool {
        self.tls.is_some()
    }

    pub fn has_credential(&self) -> bool {
        self.service_account.is_some()
    }

    pub fn requires_api_key(&self) -> bool {
        self.relay_api_key.is_some()
    }
}
