//! Service account credential used to authenticate the relay to Google Cloud.
//!
//! The credential is read once at startup from `GCP_SERVICE_ACCOUNT_JSON` (or the
//! YAML equivalent). The value can be either:
//! - Inline JSON content starting with `{` (for secrets management)
//! - A path to a service account JSON key file
//!
//! Only `client_email`, `private_key` and the optional `token_uri` fields of the key
//! file are used; everything else is ignored.

use std::fmt;
use std::path::Path;

use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::config_error::{ConfigError, ConfigResult};

/// Service account key pair as found in a Google Cloud JSON key file.
///
/// Secret material is zeroized when the value is dropped and never printed by `Debug`.
#[derive(Clone, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct ServiceAccountCredential {
    pub client_email: String,
    #[serde(rename = "private_key")]
    pub private_key_pem: String,
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl ServiceAccountCredential {
    pub fn new(client_email: impl Into<String>, private_key_pem: impl Into<String>) -> Self {
        Self {
            client_email: client_email.into(),
            private_key_pem: private_key_pem.into(),
            token_uri: None,
        }
    }

    /// Parse a service account from the contents of a JSON key file.
    ///
    /// Keys pasted into environment variables frequently keep their newlines as
    /// literal `\n` sequences; those are turned back into real newlines so the PEM
    /// can be imported.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let mut credential: Self = serde_json::from_str(json)
            .map_err(|e| ConfigError::Credential(format!("malformed service account JSON: {e}")))?;

        if credential.client_email.trim().is_empty() {
            return Err(ConfigError::Credential(
                "client_email must not be empty".to_string(),
            ));
        }
        if credential.private_key_pem.trim().is_empty() {
            return Err(ConfigError::Credential(
                "private_key must not be empty".to_string(),
            ));
        }

        if credential.private_key_pem.contains("\\n") {
            let normalized = credential.private_key_pem.replace("\\n", "\n");
            let mut escaped = std::mem::replace(&mut credential.private_key_pem, normalized);
            escaped.zeroize();
        }

        Ok(credential)
    }

    /// Load a credential from either inline JSON or a key file path.
    pub fn load(value: &str) -> ConfigResult<Self> {
        let trimmed = value.trim();
        if trimmed.starts_with('{') {
            return Self::from_json(trimmed);
        }

        let path = Path::new(trimmed);
        let mut contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        let credential = Self::from_json(&contents);
        contents.zeroize();
        credential
    }
}

impl fmt::Debug for ServiceAccountCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountCredential")
            .field("client_email", &self.client_email)
            .field("private_key_pem", &"[REDACTED]")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}
