use std::env;
use std::fmt::Display;
use std::str::FromStr;

use crate::errors::config_error::{ConfigError, ConfigResult};

pub const HOST: &str = "HOST";
pub const PORT: &str = "PORT";
pub const TLS_CERT_PATH: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH: &str = "TLS_KEY_PATH";
pub const GCP_SERVICE_ACCOUNT_JSON: &str = "GCP_SERVICE_ACCOUNT_JSON";
pub const GCP_TOKEN_URL: &str = "GCP_TOKEN_URL";
pub const GCP_TTS_URL: &str = "GCP_TTS_URL";
pub const RELAY_API_KEY: &str = "RELAY_API_KEY";
pub const RATE_LIMIT_REQUESTS_PER_SECOND: &str = "RATE_LIMIT_REQUESTS_PER_SECOND";
pub const RATE_LIMIT_BURST_SIZE: &str = "RATE_LIMIT_BURST_SIZE";
pub const VOICE_CATALOG_PATH: &str = "VOICE_CATALOG_PATH";

/// Raw values read from the process environment (after `.env` has been loaded).
///
/// Empty or whitespace-only variables are treated as unset.
#[derive(Debug, Default)]
pub(crate) struct EnvConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub tls_cert_path: Option<String>,
    pub tls_key_path: Option<String>,
    pub service_account: Option<String>,
    pub token_url: Option<String>,
    pub synthesis_url: Option<String>,
    pub api_key: Option<String>,
    pub rate_limit_requests_per_second: Option<u32>,
    pub rate_limit_burst_size: Option<u32>,
    pub voice_catalog_path: Option<String>,
}

impl EnvConfig {
    pub fn load() -> ConfigResult<Self> {
        Ok(Self {
            host: var(HOST),
            port: parse_var(PORT)?,
            tls_cert_path: var(TLS_CERT_PATH),
            tls_key_path: var(TLS_KEY_PATH),
            service_account: var(GCP_SERVICE_ACCOUNT_JSON),
            token_url: var(GCP_TOKEN_URL),
            synthesis_url: var(GCP_TTS_URL),
            api_key: var(RELAY_API_KEY),
            rate_limit_requests_per_second: parse_var(RATE_LIMIT_REQUESTS_PER_SECOND)?,
            rate_limit_burst_size: parse_var(RATE_LIMIT_BURST_SIZE)?,
            voice_catalog_path: var(VOICE_CATALOG_PATH),
        })
    }
}

pub(crate) fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_var<T>(name: &str) -> ConfigResult<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    var(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::invalid_value(name, format!("'{raw}': {e}")))
        })
        .transpose()
}
