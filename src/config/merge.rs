use std::path::PathBuf;

use super::env::EnvConfig;
use super::yaml::YamlConfig;
use super::{DEFAULT_HOST, DEFAULT_PORT, ServerConfig, TlsConfig};
use crate::core::credentials::ServiceAccountCredential;
use crate::core::synthesis::DEFAULT_SYNTHESIS_URL;
use crate::errors::config_error::{ConfigError, ConfigResult};

const DEFAULT_RATE_LIMIT_RPS: u32 = 60;
const DEFAULT_RATE_LIMIT_BURST: u32 = 10;

/// Build a `ServerConfig` from environment variables, overridden by `yaml` when
/// given.
///
/// The service account is parsed here so that a malformed credential fails at
/// startup rather than on the first request.
pub(crate) fn merge_config(yaml: Option<YamlConfig>) -> ConfigResult<ServerConfig> {
    let env = EnvConfig::load()?;
    let yaml = yaml.unwrap_or_default();

    let server = yaml.server.unwrap_or_default();
    let google = yaml.google.unwrap_or_default();
    let security = yaml.security.unwrap_or_default();
    let catalog = yaml.catalog.unwrap_or_default();
    let tls_yaml = server.tls.unwrap_or_default();

    let host = server
        .host
        .or(env.host)
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = server.port.or(env.port).unwrap_or(DEFAULT_PORT);

    let tls = match (
        tls_yaml.cert_path.or(env.tls_cert_path),
        tls_yaml.key_path.or(env.tls_key_path),
    ) {
        (Some(cert_path), Some(key_path)) => Some(TlsConfig {
            cert_path: PathBuf::from(cert_path),
            key_path: PathBuf::from(key_path),
        }),
        (None, None) => None,
        _ => return Err(ConfigError::IncompleteTls),
    };

    let service_account = google
        .service_account
        .or(env.service_account)
        .map(|value| ServiceAccountCredential::load(&value))
        .transpose()?;

    Ok(ServerConfig {
        host,
        port,
        tls,
        service_account,
        token_url: google.token_url.or(env.token_url),
        synthesis_url: google
            .synthesis_url
            .or(env.synthesis_url)
            .unwrap_or_else(|| DEFAULT_SYNTHESIS_URL.to_string()),
        relay_api_key: security.api_key.or(env.api_key),
        rate_limit_requests_per_second: security
            .rate_limit_requests_per_second
            .or(env.rate_limit_requests_per_second)
            .unwrap_or(DEFAULT_RATE_LIMIT_RPS),
        rate_limit_burst_size: security
            .rate_limit_burst_size
            .or(env.rate_limit_burst_size)
            .unwrap_or(DEFAULT_RATE_LIMIT_BURST),
        voice_catalog_path: catalog
            .path
            .or(env.voice_catalog_path)
            .map(PathBuf::from),
    })
}
