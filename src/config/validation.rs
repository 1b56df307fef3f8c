use url::Url;

use super::ServerConfig;
use crate::errors::config_error::{ConfigError, ConfigResult};

/// Validate an endpoint URL (must be absolute http or https)
pub(crate) fn validate_endpoint(name: &str, value: &str) -> ConfigResult<()> {
    let url = Url::parse(value).map_err(|e| ConfigError::invalid_value(name, e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::invalid_value(
            name,
            format!("unsupported scheme '{other}'"),
        )),
    }
}

/// Rate limiter settings must be non-zero
pub(crate) fn validate_rate_limit(rps: u32, burst: u32) -> ConfigResult<()> {
    if rps == 0 {
        return Err(ConfigError::invalid_value(
            "rate_limit_requests_per_second",
            "must be greater than 0",
        ));
    }
    if burst == 0 {
        return Err(ConfigError::invalid_value(
            "rate_limit_burst_size",
            "must be greater than 0",
        ));
    }
    Ok(())
}

pub(crate) fn validate(config: &ServerConfig) -> ConfigResult<()> {
    validate_endpoint("synthesis_url", &config.synthesis_url)?;
    if let Some(token_url) = &config.token_url {
        validate_endpoint("token_url", token_url)?;
    }
    validate_rate_limit(
        config.rate_limit_requests_per_second,
        config.rate_limit_burst_size,
    )?;
    if let Some(key) = &config.relay_api_key
        && key.trim().is_empty()
    {
        return Err(ConfigError::invalid_value("relay_api_key", "must not be blank"));
    }
    Ok(())
}
