//! Configuration validation utilities.

use serde_json::Value;

use super::error::{ConfigError, ConfigResult};
use super::schema::{LogOutput, LoggingConfig, RelayConfig};

/// Validates the configuration.
///
/// Service sections are only checked for URL shapes: every non-blank string
/// under a key ending in `_url` must pass [`validate_url`]. Everything else in
/// them is validated by the service that reads the section.
pub fn validate_config(config: &RelayConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;

    for (section, value) in &config.services {
        validate_service_urls(section, value)?;
    }

    if config.http.timeout_secs == 0 {
        return Err(ConfigError::validation(
            "http.timeout_secs must be greater than 0",
        ));
    }

    if config.http.user_agent.trim().is_empty() {
        return Err(ConfigError::missing_field("http.user_agent"));
    }

    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "logging.output is \"file\" but logging.file_path is not set",
        ));
    }

    for target in logging.filters.keys() {
        if target.is_empty() || target.contains(char::is_whitespace) {
            return Err(ConfigError::validation(format!(
                "Invalid log filter target: {target:?}"
            )));
        }
    }

    Ok(())
}

fn validate_service_urls(section: &str, value: &Value) -> ConfigResult<()> {
    let Value::Object(fields) = value else {
        return Ok(());
    };

    for (key, field) in fields {
        let Some(url) = field.as_str() else {
            continue;
        };
        if !key.ends_with("_url") || url.trim().is_empty() {
            continue;
        }
        validate_url(url).map_err(|e| match e {
            ConfigError::InvalidUrl { url, reason } => {
                ConfigError::invalid_url(url, format!("{section}.{key}: {reason}"))
            }
            other => other,
        })?;
    }

    Ok(())
}

/// Checks that `url` is an absolute `http` or `https` URL with a host.
pub fn validate_url(url: &str) -> ConfigResult<()> {
    let Some((scheme, rest)) = url.split_once("://") else {
        return Err(ConfigError::invalid_url(url, "missing scheme"));
    };

    if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
        return Err(ConfigError::invalid_url(
            url,
            format!("unsupported scheme '{scheme}'"),
        ));
    }

    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if host.is_empty() || host.contains(char::is_whitespace) {
        return Err(ConfigError::invalid_url(url, "missing host"));
    }

    Ok(())
}
