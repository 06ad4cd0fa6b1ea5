use crate::config::types::{Config, DownloadConfig, HttpConfig, MirrorConfig};
use crate::download::parse_rate_limit;
use crate::ConfigError;

/// Upper bound on `max-redirects`; anything larger is almost always a typo
const MAX_REDIRECT_LIMIT: usize = 20;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_mirror_config(&config.mirror)?;
    validate_http_config(&config.http)?;
    validate_download_config(&config.download)?;
    Ok(())
}

/// Validates mirror policy lists
fn validate_mirror_config(config: &MirrorConfig) -> Result<(), ConfigError> {
    if config.reject.iter().any(|s| s.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "reject list cannot contain empty suffixes".to_string(),
        ));
    }

    if config.exclude.iter().any(|p| p.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "exclude list cannot contain empty prefixes".to_string(),
        ));
    }

    if config.output_dir.is_empty() {
        return Err(ConfigError::Validation(
            "output_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates HTTP client settings
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.max_redirects > MAX_REDIRECT_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max_redirects must be <= {}, got {}",
            MAX_REDIRECT_LIMIT, config.max_redirects
        )));
    }

    Ok(())
}

/// Validates downloader settings
fn validate_download_config(config: &DownloadConfig) -> Result<(), ConfigError> {
    if let Some(rate) = &config.rate_limit {
        parse_rate_limit(rate)?;
    }
    Ok(())
}
