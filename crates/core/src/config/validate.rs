use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Storage root is not empty
/// - Wikipedia base URL is an http(s) URL
/// - Fetch timeout is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.storage.root.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.root cannot be empty".to_string(),
        ));
    }

    let base_url = &config.wikipedia.base_url;
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "wikipedia.base_url must be an http(s) URL, got '{}'",
            base_url
        )));
    }

    if config.fetch.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "fetch.timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
