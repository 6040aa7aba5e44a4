use url::Url;

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Tracker URL is an absolute http(s) URL
/// - Request timeout is not 0
/// - Username is not empty
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let root = config.tracker.root();
    let url = Url::parse(&root).map_err(|e| {
        ConfigError::ValidationError(format!("tracker.url is not a valid URL: {}", e))
    })?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::ValidationError(format!(
            "tracker.url must use http or https, got {}",
            url.scheme()
        )));
    }

    if config.tracker.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "tracker.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.credentials.username.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "credentials.username cannot be empty".to_string(),
        ));
    }

    Ok(())
}
