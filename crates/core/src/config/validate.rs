use super::{types::Config, ConfigError};

/// Validate configuration beyond what serde enforces:
/// - server port is not 0
/// - configured provider sections have non-empty keys/URLs
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if let Some(metadata) = &config.metadata {
        if metadata.api_key.is_empty() {
            return Err(ConfigError::ValidationError(
                "metadata.api_key cannot be empty".to_string(),
            ));
        }
    }

    if let Some(sports) = &config.sports {
        if sports.base_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "sports.base_url cannot be empty".to_string(),
            ));
        }
    }

    if let Some(downloads) = &config.downloads {
        if downloads.base_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "downloads.base_url cannot be empty".to_string(),
            ));
        }
    }

    if let Some(vision) = &config.vision {
        if vision.api_key.is_empty() || vision.model.is_empty() {
            return Err(ConfigError::ValidationError(
                "vision.api_key and vision.model must be set".to_string(),
            ));
        }
    }

    Ok(())
}
