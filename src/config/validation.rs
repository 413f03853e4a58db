use crate::config::types::{ClassifierConfig, Config, DispatchConfig, UserAgentConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_dispatch_config(&config.dispatch)?;
    validate_classifier_config(&config.classifier)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates dispatch configuration
pub(crate) fn validate_dispatch_config(config: &DispatchConfig) -> Result<(), ConfigError> {
    validate_ceiling(config.max_concurrent_requests)?;

    if config.request_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_ms must be >= 1ms".to_string(),
        ));
    }

    Ok(())
}

/// Validates a concurrency ceiling
pub(crate) fn validate_ceiling(ceiling: usize) -> Result<(), ConfigError> {
    if ceiling < 1 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_requests must be >= 1, got {}",
            ceiling
        )));
    }
    Ok(())
}

/// Validates classifier configuration
fn validate_classifier_config(config: &ClassifierConfig) -> Result<(), ConfigError> {
    if !config.confidence_threshold.is_finite() {
        return Err(ConfigError::Validation(format!(
            "confidence_threshold must be a finite number, got {}",
            config.confidence_threshold
        )));
    }
    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    Ok(())
}
