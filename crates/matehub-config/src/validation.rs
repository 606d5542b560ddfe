// SPDX-FileCopyrightText: 2026 MateHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as URL shape, delay ordering, and backoff bounds.

use crate::diagnostic::ConfigError;
use crate::model::MatehubConfig;

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &MatehubConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let base_url = config.api.base_url.trim();
    if base_url.is_empty() {
        errors.push(ConfigError::Validation {
            message: "api.base_url must not be empty".to_string(),
        });
    } else if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        errors.push(ConfigError::Validation {
            message: format!("api.base_url `{base_url}` must start with http:// or https://"),
        });
    }

    if config.api.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "api.request_timeout_secs must be at least 1".to_string(),
        });
    }

    if config.chat.model.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "chat.model must not be empty".to_string(),
        });
    }

    if config.chat.page_size == 0 || config.chat.page_size > 100 {
        errors.push(ConfigError::Validation {
            message: format!(
                "chat.page_size must be between 1 and 100, got {}",
                config.chat.page_size
            ),
        });
    }

    if config.poll.max_attempts == 0 {
        errors.push(ConfigError::Validation {
            message: "poll.max_attempts must be at least 1".to_string(),
        });
    }

    if config.poll.initial_delay_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "poll.initial_delay_ms must be at least 1".to_string(),
        });
    }

    if config.poll.max_delay_ms < config.poll.initial_delay_ms {
        errors.push(ConfigError::Validation {
            message: format!(
                "poll.max_delay_ms ({}) must not be less than poll.initial_delay_ms ({})",
                config.poll.max_delay_ms, config.poll.initial_delay_ms
            ),
        });
    }

    if config.poll.backoff_factor < 1.0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "poll.backoff_factor must be at least 1.0, got {}",
                config.poll.backoff_factor
            ),
        });
    }

    if !VALID_LOG_LEVELS.contains(&config.log.level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level `{}` is not one of: {}",
                config.log.level,
                VALID_LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&MatehubConfig::default()).is_ok());
    }

    #[test]
    fn empty_base_url_is_rejected() {
        let mut config = MatehubConfig::default();
        config.api.base_url = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.to_string().contains("base_url")));
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let mut config = MatehubConfig::default();
        config.api.base_url = "ftp://chat.example.com".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let mut config = MatehubConfig::default();
        config.chat.page_size = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn shrinking_backoff_is_rejected() {
        let mut config = MatehubConfig::default();
        config.poll.backoff_factor = 0.5;
        let errors = validate_config(&config).unwrap_err();
        assert!(
            errors
                .iter()
                .any(|e| e.to_string().contains("backoff_factor"))
        );
    }

    #[test]
    fn inverted_delay_bounds_are_rejected() {
        let mut config = MatehubConfig::default();
        config.poll.initial_delay_ms = 6000;
        config.poll.max_delay_ms = 5000;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = MatehubConfig::default();
        config.api.base_url = String::new();
        config.chat.page_size = 0;
        config.poll.max_attempts = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.len() >= 3);
    }

    #[test]
    fn bogus_log_level_is_rejected() {
        let mut config = MatehubConfig::default();
        config.log.level = "verbose".to_string();
        assert!(validate_config(&config).is_err());
    }
}
