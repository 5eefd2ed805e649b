// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as URL schemes and minimum intervals.

use std::str::FromStr;

use carelink_core::types::SenderRole;

use crate::diagnostic::ConfigError;
use crate::model::CarelinkConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &CarelinkConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let base_url = config.api.base_url.trim();
    if base_url.is_empty() {
        errors.push(ConfigError::Validation {
            message: "api.base_url must not be empty".to_string(),
        });
    } else if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        errors.push(ConfigError::Validation {
            message: format!("api.base_url `{base_url}` must use http:// or https://"),
        });
    }

    if config.api.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "api.request_timeout_secs must be at least 1".to_string(),
        });
    }

    if config.chat.poll_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "chat.poll_interval_secs must be at least 1".to_string(),
        });
    }

    if config.chat.window_before_minutes < 0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "chat.window_before_minutes must be non-negative, got {}",
                config.chat.window_before_minutes
            ),
        });
    }

    if config.chat.window_after_minutes < 0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "chat.window_after_minutes must be non-negative, got {}",
                config.chat.window_after_minutes
            ),
        });
    }

    if SenderRole::from_str(&config.app.user_role).is_err() {
        errors.push(ConfigError::Validation {
            message: format!(
                "app.user_role must be `patient` or `doctor`, got `{}`",
                config.app.user_role
            ),
        });
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.app.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "app.log_level must be one of trace/debug/info/warn/error, got `{}`",
                config.app.log_level
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
    fn default_config_validates() {
        let config = CarelinkConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_base_url_fails_validation() {
        let mut config = CarelinkConfig::default();
        config.api.base_url = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("base_url"))));
    }

    #[test]
    fn non_http_base_url_fails_validation() {
        let mut config = CarelinkConfig::default();
        config.api.base_url = "ftp://clinic.example".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn zero_poll_interval_fails_validation() {
        let mut config = CarelinkConfig::default();
        config.chat.poll_interval_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("poll_interval_secs"))));
    }

    #[test]
    fn negative_window_fails_validation() {
        let mut config = CarelinkConfig::default();
        config.chat.window_before_minutes = -5;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn bad_role_fails_validation() {
        let mut config = CarelinkConfig::default();
        config.app.user_role = "admin".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("user_role"))));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = CarelinkConfig::default();
        config.api.base_url = "".to_string();
        config.chat.poll_interval_secs = 0;
        config.app.log_level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
