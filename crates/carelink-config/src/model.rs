// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Carelink chat client.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Carelink configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values,
/// except that `api.base_url` must ultimately point at a real backend.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CarelinkConfig {
    /// Backend REST API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Chat polling and time-window settings.
    #[serde(default)]
    pub chat: ChatConfig,

    /// Local application settings (identity, logging).
    #[serde(default)]
    pub app: AppConfig,
}

/// Backend REST API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL of the telemedicine backend, e.g. `https://api.example.com/api`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token sent on every request. `None` means unauthenticated
    /// calls, which the backend will reject.
    #[serde(default)]
    pub bearer_token: Option<String>,

    /// Per-request timeout in seconds. The original client had none; polling
    /// retries on the next tick, sends surface the timeout to the user.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            bearer_token: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

/// Chat polling and messaging-window configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatConfig {
    /// Message poll interval in seconds. One design constant for every
    /// chat surface.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Minutes before the scheduled start at which the messaging window opens.
    #[serde(default = "default_window_before_minutes")]
    pub window_before_minutes: i64,

    /// Minutes after the scheduled start at which the messaging window closes.
    #[serde(default = "default_window_after_minutes")]
    pub window_after_minutes: i64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            window_before_minutes: default_window_before_minutes(),
            window_after_minutes: default_window_after_minutes(),
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    4
}

fn default_window_before_minutes() -> i64 {
    15
}

fn default_window_after_minutes() -> i64 {
    60
}

/// Local application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// The authenticated user's id, used as sender id on optimistic entries.
    #[serde(default)]
    pub user_id: Option<String>,

    /// The authenticated user's role: `patient` or `doctor`.
    #[serde(default = "default_user_role")]
    pub user_role: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_id: None,
            user_role: default_user_role(),
            log_level: default_log_level(),
        }
    }
}

fn default_user_role() -> String {
    "patient".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = CarelinkConfig::default();
        assert_eq!(config.api.request_timeout_secs, 10);
        assert_eq!(config.chat.poll_interval_secs, 4);
        assert_eq!(config.chat.window_before_minutes, 15);
        assert_eq!(config.chat.window_after_minutes, 60);
        assert_eq!(config.app.user_role, "patient");
        assert_eq!(config.app.log_level, "info");
        assert!(config.api.bearer_token.is_none());
    }

    #[test]
    fn toml_round_trip() {
        let toml_str = r#"
[api]
base_url = "https://api.clinic.example/api"
bearer_token = "tok-123"

[chat]
poll_interval_secs = 3

[app]
user_id = "p1"
user_role = "doctor"
"#;
        let config: CarelinkConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api.base_url, "https://api.clinic.example/api");
        assert_eq!(config.api.bearer_token.as_deref(), Some("tok-123"));
        assert_eq!(config.chat.poll_interval_secs, 3);
        // Unspecified keys keep their defaults.
        assert_eq!(config.chat.window_after_minutes, 60);
        assert_eq!(config.app.user_role, "doctor");
    }

    #[test]
    fn unknown_key_is_rejected() {
        let toml_str = r#"
[chat]
poll_interval_ms = 2000
"#;
        assert!(toml::from_str::<CarelinkConfig>(toml_str).is_err());
    }
}
