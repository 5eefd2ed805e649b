// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./carelink.toml` > `~/.config/carelink/carelink.toml`
//! > `/etc/carelink/carelink.toml` with environment variable overrides via
//! the `CARELINK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::CarelinkConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/carelink/carelink.toml` (system-wide)
/// 3. `~/.config/carelink/carelink.toml` (user XDG config)
/// 4. `./carelink.toml` (local directory)
/// 5. `CARELINK_*` environment variables
pub fn load_config() -> Result<CarelinkConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<CarelinkConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CarelinkConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CarelinkConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CarelinkConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(CarelinkConfig::default()))
        .merge(Toml::file("/etc/carelink/carelink.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("carelink/carelink.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("carelink.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `CARELINK_API_BEARER_TOKEN` must map to
/// `api.bearer_token`, not `api.bearer.token`.
fn env_provider() -> Env {
    Env::prefixed("CARELINK_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: CARELINK_API_BEARER_TOKEN -> "api_bearer_token"
        let mapped = key
            .as_str()
            .replacen("api_", "api.", 1)
            .replacen("chat_", "chat.", 1)
            .replacen("app_", "app.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_load_without_any_file() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.chat.poll_interval_secs, 4);
    }

    #[test]
    fn env_override_maps_to_dotted_key() {
        Jail::expect_with(|jail| {
            jail.set_env("CARELINK_API_BEARER_TOKEN", "env-token");
            jail.set_env("CARELINK_CHAT_POLL_INTERVAL_SECS", "2");
            let config: CarelinkConfig = build_figment().extract()?;
            assert_eq!(config.api.bearer_token.as_deref(), Some("env-token"));
            assert_eq!(config.chat.poll_interval_secs, 2);
            Ok(())
        });
    }

    #[test]
    fn file_then_env_precedence() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "carelink.toml",
                r#"
[api]
base_url = "https://from-file.example/api"
bearer_token = "file-token"
"#,
            )?;
            jail.set_env("CARELINK_API_BEARER_TOKEN", "env-token");
            let config: CarelinkConfig = build_figment().extract()?;
            // Env wins over file, file wins over defaults.
            assert_eq!(config.api.bearer_token.as_deref(), Some("env-token"));
            assert_eq!(config.api.base_url, "https://from-file.example/api");
            Ok(())
        });
    }
}
