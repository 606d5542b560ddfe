// SPDX-FileCopyrightText: 2026 MateHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./matehub.toml` > `~/.config/matehub/matehub.toml`
//! > `/etc/matehub/matehub.toml` with environment variable overrides via the
//! `MATEHUB_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::MatehubConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/matehub/matehub.toml` (system-wide)
/// 3. `~/.config/matehub/matehub.toml` (user XDG config)
/// 4. `./matehub.toml` (local directory)
/// 5. `MATEHUB_*` environment variables
pub fn load_config() -> Result<MatehubConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MatehubConfig::default()))
        .merge(Toml::file("/etc/matehub/matehub.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("matehub/matehub.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("matehub.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit inline configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<MatehubConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MatehubConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MatehubConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MatehubConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so underscore-containing
/// key names stay unambiguous: `MATEHUB_API_REQUEST_TIMEOUT_SECS` must map
/// to `api.request_timeout_secs`, not `api.request.timeout.secs`.
fn env_provider() -> Env {
    Env::prefixed("MATEHUB_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("api_", "api.", 1)
            .replacen("chat_", "chat.", 1)
            .replacen("poll_", "poll.", 1)
            .replacen("log_", "log.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
            [api]
            base_url = "https://chat.example.com"

            [poll]
            max_attempts = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://chat.example.com");
        assert_eq!(config.poll.max_attempts, 30);
        // Untouched sections keep their defaults.
        assert_eq!(config.chat.page_size, 20);
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.api.request_timeout_secs, 10);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn unknown_key_is_rejected() {
        let result = load_config_from_str(
            r#"
            [api]
            base_uri = "https://chat.example.com"
            "#,
        );
        assert!(result.is_err());
    }
}
