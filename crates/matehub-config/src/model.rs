// SPDX-FileCopyrightText: 2026 MateHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the MateHub client.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level MateHub client configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MatehubConfig {
    /// Backend API endpoint settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Chat behavior settings.
    #[serde(default)]
    pub chat: ChatConfig,

    /// Reply polling settings.
    #[serde(default)]
    pub poll: PollSettings,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// Backend API endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL of the MateHub backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request client-side deadline in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

/// Chat behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatConfig {
    /// Model identifier sent with each chat message.
    #[serde(default = "default_model")]
    pub model: String,

    /// Messages per history page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// When false, cursor pagination is disabled: only the latest page is
    /// ever loaded and load-older requests are no-ops.
    #[serde(default = "default_pagination")]
    pub pagination: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            page_size: default_page_size(),
            pagination: default_pagination(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.0-flash-lite".to_string()
}

fn default_page_size() -> u32 {
    20
}

fn default_pagination() -> bool {
    true
}

/// Reply polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PollSettings {
    /// Maximum status fetches before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first re-poll, in milliseconds.
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Upper bound on the inter-poll delay, in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Multiplicative delay growth per attempt, capped at `max_delay_ms`.
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_factor: default_backoff_factor(),
        }
    }
}

fn default_max_attempts() -> u32 {
    60
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    5000
}

fn default_backoff_factor() -> f64 {
    1.2
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_backend_contract() {
        let config = MatehubConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.request_timeout_secs, 10);
        assert_eq!(config.chat.page_size, 20);
        assert!(config.chat.pagination);
        assert_eq!(config.poll.max_attempts, 60);
        assert_eq!(config.poll.initial_delay_ms, 1000);
        assert_eq!(config.poll.max_delay_ms, 5000);
        assert!((config.poll.backoff_factor - 1.2).abs() < f64::EPSILON);
    }

    #[test]
    fn config_serializes_round_trip() {
        let config = MatehubConfig::default();
        let toml_str = toml::to_string(&config).expect("should serialize");
        let parsed: MatehubConfig = toml::from_str(&toml_str).expect("should deserialize");
        assert_eq!(parsed.api.base_url, config.api.base_url);
        assert_eq!(parsed.poll.max_attempts, config.poll.max_attempts);
    }
}
