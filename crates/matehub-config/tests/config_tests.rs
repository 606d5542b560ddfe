// SPDX-FileCopyrightText: 2026 MateHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the full load-and-validate pipeline.

use matehub_config::{load_and_validate_str, ConfigError};

#[test]
fn full_config_parses_and_validates() {
    let config = load_and_validate_str(
        r#"
        [api]
        base_url = "https://chat.example.com"
        request_timeout_secs = 30

        [chat]
        model = "gemini-2.0-flash-lite"
        page_size = 50
        pagination = true

        [poll]
        max_attempts = 90
        initial_delay_ms = 500
        max_delay_ms = 4000
        backoff_factor = 1.5

        [log]
        level = "debug"
        "#,
    )
    .expect("config should be valid");

    assert_eq!(config.api.base_url, "https://chat.example.com");
    assert_eq!(config.api.request_timeout_secs, 30);
    assert_eq!(config.chat.page_size, 50);
    assert_eq!(config.poll.max_attempts, 90);
    assert_eq!(config.log.level, "debug");
}

#[test]
fn partial_config_fills_defaults() {
    let config = load_and_validate_str(
        r#"
        [api]
        base_url = "https://chat.example.com"
        "#,
    )
    .expect("partial config should be valid");

    assert_eq!(config.api.request_timeout_secs, 10);
    assert_eq!(config.chat.model, "gemini-2.0-flash-lite");
    assert!((config.poll.backoff_factor - 1.2).abs() < f64::EPSILON);
}

#[test]
fn typo_in_key_produces_suggestion() {
    let errors = load_and_validate_str(
        r#"
        [poll]
        max_atempts = 30
        "#,
    )
    .unwrap_err();

    let ConfigError::UnknownKey { key, suggestion, .. } = &errors[0] else {
        panic!("expected UnknownKey, got {:?}", errors[0]);
    };
    assert_eq!(key, "max_atempts");
    assert_eq!(suggestion.as_deref(), Some("max_attempts"));
}

#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str(
        r#"
        [plo]
        max_attempts = 30
        "#,
    )
    .unwrap_err();
    assert!(!errors.is_empty());
}

#[test]
fn wrong_type_is_rejected() {
    let errors = load_and_validate_str(
        r#"
        [poll]
        max_attempts = "sixty"
        "#,
    )
    .unwrap_err();
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. } | ConfigError::Other(_)))
    );
}

#[test]
fn semantic_validation_runs_after_parse() {
    let errors = load_and_validate_str(
        r#"
        [poll]
        backoff_factor = 0.9
        "#,
    )
    .unwrap_err();
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { .. }))
    );
}

#[test]
fn pagination_can_be_disabled() {
    let config = load_and_validate_str(
        r#"
        [chat]
        pagination = false
        "#,
    )
    .expect("degraded configuration should be valid");
    assert!(!config.chat.pagination);
}
