// SPDX-FileCopyrightText: 2026 MateHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the MateHub client.

use std::time::Duration;

use thiserror::Error;

/// The primary error type used across all MateHub client crates.
#[derive(Debug, Error)]
pub enum MatehubError {
    /// Transport-level failure (connection refused, DNS, broken pipe).
    /// Retryable by the caller.
    #[error("network error: {message}")]
    Network {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Client-side deadline exceeded before a response arrived.
    #[error("request timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// Credential refresh failed; the session must be re-bootstrapped.
    #[error("session expired and could not be refreshed")]
    AuthExpired,

    /// The server rejected the request with a non-2xx status other than 401.
    /// `detail` is the parsed `detail` field of the error body, or the raw
    /// body text when the body is not JSON.
    #[error("API error ({status}): {detail}")]
    Api { status: u16, detail: String },

    /// The reply poll exhausted its attempt budget without reaching a
    /// terminal state.
    #[error("polling gave up after {attempts} attempts")]
    PollTimeout { attempts: u32 },

    /// The server reported that reply generation terminally failed.
    #[error("reply generation failed: {reason}")]
    PollFailed { reason: String },

    /// A send was rejected locally because the session is not idle.
    /// No network request was made.
    #[error("session busy: {state}")]
    Busy { state: String },

    /// Client-side input validation failed; nothing was sent.
    #[error("invalid input: {0}")]
    Invalid(String),

    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MatehubError {
    /// Maps the error classification to a short human-readable string for
    /// display. Pure function of the error variant.
    pub fn user_message(&self) -> String {
        match self {
            MatehubError::Timeout { .. } => {
                "Request timed out. Please try again.".to_string()
            }
            MatehubError::Network { .. } => {
                "Connection failed. Please check your internet connection.".to_string()
            }
            MatehubError::AuthExpired => {
                "Your session expired. Please reconnect.".to_string()
            }
            MatehubError::Api { status, detail } => match status {
                404 => "Service not found. Please check your connection.".to_string(),
                500..=599 => "Server error. Please try again later.".to_string(),
                _ if !detail.is_empty() => detail.clone(),
                _ => "An unexpected error occurred".to_string(),
            },
            MatehubError::PollTimeout { .. } => {
                "The reply took too long. Please try again.".to_string()
            }
            MatehubError::PollFailed { reason } if !reason.is_empty() => reason.clone(),
            MatehubError::Busy { .. } => {
                "A message is already awaiting a reply.".to_string()
            }
            MatehubError::Invalid(reason) => reason.clone(),
            _ => "An unexpected error occurred".to_string(),
        }
    }

    /// True for failures a caller may reasonably retry as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MatehubError::Network { .. }
                | MatehubError::Timeout { .. }
                | MatehubError::PollTimeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_maps_to_timeout_message() {
        let err = MatehubError::Timeout {
            duration: Duration::from_secs(10),
        };
        assert_eq!(err.user_message(), "Request timed out. Please try again.");
    }

    #[test]
    fn server_errors_map_to_server_message() {
        for status in [500, 502, 503] {
            let err = MatehubError::Api {
                status,
                detail: "boom".into(),
            };
            assert_eq!(err.user_message(), "Server error. Please try again later.");
        }
    }

    #[test]
    fn not_found_maps_to_not_found_message() {
        let err = MatehubError::Api {
            status: 404,
            detail: "Not Found".into(),
        };
        assert_eq!(
            err.user_message(),
            "Service not found. Please check your connection."
        );
    }

    #[test]
    fn api_detail_is_surfaced_for_client_errors() {
        let err = MatehubError::Api {
            status: 422,
            detail: "Message cannot be empty".into(),
        };
        assert_eq!(err.user_message(), "Message cannot be empty");
    }

    #[test]
    fn network_maps_to_connection_message() {
        let err = MatehubError::Network {
            message: "connection refused".into(),
            source: None,
        };
        assert_eq!(
            err.user_message(),
            "Connection failed. Please check your internet connection."
        );
    }

    #[test]
    fn poll_failure_surfaces_server_reason() {
        let err = MatehubError::PollFailed {
            reason: "model unavailable".into(),
        };
        assert_eq!(err.user_message(), "model unavailable");
    }

    #[test]
    fn retryable_classification() {
        assert!(
            MatehubError::Network {
                message: "x".into(),
                source: None
            }
            .is_retryable()
        );
        assert!(
            MatehubError::Timeout {
                duration: Duration::from_secs(1)
            }
            .is_retryable()
        );
        assert!(!MatehubError::AuthExpired.is_retryable());
        assert!(
            !MatehubError::Api {
                status: 400,
                detail: String::new()
            }
            .is_retryable()
        );
    }
}
