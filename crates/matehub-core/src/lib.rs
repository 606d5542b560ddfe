// SPDX-FileCopyrightText: 2026 MateHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the MateHub client.
//!
//! This crate provides the error taxonomy, shared types, and the
//! [`ChatBackend`] trait that decouples orchestration from the HTTP layer.
//! It performs no I/O.

pub mod backend;
pub mod error;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use backend::ChatBackend;
pub use error::MatehubError;
pub use types::{
    ChatMessage, ConversationKey, Credential, Direction, HistoryPage, ReplyJobId, ReplyPhase,
    ReplyStatus, SessionKind, UserIdentity,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_variants_construct() {
        let _network = MatehubError::Network {
            message: "test".into(),
            source: None,
        };
        let _timeout = MatehubError::Timeout {
            duration: std::time::Duration::from_secs(10),
        };
        let _expired = MatehubError::AuthExpired;
        let _api = MatehubError::Api {
            status: 422,
            detail: "test".into(),
        };
        let _poll_timeout = MatehubError::PollTimeout { attempts: 60 };
        let _poll_failed = MatehubError::PollFailed {
            reason: "test".into(),
        };
        let _busy = MatehubError::Busy {
            state: "sending".into(),
        };
        let _invalid = MatehubError::Invalid("test".into());
        let _config = MatehubError::Config("test".into());
        let _internal = MatehubError::Internal("test".into());
    }

    #[test]
    fn backend_trait_is_object_safe() {
        fn _takes_dyn(_: &dyn ChatBackend) {}
    }
}
