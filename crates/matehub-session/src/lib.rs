// SPDX-FileCopyrightText: 2026 MateHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation orchestration for the MateHub client.
//!
//! Ties the HTTP backend, the reply poller, and the history cache
//! together behind [`ChatSessionController`], which enforces the
//! one-send-at-a-time discipline and discards results that complete
//! after the user has moved to another conversation.

pub mod controller;

pub use controller::{
    ChatSessionController, LoadOlderOutcome, SendOutcome, SendState, SessionConfig,
    MAX_MESSAGE_CHARS,
};
