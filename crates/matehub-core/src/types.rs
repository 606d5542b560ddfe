// SPDX-FileCopyrightText: 2026 MateHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the MateHub client crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identifies a conversation stream. History, polling, and the send FSM
/// are all scoped to one key at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationKey {
    pub user_id: i64,
    pub story_id: i64,
}

impl ConversationKey {
    pub fn new(user_id: i64, story_id: i64) -> Self {
        Self { user_id, story_id }
    }
}

/// Server-assigned identifier for an asynchronously-generated chat reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReplyJobId(pub i64);

impl std::fmt::Display for ReplyJobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a session was issued anonymously or through a full login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
pub enum SessionKind {
    Anonymous,
    Authenticated,
}

/// An access/refresh token pair.
///
/// Owned exclusively by the credential store; every other component reads a
/// snapshot per request. No access token means no `Authorization` header on
/// outbound requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
    pub kind: SessionKind,
}

/// Which side of the conversation a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    Sent,
    Received,
}

/// One conversation message.
///
/// `id` is the monotonic server-assigned identifier; it is `None` only for
/// an optimistic local entry that has not been confirmed by the server yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Option<i64>,
    pub direction: Direction,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// A server-confirmed message.
    pub fn confirmed(
        id: i64,
        direction: Direction,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Some(id),
            direction,
            content: content.into(),
            created_at,
        }
    }

    /// An optimistic local entry awaiting server confirmation.
    pub fn optimistic(direction: Direction, content: impl Into<String>) -> Self {
        Self {
            id: None,
            direction,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// One page of conversation history, chronological within the page
/// (oldest first). `next_cursor` addresses the page of older messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPage {
    pub messages: Vec<ChatMessage>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// Non-terminal phase of reply generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ReplyPhase {
    Pending,
    Processing,
    /// A status string this client version does not recognize. Treated as
    /// non-terminal so newer backend states keep the poll alive.
    Unknown,
}

/// Reply generation status, resolved once at the HTTP boundary.
///
/// The wire payload carries a free-form `status` string plus optional
/// fallback fields; this enum is the single canonical form every consumer
/// works with.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyStatus {
    InProgress(ReplyPhase),
    /// Generation finished. `summary` is the reply text when the status
    /// payload already carried it; the full contents live behind a separate
    /// fetch.
    Completed { summary: Option<String> },
    Failed { reason: String },
}

impl ReplyStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReplyStatus::InProgress(_))
    }
}

/// Identity of the current session's user, from `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub is_anonymous: bool,
    /// External account id when the user completed a full login.
    #[serde(default)]
    pub kakao_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn direction_round_trips_through_strings() {
        for d in [Direction::Sent, Direction::Received] {
            let s = d.to_string();
            assert_eq!(Direction::from_str(&s).unwrap(), d);
        }
    }

    #[test]
    fn optimistic_messages_have_no_id() {
        let msg = ChatMessage::optimistic(Direction::Sent, "hello");
        assert!(msg.id.is_none());
        assert_eq!(msg.direction, Direction::Sent);
    }

    #[test]
    fn reply_status_terminality() {
        assert!(!ReplyStatus::InProgress(ReplyPhase::Pending).is_terminal());
        assert!(!ReplyStatus::InProgress(ReplyPhase::Unknown).is_terminal());
        assert!(ReplyStatus::Completed { summary: None }.is_terminal());
        assert!(
            ReplyStatus::Failed {
                reason: "x".into()
            }
            .is_terminal()
        );
    }

    #[test]
    fn conversation_key_equality() {
        assert_eq!(ConversationKey::new(1, 2), ConversationKey::new(1, 2));
        assert_ne!(ConversationKey::new(1, 2), ConversationKey::new(1, 3));
    }
}
