// SPDX-FileCopyrightText: 2026 MateHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire-format types for the MateHub backend.
//!
//! These structs mirror the JSON payloads exactly; conversions into the
//! shared [`matehub_core`] types happen here so the rest of the client
//! never sees raw wire shapes.

use chrono::{DateTime, Utc};
use matehub_core::{ChatMessage, Direction, HistoryPage, ReplyPhase, ReplyStatus};
use serde::{Deserialize, Serialize};

/// Token pair issued by `/auth/anonymous-token` and `/auth/refresh`.
///
/// A refresh response may omit `refresh_token`, in which case the stored
/// one stays valid.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    /// "anonymous" or "authenticated".
    #[serde(default)]
    pub user_type: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Request body for `POST /auth/anonymous-token`. A stored refresh token,
/// when present, lets the backend rebind the same anonymous user.
#[derive(Debug, Clone, Serialize)]
pub struct AnonymousTokenRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Request body for `POST /llm/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatSendRequest {
    pub story_id: i64,
    pub model: String,
    pub message: String,
}

/// Response from `POST /llm/chat`: the job handle to poll.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatSendResponse {
    pub story_chat_history_id: i64,
}

/// Response from `GET /llm/chat_history_status/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatStatusResponse {
    pub story_chat_history_id: i64,
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    /// Some backend versions inline the reply text once generation
    /// completes; when present it spares the contents fetch.
    #[serde(default)]
    pub contents: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub elapsed_time: Option<f64>,
}

impl ChatStatusResponse {
    /// Resolves the free-form wire status into the canonical enum.
    ///
    /// Unrecognized status strings map to a non-terminal phase so this
    /// client keeps polling against newer backend versions instead of
    /// aborting.
    pub fn into_status(self) -> ReplyStatus {
        match self.status.as_str() {
            "pending" => ReplyStatus::InProgress(ReplyPhase::Pending),
            "processing" => ReplyStatus::InProgress(ReplyPhase::Processing),
            "completed" => ReplyStatus::Completed {
                summary: self.contents.or(self.response),
            },
            "failed" => ReplyStatus::Failed {
                reason: self
                    .error_message
                    .unwrap_or_else(|| "reply generation failed".to_string()),
            },
            other => {
                tracing::debug!(status = %other, "unrecognized reply status, treating as in progress");
                ReplyStatus::InProgress(ReplyPhase::Unknown)
            }
        }
    }
}

/// Response from `GET /llm/chat_history/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatContentsResponse {
    pub contents: String,
    #[serde(default)]
    pub is_user_message: Option<bool>,
}

/// One history message as the backend serializes it.
#[derive(Debug, Clone, Deserialize)]
pub struct WireMessage {
    pub id: i64,
    pub contents: String,
    pub is_user_message: bool,
    pub created_at: DateTime<Utc>,
}

impl From<WireMessage> for ChatMessage {
    fn from(wire: WireMessage) -> Self {
        let direction = if wire.is_user_message {
            Direction::Sent
        } else {
            Direction::Received
        };
        ChatMessage::confirmed(wire.id, direction, wire.contents, wire.created_at)
    }
}

/// Response from `GET /chat/history`.
///
/// The cursor is an integer on the wire; the client treats it as opaque
/// text, so the conversion stringifies it here and nowhere else.
#[derive(Debug, Clone, Deserialize)]
pub struct WireHistoryPage {
    pub messages: Vec<WireMessage>,
    #[serde(default)]
    pub next_cursor: Option<i64>,
    pub has_more: bool,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl From<WireHistoryPage> for HistoryPage {
    fn from(wire: WireHistoryPage) -> Self {
        HistoryPage {
            messages: wire.messages.into_iter().map(ChatMessage::from).collect(),
            next_cursor: wire.next_cursor.map(|c| c.to_string()),
            has_more: wire.has_more,
        }
    }
}

/// Error payload the backend attaches to non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub detail: String,
}
