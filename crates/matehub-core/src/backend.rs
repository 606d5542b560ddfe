// SPDX-FileCopyrightText: 2026 MateHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The seam between orchestration and the HTTP layer.

use async_trait::async_trait;

use crate::error::MatehubError;
use crate::types::{HistoryPage, ReplyJobId, ReplyStatus, UserIdentity};

/// Everything the session layer needs from the MateHub backend.
///
/// Implemented over HTTP by `matehub-api`; tests substitute in-memory
/// fakes. All methods are read-only except [`send_chat`], which enqueues
/// reply generation and returns the job to poll.
///
/// [`send_chat`]: ChatBackend::send_chat
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Submits a chat message for asynchronous reply generation.
    async fn send_chat(
        &self,
        story_id: i64,
        model: &str,
        message: &str,
    ) -> Result<ReplyJobId, MatehubError>;

    /// Fetches the current generation status of a reply job.
    async fn reply_status(&self, job: ReplyJobId) -> Result<ReplyStatus, MatehubError>;

    /// Fetches the full contents of a completed reply.
    async fn reply_contents(&self, job: ReplyJobId) -> Result<String, MatehubError>;

    /// Fetches one page of conversation history. `cursor = None` requests
    /// the most recent `limit` messages.
    async fn history_page(
        &self,
        story_id: i64,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<HistoryPage, MatehubError>;

    /// Resolves the current session's user identity.
    async fn me(&self) -> Result<UserIdentity, MatehubError>;
}
