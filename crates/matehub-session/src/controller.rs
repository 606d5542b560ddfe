// SPDX-FileCopyrightText: 2026 MateHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The chat session state machine.
//!
//! One [`ChatSessionController`] drives one active conversation at a
//! time: it serializes sends through an `Idle → Sending → AwaitingReply`
//! cycle, owns the history cache, and guards every asynchronous
//! completion with an epoch so results for a switched-away conversation
//! are discarded instead of corrupting the new one.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use matehub_core::{
    ChatBackend, ChatMessage, ConversationKey, Direction, HistoryPage, MatehubError, UserIdentity,
};
use matehub_history::ConversationCache;
use matehub_poll::{poll, PollConfig, PollUpdate};
use strum::Display;
use tracing::{debug, info, warn};

/// Hard cap on outbound message length, matching the backend's own
/// validation so oversized input fails locally.
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// Tunables for one session, resolved from configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Model identifier passed to every send.
    pub model: String,
    /// History page size for both the initial load and older pages.
    pub page_size: u32,
    /// When false, only the latest page is ever loaded and
    /// [`ChatSessionController::load_older`] is a no-op.
    pub pagination: bool,
    pub poll: PollConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash-lite".to_string(),
            page_size: 20,
            pagination: true,
            poll: PollConfig::default(),
        }
    }
}

/// Send-side lifecycle of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SendState {
    /// Ready to accept a send.
    Idle,
    /// A send request is in flight.
    Sending,
    /// The send was accepted; the reply is being polled.
    AwaitingReply,
}

/// Result of a completed send.
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// The reply arrived and was appended to the conversation.
    Delivered {
        reply: ChatMessage,
        /// Whether the view should snap to the bottom, decided from the
        /// viewport position captured when the send started.
        force_scroll: bool,
    },
    /// The conversation was switched away while the reply was pending.
    /// Nothing was appended anywhere.
    Superseded,
}

/// Result of a [`ChatSessionController::load_older`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOlderOutcome {
    Loaded {
        inserted: usize,
        has_more_older: bool,
    },
    /// Another older-page load is still in flight.
    AlreadyLoading,
    /// No cursor, or the backend reported no older messages.
    NothingOlder,
    /// Pagination is disabled by configuration.
    Disabled,
    /// The conversation was switched away mid-fetch; the page was
    /// discarded.
    Superseded,
}

struct SessionInner {
    key: ConversationKey,
    /// Bumped on every conversation switch. Async completions compare
    /// their captured epoch before touching any state.
    epoch: u64,
    state: SendState,
    cache: ConversationCache,
    /// Latch serializing older-page loads.
    loading_history: bool,
}

/// Orchestrates one active conversation against a [`ChatBackend`].
///
/// Cloning shares all state; methods take `&self` and internal state is
/// mutex-protected (the lock is never held across an await).
#[derive(Clone)]
pub struct ChatSessionController {
    backend: Arc<dyn ChatBackend>,
    config: SessionConfig,
    inner: Arc<Mutex<SessionInner>>,
}

impl ChatSessionController {
    pub fn new(backend: Arc<dyn ChatBackend>, key: ConversationKey, config: SessionConfig) -> Self {
        Self {
            backend,
            config,
            inner: Arc::new(Mutex::new(SessionInner {
                key,
                epoch: 0,
                state: SendState::Idle,
                cache: ConversationCache::new(),
                loading_history: false,
            })),
        }
    }

    pub fn state(&self) -> SendState {
        self.inner.lock().expect("session lock poisoned").state
    }

    pub fn key(&self) -> ConversationKey {
        self.inner.lock().expect("session lock poisoned").key
    }

    /// Snapshot of the active conversation's messages, oldest first.
    pub fn messages(&self) -> Vec<ChatMessage> {
        let inner = self.inner.lock().expect("session lock poisoned");
        inner
            .cache
            .entry(inner.key)
            .map(|e| e.messages().to_vec())
            .unwrap_or_default()
    }

    /// Whether older history remains beyond what is cached.
    pub fn has_more_older(&self) -> bool {
        let inner = self.inner.lock().expect("session lock poisoned");
        inner
            .cache
            .entry(inner.key)
            .is_some_and(|e| e.has_more_older())
    }

    pub async fn identity(&self) -> Result<UserIdentity, MatehubError> {
        self.backend.me().await
    }

    /// Sends a message and drives it to a delivered reply.
    ///
    /// Rejected locally with [`MatehubError::Busy`] when a send is
    /// already in flight, and with [`MatehubError::Invalid`] on empty or
    /// oversized input; neither touches the network. `at_bottom` is the
    /// caller's report of the viewport position at send time and decides
    /// the anchoring of the eventual reply.
    pub async fn send(&self, text: &str, at_bottom: bool) -> Result<SendOutcome, MatehubError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(MatehubError::Invalid("Message cannot be empty".into()));
        }
        if text.chars().count() > MAX_MESSAGE_CHARS {
            return Err(MatehubError::Invalid(format!(
                "Message is too long (max {MAX_MESSAGE_CHARS} characters)"
            )));
        }

        let (epoch, key) = {
            let mut inner = self.inner.lock().expect("session lock poisoned");
            if inner.state != SendState::Idle {
                return Err(MatehubError::Busy {
                    state: inner.state.to_string(),
                });
            }
            inner.state = SendState::Sending;
            let key = inner.key;
            inner
                .cache
                .append_live(key, ChatMessage::optimistic(Direction::Sent, text), at_bottom);
            (inner.epoch, key)
        };

        let job = match self
            .backend
            .send_chat(key.story_id, &self.config.model, text)
            .await
        {
            Ok(job) => job,
            Err(err) => {
                self.finish_if_current(epoch);
                return Err(err);
            }
        };
        info!(story_id = key.story_id, job = %job, "chat message accepted");

        {
            let mut inner = self.inner.lock().expect("session lock poisoned");
            if inner.epoch == epoch {
                inner.state = SendState::AwaitingReply;
            }
        }

        let backend = &self.backend;
        let poll_result = poll(
            &self.config.poll,
            move || async move { backend.reply_status(job).await.map(PollUpdate::from) },
            |_, attempt| debug!(job = %job, attempt, "awaiting reply"),
        )
        .await;

        let summary = match poll_result {
            Ok(summary) => summary,
            Err(err) => {
                self.finish_if_current(epoch);
                return Err(err);
            }
        };

        // The status payload only summarizes; fetch the full reply, but
        // settle for the summary rather than failing a finished job.
        let contents = match self.backend.reply_contents(job).await {
            Ok(contents) => contents,
            Err(err) => match summary {
                Some(summary) => {
                    warn!(job = %job, error = %err, "contents fetch failed, using status summary");
                    summary
                }
                None => {
                    self.finish_if_current(epoch);
                    return Err(err);
                }
            },
        };

        let reply = ChatMessage::confirmed(job.0, Direction::Received, contents, Utc::now());
        let mut inner = self.inner.lock().expect("session lock poisoned");
        if inner.epoch != epoch {
            debug!(job = %job, "discarding reply for a switched-away conversation");
            return Ok(SendOutcome::Superseded);
        }
        let append = inner.cache.append_live(key, reply.clone(), at_bottom);
        inner.state = SendState::Idle;
        Ok(SendOutcome::Delivered {
            reply,
            force_scroll: append.force_scroll,
        })
    }

    /// Switches the active conversation, invalidating every in-flight
    /// completion for the old one, and loads the new one's latest page.
    pub async fn switch_story(&self, key: ConversationKey) -> Result<(), MatehubError> {
        let epoch = {
            let mut inner = self.inner.lock().expect("session lock poisoned");
            inner.epoch += 1;
            inner.key = key;
            inner.state = SendState::Idle;
            inner.loading_history = false;
            inner.cache.reset(key);
            debug!(story_id = key.story_id, epoch = inner.epoch, "switched conversation");
            inner.epoch
        };
        self.load_latest_at(epoch, key).await
    }

    /// Reloads the latest history page for the active conversation.
    pub async fn load_latest(&self) -> Result<(), MatehubError> {
        let (epoch, key) = {
            let inner = self.inner.lock().expect("session lock poisoned");
            (inner.epoch, inner.key)
        };
        self.load_latest_at(epoch, key).await
    }

    async fn load_latest_at(&self, epoch: u64, key: ConversationKey) -> Result<(), MatehubError> {
        let page = self
            .backend
            .history_page(key.story_id, self.config.page_size, None)
            .await?;
        let page = if self.config.pagination {
            page
        } else {
            HistoryPage {
                next_cursor: None,
                has_more: false,
                ..page
            }
        };

        let mut inner = self.inner.lock().expect("session lock poisoned");
        if inner.epoch != epoch {
            return Ok(());
        }
        inner.cache.replace_latest(key, page);
        Ok(())
    }

    /// Loads one page of older history above what is cached.
    ///
    /// Serialized: while one load is in flight, further calls return
    /// [`LoadOlderOutcome::AlreadyLoading`] without fetching.
    pub async fn load_older(&self) -> Result<LoadOlderOutcome, MatehubError> {
        if !self.config.pagination {
            return Ok(LoadOlderOutcome::Disabled);
        }

        let (epoch, key, cursor) = {
            let mut inner = self.inner.lock().expect("session lock poisoned");
            if inner.loading_history {
                return Ok(LoadOlderOutcome::AlreadyLoading);
            }
            let key = inner.key;
            let cursor = match inner.cache.entry(key) {
                Some(entry) if entry.has_more_older() => match entry.oldest_cursor() {
                    Some(cursor) => cursor.to_string(),
                    None => return Ok(LoadOlderOutcome::NothingOlder),
                },
                _ => return Ok(LoadOlderOutcome::NothingOlder),
            };
            inner.loading_history = true;
            (inner.epoch, key, cursor)
        };

        let page = match self
            .backend
            .history_page(key.story_id, self.config.page_size, Some(&cursor))
            .await
        {
            Ok(page) => page,
            Err(err) => {
                let mut inner = self.inner.lock().expect("session lock poisoned");
                if inner.epoch == epoch {
                    inner.loading_history = false;
                }
                return Err(err);
            }
        };

        let mut inner = self.inner.lock().expect("session lock poisoned");
        if inner.epoch != epoch {
            return Ok(LoadOlderOutcome::Superseded);
        }
        inner.loading_history = false;
        let outcome = inner.cache.prepend_older(key, page);
        Ok(LoadOlderOutcome::Loaded {
            inserted: outcome.inserted,
            has_more_older: outcome.has_more_older,
        })
    }

    fn finish_if_current(&self, epoch: u64) {
        let mut inner = self.inner.lock().expect("session lock poisoned");
        if inner.epoch == epoch {
            inner.state = SendState::Idle;
        }
    }
}
