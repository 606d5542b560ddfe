// SPDX-FileCopyrightText: 2026 MateHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory conversation history cache.
//!
//! One entry per [`ConversationKey`], holding an ordered, deduplicated
//! message sequence stitched together from history pages and live appends.
//! Invariants per entry:
//!
//! - confirmed message ids are strictly increasing;
//! - no id appears twice, no matter how often a page is merged;
//! - optimistic entries (no id yet) keep their insertion position; a
//!   confirmed reply may land behind one whose server echo is still
//!   pending, and the echo later reconciles in place.
//!
//! The cache is pure state. Fetching happens upstream, so a failed fetch
//! never touches an entry (no partial merges).

use std::collections::{HashMap, HashSet};

use matehub_core::{ChatMessage, ConversationKey, Direction, HistoryPage};
use tracing::debug;

/// Result of a prepend merge, enough for the caller to restore the visual
/// anchor (the height delta comes from the inserted message count).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrependOutcome {
    /// Messages actually inserted after deduplication.
    pub inserted: usize,
    /// Whether an older page remains beyond the new oldest cursor.
    pub has_more_older: bool,
}

/// Result of a live append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendOutcome {
    /// Whether the view must snap to the bottom edge: always for the
    /// user's own message, otherwise only if the viewport already was at
    /// the bottom.
    pub force_scroll: bool,
    /// False when the message was dropped as a duplicate or consumed by
    /// reconciling an optimistic entry.
    pub inserted: bool,
}

/// Cached state for one conversation.
#[derive(Debug, Clone, Default)]
pub struct CacheEntry {
    messages: Vec<ChatMessage>,
    oldest_cursor: Option<String>,
    has_more_older: bool,
}

impl CacheEntry {
    /// The stitched message sequence, oldest first.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Cursor addressing the page older than the cached range.
    pub fn oldest_cursor(&self) -> Option<&str> {
        self.oldest_cursor.as_deref()
    }

    pub fn has_more_older(&self) -> bool {
        self.has_more_older
    }

    fn confirmed_ids(&self) -> HashSet<i64> {
        self.messages.iter().filter_map(|m| m.id).collect()
    }

    fn is_strictly_ordered(&self) -> bool {
        self.messages
            .iter()
            .filter_map(|m| m.id)
            .collect::<Vec<_>>()
            .windows(2)
            .all(|w| w[0] < w[1])
    }
}

/// Ordered, deduplicated, cursor-addressable view of conversation history,
/// keyed by `(user_id, story_id)`.
#[derive(Debug, Default)]
pub struct ConversationCache {
    entries: HashMap<ConversationKey, CacheEntry>,
}

impl ConversationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache entry for `key`, if one exists.
    pub fn entry(&self, key: ConversationKey) -> Option<&CacheEntry> {
        self.entries.get(&key)
    }

    /// Replaces the entire entry for `key` with the most recent page.
    ///
    /// This is the initial-load path: whatever was cached is discarded and
    /// the pagination cursor restarts from the page's `next_cursor`.
    pub fn replace_latest(&mut self, key: ConversationKey, page: HistoryPage) {
        let mut messages: Vec<ChatMessage> =
            page.messages.into_iter().filter(|m| m.id.is_some()).collect();
        messages.dedup_by_key(|m| m.id);

        let entry = CacheEntry {
            messages,
            oldest_cursor: page.next_cursor,
            has_more_older: page.has_more,
        };
        debug_assert!(entry.is_strictly_ordered());
        debug!(
            story_id = key.story_id,
            count = entry.messages.len(),
            has_more = entry.has_more_older,
            "replaced history entry with latest page"
        );
        self.entries.insert(key, entry);
    }

    /// Merges an older page in front of the cached sequence.
    ///
    /// Incoming messages are chronological within the page; any id already
    /// cached is dropped, so merging the same page twice is a no-op. The
    /// entry's cursor advances to the page's `next_cursor`.
    pub fn prepend_older(&mut self, key: ConversationKey, page: HistoryPage) -> PrependOutcome {
        let entry = self.entries.entry(key).or_default();
        let existing = entry.confirmed_ids();

        let mut incoming: Vec<ChatMessage> = page
            .messages
            .into_iter()
            .filter(|m| m.id.is_some_and(|id| !existing.contains(&id)))
            .collect();
        incoming.dedup_by_key(|m| m.id);

        let inserted = incoming.len();
        incoming.append(&mut entry.messages);
        entry.messages = incoming;
        entry.oldest_cursor = page.next_cursor;
        entry.has_more_older = page.has_more;

        debug_assert!(entry.is_strictly_ordered());
        debug!(
            story_id = key.story_id,
            inserted,
            has_more = entry.has_more_older,
            "prepended older history page"
        );
        PrependOutcome {
            inserted,
            has_more_older: entry.has_more_older,
        }
    }

    /// Appends a newly sent or newly received message at the tail.
    ///
    /// An optimistic own message (`id: None`) is appended as-is and
    /// reconciled later. A server-confirmed message first tries to fill
    /// the oldest matching optimistic entry; an id already cached is
    /// dropped. `at_bottom` is the caller's report of whether the viewport
    /// sat at the bottom edge when the append was triggered.
    pub fn append_live(
        &mut self,
        key: ConversationKey,
        message: ChatMessage,
        at_bottom: bool,
    ) -> AppendOutcome {
        let own_message = message.direction == Direction::Sent;
        let force_scroll = own_message || at_bottom;
        let entry = self.entries.entry(key).or_default();

        let inserted = match message.id {
            None => {
                entry.messages.push(message);
                true
            }
            Some(id) => {
                if let Some(slot) = entry.messages.iter_mut().find(|m| {
                    m.id.is_none()
                        && m.direction == message.direction
                        && m.content == message.content
                }) {
                    // Server copy of an optimistic entry: fill in place.
                    slot.id = Some(id);
                    slot.created_at = message.created_at;
                    false
                } else if entry.confirmed_ids().contains(&id) {
                    false
                } else {
                    entry.messages.push(message);
                    true
                }
            }
        };

        debug_assert!(entry.is_strictly_ordered());
        AppendOutcome {
            force_scroll,
            inserted,
        }
    }

    /// Drops the entry for `key`. Used when the active conversation
    /// switches.
    pub fn reset(&mut self, key: ConversationKey) {
        self.entries.remove(&key);
    }
}
