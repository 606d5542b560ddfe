// SPDX-FileCopyrightText: 2026 MateHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cursor-based conversation history cache for the MateHub client.
//!
//! [`ConversationCache`] stitches paginated history fetches and live
//! messages into one ordered, deduplicated sequence per conversation;
//! [`scroll`] holds the pure anchoring math that keeps the user's place
//! when older pages are inserted above the viewport.

pub mod cache;
pub mod scroll;

pub use cache::{AppendOutcome, CacheEntry, ConversationCache, PrependOutcome};
pub use scroll::{is_at_bottom, is_near_top, offset_after_prepend, ScrollMetrics};
