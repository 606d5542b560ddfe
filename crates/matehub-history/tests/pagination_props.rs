// SPDX-FileCopyrightText: 2026 MateHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property tests for history merge invariants: any sequence of older-page
//! merges keeps the cached sequence strictly increasing and duplicate-free,
//! and refetching pages never changes the result.

use chrono::{TimeZone, Utc};
use matehub_core::{ChatMessage, ConversationKey, Direction, HistoryPage};
use matehub_history::ConversationCache;
use proptest::prelude::*;

fn message(id: i64) -> ChatMessage {
    ChatMessage::confirmed(
        id,
        if id % 2 == 0 {
            Direction::Sent
        } else {
            Direction::Received
        },
        format!("m{id}"),
        Utc.timestamp_opt(1_700_000_000 + id, 0).unwrap(),
    )
}

fn page_of(ids: &[i64], has_more: bool) -> HistoryPage {
    HistoryPage {
        messages: ids.iter().copied().map(message).collect(),
        next_cursor: ids.first().map(|id| format!("c{id}")),
        has_more,
    }
}

fn cached_ids(cache: &ConversationCache, key: ConversationKey) -> Vec<i64> {
    cache
        .entry(key)
        .map(|e| e.messages().iter().filter_map(|m| m.id).collect())
        .unwrap_or_default()
}

/// Splits a strictly-increasing id range into consecutive chunks, newest
/// chunk first (the order pages arrive when scrolling up).
fn chunked_pages(span: i64, chunk: usize) -> Vec<Vec<i64>> {
    let ids: Vec<i64> = (1..=span).collect();
    let mut pages: Vec<Vec<i64>> = ids.chunks(chunk).map(<[i64]>::to_vec).collect();
    pages.reverse();
    pages
}

proptest! {
    #[test]
    fn merges_stay_ordered_and_deduplicated(span in 1i64..120, chunk in 1usize..20) {
        let key = ConversationKey::new(1, 1);
        let mut cache = ConversationCache::new();
        let pages = chunked_pages(span, chunk);

        // Newest page is the initial load; the rest prepend.
        let mut iter = pages.into_iter();
        let newest = iter.next().unwrap();
        cache.replace_latest(key, page_of(&newest, true));
        for older in iter {
            cache.prepend_older(key, page_of(&older, true));
        }

        let ids = cached_ids(&cache, key);
        prop_assert_eq!(ids.clone(), (1..=span).collect::<Vec<_>>());
        prop_assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn refetching_any_page_is_a_no_op(span in 2i64..80, chunk in 1usize..10, repeat in 0usize..5) {
        let key = ConversationKey::new(1, 1);
        let mut cache = ConversationCache::new();
        let pages = chunked_pages(span, chunk);

        let mut iter = pages.clone().into_iter();
        cache.replace_latest(key, page_of(&iter.next().unwrap(), true));
        for older in iter {
            cache.prepend_older(key, page_of(&older, true));
        }
        let before = cached_ids(&cache, key);

        // Refetch an arbitrary already-merged page a few times.
        let target = &pages[repeat % pages.len()];
        for _ in 0..=repeat {
            let outcome = cache.prepend_older(key, page_of(target, true));
            prop_assert_eq!(outcome.inserted, 0);
        }

        prop_assert_eq!(cached_ids(&cache, key), before);
    }

    #[test]
    fn overlapping_pages_never_duplicate(overlap in 1usize..4) {
        let key = ConversationKey::new(1, 1);
        let mut cache = ConversationCache::new();
        cache.replace_latest(key, page_of(&[10, 11, 12], true));

        // An older page that overlaps the cached range by `overlap` ids.
        let page_ids: Vec<i64> = (8..=(9 + overlap as i64)).collect();
        cache.prepend_older(key, page_of(&page_ids, true));

        let ids = cached_ids(&cache, key);
        let mut deduped = ids.clone();
        deduped.dedup();
        prop_assert_eq!(ids, deduped);
    }
}
