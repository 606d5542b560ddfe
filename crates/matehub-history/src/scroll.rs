// SPDX-FileCopyrightText: 2026 MateHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure scroll-anchoring math.
//!
//! The cache defines *what* the anchoring policy is; these functions
//! compute the offsets so callers can apply it to whatever renders the
//! conversation. Nothing here touches a rendering target.

/// Scroll position of a conversation viewport, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    /// Distance scrolled from the top of the content.
    pub scroll_top: f64,
    /// Total content height.
    pub scroll_height: f64,
    /// Visible viewport height.
    pub viewport_height: f64,
}

/// Slack within which a position still counts as "at the edge". Keeps the
/// view anchored to the bottom through sub-threshold wobble (momentum
/// scrolling, fractional layout heights).
pub const EDGE_THRESHOLD_PX: f64 = 50.0;

/// Whether the viewport sits at the bottom-of-conversation edge.
pub fn is_at_bottom(metrics: ScrollMetrics) -> bool {
    metrics.scroll_top + metrics.viewport_height >= metrics.scroll_height - EDGE_THRESHOLD_PX
}

/// Whether the viewport is close enough to the top edge that older
/// history should be fetched.
pub fn is_near_top(metrics: ScrollMetrics) -> bool {
    metrics.scroll_top <= EDGE_THRESHOLD_PX
}

/// The scroll offset that leaves the visually anchored content unchanged
/// after content of some height was inserted *above* the viewport.
///
/// `new_scroll_height` is the content height after the insertion; the
/// delta between the heights is exactly how far everything moved down.
pub fn offset_after_prepend(before: ScrollMetrics, new_scroll_height: f64) -> f64 {
    before.scroll_top + (new_scroll_height - before.scroll_height)
}

/// The scroll offset pinning the viewport to the bottom edge.
pub fn bottom_offset(scroll_height: f64, viewport_height: f64) -> f64 {
    (scroll_height - viewport_height).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(scroll_top: f64, scroll_height: f64, viewport_height: f64) -> ScrollMetrics {
        ScrollMetrics {
            scroll_top,
            scroll_height,
            viewport_height,
        }
    }

    #[test]
    fn exactly_at_bottom_counts() {
        assert!(is_at_bottom(metrics(600.0, 1000.0, 400.0)));
    }

    #[test]
    fn within_threshold_counts_as_bottom() {
        assert!(is_at_bottom(metrics(560.0, 1000.0, 400.0)));
    }

    #[test]
    fn beyond_threshold_is_not_bottom() {
        assert!(!is_at_bottom(metrics(500.0, 1000.0, 400.0)));
    }

    #[test]
    fn near_top_detection() {
        assert!(is_near_top(metrics(0.0, 1000.0, 400.0)));
        assert!(is_near_top(metrics(50.0, 1000.0, 400.0)));
        assert!(!is_near_top(metrics(51.0, 1000.0, 400.0)));
    }

    #[test]
    fn prepend_offset_preserves_anchor() {
        // 300px of older messages inserted above: the anchor moves down by
        // exactly that delta.
        let before = metrics(120.0, 1000.0, 400.0);
        assert_eq!(offset_after_prepend(before, 1300.0), 420.0);
    }

    #[test]
    fn prepend_offset_is_identity_when_nothing_inserted() {
        let before = metrics(120.0, 1000.0, 400.0);
        assert_eq!(offset_after_prepend(before, 1000.0), 120.0);
    }

    #[test]
    fn bottom_offset_clamps_short_content() {
        assert_eq!(bottom_offset(1000.0, 400.0), 600.0);
        // Content shorter than the viewport never scrolls.
        assert_eq!(bottom_offset(300.0, 400.0), 0.0);
    }
}
