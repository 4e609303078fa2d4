//! Offset/count windowing over provider-ordered result collections.

use crate::ValidationError;

/// One page request: skip `start` items, keep at most `count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    start: usize,
    count: usize,
}

impl Window {
    /// Builds a window, rejecting `count` outside `1..=max_count`.
    pub fn new(start: usize, count: usize, max_count: usize) -> Result<Self, ValidationError> {
        if count == 0 || count > max_count {
            return Err(ValidationError::InvalidCount {
                count,
                max: max_count,
            });
        }

        Ok(Self { start, count })
    }

    pub const fn start(self) -> usize {
        self.start
    }

    pub const fn count(self) -> usize {
        self.count
    }

    /// Number of upstream items needed to fill this window.
    pub const fn fetch_depth(self) -> usize {
        self.start.saturating_add(self.count)
    }
}

/// An item with its 1-based rank across pages.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub rank: usize,
    pub item: T,
}

/// Slices `collection` to `window` without reordering.
///
/// Ranks continue from previous pages (`start + index + 1`), so walking pages
/// with increasing `start` over a stable upstream order gives contiguous ranks.
/// A `start` past the end yields an empty page.
pub fn window<T>(collection: Vec<T>, window: Window) -> Vec<Ranked<T>> {
    collection
        .into_iter()
        .skip(window.start)
        .take(window.count)
        .enumerate()
        .map(|(index, item)| Ranked {
            rank: window.start + index + 1,
            item,
        })
        .collect()
}
