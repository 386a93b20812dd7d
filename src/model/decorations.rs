//! Line-anchored decoration tracking.
//!
//! Decorations are opaque handles over ranges that must keep pointing at
//! the same logical lines while the document shifts underneath them. The
//! store adjusts every tracked range on line insertion and deletion;
//! callers re-read positions through the handle instead of caching line
//! numbers.

use serde::{Deserialize, Serialize};

use crate::position::{Position, Range};

/// Opaque handle to a tracked decoration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecorationId(u64);

#[derive(Clone, Debug)]
struct DecorationEntry {
    id: DecorationId,
    range: Range,
}

/// The set of tracked decorations of one document.
#[derive(Clone, Debug, Default)]
pub(crate) struct DecorationStore {
    next_id: u64,
    entries: Vec<DecorationEntry>,
}

impl DecorationStore {
    /// Remove `old_ids`, add `new_ranges`, return the new handles.
    pub(crate) fn delta(&mut self, old_ids: &[DecorationId], new_ranges: &[Range]) -> Vec<DecorationId> {
        self.entries.retain(|entry| !old_ids.contains(&entry.id));

        let mut ids = Vec::with_capacity(new_ranges.len());
        for range in new_ranges {
            self.next_id += 1;
            let id = DecorationId(self.next_id);
            self.entries.push(DecorationEntry { id, range: *range });
            ids.push(id);
        }
        ids
    }

    pub(crate) fn get(&self, id: DecorationId) -> Option<Range> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.range)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// `count` lines were inserted and now occupy `at..at + count`.
    ///
    /// Ranges at or below the insertion point shift down; a range spanning
    /// it (start above, end at or below) expands to keep covering its
    /// original tail.
    pub(crate) fn on_lines_inserted(&mut self, at: u32, count: u32) {
        for entry in &mut self.entries {
            if entry.range.start.line_number >= at {
                entry.range.start.line_number += count;
            }
            if entry.range.end.line_number >= at {
                entry.range.end.line_number += count;
            }
        }
    }

    /// Lines `from..=to` were deleted.
    ///
    /// Surviving endpoints renumber; an endpoint inside the deleted span
    /// snaps to the deletion point (start) or just above it (end), so a
    /// fully deleted range degenerates to an empty `start_line > end_line`
    /// interval.
    pub(crate) fn on_lines_deleted(&mut self, from: u32, to: u32) {
        let count = to - from + 1;
        for entry in &mut self.entries {
            let start = entry.range.start.line_number;
            let end = entry.range.end.line_number;

            entry.range.start = if start > to {
                Position::new(start - count, entry.range.start.column)
            } else if start >= from {
                Position::new(from, 1)
            } else {
                entry.range.start
            };
            entry.range.end = if end > to {
                Position::new(end - count, entry.range.end.column)
            } else if end >= from {
                Position::new(from.saturating_sub(1), 1)
            } else {
                entry.range.end
            };
        }
    }
}
