//! The document side of the view layer.
//!
//! [`TextModel`] is the read-mostly contract the view collection consumes:
//! versioned line content, per-line token streams, and a decoration store
//! that anchors ranges across edits. [`Document`] is the crate's reference
//! implementation, rope-backed and line-oriented; any host model providing
//! the same contract works.

mod decorations;
mod document;

pub use decorations::DecorationId;
pub use document::Document;

use crate::position::Range;
use crate::tokens::LineTokens;

/// Versioned line-oriented document consumed by the view collection.
///
/// Line numbers are 1-based. Columns are 1-based char offsets plus one;
/// a line's max column is one past its last character.
pub trait TextModel {
    /// Monotonically increasing mutation counter.
    fn version_id(&self) -> u64;

    /// Number of lines; always at least 1.
    fn line_count(&self) -> u32;

    /// All line contents, without line terminators.
    fn lines_content(&self) -> Vec<String>;

    /// One line's content, without its line terminator.
    fn line_content(&self, line_number: u32) -> String;

    /// Smallest valid column on the line (1).
    fn line_min_column(&self, line_number: u32) -> u32;

    /// One past the line's last character.
    fn line_max_column(&self, line_number: u32) -> u32;

    /// The line's token stream. `inaccurate` permits a stale or
    /// approximate answer when exact tokens are not available.
    fn line_tokens(&self, line_number: u32, inaccurate: bool) -> LineTokens;

    /// Current position of a tracked decoration, or `None` for an unknown
    /// id. A returned range with `start_line > end_line` is empty (the
    /// decorated lines were all deleted).
    fn decoration_range(&self, id: DecorationId) -> Option<Range>;

    /// Clamp a range to the document's current bounds.
    fn validate_range(&self, range: Range) -> Range;

    /// Atomically remove `old_ids` and track `new_ranges`, returning one
    /// id per new range. Unknown old ids are ignored.
    fn delta_decorations(&mut self, old_ids: &[DecorationId], new_ranges: &[Range])
        -> Vec<DecorationId>;
}
