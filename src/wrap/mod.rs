//! Line wrapping: where an input line breaks and how continuations indent.
//!
//! The view collection never decides break points itself. It asks a
//! [`LineMapperFactory`] once per input line and caches the returned
//! [`LineMapping`] inside the line's split representation until the text
//! or the wrapping configuration changes. A factory returning `None`
//! means the line fits as-is.

mod monospace;

pub use monospace::MonospaceLineMapperFactory;

use serde::{Deserialize, Serialize};

use crate::position::OutputPosition;

/// Hanging-indent policy for the continuation rows of a wrapped line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrappingIndent {
    /// Continuations start at column 1.
    #[default]
    None,
    /// Continuations repeat the line's leading whitespace.
    Same,
    /// Leading whitespace plus one extra tab.
    Indent,
    /// Leading whitespace plus two extra tabs.
    DeepIndent,
}

/// Immutable break decision for one input line.
///
/// All offsets are 0-based char offsets into the line. Output line
/// indices are 0-based and local to the line.
pub trait LineMapping {
    /// Number of output rows; at least 1 (a factory that would answer 1
    /// should have returned no mapping instead).
    fn output_line_count(&self) -> u32;

    /// Indent prefix rendered on rows 1 and up. May be empty.
    fn wrapped_lines_indent(&self) -> &str;

    /// Input char offset of `(row, offset-within-row-slice)`. The offset
    /// is clamped to the row's slice length.
    fn input_offset_of_output_position(&self, output_line_index: u32, output_offset: u32) -> u32;

    /// Output row and offset of an input char offset. An offset equal to
    /// a break point belongs to the row that starts there.
    fn output_position_of_input_offset(&self, input_offset: u32) -> OutputPosition;
}

/// Per-line break policy consumed by the view collection.
pub trait LineMapperFactory {
    /// Decide the breaks for one line, or `None` when the line fits
    /// without wrapping (including when `wrapping_column` is `None`).
    fn create_line_mapping(
        &self,
        text: &str,
        tab_size: u32,
        wrapping_column: Option<u32>,
        columns_for_full_width_char: u32,
        wrapping_indent: WrappingIndent,
    ) -> Option<Box<dyn LineMapping>>;
}
