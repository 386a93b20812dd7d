//! Per-input-line projection onto output rows.

use crate::model::TextModel;
use crate::position::Position;
use crate::tokens::LineTokens;
use crate::wrap::LineMapping;

/// How one input line projects onto output rows.
enum Projection {
    /// The line fits: one output row, identity column mapping.
    Identity,
    /// The line wraps according to an immutable mapping. The indent and
    /// row count are cached at construction; a config change replaces the
    /// whole split line rather than mutating it.
    Wrapped {
        mapping: Box<dyn LineMapping>,
        indent: String,
        indent_len: u32,
        output_count: u32,
    },
}

/// Projection of exactly one input line.
///
/// Visibility is the only mutable attribute. Every query method except
/// [`output_line_count`](Self::output_line_count) asserts that the line is
/// visible: the collection's public API resolves output lines through the
/// prefix sum, which never lands on a hidden line, so reaching one here is
/// a caller bug.
pub struct SplitLine {
    visible: bool,
    projection: Projection,
}

impl SplitLine {
    /// An unwrapped line.
    #[must_use]
    pub fn identity(visible: bool) -> Self {
        Self {
            visible,
            projection: Projection::Identity,
        }
    }

    /// A wrapped line. Caches the mapping's indent and row count.
    #[must_use]
    pub fn wrapped(mapping: Box<dyn LineMapping>, visible: bool) -> Self {
        let indent = mapping.wrapped_lines_indent().to_string();
        let indent_len = indent.chars().count() as u32;
        let output_count = mapping.output_line_count();
        Self {
            visible,
            projection: Projection::Wrapped {
                mapping,
                indent,
                indent_len,
                output_count,
            },
        }
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Output rows this line contributes: 0 while hidden.
    #[must_use]
    pub fn output_line_count(&self) -> u32 {
        if !self.visible {
            return 0;
        }
        match &self.projection {
            Projection::Identity => 1,
            Projection::Wrapped { output_count, .. } => *output_count,
        }
    }

    /// The char range of the input line shown on `output_index`, as
    /// `[start, end)` offsets.
    fn row_slice(
        &self,
        model: &dyn TextModel,
        line_number: u32,
        output_index: u32,
    ) -> (u32, u32) {
        match &self.projection {
            Projection::Identity => (0, model.line_max_column(line_number) - 1),
            Projection::Wrapped {
                mapping,
                output_count,
                ..
            } => {
                let start = mapping.input_offset_of_output_position(output_index, 0);
                let end = if output_index + 1 < *output_count {
                    mapping.input_offset_of_output_position(output_index + 1, 0)
                } else {
                    model.line_max_column(line_number) - 1
                };
                (start, end)
            }
        }
    }

    /// Content rendered on one output row.
    #[must_use]
    pub fn output_line_content(
        &self,
        model: &dyn TextModel,
        line_number: u32,
        output_index: u32,
    ) -> String {
        self.assert_visible();
        let content = model.line_content(line_number);
        let (start, end) = self.row_slice(model, line_number, output_index);
        let slice = char_slice(&content, start, end);
        match &self.projection {
            Projection::Wrapped { indent, .. } if output_index > 0 => {
                let mut out = indent.clone();
                out.push_str(slice);
                out
            }
            _ => slice.to_string(),
        }
    }

    /// Smallest valid column on one output row.
    #[must_use]
    pub fn output_line_min_column(
        &self,
        model: &dyn TextModel,
        line_number: u32,
        output_index: u32,
    ) -> u32 {
        self.assert_visible();
        match &self.projection {
            Projection::Identity => model.line_min_column(line_number),
            Projection::Wrapped { indent_len, .. } => {
                if output_index == 0 {
                    1
                } else {
                    indent_len + 1
                }
            }
        }
    }

    /// One past the last column on one output row.
    #[must_use]
    pub fn output_line_max_column(
        &self,
        model: &dyn TextModel,
        line_number: u32,
        output_index: u32,
    ) -> u32 {
        self.assert_visible();
        match &self.projection {
            Projection::Identity => model.line_max_column(line_number),
            Projection::Wrapped { indent_len, .. } => {
                let (start, end) = self.row_slice(model, line_number, output_index);
                let indent = if output_index > 0 { *indent_len } else { 0 };
                indent + (end - start) + 1
            }
        }
    }

    /// Tokens restricted to one output row, shifted past the indent on
    /// continuations.
    #[must_use]
    pub fn output_line_tokens(
        &self,
        model: &dyn TextModel,
        line_number: u32,
        output_index: u32,
        inaccurate: bool,
    ) -> LineTokens {
        self.assert_visible();
        let tokens = model.line_tokens(line_number, inaccurate);
        let (start, end) = self.row_slice(model, line_number, output_index);
        let delta = match &self.projection {
            Projection::Wrapped { indent_len, .. } if output_index > 0 => *indent_len,
            _ => 0,
        };
        tokens.restricted(start, end, delta)
    }

    /// Input column of an output (row, column). Columns inside a
    /// continuation's indent clamp to the row's first input offset.
    #[must_use]
    pub fn input_column_of_output_position(&self, output_index: u32, output_column: u32) -> u32 {
        self.assert_visible();
        match &self.projection {
            Projection::Identity => output_column,
            Projection::Wrapped {
                mapping,
                indent_len,
                ..
            } => {
                let mut adjusted = output_column.saturating_sub(1);
                if output_index > 0 {
                    adjusted = adjusted.saturating_sub(*indent_len);
                }
                mapping.input_offset_of_output_position(output_index, adjusted) + 1
            }
        }
    }

    /// Output position of an input column. `delta_line_number` is the
    /// 1-based output line number of this input line's first row.
    #[must_use]
    pub fn output_position_of_input_position(
        &self,
        delta_line_number: u32,
        input_column: u32,
    ) -> Position {
        self.assert_visible();
        match &self.projection {
            Projection::Identity => Position::new(delta_line_number, input_column),
            Projection::Wrapped {
                mapping,
                indent_len,
                ..
            } => {
                let pos = mapping.output_position_of_input_offset(input_column.saturating_sub(1));
                let mut output_offset = pos.output_offset;
                if pos.output_line_index > 0 {
                    output_offset += *indent_len;
                }
                Position::new(delta_line_number + pos.output_line_index, output_offset + 1)
            }
        }
    }

    fn assert_visible(&self) {
        assert!(self.visible, "query on a hidden line");
    }
}

/// Slice a string by char offsets.
fn char_slice(s: &str, start: u32, end: u32) -> &str {
    let byte_start = byte_of_char_offset(s, start as usize);
    let byte_end = byte_of_char_offset(s, end as usize);
    &s[byte_start..byte_end.max(byte_start)]
}

fn byte_of_char_offset(s: &str, char_offset: usize) -> usize {
    s.char_indices()
        .nth(char_offset)
        .map_or(s.len(), |(byte, _)| byte)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Document;
    use crate::position::OutputPosition;
    use crate::tokens::{Token, TokenKind};

    /// Fixed break table: rows start at the given offsets.
    struct FixedMapping {
        breaks: Vec<u32>,
        text_len: u32,
        indent: String,
    }

    impl LineMapping for FixedMapping {
        fn output_line_count(&self) -> u32 {
            self.breaks.len() as u32
        }

        fn wrapped_lines_indent(&self) -> &str {
            &self.indent
        }

        fn input_offset_of_output_position(&self, row: u32, offset: u32) -> u32 {
            let start = self.breaks[row as usize];
            let end = if (row as usize) + 1 < self.breaks.len() {
                self.breaks[row as usize + 1]
            } else {
                self.text_len
            };
            start + offset.min(end - start)
        }

        fn output_position_of_input_offset(&self, input_offset: u32) -> OutputPosition {
            let offset = input_offset.min(self.text_len);
            let row = self.breaks.partition_point(|&b| b <= offset) - 1;
            OutputPosition::new(row as u32, offset - self.breaks[row])
        }
    }

    fn wrapped_abcdefghij() -> (Document, SplitLine) {
        let doc = Document::new("abcdefghij");
        let line = SplitLine::wrapped(
            Box::new(FixedMapping {
                breaks: vec![0, 4, 8],
                text_len: 10,
                indent: "  ".to_string(),
            }),
            true,
        );
        (doc, line)
    }

    #[test]
    fn test_identity_passthrough() {
        let doc = Document::new("hello");
        let line = SplitLine::identity(true);
        assert_eq!(line.output_line_count(), 1);
        assert_eq!(line.output_line_content(&doc, 1, 0), "hello");
        assert_eq!(line.output_line_min_column(&doc, 1, 0), 1);
        assert_eq!(line.output_line_max_column(&doc, 1, 0), 6);
        assert_eq!(line.input_column_of_output_position(0, 3), 3);
        assert_eq!(
            line.output_position_of_input_position(7, 3),
            Position::new(7, 3)
        );
    }

    #[test]
    fn test_hidden_contributes_nothing() {
        let mut line = SplitLine::identity(true);
        line.set_visible(false);
        assert_eq!(line.output_line_count(), 0);
        line.set_visible(true);
        assert_eq!(line.output_line_count(), 1);
    }

    #[test]
    #[should_panic(expected = "hidden line")]
    fn test_hidden_query_panics() {
        let doc = Document::new("x");
        let line = SplitLine::identity(false);
        let _ = line.output_line_content(&doc, 1, 0);
    }

    #[test]
    fn test_wrapped_contents() {
        let (doc, line) = wrapped_abcdefghij();
        assert_eq!(line.output_line_count(), 3);
        assert_eq!(line.output_line_content(&doc, 1, 0), "abcd");
        assert_eq!(line.output_line_content(&doc, 1, 1), "  efgh");
        assert_eq!(line.output_line_content(&doc, 1, 2), "  ij");
    }

    #[test]
    fn test_wrapped_columns() {
        let (doc, line) = wrapped_abcdefghij();
        assert_eq!(line.output_line_min_column(&doc, 1, 0), 1);
        assert_eq!(line.output_line_min_column(&doc, 1, 1), 3);
        assert_eq!(line.output_line_max_column(&doc, 1, 0), 5);
        assert_eq!(line.output_line_max_column(&doc, 1, 1), 7);
        assert_eq!(line.output_line_max_column(&doc, 1, 2), 5);
    }

    #[test]
    fn test_wrapped_forward_map() {
        let (_doc, line) = wrapped_abcdefghij();
        // Input column 7 is offset 6, row 1 offset 2, shifted past the indent.
        assert_eq!(
            line.output_position_of_input_position(1, 7),
            Position::new(2, 5)
        );
        // Row 0 gets no indent shift.
        assert_eq!(
            line.output_position_of_input_position(1, 2),
            Position::new(1, 2)
        );
    }

    #[test]
    fn test_wrapped_inverse_map_clamps_into_indent() {
        let (_doc, line) = wrapped_abcdefghij();
        assert_eq!(line.input_column_of_output_position(1, 3), 5);
        // Columns 1 and 2 sit inside the indent and clamp to the row start.
        assert_eq!(line.input_column_of_output_position(1, 1), 5);
        assert_eq!(line.input_column_of_output_position(1, 2), 5);
    }

    #[test]
    fn test_wrapped_tokens_shift_past_indent() {
        let (mut doc, line) = wrapped_abcdefghij();
        doc.set_line_tokens(
            1,
            LineTokens::new(vec![
                Token::new(TokenKind::Keyword, 0, 5),
                Token::new(TokenKind::Identifier, 5, 10),
            ]),
        );
        assert_eq!(
            line.output_line_tokens(&doc, 1, 0, false).tokens(),
            &[Token::new(TokenKind::Keyword, 0, 4)]
        );
        assert_eq!(
            line.output_line_tokens(&doc, 1, 1, false).tokens(),
            &[
                Token::new(TokenKind::Keyword, 2, 3),
                Token::new(TokenKind::Identifier, 3, 6),
            ]
        );
        assert_eq!(
            line.output_line_tokens(&doc, 1, 2, false).tokens(),
            &[Token::new(TokenKind::Identifier, 2, 4)]
        );
    }

    #[test]
    fn test_char_slice_multibyte() {
        assert_eq!(char_slice("日本語です", 1, 3), "本語");
        assert_eq!(char_slice("abc", 2, 3), "c");
        assert_eq!(char_slice("abc", 3, 3), "");
    }
}
