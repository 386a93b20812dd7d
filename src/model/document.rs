//! Rope-backed reference document.

use ropey::Rope;

use crate::model::decorations::DecorationStore;
use crate::model::{DecorationId, TextModel};
use crate::position::{Position, Range};
use crate::tokens::{LineTokens, TokenKind};

/// Reference [`TextModel`]: a rope of lines with a monotonic version, a
/// decoration store, and optional per-line tokens.
///
/// Mutators bump the version; the host is expected to deliver the matching
/// change event to its view collection afterwards. The document always has
/// at least one line (an empty document is one empty line).
#[derive(Clone, Debug)]
pub struct Document {
    rope: Rope,
    version_id: u64,
    line_tokens: Vec<Option<LineTokens>>,
    decorations: DecorationStore,
}

impl Document {
    /// Create a document from initial text.
    #[must_use]
    pub fn new(text: &str) -> Self {
        let rope = Rope::from_str(text);
        let line_count = rope.len_lines();
        Self {
            rope,
            version_id: 1,
            line_tokens: vec![None; line_count],
            decorations: DecorationStore::default(),
        }
    }

    /// Replace the whole content. Drops all tokens and decorations.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.line_tokens = vec![None; self.rope.len_lines()];
        self.decorations.clear();
        self.version_id += 1;
    }

    /// Insert lines so that `texts` become lines `at..at + texts.len()`.
    ///
    /// `at` may be `line_count() + 1` to append after the last line.
    pub fn insert_lines(&mut self, at: u32, texts: &[&str]) {
        if texts.is_empty() {
            return;
        }
        let line_count = self.line_count();
        assert!(
            at >= 1 && at <= line_count + 1,
            "insertion point {at} outside 1..={}",
            line_count + 1
        );
        debug_assert!(
            texts.iter().all(|text| !text.contains('\n')),
            "inserted lines must not contain terminators"
        );

        let joined = texts.join("\n");
        if at == line_count + 1 {
            let len = self.rope.len_chars();
            self.rope.insert(len, "\n");
            self.rope.insert(len + 1, &joined);
        } else {
            let offset = self.rope.line_to_char((at - 1) as usize);
            self.rope.insert(offset, &joined);
            self.rope.insert(offset + joined.chars().count(), "\n");
        }

        let index = (at - 1) as usize;
        self.line_tokens
            .splice(index..index, std::iter::repeat(None).take(texts.len()));
        self.decorations.on_lines_inserted(at, texts.len() as u32);
        self.version_id += 1;
    }

    /// Delete lines `from..=to`. At least one line must survive.
    pub fn remove_lines(&mut self, from: u32, to: u32) {
        let line_count = self.line_count();
        assert!(from >= 1 && from <= to && to <= line_count, "bad line range {from}..={to}");
        assert!(
            from > 1 || to < line_count,
            "cannot remove every line of the document"
        );

        if to == line_count {
            // Deleting through the last line also consumes the newline
            // that separated it from the surviving prefix.
            let start = self.rope.line_to_char((from - 1) as usize) - 1;
            let end = self.rope.len_chars();
            self.rope.remove(start..end);
        } else {
            let start = self.rope.line_to_char((from - 1) as usize);
            let end = self.rope.line_to_char(to as usize);
            self.rope.remove(start..end);
        }

        self.line_tokens.drain((from - 1) as usize..to as usize);
        self.decorations.on_lines_deleted(from, to);
        self.version_id += 1;
    }

    /// Replace one line's content. Stored tokens for the line are dropped.
    pub fn set_line_content(&mut self, line_number: u32, text: &str) {
        self.assert_line(line_number);
        debug_assert!(!text.contains('\n'), "line content must not contain terminators");
        let start = self.rope.line_to_char((line_number - 1) as usize);
        let end = start + self.line_char_len(line_number);
        self.rope.remove(start..end);
        self.rope.insert(start, text);

        self.line_tokens[(line_number - 1) as usize] = None;
        self.version_id += 1;
    }

    /// Attach exact tokens to a line. They are dropped again when the
    /// line's content changes.
    pub fn set_line_tokens(&mut self, line_number: u32, tokens: LineTokens) {
        self.assert_line(line_number);
        self.line_tokens[(line_number - 1) as usize] = Some(tokens);
    }

    fn assert_line(&self, line_number: u32) {
        assert!(
            line_number >= 1 && line_number <= self.line_count(),
            "line {line_number} outside 1..={}",
            self.line_count()
        );
    }

    /// Char length of the line, excluding its terminator.
    fn line_char_len(&self, line_number: u32) -> usize {
        let line = self.rope.line((line_number - 1) as usize);
        let mut len = line.len_chars();
        // ropey keeps the terminator on the slice.
        if len > 0 && line.char(len - 1) == '\n' {
            len -= 1;
            if len > 0 && line.char(len - 1) == '\r' {
                len -= 1;
            }
        }
        len
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("")
    }
}

impl TextModel for Document {
    fn version_id(&self) -> u64 {
        self.version_id
    }

    fn line_count(&self) -> u32 {
        self.rope.len_lines() as u32
    }

    fn lines_content(&self) -> Vec<String> {
        (1..=self.line_count())
            .map(|n| self.line_content(n))
            .collect()
    }

    fn line_content(&self, line_number: u32) -> String {
        self.assert_line(line_number);
        let line = self.rope.line((line_number - 1) as usize);
        line.slice(..self.line_char_len(line_number)).to_string()
    }

    fn line_min_column(&self, _line_number: u32) -> u32 {
        1
    }

    fn line_max_column(&self, line_number: u32) -> u32 {
        self.assert_line(line_number);
        self.line_char_len(line_number) as u32 + 1
    }

    fn line_tokens(&self, line_number: u32, _inaccurate: bool) -> LineTokens {
        self.assert_line(line_number);
        match &self.line_tokens[(line_number - 1) as usize] {
            Some(tokens) => tokens.clone(),
            None => LineTokens::whole_line(TokenKind::Text, self.line_max_column(line_number) - 1),
        }
    }

    fn decoration_range(&self, id: DecorationId) -> Option<Range> {
        self.decorations.get(id)
    }

    fn validate_range(&self, range: Range) -> Range {
        let clamp = |pos: Position| {
            let line_number = pos.line_number.clamp(1, self.line_count());
            let column = pos.column.clamp(1, self.line_max_column(line_number));
            Position::new(line_number, column)
        };
        let start = clamp(range.start);
        let mut end = clamp(range.end);
        if end < start {
            end = start;
        }
        Range::new(start, end)
    }

    fn delta_decorations(
        &mut self,
        old_ids: &[DecorationId],
        new_ranges: &[Range],
    ) -> Vec<DecorationId> {
        self.decorations.delta(old_ids, new_ranges)
    }
}
