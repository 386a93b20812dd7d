//! The aggregate over all input lines.

use crate::error::{Error, Result};
use crate::event::{ViewEvent, ViewEventSink};
use crate::model::{DecorationId, TextModel};
use crate::position::{Position, Range};
use crate::prefix_sum::PrefixSumComputer;
use crate::tokens::LineTokens;
use crate::view::split_line::SplitLine;
use crate::wrap::{LineMapperFactory, WrappingIndent};

/// Projects a versioned document through soft wrapping and hidden areas
/// onto the output (view) line sequence.
///
/// Holds one [`SplitLine`] per input line plus a prefix sum over their
/// effective output counts, so output-line indexing is O(log N). The
/// collection never owns the document: the host passes its model into
/// every call and must deliver each model mutation as a change event, in
/// strictly increasing version order, before querying again.
pub struct SplitLinesCollection {
    factory: Box<dyn LineMapperFactory>,
    events: ViewEventSink,
    lines: Vec<SplitLine>,
    prefix_sum: PrefixSumComputer,
    hidden_decoration_ids: Vec<DecorationId>,
    valid_version_id: u64,
    tab_size: u32,
    wrapping_column: Option<u32>,
    columns_for_full_width_char: u32,
    wrapping_indent: WrappingIndent,
}

impl SplitLinesCollection {
    /// Build the projection of the model's current content. All lines
    /// start visible.
    #[must_use]
    pub fn new(
        model: &dyn TextModel,
        factory: Box<dyn LineMapperFactory>,
        events: ViewEventSink,
        tab_size: u32,
        wrapping_column: Option<u32>,
        columns_for_full_width_char: u32,
        wrapping_indent: WrappingIndent,
    ) -> Self {
        let mut collection = Self {
            factory,
            events,
            lines: Vec::new(),
            prefix_sum: PrefixSumComputer::default(),
            hidden_decoration_ids: Vec::new(),
            valid_version_id: 0,
            tab_size,
            wrapping_column,
            columns_for_full_width_char,
            wrapping_indent,
        };
        collection.reconstruct(model);
        collection
    }

    /// Release the hidden-area decoration handles.
    pub fn dispose(&mut self, model: &mut dyn TextModel) {
        self.hidden_decoration_ids = model.delta_decorations(&self.hidden_decoration_ids, &[]);
    }

    // ---- configuration ------------------------------------------------

    #[must_use]
    pub fn tab_size(&self) -> u32 {
        self.tab_size
    }

    #[must_use]
    pub fn wrapping_column(&self) -> Option<u32> {
        self.wrapping_column
    }

    #[must_use]
    pub fn wrapping_indent(&self) -> WrappingIndent {
        self.wrapping_indent
    }

    /// Change the tab size. Returns whether anything changed; a change
    /// rebuilds every split line (visibility resets to visible) and emits
    /// one flush event.
    pub fn set_tab_size(&mut self, model: &dyn TextModel, tab_size: u32) -> bool {
        if self.tab_size == tab_size {
            return false;
        }
        self.tab_size = tab_size;
        self.reconstruct(model);
        (self.events)(ViewEvent::ModelFlushed);
        true
    }

    /// Change the wrapping column (`None` turns wrapping off) and the
    /// full-width column cost. Same rebuild semantics as
    /// [`set_tab_size`](Self::set_tab_size).
    pub fn set_wrapping_column(
        &mut self,
        model: &dyn TextModel,
        wrapping_column: Option<u32>,
        columns_for_full_width_char: u32,
    ) -> bool {
        if self.wrapping_column == wrapping_column
            && self.columns_for_full_width_char == columns_for_full_width_char
        {
            return false;
        }
        self.wrapping_column = wrapping_column;
        self.columns_for_full_width_char = columns_for_full_width_char;
        self.reconstruct(model);
        (self.events)(ViewEvent::ModelFlushed);
        true
    }

    /// Change the hanging-indent policy. Same rebuild semantics as
    /// [`set_tab_size`](Self::set_tab_size).
    pub fn set_wrapping_indent(&mut self, model: &dyn TextModel, indent: WrappingIndent) -> bool {
        if self.wrapping_indent == indent {
            return false;
        }
        self.wrapping_indent = indent;
        self.reconstruct(model);
        (self.events)(ViewEvent::ModelFlushed);
        true
    }

    // ---- visibility ----------------------------------------------------

    /// Replace the set of hidden input-line ranges.
    ///
    /// Ranges are validated against the model, sorted, and merged when
    /// their line intervals touch or overlap; hiding is per whole input
    /// line, columns are ignored. The merged ranges replace the previous
    /// decoration batch so the model keeps them anchored across future
    /// edits. Emits one flush event.
    pub fn set_hidden_areas(&mut self, model: &mut dyn TextModel, ranges: &[Range]) {
        let mut sorted: Vec<Range> = ranges
            .iter()
            .map(|range| model.validate_range(*range))
            .collect();
        sorted.sort_by_key(|range| (range.start_line(), range.end_line()));

        let mut merged: Vec<Range> = Vec::new();
        for range in sorted {
            match merged.last_mut() {
                Some(last) if last.lines_touch(&range) => {
                    if range.end_line() > last.end_line() {
                        last.end = Position::new(
                            range.end_line(),
                            model.line_max_column(range.end_line()),
                        );
                    }
                }
                _ => {
                    merged.push(Range::new(
                        Position::new(range.start_line(), 1),
                        Position::new(range.end_line(), model.line_max_column(range.end_line())),
                    ));
                }
            }
        }

        self.hidden_decoration_ids =
            model.delta_decorations(&self.hidden_decoration_ids, &merged);

        let mut cursor = 0usize;
        for line_number in 1..=self.lines.len() as u32 {
            while cursor < merged.len() && merged[cursor].end_line() < line_number {
                cursor += 1;
            }
            let hidden = cursor < merged.len() && merged[cursor].start_line() <= line_number;
            let index = (line_number - 1) as usize;
            if self.lines[index].is_visible() == hidden {
                self.lines[index].set_visible(!hidden);
                let count = self.lines[index].output_line_count();
                self.prefix_sum.change_value(index, count);
            }
        }

        (self.events)(ViewEvent::ModelFlushed);
    }

    // ---- document change events -----------------------------------------

    /// The document was rebuilt wholesale: reconstruct everything.
    pub fn on_model_flushed(&mut self, model: &dyn TextModel, version_id: u64) {
        if version_id <= self.valid_version_id {
            return;
        }
        self.reconstruct(model);
        (self.events)(ViewEvent::ModelFlushed);
    }

    /// Input lines `from..=to` were deleted.
    pub fn on_model_lines_deleted(&mut self, version_id: u64, from: u32, to: u32) {
        if version_id <= self.valid_version_id {
            return;
        }
        debug_assert!(from >= 1 && from <= to && to as usize <= self.lines.len());
        self.valid_version_id = version_id;

        // The affected output range, read before the splice.
        let out_from = if from == 1 {
            1
        } else {
            self.prefix_sum.accumulated((from - 2) as usize) + 1
        };
        let out_to = self.prefix_sum.accumulated((to - 1) as usize);

        self.lines.drain((from - 1) as usize..to as usize);
        self.prefix_sum
            .remove_values((from - 1) as usize, (to - from + 1) as usize);

        (self.events)(ViewEvent::LinesDeleted {
            from_line_number: out_from,
            to_line_number: out_to,
        });
    }

    /// `texts` were inserted as input lines `from..`.
    ///
    /// The new lines inherit visibility from the hidden range containing
    /// `(from, 1)`, if any: lines typed into a hidden region stay hidden.
    pub fn on_model_lines_inserted(
        &mut self,
        model: &dyn TextModel,
        version_id: u64,
        from: u32,
        texts: &[&str],
    ) {
        if version_id <= self.valid_version_id {
            return;
        }
        debug_assert!(from >= 1 && (from - 1) as usize <= self.lines.len());
        self.valid_version_id = version_id;

        let hidden = self
            .hidden_ranges(model)
            .iter()
            .any(|range| range.contains_line(from));

        let new_lines: Vec<SplitLine> = texts
            .iter()
            .map(|text| self.build_split_line(text, !hidden))
            .collect();
        let counts: Vec<u32> = new_lines.iter().map(SplitLine::output_line_count).collect();
        let total_new: u32 = counts.iter().sum();

        let index = (from - 1) as usize;
        self.lines.splice(index..index, new_lines);
        self.prefix_sum.insert_values(index, &counts);

        let out_from = if from == 1 {
            1
        } else {
            self.prefix_sum.accumulated((from - 2) as usize) + 1
        };
        (self.events)(ViewEvent::LinesInserted {
            from_line_number: out_from,
            to_line_number: out_from + total_new - 1,
        });
    }

    /// One input line's text changed. Returns whether the line's output
    /// row count changed (so downstream line mappings shifted).
    pub fn on_model_line_changed(
        &mut self,
        version_id: u64,
        line_number: u32,
        new_text: &str,
    ) -> bool {
        if version_id <= self.valid_version_id {
            return false;
        }
        debug_assert!(line_number >= 1 && (line_number as usize) <= self.lines.len());
        self.valid_version_id = version_id;

        let index = (line_number - 1) as usize;
        let visible = self.lines[index].is_visible();
        let old_count = self.lines[index].output_line_count();
        self.lines[index] = self.build_split_line(new_text, visible);
        let new_count = self.lines[index].output_line_count();
        self.prefix_sum.change_value(index, new_count);

        let out_start = if line_number == 1 {
            1
        } else {
            self.prefix_sum.accumulated(index - 1) + 1
        };
        for row in 0..old_count.min(new_count) {
            (self.events)(ViewEvent::LineChanged {
                line_number: out_start + row,
            });
        }
        if new_count > old_count {
            (self.events)(ViewEvent::LinesInserted {
                from_line_number: out_start + old_count,
                to_line_number: out_start + new_count - 1,
            });
            true
        } else if new_count < old_count {
            (self.events)(ViewEvent::LinesDeleted {
                from_line_number: out_start + new_count,
                to_line_number: out_start + old_count - 1,
            });
            true
        } else {
            false
        }
    }

    // ---- queries ---------------------------------------------------------

    /// Total output lines.
    pub fn output_line_count(&self, model: &dyn TextModel) -> Result<u32> {
        self.ensure_valid(model)?;
        Ok(self.prefix_sum.total())
    }

    /// Content of one output line.
    pub fn output_line_content(&self, model: &dyn TextModel, output_line: u32) -> Result<String> {
        self.ensure_valid(model)?;
        let (index, row) = self.locate_output_line(output_line)?;
        Ok(self.lines[index].output_line_content(model, index as u32 + 1, row))
    }

    /// Smallest valid column of one output line.
    pub fn output_line_min_column(
        &self,
        model: &dyn TextModel,
        output_line: u32,
    ) -> Result<u32> {
        self.ensure_valid(model)?;
        let (index, row) = self.locate_output_line(output_line)?;
        Ok(self.lines[index].output_line_min_column(model, index as u32 + 1, row))
    }

    /// One past the last column of one output line.
    pub fn output_line_max_column(
        &self,
        model: &dyn TextModel,
        output_line: u32,
    ) -> Result<u32> {
        self.ensure_valid(model)?;
        let (index, row) = self.locate_output_line(output_line)?;
        Ok(self.lines[index].output_line_max_column(model, index as u32 + 1, row))
    }

    /// Tokens of one output line, rebased onto its columns.
    pub fn output_line_tokens(
        &self,
        model: &dyn TextModel,
        output_line: u32,
        inaccurate: bool,
    ) -> Result<LineTokens> {
        self.ensure_valid(model)?;
        let (index, row) = self.locate_output_line(output_line)?;
        Ok(self.lines[index].output_line_tokens(model, index as u32 + 1, row, inaccurate))
    }

    /// Translate an output position to its input position. The column
    /// clamps into the output line's valid range first, so positions
    /// inside a continuation's indent resolve to the wrap start.
    pub fn output_to_input_position(
        &self,
        model: &dyn TextModel,
        output_line: u32,
        output_column: u32,
    ) -> Result<Position> {
        self.ensure_valid(model)?;
        let (index, row) = self.locate_output_line(output_line)?;
        let line = &self.lines[index];
        let max_column = line.output_line_max_column(model, index as u32 + 1, row);
        let column = output_column.clamp(1, max_column);
        Ok(Position::new(
            index as u32 + 1,
            line.input_column_of_output_position(row, column),
        ))
    }

    /// Translate an input position to its output position.
    ///
    /// The line number clamps into the document; a hidden line resolves to
    /// the end of the nearest preceding visible line, or `(1, 1)` when
    /// every preceding line is hidden too.
    pub fn input_to_output_position(
        &self,
        model: &dyn TextModel,
        input_line: u32,
        input_column: u32,
    ) -> Result<Position> {
        self.ensure_valid(model)?;
        let line_count = self.lines.len() as u32;
        let mut index = (input_line.clamp(1, line_count) - 1) as usize;

        let column;
        if self.lines[index].is_visible() {
            let line_number = index as u32 + 1;
            column = input_column.clamp(
                model.line_min_column(line_number),
                model.line_max_column(line_number),
            );
        } else {
            // Collapse to the end of the nearest preceding visible line.
            loop {
                if index == 0 {
                    return Ok(Position::new(1, 1));
                }
                index -= 1;
                if self.lines[index].is_visible() {
                    break;
                }
            }
            column = model.line_max_column(index as u32 + 1);
        }

        let delta_line_number = 1 + if index == 0 {
            0
        } else {
            self.prefix_sum.accumulated(index - 1)
        };
        Ok(self.lines[index].output_position_of_input_position(delta_line_number, column))
    }

    // ---- internals --------------------------------------------------------

    fn ensure_valid(&self, model: &dyn TextModel) -> Result<()> {
        let model_version = model.version_id();
        if model_version != self.valid_version_id {
            return Err(Error::StaleModel {
                model_version,
                expected: self.valid_version_id,
            });
        }
        Ok(())
    }

    /// Map a 1-based output line to `(input line index, row within line)`.
    fn locate_output_line(&self, output_line: u32) -> Result<(usize, u32)> {
        let total = self.prefix_sum.total();
        if output_line < 1 || output_line > total {
            return Err(Error::OutOfRange {
                what: "output line",
                value: output_line,
                max: total,
            });
        }
        let found = self.prefix_sum.index_of(output_line - 1);
        Ok((found.index as usize, found.remainder))
    }

    fn build_split_line(&self, text: &str, visible: bool) -> SplitLine {
        match self.factory.create_line_mapping(
            text,
            self.tab_size,
            self.wrapping_column,
            self.columns_for_full_width_char,
            self.wrapping_indent,
        ) {
            Some(mapping) => SplitLine::wrapped(mapping, visible),
            None => SplitLine::identity(visible),
        }
    }

    fn reconstruct(&mut self, model: &dyn TextModel) {
        let lines: Vec<SplitLine> = model
            .lines_content()
            .iter()
            .map(|text| self.build_split_line(text, true))
            .collect();
        let counts: Vec<u32> = lines.iter().map(SplitLine::output_line_count).collect();
        self.lines = lines;
        self.prefix_sum = PrefixSumComputer::new(counts);
        self.valid_version_id = model.version_id();
    }

    /// Current hidden ranges, re-read from the model's decoration store.
    fn hidden_ranges(&self, model: &dyn TextModel) -> Vec<Range> {
        let mut ranges: Vec<Range> = self
            .hidden_decoration_ids
            .iter()
            .filter_map(|&id| model.decoration_range(id))
            .filter(|range| range.start_line() <= range.end_line())
            .collect();
        ranges.sort_by_key(Range::start_line);
        ranges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::null_sink;
    use crate::model::Document;
    use crate::wrap::MonospaceLineMapperFactory;

    fn collection(doc: &Document, wrapping_column: Option<u32>) -> SplitLinesCollection {
        SplitLinesCollection::new(
            doc,
            Box::new(MonospaceLineMapperFactory::new()),
            null_sink(),
            4,
            wrapping_column,
            2,
            WrappingIndent::None,
        )
    }

    #[test]
    fn test_identity_projection() {
        let doc = Document::new("a\nbb\nccc");
        let lines = collection(&doc, Some(80));
        assert_eq!(lines.output_line_count(&doc).unwrap(), 3);
        assert_eq!(lines.output_line_content(&doc, 3).unwrap(), "ccc");
        assert_eq!(
            lines.input_to_output_position(&doc, 2, 2).unwrap(),
            Position::new(2, 2)
        );
        assert_eq!(
            lines.output_to_input_position(&doc, 2, 2).unwrap(),
            Position::new(2, 2)
        );
    }

    #[test]
    fn test_stale_model_rejected() {
        let mut doc = Document::new("a");
        let lines = collection(&doc, Some(80));
        doc.set_line_content(1, "b");
        assert_eq!(
            lines.output_line_count(&doc),
            Err(Error::StaleModel {
                model_version: 2,
                expected: 1
            })
        );
    }

    #[test]
    fn test_out_of_range_output_line() {
        let doc = Document::new("a\nb");
        let lines = collection(&doc, Some(80));
        assert!(matches!(
            lines.output_line_content(&doc, 0),
            Err(Error::OutOfRange { .. })
        ));
        assert!(matches!(
            lines.output_line_content(&doc, 3),
            Err(Error::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_wrapping_splits_output() {
        let doc = Document::new("abcdefghij\nx");
        let lines = collection(&doc, Some(4));
        assert_eq!(lines.output_line_count(&doc).unwrap(), 4);
        assert_eq!(lines.output_line_content(&doc, 1).unwrap(), "abcd");
        assert_eq!(lines.output_line_content(&doc, 2).unwrap(), "efgh");
        assert_eq!(lines.output_line_content(&doc, 3).unwrap(), "ij");
        assert_eq!(lines.output_line_content(&doc, 4).unwrap(), "x");
        assert_eq!(
            lines.output_to_input_position(&doc, 4, 1).unwrap(),
            Position::new(2, 1)
        );
    }

    #[test]
    fn test_line_changed_keeps_version_gate() {
        let mut doc = Document::new("short");
        let mut lines = collection(&doc, Some(4));
        assert_eq!(lines.output_line_count(&doc).unwrap(), 2);

        doc.set_line_content(1, "ab");
        let version = doc.version_id();
        assert!(lines.on_model_line_changed(version, 1, "ab"));
        assert_eq!(lines.output_line_count(&doc).unwrap(), 1);

        // A replay of the same version is discarded.
        assert!(!lines.on_model_line_changed(version, 1, "ab"));
    }

    #[test]
    fn test_config_setter_no_op_returns_false() {
        let doc = Document::new("a");
        let mut lines = collection(&doc, Some(80));
        assert!(!lines.set_tab_size(&doc, 4));
        assert!(lines.set_tab_size(&doc, 8));
        assert!(!lines.set_tab_size(&doc, 8));
        assert!(!lines.set_wrapping_column(&doc, Some(80), 2));
        assert!(lines.set_wrapping_column(&doc, Some(40), 2));
        assert!(!lines.set_wrapping_indent(&doc, WrappingIndent::None));
        assert!(lines.set_wrapping_indent(&doc, WrappingIndent::Same));
    }

    #[test]
    fn test_hidden_ranges_merge_and_collapse() {
        let mut doc = Document::new("L1\nL2\nL3\nL4\nL5");
        let mut lines = collection(&doc, Some(80));
        lines.set_hidden_areas(
            &mut doc,
            &[Range::of_lines(3, 3), Range::of_lines(2, 2)],
        );
        assert_eq!(lines.output_line_count(&doc).unwrap(), 3);
        assert_eq!(lines.output_line_content(&doc, 2).unwrap(), "L4");
        // Translating into the hidden block lands at the end of L1.
        assert_eq!(
            lines.input_to_output_position(&doc, 3, 1).unwrap(),
            Position::new(1, 3)
        );
    }

    #[test]
    fn test_hidden_prefix_collapses_to_origin() {
        let mut doc = Document::new("L1\nL2\nL3");
        let mut lines = collection(&doc, Some(80));
        lines.set_hidden_areas(&mut doc, &[Range::of_lines(1, 2)]);
        assert_eq!(
            lines.input_to_output_position(&doc, 2, 1).unwrap(),
            Position::new(1, 1)
        );
        assert_eq!(
            lines.input_to_output_position(&doc, 3, 2).unwrap(),
            Position::new(1, 2)
        );
    }

    #[test]
    fn test_unhide_restores_counts() {
        let mut doc = Document::new("L1\nL2\nL3");
        let mut lines = collection(&doc, Some(80));
        lines.set_hidden_areas(&mut doc, &[Range::of_lines(2, 3)]);
        assert_eq!(lines.output_line_count(&doc).unwrap(), 1);
        lines.set_hidden_areas(&mut doc, &[]);
        assert_eq!(lines.output_line_count(&doc).unwrap(), 3);
    }

    #[test]
    fn test_dispose_releases_decorations() {
        let mut doc = Document::new("L1\nL2");
        let mut lines = collection(&doc, Some(80));
        lines.set_hidden_areas(&mut doc, &[Range::of_lines(2, 2)]);
        lines.dispose(&mut doc);
        assert!(lines.hidden_decoration_ids.is_empty());
    }
}
