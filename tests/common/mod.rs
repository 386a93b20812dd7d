//! Shared helpers for the integration suites.

// Each integration binary compiles its own copy; not all use everything.
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Once;

use viewlines::{
    Document, LineMapperFactory, LineMapping, OutputPosition, SplitLinesCollection, ViewEvent,
    ViewEventSink, WrappingIndent,
};

pub fn setup_test_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

/// Log of every event a collection emitted, shared with its sink.
#[derive(Clone)]
pub struct EventLog(Rc<RefCell<Vec<ViewEvent>>>);

impl EventLog {
    pub fn take(&self) -> Vec<ViewEvent> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

pub fn recording_sink() -> (ViewEventSink, EventLog) {
    let log = EventLog(Rc::new(RefCell::new(Vec::new())));
    let writer = Rc::clone(&log.0);
    (Box::new(move |event| writer.borrow_mut().push(event)), log)
}

/// Test factory: break every `column` chars, with a fixed indent string,
/// independent of display widths. Lines that fit produce no mapping.
pub struct FixedWidthFactory {
    pub column: u32,
    pub indent: &'static str,
}

struct FixedWidthMapping {
    breaks: Vec<u32>,
    text_len: u32,
    indent: &'static str,
}

impl LineMapping for FixedWidthMapping {
    fn output_line_count(&self) -> u32 {
        self.breaks.len() as u32
    }

    fn wrapped_lines_indent(&self) -> &str {
        self.indent
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

impl LineMapperFactory for FixedWidthFactory {
    fn create_line_mapping(
        &self,
        text: &str,
        _tab_size: u32,
        wrapping_column: Option<u32>,
        _columns_for_full_width_char: u32,
        _wrapping_indent: WrappingIndent,
    ) -> Option<Box<dyn LineMapping>> {
        wrapping_column?;
        let text_len = text.chars().count() as u32;
        if text_len <= self.column {
            return None;
        }
        let breaks = (0..text_len).step_by(self.column as usize).collect();
        Some(Box::new(FixedWidthMapping {
            breaks,
            text_len,
            indent: self.indent,
        }))
    }
}

/// Collection over `doc` using [`FixedWidthFactory`].
pub fn fixed_width_collection(
    doc: &Document,
    column: u32,
    indent: &'static str,
) -> (SplitLinesCollection, EventLog) {
    let (sink, log) = recording_sink();
    let collection = SplitLinesCollection::new(
        doc,
        Box::new(FixedWidthFactory { column, indent }),
        sink,
        4,
        Some(column),
        2,
        WrappingIndent::None,
    );
    (collection, log)
}
