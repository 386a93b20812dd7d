//! View change events emitted by the collection.
//!
//! The collection publishes coarse-grained events describing how the output
//! (view) line sequence changed, so a downstream renderer can invalidate the
//! minimum amount of cached state. Events are delivered synchronously,
//! inside the call that caused them, through a caller-supplied sink.

use serde::Serialize;

/// A change to the output line sequence.
///
/// Line numbers are 1-based output (view) line numbers. Inserted/deleted
/// ranges are inclusive. A range with `from_line_number > to_line_number`
/// is empty and may be emitted when every affected input line is hidden.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ViewEvent {
    /// Total invalidation: every downstream cache of view lines is stale.
    ModelFlushed,
    /// One output line's content changed in place.
    LineChanged { line_number: u32 },
    /// A run of new output lines appeared.
    LinesInserted {
        from_line_number: u32,
        to_line_number: u32,
    },
    /// A run of output lines disappeared.
    LinesDeleted {
        from_line_number: u32,
        to_line_number: u32,
    },
}

impl ViewEvent {
    /// Stable event name, for hosts that key callbacks by string.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ModelFlushed => "model_flushed",
            Self::LineChanged { .. } => "line_changed",
            Self::LinesInserted { .. } => "lines_inserted",
            Self::LinesDeleted { .. } => "lines_deleted",
        }
    }
}

/// Callback sink the collection emits [`ViewEvent`]s into.
pub type ViewEventSink = Box<dyn FnMut(ViewEvent)>;

/// A sink that drops every event, for hosts that poll state instead.
#[must_use]
pub fn null_sink() -> ViewEventSink {
    Box::new(|_| {})
}
