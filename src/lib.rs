//! `viewlines` - View-model line layer for code editors
//!
//! viewlines is the transform between a document of input lines and the
//! sequence of output (view) lines a renderer consumes. It is a mapping
//! layer, not a framework: you bring the text buffer, the tokenizer, and
//! the renderer; viewlines owns the projection in between and keeps it
//! consistent while the document mutates underneath it.
//!
//! # How This Crate Fits In
//!
//! Two projections compose. Soft wrapping splits an input line that is
//! wider than the configured wrapping column into several output lines,
//! with a hanging indent on continuations. Hiding removes caller-chosen
//! input-line ranges from the output entirely. The collection maintains
//! the bidirectional (line, column) mapping across both, answers
//! output-line queries in O(log N), and emits incremental view events as
//! the document changes.
//!
//! # Architecture At A Glance
//!
//! - `view`: [`SplitLinesCollection`] and the per-line [`SplitLine`] projection
//! - `prefix_sum`: output-line indexing over per-line row counts
//! - `wrap`: the [`LineMapping`]/[`LineMapperFactory`] seam and a monospace reference factory
//! - `model`: the [`TextModel`] contract and a rope-backed reference [`Document`]
//! - `tokens`: per-line token streams and their restriction onto view rows
//! - `position` / `event` / `error`: coordinates, view events, error types
//!
//! # Data Flow
//!
//! ```text
//! Host edits model (version++)
//!     -> host delivers change event to SplitLinesCollection
//!     -> collection rebuilds affected SplitLines via LineMapperFactory
//!     -> prefix sum updated in lockstep
//!     -> ViewEvents emitted for the affected output rows
//!     -> renderer queries content / tokens / positions
//! ```
//!
//! Queries are gated on the document version: a query while a model
//! mutation has not yet been delivered fails with
//! [`Error::StaleModel`](error::Error::StaleModel) instead of answering
//! from a corrupted mapping.
//!
//! # Example
//!
//! ```
//! use viewlines::{
//!     Document, MonospaceLineMapperFactory, SplitLinesCollection, WrappingIndent, null_sink,
//! };
//!
//! let doc = Document::new("first line\nsecond");
//! let lines = SplitLinesCollection::new(
//!     &doc,
//!     Box::new(MonospaceLineMapperFactory::new()),
//!     null_sink(),
//!     4,        // tab size
//!     Some(6),  // wrapping column
//!     2,        // columns for a full-width char
//!     WrappingIndent::None,
//! );
//!
//! assert_eq!(lines.output_line_count(&doc).unwrap(), 3);
//! assert_eq!(lines.output_line_content(&doc, 1).unwrap(), "first ");
//! assert_eq!(lines.output_line_content(&doc, 2).unwrap(), "line");
//! ```

// Crate-level lint configuration
#![warn(unsafe_code)]
#![allow(clippy::cast_possible_truncation)] // Intentional coordinate casts
#![allow(clippy::module_name_repetitions)] // Allow tokens::LineTokens etc
#![allow(clippy::missing_panics_doc)] // Contract panics documented in prose
#![allow(clippy::missing_errors_doc)] // Error conditions documented in prose

pub mod error;
pub mod event;
pub mod model;
pub mod position;
pub mod prefix_sum;
pub mod tokens;
pub mod view;
pub mod wrap;

// Re-export core types at crate root
pub use error::{Error, Result};
pub use event::{ViewEvent, ViewEventSink, null_sink};
pub use model::{DecorationId, Document, TextModel};
pub use position::{OutputPosition, Position, Range};
pub use prefix_sum::{IndexOf, PrefixSumComputer};
pub use tokens::{LineTokens, Token, TokenKind};
pub use view::{SplitLine, SplitLinesCollection};
pub use wrap::{LineMapperFactory, LineMapping, MonospaceLineMapperFactory, WrappingIndent};
