//! Reference monospace line mapper.
//!
//! Breaks a line against a column budget by display width: tabs advance to
//! the next tab stop, full-width clusters cost a configurable number of
//! columns, zero-width clusters are free. Breaks prefer the position after
//! the last whitespace cluster on the row (word wrap) and fall back to a
//! hard break, never splitting a grapheme cluster.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::position::OutputPosition;
use crate::wrap::{LineMapperFactory, LineMapping, WrappingIndent};

/// One grapheme cluster of the scanned line.
struct Cluster {
    /// Char offset of the cluster's first scalar.
    char_offset: u32,
    /// Scalars in the cluster.
    char_len: u32,
    /// Raw display width, before tab expansion.
    width: usize,
    is_tab: bool,
    is_whitespace: bool,
}

fn scan_clusters(text: &str) -> Vec<Cluster> {
    let mut clusters = Vec::new();
    let mut char_offset = 0u32;
    for grapheme in text.graphemes(true) {
        clusters.push(Cluster {
            char_offset,
            char_len: grapheme.chars().count() as u32,
            width: UnicodeWidthStr::width(grapheme),
            is_tab: grapheme == "\t",
            is_whitespace: grapheme.chars().all(char::is_whitespace),
        });
        char_offset += grapheme.chars().count() as u32;
    }
    clusters
}

/// Column cost of a cluster at visual column `col`.
fn cluster_cost(cluster: &Cluster, col: u32, tab_size: u32, full_width_cost: u32) -> u32 {
    if cluster.is_tab {
        tab_size - (col % tab_size)
    } else if cluster.width >= 2 {
        full_width_cost
    } else {
        cluster.width as u32
    }
}

fn visual_width(text: &str, tab_size: u32, full_width_cost: u32) -> u32 {
    let mut col = 0u32;
    for cluster in scan_clusters(text) {
        col += cluster_cost(&cluster, col, tab_size, full_width_cost);
    }
    col
}

/// Break-table mapping produced by [`MonospaceLineMapperFactory`].
struct MonospaceLineMapping {
    /// Start char offset of each output row; `breaks[0] == 0`.
    breaks: Vec<u32>,
    /// Char length of the whole line.
    text_len: u32,
    indent: String,
}

impl MonospaceLineMapping {
    fn row_slice(&self, row: u32) -> (u32, u32) {
        let start = self.breaks[row as usize];
        let end = if (row as usize) + 1 < self.breaks.len() {
            self.breaks[row as usize + 1]
        } else {
            self.text_len
        };
        (start, end)
    }
}

impl LineMapping for MonospaceLineMapping {
    fn output_line_count(&self) -> u32 {
        self.breaks.len() as u32
    }

    fn wrapped_lines_indent(&self) -> &str {
        &self.indent
    }

    fn input_offset_of_output_position(&self, output_line_index: u32, output_offset: u32) -> u32 {
        let (start, end) = self.row_slice(output_line_index);
        start + output_offset.min(end - start)
    }

    fn output_position_of_input_offset(&self, input_offset: u32) -> OutputPosition {
        let offset = input_offset.min(self.text_len);
        let row = self.breaks.partition_point(|&b| b <= offset) - 1;
        OutputPosition::new(row as u32, offset - self.breaks[row])
    }
}

/// Monospace [`LineMapperFactory`].
#[derive(Clone, Copy, Debug, Default)]
pub struct MonospaceLineMapperFactory;

impl MonospaceLineMapperFactory {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn indent_for(text: &str, policy: WrappingIndent) -> String {
        let leading: String = text
            .chars()
            .take_while(|&c| c == ' ' || c == '\t')
            .collect();
        match policy {
            WrappingIndent::None => String::new(),
            WrappingIndent::Same => leading,
            WrappingIndent::Indent => leading + "\t",
            WrappingIndent::DeepIndent => leading + "\t\t",
        }
    }
}

impl LineMapperFactory for MonospaceLineMapperFactory {
    fn create_line_mapping(
        &self,
        text: &str,
        tab_size: u32,
        wrapping_column: Option<u32>,
        columns_for_full_width_char: u32,
        wrapping_indent: WrappingIndent,
    ) -> Option<Box<dyn LineMapping>> {
        let wrapping_column = wrapping_column.filter(|&col| col > 0)?;
        let tab_size = tab_size.max(1);

        let clusters = scan_clusters(text);
        if visual_width(text, tab_size, columns_for_full_width_char) <= wrapping_column {
            return None;
        }

        let mut indent = Self::indent_for(text, wrapping_indent);
        let mut indent_width = visual_width(&indent, tab_size, columns_for_full_width_char);
        // An indent that leaves no room for a full-width cluster would
        // stall the fill; fall back to no indent.
        if indent_width + columns_for_full_width_char > wrapping_column {
            indent.clear();
            indent_width = 0;
        }

        let text_len = clusters
            .last()
            .map_or(0, |c| c.char_offset + c.char_len);

        let mut breaks = vec![0u32];
        let mut row_start_col = 0u32; // visual column where this row's content begins
        let mut current_width = 0u32;
        let mut row_has_word = false;
        // (break char offset, cluster index resuming the next row)
        let mut last_whitespace_break: Option<(u32, usize)> = None;

        let mut i = 0usize;
        while i < clusters.len() {
            let cluster = &clusters[i];
            let cost = cluster_cost(
                cluster,
                row_start_col + current_width,
                tab_size,
                columns_for_full_width_char,
            );

            if current_width + cost > wrapping_column - row_start_col && current_width > 0 {
                let (break_offset, resume_index) =
                    last_whitespace_break.unwrap_or((cluster.char_offset, i));

                breaks.push(break_offset);
                row_start_col = indent_width;
                current_width = 0;
                row_has_word = false;
                last_whitespace_break = None;
                i = resume_index;
                continue;
            }

            if cluster.is_whitespace {
                // Never break before a row's first word: a break here would
                // strand the leading whitespace as its own row.
                if row_has_word {
                    last_whitespace_break = Some((cluster.char_offset + cluster.char_len, i + 1));
                }
            } else {
                row_has_word = true;
            }
            current_width += cost;
            i += 1;
        }

        if breaks.len() == 1 {
            // A single oversized cluster can overflow the budget without
            // ever producing a break point.
            return None;
        }

        Some(Box::new(MonospaceLineMapping {
            breaks,
            text_len,
            indent,
        }))
    }
}
