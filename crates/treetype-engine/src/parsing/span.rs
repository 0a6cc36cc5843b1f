/// A leaf of source text positioned by row and column.
///
/// Rows and columns are zero-based and end-exclusive. Columns are UTF-8 byte
/// offsets within their row, the unit tree-sitter reports positions in.
/// Spans are never edited after creation: transforms replace a span with new
/// spans instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
    /// Exact source text covered by the span, including any newlines.
    pub text: String,
    /// The grammar's node type, or a synthetic type such as `whitespace`.
    pub grammar_type: &'static str,
    /// Lies inside a region the grammar could not parse.
    pub in_error: bool,
}

/// The part of a span's text that lies on one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowFragment<'a> {
    pub row: usize,
    pub start_col: usize,
    pub text: &'a str,
}

impl RowFragment<'_> {
    pub fn end_col(&self) -> usize {
        self.start_col + self.text.len()
    }
}

impl Span {
    /// Builds a span starting at `(row, col)`, deriving the end position by
    /// walking the text.
    pub fn from_text(row: usize, col: usize, text: &str, grammar_type: &'static str) -> Self {
        let (end_row, end_col) = advance(row, col, text);
        Span {
            start_row: row,
            start_col: col,
            end_row,
            end_col,
            text: text.to_string(),
            grammar_type,
            in_error: false,
        }
    }

    pub fn within_error(mut self, in_error: bool) -> Self {
        self.in_error = in_error;
        self
    }

    pub fn is_multiline(&self) -> bool {
        self.end_row > self.start_row
    }

    /// Splits the text into the pieces that land on each row it touches.
    ///
    /// The first fragment starts at `start_col`; continuation fragments start at
    /// column 0. Newline characters belong to no fragment.
    pub fn row_fragments(&self) -> impl Iterator<Item = RowFragment<'_>> + '_ {
        self.text.split('\n').enumerate().map(|(i, text)| RowFragment {
            row: self.start_row + i,
            start_col: if i == 0 { self.start_col } else { 0 },
            text,
        })
    }
}

/// Returns the position reached after `text` when starting at `(row, col)`.
pub fn advance(row: usize, col: usize, text: &str) -> (usize, usize) {
    match text.rfind('\n') {
        Some(last_newline) => (
            row + text.matches('\n').count(),
            text.len() - last_newline - 1,
        ),
        None => (row, col + text.len()),
    }
}
