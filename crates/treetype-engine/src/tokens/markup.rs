use crate::parsing::Span;

use super::classify::{ClassifiedSpan, classify};

/// Grammar type given to whitespace split off markup text.
pub const MARKUP_WHITESPACE: &str = "jsx_text_whitespace";

/// Separates markup text from the formatting whitespace around it.
///
/// Grammars such as JSX keep the text between tags as one leaf, indentation
/// and all. The splitter replaces such a leaf with up to three spans: leading
/// whitespace, the trimmed content, and trailing whitespace. Only the content
/// is typeable. The pieces tile the original span's range exactly.
#[derive(Debug, Clone, Copy)]
pub struct MarkupTextSplitter {
    pub text_type: &'static str,
}

impl MarkupTextSplitter {
    pub fn new(text_type: &'static str) -> Self {
        MarkupTextSplitter { text_type }
    }

    pub fn apply(&self, spans: Vec<ClassifiedSpan>) -> Vec<ClassifiedSpan> {
        spans
            .into_iter()
            .flat_map(|span| self.split(span))
            .collect()
    }

    /// Splits one span. Spans of other types, and markup text without
    /// surrounding whitespace, pass through unchanged.
    pub fn split(&self, span: ClassifiedSpan) -> Vec<ClassifiedSpan> {
        if span.span.grammar_type != self.text_type {
            return vec![span];
        }
        let text = span.span.text.as_str();
        let content = text.trim();
        if content == text {
            return vec![span];
        }

        let leading_len = text.len() - text.trim_start().len();
        let leading = &text[..leading_len];
        let trailing = &text[leading_len + content.len()..];

        let mut pieces = Vec::with_capacity(3);
        let (mut row, mut col) = (span.span.start_row, span.span.start_col);

        if !leading.is_empty() {
            let piece = whitespace_piece(row, col, leading);
            (row, col) = (piece.span.end_row, piece.span.end_col);
            pieces.push(piece);
        }
        if !content.is_empty() {
            let piece = classify(
                Span::from_text(row, col, content, self.text_type).within_error(span.span.in_error),
            );
            (row, col) = (piece.span.end_row, piece.span.end_col);
            pieces.push(piece);
        }
        if !trailing.is_empty() {
            pieces.push(whitespace_piece(row, col, trailing));
        }

        log::debug!(
            "split {} at {}:{} into {} pieces",
            self.text_type,
            span.span.start_row,
            span.span.start_col,
            pieces.len()
        );
        pieces
    }
}

fn whitespace_piece(row: usize, col: usize, text: &str) -> ClassifiedSpan {
    ClassifiedSpan {
        span: Span::from_text(row, col, text, MARKUP_WHITESPACE),
        base_typeable: false,
        categories: Vec::new(),
    }
}
