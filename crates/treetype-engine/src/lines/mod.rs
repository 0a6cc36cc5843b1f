//! # Line Assembly
//!
//! Groups classified spans into one [`LineRecord`] per source row on which a
//! span starts. A record carries everything a front end needs for that row:
//!
//! - **`display_tokens`**: every span on the row in column order, typeable or not
//! - **`typing_sequence`**: the characters the user types, i.e. the typeable
//!   tokens' text concatenated
//! - **`char_map`**: for each character of the typing sequence, the index of
//!   the typeable token it belongs to and that token's display column
//!
//! Spans that run over several rows (block comments, multi-line strings) are
//! recorded on the row where they start; continuation rows get no record of
//! their own.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tokens::{Category, ClassifiedSpan};

pub const DEFAULT_INDENT_WIDTH: usize = 4;

/// Serialized projection of a classified span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayToken {
    pub text: String,
    #[serde(rename = "type")]
    pub grammar_type: String,
    pub categories: Vec<Category>,
    pub base_typeable: bool,
    pub start_col: usize,
    pub end_col: usize,
}

impl From<&ClassifiedSpan> for DisplayToken {
    fn from(span: &ClassifiedSpan) -> Self {
        DisplayToken {
            text: span.span.text.clone(),
            grammar_type: span.span.grammar_type.to_string(),
            categories: span.categories.clone(),
            base_typeable: span.base_typeable,
            start_col: span.span.start_col,
            end_col: span.span.end_col,
        }
    }
}

/// Where one typed character lives on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharMapEntry {
    /// Index into the row's typeable tokens (not into `display_tokens`).
    pub token_idx: usize,
    /// `start_col` of that token.
    pub display_col: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRecord {
    pub line_number: usize,
    pub indent_level: usize,
    /// The source row, without its `\n` terminator.
    pub actual_line: String,
    pub display_tokens: Vec<DisplayToken>,
    pub typing_sequence: String,
    /// Keyed by character index into `typing_sequence`; serialized as an
    /// object with decimal string keys in numeric order.
    pub char_map: BTreeMap<usize, CharMapEntry>,
}

impl LineRecord {
    /// The tokens that make up the typing sequence, in order.
    pub fn typing_tokens(&self) -> impl Iterator<Item = &DisplayToken> {
        self.display_tokens.iter().filter(|t| t.base_typeable)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LineAssembler {
    /// Columns per indentation level. Only a display hint; it need not match
    /// the file's real indentation.
    pub indent_width: usize,
}

impl Default for LineAssembler {
    fn default() -> Self {
        LineAssembler {
            indent_width: DEFAULT_INDENT_WIDTH,
        }
    }
}

impl LineAssembler {
    pub fn new(indent_width: usize) -> Self {
        LineAssembler { indent_width }
    }

    /// Builds one record per row that has at least one span starting on it,
    /// in row order.
    pub fn assemble(&self, source: &str, spans: &[ClassifiedSpan]) -> Vec<LineRecord> {
        let source_lines: Vec<&str> = source.split('\n').collect();

        let mut rows: BTreeMap<usize, Vec<&ClassifiedSpan>> = BTreeMap::new();
        for span in spans {
            rows.entry(span.span.start_row).or_default().push(span);
        }

        rows.into_iter()
            .map(|(row, mut row_spans)| {
                // Stable: ties keep extraction order
                row_spans.sort_by_key(|s| s.span.start_col);
                let actual_line = source_lines.get(row).copied().unwrap_or("");
                self.assemble_line(row, actual_line, &row_spans)
            })
            .collect()
    }

    fn assemble_line(
        &self,
        row: usize,
        actual_line: &str,
        spans: &[&ClassifiedSpan],
    ) -> LineRecord {
        let display_tokens: Vec<DisplayToken> =
            spans.iter().map(|s| DisplayToken::from(*s)).collect();

        let mut typing_sequence = String::new();
        let mut char_map = BTreeMap::new();
        let mut char_idx = 0;
        let typing_tokens = display_tokens.iter().filter(|t| t.base_typeable);
        for (token_idx, token) in typing_tokens.enumerate() {
            typing_sequence.push_str(&token.text);
            for _ in token.text.chars() {
                char_map.insert(
                    char_idx,
                    CharMapEntry {
                        token_idx,
                        display_col: token.start_col,
                    },
                );
                char_idx += 1;
            }
        }

        LineRecord {
            line_number: row,
            indent_level: self.indent_level(&display_tokens),
            actual_line: actual_line.to_string(),
            display_tokens,
            typing_sequence,
            char_map,
        }
    }

    /// Indentation is measured at the first typeable token, so leading
    /// whitespace filler does not flatten every row to level 0.
    fn indent_level(&self, tokens: &[DisplayToken]) -> usize {
        let indent_col = tokens
            .iter()
            .find(|t| t.base_typeable)
            .or_else(|| tokens.first())
            .map_or(0, |t| t.start_col);
        indent_col.checked_div(self.indent_width).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::{Span, WHITESPACE};
    use crate::tokens::classify;
    use pretty_assertions::assert_eq;

    fn spans(row: usize, pieces: &[(usize, &str, &'static str)]) -> Vec<ClassifiedSpan> {
        pieces
            .iter()
            .map(|(col, text, ty)| classify(Span::from_text(row, *col, text, *ty)))
            .collect()
    }

    #[test]
    fn test_typing_sequence_skips_whitespace() {
        let source = "x = 1\n";
        let spans = spans(
            0,
            &[
                (0, "x", "identifier"),
                (1, " ", WHITESPACE),
                (2, "=", "="),
                (3, " ", WHITESPACE),
                (4, "1", "integer"),
            ],
        );
        let lines = LineAssembler::default().assemble(source, &spans);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].typing_sequence, "x=1");
        assert_eq!(lines[0].display_tokens.len(), 5);
        assert_eq!(lines[0].actual_line, "x = 1");
    }

    #[test]
    fn test_char_map_points_at_typing_tokens() {
        let source = "    return ab\n";
        let spans = spans(
            0,
            &[
                (0, "    ", WHITESPACE),
                (4, "return", "return"),
                (10, " ", WHITESPACE),
                (11, "ab", "identifier"),
            ],
        );
        let line = &LineAssembler::default().assemble(source, &spans)[0];
        assert_eq!(line.typing_sequence, "returnab");
        assert_eq!(line.char_map.len(), 8);
        assert_eq!(
            line.char_map[&0],
            CharMapEntry {
                token_idx: 0,
                display_col: 4
            }
        );
        assert_eq!(
            line.char_map[&6],
            CharMapEntry {
                token_idx: 1,
                display_col: 11
            }
        );
        assert_eq!(line.char_map[&7].token_idx, 1);
    }

    #[test]
    fn test_char_map_counts_characters_not_bytes() {
        let spans = spans(0, &[(0, "\"é\"", "string")]);
        let line = &LineAssembler::default().assemble("\"é\"\n", &spans)[0];
        assert_eq!(line.char_map.len(), 3);
        assert_eq!(line.char_map.len(), line.typing_sequence.chars().count());
    }

    #[test]
    fn test_indent_level_uses_first_typeable_token() {
        let spans = spans(0, &[(0, "        ", WHITESPACE), (8, "pass", "pass")]);
        let line = &LineAssembler::default().assemble("        pass\n", &spans)[0];
        assert_eq!(line.indent_level, 2);

        let line = &LineAssembler::new(2).assemble("        pass\n", &spans)[0];
        assert_eq!(line.indent_level, 4);
    }

    #[test]
    fn test_indent_level_is_integer_division() {
        let spans = spans(0, &[(6, "x", "identifier")]);
        let line = &LineAssembler::default().assemble("      x\n", &spans)[0];
        assert_eq!(line.indent_level, 1);
    }

    #[test]
    fn test_zero_indent_width_does_not_panic() {
        let spans = spans(0, &[(4, "x", "identifier")]);
        let line = &LineAssembler::new(0).assemble("    x\n", &spans)[0];
        assert_eq!(line.indent_level, 0);
    }

    #[test]
    fn test_rows_without_spans_are_absent() {
        let source = "a\n\nb\n";
        let mut all = spans(0, &[(0, "a", "identifier")]);
        all.extend(spans(2, &[(0, "b", "identifier")]));
        let lines = LineAssembler::default().assemble(source, &all);
        let numbers: Vec<_> = lines.iter().map(|l| l.line_number).collect();
        assert_eq!(numbers, vec![0, 2]);
    }

    #[test]
    fn test_tokens_sorted_by_column_with_stable_ties() {
        let source = "ab\n";
        let spans = spans(
            0,
            &[
                (1, "b", "identifier"),
                (0, "a", "first"),
                (0, "a", "second"),
            ],
        );
        let line = &LineAssembler::default().assemble(source, &spans)[0];
        let types: Vec<_> = line
            .display_tokens
            .iter()
            .map(|t| t.grammar_type.as_str())
            .collect();
        assert_eq!(types, vec!["first", "second", "identifier"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(LineAssembler::default().assemble("", &[]).is_empty());
    }

    #[test]
    fn test_char_map_serializes_with_string_keys() {
        let spans = spans(0, &[(0, "ok", "identifier")]);
        let line = &LineAssembler::default().assemble("ok", &spans)[0];
        let json = serde_json::to_value(line).unwrap();
        assert_eq!(
            json["char_map"]["1"],
            serde_json::json!({"token_idx": 0, "display_col": 0})
        );
        assert_eq!(json["display_tokens"][0]["type"], "identifier");
    }
}
