use std::collections::{BTreeMap, HashMap};

use super::span::Span;

/// Grammar type given to synthetic spans covering inter-token whitespace.
pub const WHITESPACE: &str = "whitespace";

/// Source text on a row that no leaf covers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("row {row}: columns {from}..{to} hold text no leaf covers: {text:?}")]
pub struct UncoveredText {
    pub row: usize,
    pub from: usize,
    pub to: usize,
    pub text: String,
}

/// Materializes the whitespace between leaves as `whitespace` spans.
///
/// Grammars never emit leaves for indentation or the spaces between tokens.
/// For every row on which a leaf starts or a multi-line leaf ends, the
/// uncovered columns before, between, and after its leaves are filled, so
/// that the row's spans tile it completely (line terminator excluded).
/// Columns already covered by a multi-line leaf that started on an earlier
/// row are left alone.
///
/// A gap containing anything other than whitespace means a leaf is missing,
/// and the whole file fails with [`UncoveredText`].
pub fn fill_whitespace_gaps(leaves: Vec<Span>, source: &str) -> Result<Vec<Span>, UncoveredText> {
    let lines: Vec<&str> = source.split('\n').collect();

    let mut covered_until: HashMap<usize, usize> = HashMap::new();
    for leaf in leaves.iter().filter(|l| l.is_multiline()) {
        covered_until.insert(leaf.end_row, leaf.end_col);
    }

    let mut by_row: BTreeMap<usize, Vec<Span>> = covered_until
        .keys()
        .map(|&row| (row, Vec::new()))
        .collect();
    for leaf in leaves {
        by_row.entry(leaf.start_row).or_default().push(leaf);
    }

    let mut filled = Vec::new();
    for (row, mut row_leaves) in by_row {
        row_leaves.sort_by_key(|l| l.start_col);
        let line = lines
            .get(row)
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .unwrap_or("");
        let mut cursor = covered_until.get(&row).copied().unwrap_or(0);

        for leaf in row_leaves {
            if leaf.start_col > cursor {
                push_gap(&mut filled, row, line, cursor, leaf.start_col)?;
            }
            cursor = if leaf.is_multiline() {
                line.len()
            } else {
                cursor.max(leaf.end_col)
            };
            filled.push(leaf);
        }

        if cursor < line.len() {
            push_gap(&mut filled, row, line, cursor, line.len())?;
        }
    }
    Ok(filled)
}

fn push_gap(
    spans: &mut Vec<Span>,
    row: usize,
    line: &str,
    from: usize,
    to: usize,
) -> Result<(), UncoveredText> {
    match line.get(from..to) {
        Some(gap) if gap.chars().all(char::is_whitespace) => {
            spans.push(Span::from_text(row, from, gap, WHITESPACE));
            Ok(())
        }
        _ => Err(UncoveredText {
            row,
            from,
            to,
            text: line
                .as_bytes()
                .get(from..to)
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                .unwrap_or_default(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn leaf(row: usize, col: usize, text: &str) -> Span {
        Span::from_text(row, col, text, "identifier")
    }

    fn describe(spans: &[Span]) -> Vec<(usize, usize, usize, &str, &str)> {
        spans
            .iter()
            .map(|s| {
                (
                    s.start_row,
                    s.start_col,
                    s.end_col,
                    s.text.as_str(),
                    s.grammar_type,
                )
            })
            .collect()
    }

    #[test]
    fn test_fills_indentation_and_inner_gaps() {
        let source = "    a = b\n";
        let leaves = vec![leaf(0, 4, "a"), leaf(0, 6, "="), leaf(0, 8, "b")];
        let filled = fill_whitespace_gaps(leaves, source).unwrap();
        assert_eq!(
            describe(&filled),
            vec![
                (0, 0, 4, "    ", WHITESPACE),
                (0, 4, 5, "a", "identifier"),
                (0, 5, 6, " ", WHITESPACE),
                (0, 6, 7, "=", "identifier"),
                (0, 7, 8, " ", WHITESPACE),
                (0, 8, 9, "b", "identifier"),
            ]
        );
    }

    #[test]
    fn test_fills_trailing_whitespace_but_not_terminator() {
        let source = "a  \r\nb\n";
        let filled = fill_whitespace_gaps(vec![leaf(0, 0, "a"), leaf(1, 0, "b")], source).unwrap();
        assert_eq!(
            describe(&filled),
            vec![
                (0, 0, 1, "a", "identifier"),
                (0, 1, 3, "  ", WHITESPACE),
                (1, 0, 1, "b", "identifier"),
            ]
        );
    }

    #[test]
    fn test_rows_without_leaves_stay_empty() {
        let source = "a\n    \nb\n";
        let filled = fill_whitespace_gaps(vec![leaf(0, 0, "a"), leaf(2, 0, "b")], source).unwrap();
        assert!(filled.iter().all(|s| s.start_row != 1));
    }

    #[test]
    fn test_respects_multiline_leaf_coverage() {
        let source = "x = \"\"\"one\n  two\"\"\" + y\n";
        let body = Span::from_text(0, 7, "one\n  two", "string_content");
        let leaves = vec![
            leaf(0, 0, "x"),
            leaf(0, 2, "="),
            leaf(0, 4, "\"\"\""),
            body,
            leaf(1, 5, "\"\"\""),
            leaf(1, 9, "+"),
            leaf(1, 11, "y"),
        ];
        let filled = fill_whitespace_gaps(leaves, source).unwrap();
        let row1: Vec<_> = describe(&filled)
            .into_iter()
            .filter(|s| s.0 == 1)
            .collect();
        assert_eq!(
            row1,
            vec![
                (1, 5, 8, "\"\"\"", "identifier"),
                (1, 8, 9, " ", WHITESPACE),
                (1, 9, 10, "+", "identifier"),
                (1, 10, 11, " ", WHITESPACE),
                (1, 11, 12, "y", "identifier"),
            ]
        );
    }

    #[test]
    fn test_fills_tail_of_row_where_multiline_leaf_ends() {
        let source = "/* a\n b */   \nx\n";
        let comment = Span::from_text(0, 0, "/* a\n b */", "comment");
        let filled = fill_whitespace_gaps(vec![comment, leaf(2, 0, "x")], source).unwrap();
        assert_eq!(
            describe(&filled)[1..],
            [(1, 5, 8, "   ", WHITESPACE), (2, 0, 1, "x", "identifier")]
        );
    }

    #[test]
    fn test_non_whitespace_gap_is_an_error() {
        let source = "a ? b\n";
        let err = fill_whitespace_gaps(vec![leaf(0, 0, "a"), leaf(0, 4, "b")], source).unwrap_err();
        assert_eq!(
            err,
            UncoveredText {
                row: 0,
                from: 1,
                to: 4,
                text: " ? ".to_string(),
            }
        );
    }

    #[test]
    fn test_uncovered_row_tail_is_an_error() {
        let source = "x = f\"{v:>10}\"\n";
        let leaves = vec![leaf(0, 0, "x"), leaf(0, 2, "="), leaf(0, 4, "f\"{v:")];
        let err = fill_whitespace_gaps(leaves, source).unwrap_err();
        assert_eq!((err.from, err.to), (9, 14));
        assert_eq!(err.text, ">10}\"");
    }
}
