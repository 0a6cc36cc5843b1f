//! # Round-Trip Verification
//!
//! Certifies that encoding lost nothing. Each row is rebuilt purely from the
//! spans that touch it and compared byte-for-byte with the source row. The
//! only tolerated difference is the row terminator, which spans never include.
//!
//! Alongside the reconstruction the verifier checks:
//!
//! - **coverage**: a row's spans tile it with no gaps and no overlaps
//! - **bracket disjointness**: no token carries two bracket categories
//! - **char map consistency**: each record's `char_map` and `typing_sequence`
//!   agree with its typeable tokens
//!
//! A failure means a gap in a language's atomic type set or a bug in a span
//! transform; it is never expected on real input.

use std::collections::BTreeMap;
use std::fmt;

use crate::document::SnippetDocument;
use crate::lines::{CharMapEntry, LineRecord};
use crate::parsing::RowFragment;
use crate::tokens::{Category, ClassifiedSpan};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Discrepancy {
    #[error(
        "line {row}: reconstruction is {:.1}% identical\n  source:        {actual:?}\n  reconstructed: {reconstructed:?}",
        .percent_identical * 100.0
    )]
    Reconstruction {
        row: usize,
        actual: String,
        reconstructed: String,
        percent_identical: f64,
    },
    #[error("line {row}: columns {from}..{to} are not covered by any span")]
    Gap { row: usize, from: usize, to: usize },
    #[error("line {row}: spans overlap at column {at}")]
    Overlap { row: usize, at: usize },
    #[error("line {row}: token {text:?} at column {col} has several bracket categories")]
    BracketConflict { row: usize, col: usize, text: String },
    #[error("line {row}: typing sequence does not match its typeable tokens")]
    TypingSequence { row: usize },
    #[error("line {row}: char map has {entries} entries for {chars} typed characters")]
    CharMapLength {
        row: usize,
        entries: usize,
        chars: usize,
    },
    #[error("line {row}: char map entry {index} is {actual:?}, expected {expected:?}")]
    CharMapEntry {
        row: usize,
        index: usize,
        actual: Option<CharMapEntry>,
        expected: CharMapEntry,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerificationReport {
    pub rows_checked: usize,
    pub discrepancies: Vec<Discrepancy>,
}

impl VerificationReport {
    pub fn is_ok(&self) -> bool {
        self.discrepancies.is_empty()
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows checked, {} discrepancies",
            self.rows_checked,
            self.discrepancies.len()
        )?;
        for discrepancy in &self.discrepancies {
            write!(f, "\n{discrepancy}")?;
        }
        Ok(())
    }
}

/// Character-level comparison of a source row with its reconstruction.
#[derive(Debug, Clone, PartialEq)]
pub struct LineComparison {
    pub length_identical: bool,
    /// Byte positions where both strings have a byte and the bytes differ.
    pub mismatches: Vec<usize>,
    /// Matching bytes over the source row's length; 1.0 for an empty row.
    pub percent_identical: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineVerdict {
    Identical,
    /// Only the source row's terminator is absent from the reconstruction.
    MissingTerminator,
    Mismatch,
}

/// Rebuilds a row from its fragments, filling untouched columns with spaces.
pub fn reconstruct_row(fragments: &[RowFragment]) -> String {
    let len = fragments.iter().map(|f| f.end_col()).max().unwrap_or(0);
    let mut buffer = vec![b' '; len];
    for fragment in fragments {
        buffer[fragment.start_col..fragment.end_col()]
            .copy_from_slice(fragment.text.as_bytes());
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

pub fn compare_lines(actual: &str, reconstructed: &str) -> LineComparison {
    let mismatches: Vec<usize> = actual
        .bytes()
        .zip(reconstructed.bytes())
        .enumerate()
        .filter(|(_, (a, r))| a != r)
        .map(|(i, _)| i)
        .collect();

    let matched = actual
        .bytes()
        .zip(reconstructed.bytes())
        .filter(|(a, r)| a == r)
        .count();
    let percent_identical = if actual.is_empty() {
        1.0
    } else {
        matched as f64 / actual.len().max(1) as f64
    };

    LineComparison {
        length_identical: actual.len() == reconstructed.len(),
        mismatches,
        percent_identical,
    }
}

pub fn line_verdict(actual: &str, reconstructed: &str) -> LineVerdict {
    if actual == reconstructed {
        LineVerdict::Identical
    } else if strip_terminator(actual) == Some(reconstructed) {
        LineVerdict::MissingTerminator
    } else {
        LineVerdict::Mismatch
    }
}

fn strip_terminator(line: &str) -> Option<&str> {
    line.strip_suffix("\r\n")
        .or_else(|| line.strip_suffix('\n'))
        .or_else(|| line.strip_suffix('\r'))
}

#[derive(Debug, Clone, Copy)]
pub struct Verifier {
    /// Require every row's spans to tile it. Only holds when whitespace gaps
    /// were filled during encoding.
    pub check_coverage: bool,
}

impl Default for Verifier {
    fn default() -> Self {
        Verifier {
            check_coverage: true,
        }
    }
}

impl Verifier {
    pub fn new(check_coverage: bool) -> Self {
        Verifier { check_coverage }
    }

    /// Checks the spans of an encoding against the source and the records
    /// assembled from them.
    pub fn verify(
        &self,
        source: &str,
        spans: &[ClassifiedSpan],
        document: &SnippetDocument,
    ) -> VerificationReport {
        let mut report = self.verify_spans(source, spans);
        report.discrepancies.extend(verify_lines(&document.lines));
        report
    }

    pub fn verify_spans(&self, source: &str, spans: &[ClassifiedSpan]) -> VerificationReport {
        let source_lines: Vec<&str> = source.split('\n').collect();

        let mut by_row: BTreeMap<usize, Vec<RowFragment>> = BTreeMap::new();
        for span in spans {
            for fragment in span.span.row_fragments().filter(|f| !f.text.is_empty()) {
                by_row.entry(fragment.row).or_default().push(fragment);
            }
        }

        let mut report = VerificationReport::default();
        for (row, mut fragments) in by_row {
            report.rows_checked += 1;
            fragments.sort_by_key(|f| f.start_col);
            let actual = source_lines.get(row).copied().unwrap_or("");

            let reconstructed = reconstruct_row(&fragments);
            if line_verdict(actual, &reconstructed) == LineVerdict::Mismatch {
                report.discrepancies.push(Discrepancy::Reconstruction {
                    row,
                    actual: actual.to_string(),
                    percent_identical: compare_lines(actual, &reconstructed).percent_identical,
                    reconstructed,
                });
            }

            if self.check_coverage {
                let content = actual.strip_suffix('\r').unwrap_or(actual);
                check_coverage(row, content.len(), &fragments, &mut report.discrepancies);
            }
        }

        for span in spans {
            let brackets = Category::BRACKETS
                .iter()
                .filter(|c| span.has_category(**c))
                .count();
            if brackets > 1 {
                report.discrepancies.push(Discrepancy::BracketConflict {
                    row: span.span.start_row,
                    col: span.span.start_col,
                    text: span.span.text.clone(),
                });
            }
        }

        report
    }
}

fn check_coverage(
    row: usize,
    line_len: usize,
    fragments: &[RowFragment],
    discrepancies: &mut Vec<Discrepancy>,
) {
    let mut cursor = 0;
    for fragment in fragments {
        if fragment.start_col > cursor {
            discrepancies.push(Discrepancy::Gap {
                row,
                from: cursor,
                to: fragment.start_col,
            });
        } else if fragment.start_col < cursor {
            discrepancies.push(Discrepancy::Overlap {
                row,
                at: fragment.start_col,
            });
        }
        cursor = cursor.max(fragment.end_col());
    }
    if cursor < line_len {
        discrepancies.push(Discrepancy::Gap {
            row,
            from: cursor,
            to: line_len,
        });
    }
}

/// Checks each record's typing sequence and char map against its tokens.
pub fn verify_lines(lines: &[LineRecord]) -> Vec<Discrepancy> {
    let mut discrepancies = Vec::new();
    for line in lines {
        let row = line.line_number;
        let expected_sequence: String =
            line.typing_tokens().map(|t| t.text.as_str()).collect();
        if expected_sequence != line.typing_sequence {
            discrepancies.push(Discrepancy::TypingSequence { row });
        }

        let chars = line.typing_sequence.chars().count();
        if line.char_map.len() != chars {
            discrepancies.push(Discrepancy::CharMapLength {
                row,
                entries: line.char_map.len(),
                chars,
            });
        }

        let expected_entries = line.typing_tokens().enumerate().flat_map(|(token_idx, t)| {
            t.text.chars().map(move |_| CharMapEntry {
                token_idx,
                display_col: t.start_col,
            })
        });
        for (index, expected) in expected_entries.enumerate() {
            let actual = line.char_map.get(&index).copied();
            if actual != Some(expected) {
                discrepancies.push(Discrepancy::CharMapEntry {
                    row,
                    index,
                    actual,
                    expected,
                });
            }
        }
    }
    discrepancies
}
