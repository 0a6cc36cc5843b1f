use serde::{Deserialize, Serialize};

use crate::language::Language;
use crate::lines::{DEFAULT_INDENT_WIDTH, LineAssembler, LineRecord};
use crate::parsing::{
    ParseError, Span, SyntaxErrorPolicy, UncoveredText, WHITESPACE, check_syntax, extract_leaves,
    fill_whitespace_gaps, parse_source,
};
use crate::tokens::{ClassifiedSpan, MarkupTextSplitter, classify_all};
use crate::verify::{VerificationReport, Verifier};

/// The persisted encoding of one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetDocument {
    pub language: Language,
    /// Number of entries in `lines`.
    pub total_lines: usize,
    pub lines: Vec<LineRecord>,
}

impl SnippetDocument {
    pub fn new(language: Language, lines: Vec<LineRecord>) -> Self {
        SnippetDocument {
            language,
            total_lines: lines.len(),
            lines,
        }
    }

    /// Total characters a user types to complete the snippet.
    pub fn typeable_chars(&self) -> usize {
        self.lines
            .iter()
            .map(|l| l.typing_sequence.chars().count())
            .sum()
    }

    /// Pretty-printed JSON, two-space indented, non-ASCII kept literal.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    pub indent_width: usize,
    pub syntax_errors: SyntaxErrorPolicy,
    /// Run the markup-text splitter for languages that have markup text.
    pub split_markup_text: bool,
    /// Emit `whitespace` spans for the columns between leaves.
    pub fill_whitespace: bool,
    /// Run the round-trip verifier and fail on any discrepancy.
    pub verify: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            indent_width: DEFAULT_INDENT_WIDTH,
            syntax_errors: SyntaxErrorPolicy::Tolerate,
            split_markup_text: true,
            fill_whitespace: true,
            verify: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("lossy extraction: {0}")]
    UncoveredText(#[from] UncoveredText),
    #[error("round-trip verification failed: {0}")]
    Verification(VerificationReport),
}

/// An encoded document with the spans it was assembled from.
#[derive(Debug, Clone)]
pub struct Encoded {
    pub document: SnippetDocument,
    pub spans: Vec<ClassifiedSpan>,
}

/// Produces the classified spans of `source`, in document order.
pub fn encode_spans(
    language: Language,
    source: &str,
    options: &EncodeOptions,
) -> Result<Vec<ClassifiedSpan>, EncodeError> {
    let profile = language.profile();
    let tree = parse_source(language, source)?;
    check_syntax(language, &tree, options.syntax_errors)?;

    let leaves = extract_leaves(&tree, source, &profile);
    log::debug!("{language}: extracted {} leaves", leaves.len());
    let leaves = cover_rows(leaves, source, options.fill_whitespace)?;

    let mut spans = classify_all(leaves);
    if options.split_markup_text
        && let Some(text_type) = profile.markup_text_type
    {
        spans = MarkupTextSplitter::new(text_type).apply(spans);
    }
    Ok(spans)
}

/// Checks that the leaves tile every row, keeping the whitespace filler only
/// when `fill_whitespace` is set.
fn cover_rows(
    leaves: Vec<Span>,
    source: &str,
    fill_whitespace: bool,
) -> Result<Vec<Span>, UncoveredText> {
    let mut filled = fill_whitespace_gaps(leaves, source)?;
    if !fill_whitespace {
        filled.retain(|span| span.grammar_type != WHITESPACE);
    }
    Ok(filled)
}

/// Runs the full pipeline: parse, extract, fill, classify, split, assemble,
/// and, when enabled, verify.
pub fn encode_source(
    language: Language,
    source: &str,
    options: &EncodeOptions,
) -> Result<Encoded, EncodeError> {
    let spans = encode_spans(language, source, options)?;
    let lines = LineAssembler::new(options.indent_width).assemble(source, &spans);
    let document = SnippetDocument::new(language, lines);

    if options.verify {
        let report = Verifier::new(options.fill_whitespace).verify(source, &spans, &document);
        if !report.is_ok() {
            return Err(EncodeError::Verification(report));
        }
        log::debug!("{language}: verified {} rows", report.rows_checked);
    }

    Ok(Encoded { document, spans })
}
