//! # Parsing
//!
//! Turns source text into a flat, position-ordered sequence of [`Span`]s.
//!
//! ## Stages
//!
//! 1. **Parser adapter** ([`parse_source`]): runs the tree-sitter grammar for a
//!    [`Language`] over the complete source. Every call is a fresh, full parse.
//! 2. **Leaf extraction** ([`leaves`]): walks the tree, emitting childless nodes
//!    and nodes of the language's atomic types as leaves.
//! 3. **Gap filling** ([`gaps`]): adds `whitespace` spans for the columns no
//!    leaf covers, so each row is tiled exactly. Uncovered text that is not
//!    whitespace fails the file.
//!
//! ## Syntax errors
//!
//! Grammars recover from errors and return a best-effort tree containing
//! `ERROR` nodes. Under [`SyntaxErrorPolicy::Tolerate`] those nodes are walked
//! like any other and their leaves are marked `in_error`; under
//! [`SyntaxErrorPolicy::Reject`] the first error aborts the file with its
//! position.

pub mod gaps;
pub mod leaves;
pub mod span;

use serde::{Deserialize, Serialize};
use tree_sitter::{Node, Parser, Point, Tree};

use crate::language::Language;

pub use gaps::{UncoveredText, WHITESPACE, fill_whitespace_gaps};
pub use leaves::extract_leaves;
pub use span::{RowFragment, Span};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to load the {language} grammar: {source}")]
    Grammar {
        language: Language,
        source: tree_sitter::LanguageError,
    },
    #[error("the {language} parser returned no tree")]
    NoTree { language: Language },
    #[error("syntax error in {language} source at line {line}, column {column}")]
    Syntax {
        language: Language,
        /// One-based line of the first error.
        line: usize,
        /// One-based byte column of the first error.
        column: usize,
    },
}

/// What to do with a tree that contains `ERROR` or `MISSING` nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyntaxErrorPolicy {
    /// Keep error nodes as ordinary leaves so broken snippets stay practicable.
    #[default]
    Tolerate,
    /// Fail the file at the first error.
    Reject,
}

/// Parses a complete source file with the grammar for `language`.
pub fn parse_source(language: Language, source: &str) -> Result<Tree, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&language.grammar())
        .map_err(|source| ParseError::Grammar { language, source })?;
    parser
        .parse(source, None)
        .ok_or(ParseError::NoTree { language })
}

/// Applies `policy` to a parsed tree.
pub fn check_syntax(
    language: Language,
    tree: &Tree,
    policy: SyntaxErrorPolicy,
) -> Result<(), ParseError> {
    let root = tree.root_node();
    if !root.has_error() {
        return Ok(());
    }

    let position = first_error(root).unwrap_or_else(|| root.start_position());
    match policy {
        SyntaxErrorPolicy::Tolerate => {
            log::warn!(
                "{language} source has syntax errors (first at {}:{}); keeping error nodes",
                position.row + 1,
                position.column + 1
            );
            Ok(())
        }
        SyntaxErrorPolicy::Reject => Err(ParseError::Syntax {
            language,
            line: position.row + 1,
            column: position.column + 1,
        }),
    }
}

/// Position of the first `ERROR` or `MISSING` node in document order.
fn first_error(node: Node) -> Option<Point> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position());
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    node.children(&mut cursor).find_map(first_error)
}
