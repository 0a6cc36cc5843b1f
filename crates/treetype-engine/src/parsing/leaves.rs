use tree_sitter::{Node, Point, Tree};

use crate::language::LanguageProfile;

use super::span::{Span, advance};

/// Flattens a syntax tree into its leaves, in document order.
///
/// Nodes whose type is atomic for the language become a single leaf even when
/// they have children, so a multi-line comment or string body is one unit.
/// Text a node owns between or after its visible children (tokens the grammar
/// keeps hidden, such as a Python format spec) becomes a leaf typed after that
/// node. Leaves under an `ERROR` node are marked `in_error`.
/// The root itself is never a leaf; an empty tree yields no leaves.
pub fn extract_leaves(tree: &Tree, source: &str, profile: &LanguageProfile) -> Vec<Span> {
    let mut leaves = Vec::new();
    collect_children(tree.root_node(), source, profile, false, &mut leaves);
    leaves
}

fn collect_leaves(
    node: Node,
    source: &str,
    profile: &LanguageProfile,
    in_error: bool,
    leaves: &mut Vec<Span>,
) {
    let in_error = in_error || node.is_error();
    if profile.is_atomic(node.kind()) || node.child_count() == 0 {
        if let Some(span) = leaf_span(node, source, in_error) {
            leaves.push(span);
        }
        return;
    }
    collect_children(node, source, profile, in_error, leaves);
}

fn collect_children(
    node: Node,
    source: &str,
    profile: &LanguageProfile,
    in_error: bool,
    leaves: &mut Vec<Span>,
) {
    let mut covered = (node.start_byte(), node.start_position());
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.start_byte() > covered.0 {
            push_hidden_text(node, source, covered, child.start_byte(), in_error, leaves);
        }
        collect_leaves(child, source, profile, in_error, leaves);
        if child.end_byte() > covered.0 {
            covered = (child.end_byte(), child.end_position());
        }
    }
    if node.end_byte() > covered.0 {
        push_hidden_text(node, source, covered, node.end_byte(), in_error, leaves);
    }
}

/// Emits the non-whitespace part of `from..to`, which no child of `node`
/// covers, as a leaf of `node`'s type.
fn push_hidden_text(
    node: Node,
    source: &str,
    (from, at): (usize, Point),
    to: usize,
    in_error: bool,
    leaves: &mut Vec<Span>,
) {
    let Some(gap) = source.get(from..to) else {
        log::warn!("{} has a non-UTF-8 gap {from}..{to}", node.kind());
        return;
    };
    let text = gap.trim();
    if text.is_empty() {
        return;
    }

    let leading = &gap[..gap.len() - gap.trim_start().len()];
    let (row, col) = advance(at.row, at.column, leading);
    log::debug!("{} owns hidden text {text:?} at {row}:{col}", node.kind());
    leaves.push(Span::from_text(row, col, text, node.kind()).within_error(in_error));
}

fn leaf_span(node: Node, source: &str, in_error: bool) -> Option<Span> {
    let range = node.byte_range();
    if range.is_empty() {
        // MISSING nodes from error recovery cover no source text
        log::debug!(
            "skipping zero-width {} at {}:{}",
            node.kind(),
            node.start_position().row,
            node.start_position().column
        );
        return None;
    }

    let Some(text) = source.get(range.clone()) else {
        log::warn!("leaf {} has a non-UTF-8 byte range {range:?}", node.kind());
        return None;
    };

    let start = node.start_position();
    let end = node.end_position();
    Some(Span {
        start_row: start.row,
        start_col: start.column,
        end_row: end.row,
        end_col: end.column,
        text: text.to_string(),
        grammar_type: node.kind(),
        in_error,
    })
}
