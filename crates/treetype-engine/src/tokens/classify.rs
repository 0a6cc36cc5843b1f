use crate::parsing::{Span, WHITESPACE};

use super::category::{Category, TokenFacts, categorize_facts};

/// A span together with its typing flag and categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedSpan {
    pub span: Span,
    /// Whether the span can ever be required input. Only whitespace filler is
    /// excluded; practice modes filter further by category.
    pub base_typeable: bool,
    pub categories: Vec<Category>,
}

impl ClassifiedSpan {
    pub fn has_category(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }
}

/// Whether a token of this type and text may be required input.
///
/// Unknown grammar types default to typeable, so nothing a user needs to type
/// is ever hidden by an incomplete rule set.
pub fn is_base_typeable(grammar_type: &str, text: &str) -> bool {
    !(grammar_type == WHITESPACE && text.trim().is_empty())
}

pub fn classify(span: Span) -> ClassifiedSpan {
    let base_typeable = is_base_typeable(span.grammar_type, &span.text);
    let categories = categorize_facts(&TokenFacts::of(&span));
    ClassifiedSpan {
        span,
        base_typeable,
        categories,
    }
}

pub fn classify_all(spans: Vec<Span>) -> Vec<ClassifiedSpan> {
    spans.into_iter().map(classify).collect()
}
