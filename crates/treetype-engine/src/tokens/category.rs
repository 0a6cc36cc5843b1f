use std::fmt;

use serde::{Deserialize, Serialize};

use crate::parsing::Span;

/// Rendering/typing category of a token.
///
/// A token may carry several categories. The four bracket kinds are kept
/// apart so a practice mode can require parentheses while skipping braces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Comment,
    StringContent,
    StringDelimiter,
    Punctuation,
    Parenthesis,
    CurlyBrace,
    SquareBracket,
    AngleBracket,
    Operator,
    /// Text the grammar could not parse (inside an `ERROR` node).
    Error,
}

impl Category {
    pub const BRACKETS: [Category; 4] = [
        Category::Parenthesis,
        Category::CurlyBrace,
        Category::SquareBracket,
        Category::AngleBracket,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Comment => "comment",
            Category::StringContent => "string_content",
            Category::StringDelimiter => "string_delimiter",
            Category::Punctuation => "punctuation",
            Category::Parenthesis => "parenthesis",
            Category::CurlyBrace => "curly_brace",
            Category::SquareBracket => "square_bracket",
            Category::AngleBracket => "angle_bracket",
            Category::Operator => "operator",
            Category::Error => "error",
        }
    }

    pub fn is_bracket(self) -> bool {
        Self::BRACKETS.contains(&self)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a category rule may look at: one token's type, text and error
/// marking, nothing else.
pub struct TokenFacts<'a> {
    pub grammar_type: &'a str,
    /// `grammar_type` lower-cased once for the substring rules.
    pub type_lower: String,
    pub text: &'a str,
    pub in_error: bool,
}

impl<'a> TokenFacts<'a> {
    pub fn new(grammar_type: &'a str, text: &'a str) -> Self {
        TokenFacts {
            grammar_type,
            type_lower: grammar_type.to_lowercase(),
            text,
            in_error: false,
        }
    }

    pub fn of(span: &'a Span) -> Self {
        TokenFacts {
            in_error: span.in_error,
            ..Self::new(span.grammar_type, &span.text)
        }
    }
}

pub type Rule = fn(&TokenFacts) -> bool;

const QUOTES: &[&str] = &["\"", "'", "`"];
const PUNCTUATION: &[&str] = &[":", ";", ",", "."];
const OPERATORS: &[&str] = &[
    "=", "+", "-", "*", "/", "%", "!", "&", "|", "^", "~", "->", "=>", "++", "--", "+=", "-=",
    "*=", "/=", "%=", "==", "!=", "===", "!==", "<=", ">=", "&&", "||", "<<", ">>", "**", "//",
    "?", ":", "??", "?.", "...",
];

/// Category rules in output order. Every rule is checked against every token
/// and a token receives every category whose rule matches.
pub const RULES: &[(Category, Rule)] = &[
    (Category::Comment, |t| t.type_lower.contains("comment")),
    (Category::StringContent, |t| {
        (t.type_lower.contains("string")
            && (t.type_lower.contains("content") || t.type_lower.contains("fragment")))
            || t.grammar_type == "jsx_text"
    }),
    (Category::StringDelimiter, |t| {
        QUOTES.contains(&t.text)
            || t.type_lower.contains("string_start")
            || t.type_lower.contains("string_end")
    }),
    (Category::Punctuation, |t| PUNCTUATION.contains(&t.text)),
    (Category::Parenthesis, |t| matches!(t.text, "(" | ")")),
    (Category::CurlyBrace, |t| matches!(t.text, "{" | "}")),
    (Category::SquareBracket, |t| matches!(t.text, "[" | "]")),
    (Category::AngleBracket, |t| matches!(t.text, "<" | ">" | "</" | "/>")),
    (Category::Operator, |t| OPERATORS.contains(&t.text)),
    (Category::Error, |t| t.in_error || t.grammar_type == "ERROR"),
];

/// All categories whose rule matches the token, in rule order.
pub fn categorize(grammar_type: &str, text: &str) -> Vec<Category> {
    categorize_facts(&TokenFacts::new(grammar_type, text))
}

pub fn categorize_facts(facts: &TokenFacts) -> Vec<Category> {
    RULES
        .iter()
        .filter(|(_, rule)| rule(facts))
        .map(|(category, _)| *category)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("comment", "# add", &[Category::Comment])]
    #[case("comment", "/* block */", &[Category::Comment])]
    #[case("string_content", "hello", &[Category::StringContent])]
    #[case("string_fragment", "hello", &[Category::StringContent])]
    #[case("jsx_text", "Add", &[Category::StringContent])]
    #[case("string_start", "\"\"\"", &[Category::StringDelimiter])]
    #[case("string_end", "f'", &[Category::StringDelimiter])]
    #[case("\"", "\"", &[Category::StringDelimiter])]
    #[case("`", "`", &[Category::StringDelimiter])]
    #[case(";", ";", &[Category::Punctuation])]
    #[case(",", ",", &[Category::Punctuation])]
    #[case("(", "(", &[Category::Parenthesis])]
    #[case("}", "}", &[Category::CurlyBrace])]
    #[case("[", "[", &[Category::SquareBracket])]
    #[case("</", "</", &[Category::AngleBracket])]
    #[case("/>", "/>", &[Category::AngleBracket])]
    #[case("=>", "=>", &[Category::Operator])]
    #[case("===", "===", &[Category::Operator])]
    #[case("??", "??", &[Category::Operator])]
    #[case("...", "...", &[Category::Operator])]
    #[case("->", "->", &[Category::Operator])]
    #[case("identifier", "value", &[])]
    #[case("def", "def", &[])]
    #[case("ERROR", "@", &[Category::Error])]
    fn test_categorize(
        #[case] grammar_type: &str,
        #[case] text: &str,
        #[case] expected: &[Category],
    ) {
        assert_eq!(categorize(grammar_type, text), expected);
    }

    #[test]
    fn test_span_inside_error_region_is_tagged() {
        let span = Span::from_text(0, 4, ")", ")").within_error(true);
        assert_eq!(
            categorize_facts(&TokenFacts::of(&span)),
            vec![Category::Parenthesis, Category::Error]
        );
    }

    #[test]
    fn test_colon_is_punctuation_and_operator() {
        assert_eq!(
            categorize(":", ":"),
            vec![Category::Punctuation, Category::Operator]
        );
    }

    #[test]
    fn test_comparison_angle_is_bracket_not_operator() {
        // `<` alone is an angle bracket; only `<=` and friends are operators
        assert_eq!(categorize("<", "<"), vec![Category::AngleBracket]);
        assert_eq!(categorize("<=", "<="), vec![Category::Operator]);
    }

    #[test]
    fn test_no_token_text_matches_two_bracket_kinds() {
        let candidates = [
            "(", ")", "{", "}", "[", "]", "<", ">", "</", "/>", "=>", "->", "<=",
        ];
        for text in candidates {
            let brackets = categorize(text, text)
                .into_iter()
                .filter(|c| c.is_bracket())
                .count();
            assert!(brackets <= 1, "{text} has {brackets} bracket kinds");
        }
    }

    #[test]
    fn test_serialized_names() {
        for (category, _) in RULES {
            let json = serde_json::to_string(category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
        }
    }

    #[test]
    fn test_rules_cover_each_category_once() {
        let mut seen: Vec<Category> = RULES.iter().map(|(c, _)| *c).collect();
        let total = seen.len();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), total);
    }
}
