use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// File extensions the engine knows how to encode, in the order they are
/// reported to users.
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["py", "js", "jsx", "ts", "tsx"];

/// Grammar types every supported language treats as a single leaf, even when
/// the grammar gives them children (e.g. a string body containing escapes).
const ATOMIC_TYPES: &[&str] = &["string_content", "comment", "string_fragment"];

/// Grammar type of literal text between JSX tags.
const JSX_TEXT: &str = "jsx_text";

/// A source language with a tree-sitter grammar behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    /// TypeScript with JSX, parsed by the dedicated TSX grammar.
    Tsx,
}

impl Language {
    pub const ALL: [Language; 4] = [
        Language::Python,
        Language::JavaScript,
        Language::TypeScript,
        Language::Tsx,
    ];

    /// Maps a file extension (without the leading dot) to its language.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "py" => Some(Language::Python),
            "js" | "jsx" => Some(Language::JavaScript),
            "ts" => Some(Language::TypeScript),
            "tsx" => Some(Language::Tsx),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// The name used in output documents and directory names.
    pub fn name(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Tsx => "tsx",
        }
    }

    /// The tree-sitter grammar for this language.
    pub fn grammar(self) -> tree_sitter::Language {
        match self {
            Language::Python => tree_sitter_python::LANGUAGE.into(),
            Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Language::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }

    pub fn profile(self) -> LanguageProfile {
        match self {
            Language::Python | Language::TypeScript => LanguageProfile {
                atomic_types: ATOMIC_TYPES,
                markup_text_type: None,
            },
            Language::JavaScript | Language::Tsx => LanguageProfile {
                atomic_types: ATOMIC_TYPES,
                markup_text_type: Some(JSX_TEXT),
            },
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown language: {0}")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.name() == s)
            .ok_or_else(|| UnknownLanguage(s.to_string()))
    }
}

/// Per-language knobs for the otherwise language-agnostic pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageProfile {
    /// Node types emitted as one leaf without descending into children.
    pub atomic_types: &'static [&'static str],
    /// Node type holding markup text whose surrounding whitespace is split off.
    /// `None` disables the markup-text splitter for the language.
    pub markup_text_type: Option<&'static str>,
}

impl LanguageProfile {
    pub fn is_atomic(&self, grammar_type: &str) -> bool {
        self.atomic_types.contains(&grammar_type)
    }
}
