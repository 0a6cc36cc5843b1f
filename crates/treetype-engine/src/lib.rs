pub mod batch;
pub mod document;
pub mod io;
pub mod language;
pub mod lines;
pub mod parsing;
pub mod tokens;
pub mod verify;

// Re-export key types for easier usage
pub use batch::{BatchJob, FileError, FileReport, ProcessOptions, process_file, run_batch};
pub use document::{EncodeError, EncodeOptions, Encoded, SnippetDocument, encode_source};
pub use io::*;
pub use language::{Language, LanguageProfile};
pub use lines::{CharMapEntry, DisplayToken, LineRecord};
pub use parsing::{ParseError, SyntaxErrorPolicy, UncoveredText};
pub use tokens::{Category, ClassifiedSpan};
pub use verify::{Discrepancy, VerificationReport, Verifier};
