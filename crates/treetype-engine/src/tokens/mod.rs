//! # Token Classification
//!
//! Attaches typing and rendering information to spans.
//!
//! - **`category`**: the [`Category`] enum and the ordered rule table that
//!   tags a token with every category it matches
//! - **`classify`**: [`ClassifiedSpan`] and the `base_typeable` rule
//! - **`markup`**: [`MarkupTextSplitter`], the fix-up that separates markup
//!   text from the whitespace around it
//!
//! Classification is local: a token's categories depend only on its own
//! grammar type and text, plus whether it sits in an unparsable region,
//! never on its neighbours.

pub mod category;
pub mod classify;
pub mod markup;

pub use category::{Category, categorize, categorize_facts};
pub use classify::{ClassifiedSpan, classify, classify_all, is_base_typeable};
pub use markup::{MARKUP_WHITESPACE, MarkupTextSplitter};
