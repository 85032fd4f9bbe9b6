//! Character-level expansion of tree spans and attention mask assembly.

pub mod builder;
pub mod char_span;

pub use builder::AttentionMask;
pub use char_span::{expand_char_leaves, expand_char_spans, LexiconSpans};
