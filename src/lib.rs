pub mod data;
pub mod decode;
pub mod features;
pub mod mask;
pub mod parse;
pub mod tree;

pub use data::{InputExample, LabelVocabulary, RawRecord};
pub use decode::{decode_entities, Entity, Markup};
pub use features::{encode_example, encode_examples, CharTokenizer, EncoderConfig, InputFeatures};
pub use mask::{AttentionMask, LexiconSpans};
pub use parse::{DependencyParser, Parse};
pub use tree::{coverage_spans, leaf_sets, CoverageSpan, DependencyTree, TreeError};
