//! Dataset records, readers and label bookkeeping.

pub mod example;
pub mod labels;
pub mod reader;

pub use example::{EntityAnnotations, InputExample, RawRecord};
pub use labels::LabelVocabulary;
pub use reader::{examples_from_records, read_columnar, read_jsonl};
