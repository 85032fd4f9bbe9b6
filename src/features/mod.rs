//! Feature encoding for the sequence labeling model.
//!
//! Turns an [`InputExample`] into fixed-length model features: token ids,
//! attention mask over tokens, segment ids, label ids and the square
//! syntactic span mask. Truncation is applied to tokens, labels and the
//! span mask together so the three can never desynchronize.

pub mod tokenizer;

pub use tokenizer::CharTokenizer;

use anyhow::{anyhow, Context, Result};
use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::{InputExample, LabelVocabulary};
use crate::mask::builder::MaskLayout;
use crate::mask::{expand_char_leaves, expand_char_spans, AttentionMask};

/// Which syntactic relation the span mask encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaskStrategy {
    /// Each character attends to all characters of the leaf units under
    /// its governing unit's subtree (the default).
    LeafSets,
    /// Each character is attended to by all characters inside its
    /// coverage span.
    CoverageSpans,
}

/// Immutable encoding configuration.
///
/// Replaces the original pipeline's pile of keyword arguments and global
/// tables with one explicit object handed into encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderConfig {
    pub max_seq_length: usize,
    pub cls_token: String,
    pub sep_token: String,
    pub pad_token_id: usize,
    /// BERT-style leading CLS by default; true for XLNet-style trailing.
    pub cls_token_at_end: bool,
    pub pad_on_left: bool,
    pub cls_token_segment_id: usize,
    pub pad_token_segment_id: usize,
    pub sequence_a_segment_id: usize,
    /// Real tokens are 1 and padding 0 when true (the usual convention).
    pub mask_padding_with_zero: bool,
    pub mask_strategy: MaskStrategy,
}

impl EncoderConfig {
    pub fn new(max_seq_length: usize) -> Self {
        Self {
            max_seq_length,
            cls_token: "[CLS]".to_string(),
            sep_token: "[SEP]".to_string(),
            pad_token_id: 0,
            cls_token_at_end: false,
            pad_on_left: false,
            cls_token_segment_id: 1,
            pad_token_segment_id: 0,
            sequence_a_segment_id: 0,
            mask_padding_with_zero: true,
            mask_strategy: MaskStrategy::LeafSets,
        }
    }

    fn mask_layout(&self) -> MaskLayout {
        MaskLayout {
            max_seq_length: self.max_seq_length,
            cls_token_at_end: self.cls_token_at_end,
            pad_on_left: self.pad_on_left,
        }
    }
}

/// One encoded example, every sequence exactly `max_seq_length` long.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputFeatures {
    pub input_ids: Vec<usize>,
    pub input_mask: Vec<usize>,
    pub segment_ids: Vec<usize>,
    pub label_ids: Vec<usize>,
    /// Unpadded length (characters + special tokens).
    pub input_len: usize,
    pub span_mask: AttentionMask,
}

/// Encode a single example.
pub fn encode_example(
    example: &InputExample,
    labels: &LabelVocabulary,
    tokenizer: &CharTokenizer,
    config: &EncoderConfig,
) -> Result<InputFeatures> {
    let mut tokens = tokenizer.tokenize(&example.chars);
    let mut label_ids = example
        .labels
        .iter()
        .map(|label| {
            labels
                .id(label)
                .ok_or_else(|| anyhow!("unknown label '{}'", label))
        })
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("example {}", example.guid))?;
    let outside = labels.outside_id()?;

    // Character-level expansion of the node-level tree features.
    let span_mask = match config.mask_strategy {
        MaskStrategy::LeafSets => {
            let char_leaves = expand_char_leaves(&example.leaf_sets, &example.lexicon_spans)
                .with_context(|| format!("example {}", example.guid))?;
            AttentionMask::build(&char_leaves, &config.mask_layout())
        }
        MaskStrategy::CoverageSpans => {
            let char_spans = expand_char_spans(&example.coverage_spans, &example.lexicon_spans)
                .with_context(|| format!("example {}", example.guid))?;
            AttentionMask::build_from_spans(&char_spans, &config.mask_layout())
        }
    };

    // Two slots are reserved for the CLS and SEP placeholder tokens.
    let limit = config.max_seq_length.saturating_sub(2);
    if tokens.len() > limit {
        tokens.truncate(limit);
        label_ids.truncate(limit);
    }

    tokens.push(config.sep_token.clone());
    label_ids.push(outside);
    let mut segment_ids = vec![config.sequence_a_segment_id; tokens.len()];

    if config.cls_token_at_end {
        tokens.push(config.cls_token.clone());
        label_ids.push(outside);
        segment_ids.push(config.cls_token_segment_id);
    } else {
        tokens.insert(0, config.cls_token.clone());
        label_ids.insert(0, outside);
        segment_ids.insert(0, config.cls_token_segment_id);
    }

    let mut input_ids = tokenizer.convert_tokens_to_ids(&tokens)?;
    let real = if config.mask_padding_with_zero { 1 } else { 0 };
    let pad = 1 - real;
    let mut input_mask = vec![real; input_ids.len()];
    let input_len = label_ids.len();

    let padding = config.max_seq_length - input_ids.len();
    if config.pad_on_left {
        input_ids.splice(0..0, std::iter::repeat(config.pad_token_id).take(padding));
        input_mask.splice(0..0, std::iter::repeat(pad).take(padding));
        segment_ids.splice(0..0, std::iter::repeat(config.pad_token_segment_id).take(padding));
        label_ids.splice(0..0, std::iter::repeat(config.pad_token_id).take(padding));
    } else {
        input_ids.extend(std::iter::repeat(config.pad_token_id).take(padding));
        input_mask.extend(std::iter::repeat(pad).take(padding));
        segment_ids.extend(std::iter::repeat(config.pad_token_segment_id).take(padding));
        label_ids.extend(std::iter::repeat(config.pad_token_id).take(padding));
    }

    debug_assert_eq!(input_ids.len(), config.max_seq_length);
    debug_assert_eq!(input_mask.len(), config.max_seq_length);
    debug_assert_eq!(segment_ids.len(), config.max_seq_length);
    debug_assert_eq!(label_ids.len(), config.max_seq_length);
    debug_assert_eq!(span_mask.dim(), config.max_seq_length);

    Ok(InputFeatures {
        input_ids,
        input_mask,
        segment_ids,
        label_ids,
        input_len,
        span_mask,
    })
}

/// Encode a batch of examples in parallel.
///
/// Examples are independent, so encoding is embarrassingly parallel; the
/// output order matches the input order.
pub fn encode_examples(
    examples: &[InputExample],
    labels: &LabelVocabulary,
    tokenizer: &CharTokenizer,
    config: &EncoderConfig,
) -> Result<Vec<InputFeatures>> {
    info!("encoding {} examples", examples.len());
    let features = examples
        .par_iter()
        .map(|example| encode_example(example, labels, tokenizer, config))
        .collect::<Result<Vec<_>>>()?;
    info!("encoded {} examples", features.len());
    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RawRecord;

    fn tokenizer() -> CharTokenizer {
        CharTokenizer::from_tokens(
            ["[PAD]", "[UNK]", "[CLS]", "[SEP]", "浙", "商", "银", "行", "企", "业"],
            false,
        )
        .unwrap()
    }

    fn labels() -> LabelVocabulary {
        LabelVocabulary::new(["X", "B-company", "I-company", "S-company", "O"]).unwrap()
    }

    fn example() -> InputExample {
        let record = RawRecord {
            text: "浙商银行企业".to_string(),
            label: None,
            lexicons: Some(vec!["浙商银行".to_string(), "企业".to_string()]),
            heads: Some(vec![0, 1]),
        };
        InputExample::from_record("test-0", &record).unwrap()
    }

    #[test]
    fn test_feature_lengths_and_layout() {
        let config = EncoderConfig::new(10);
        let features = encode_example(&example(), &labels(), &tokenizer(), &config).unwrap();

        assert_eq!(features.input_ids.len(), 10);
        assert_eq!(features.input_mask.len(), 10);
        assert_eq!(features.segment_ids.len(), 10);
        assert_eq!(features.label_ids.len(), 10);
        assert_eq!(features.span_mask.dim(), 10);
        // CLS + 6 chars + SEP.
        assert_eq!(features.input_len, 8);
        assert_eq!(features.input_ids[0], 2);
        assert_eq!(features.input_ids[7], 3);
        assert_eq!(features.input_ids[8], 0);
        assert_eq!(features.input_mask[..8], [1; 8]);
        assert_eq!(features.input_mask[8..], [0, 0]);
        assert_eq!(features.segment_ids[0], 1);

        // All six characters see each other (unit 1 governs unit 2), at
        // offset (1, 1) for the leading CLS.
        for i in 1..5 {
            for j in 1..7 {
                assert!(features.span_mask.get(i, j), "({i}, {j})");
            }
        }
        assert!(features.span_mask.get(5, 5));
        assert!(!features.span_mask.get(5, 1));
        assert!(!features.span_mask.get(0, 0));
    }

    #[test]
    fn test_truncation_keeps_streams_in_sync() {
        let config = EncoderConfig::new(5);
        let features = encode_example(&example(), &labels(), &tokenizer(), &config).unwrap();
        // 3 kept chars + CLS + SEP, no padding.
        assert_eq!(features.input_len, 5);
        assert_eq!(features.input_ids.len(), 5);
        // Mask block confined to rows/cols 1..=3.
        for i in 0..5 {
            assert!(!features.span_mask.get(i, 4));
            assert!(!features.span_mask.get(4, i));
        }
    }

    #[test]
    fn test_cls_at_end() {
        let mut config = EncoderConfig::new(10);
        config.cls_token_at_end = true;
        let features = encode_example(&example(), &labels(), &tokenizer(), &config).unwrap();
        // chars, SEP, CLS.
        assert_eq!(features.input_ids[6], 3);
        assert_eq!(features.input_ids[7], 2);
        assert!(features.span_mask.get(0, 0));
    }

    #[test]
    fn test_pad_on_left() {
        let mut config = EncoderConfig::new(10);
        config.pad_on_left = true;
        let features = encode_example(&example(), &labels(), &tokenizer(), &config).unwrap();
        assert_eq!(features.input_ids[..2], [0, 0]);
        assert_eq!(features.input_mask[..2], [0, 0]);
        // CLS after the padding.
        assert_eq!(features.input_ids[2], 2);
        assert!(features.span_mask.get(3, 3));
    }

    #[test]
    fn test_coverage_span_strategy() {
        let mut config = EncoderConfig::new(10);
        config.mask_strategy = MaskStrategy::CoverageSpans;
        let features = encode_example(&example(), &labels(), &tokenizer(), &config).unwrap();
        // First char of unit 1 covers chars 1..=6: column 1 set for all.
        for i in 1..7 {
            assert!(features.span_mask.get(i, 1), "row {i}");
        }
        // Placeholder char 2 covers only itself.
        assert!(features.span_mask.get(2, 2));
        assert!(!features.span_mask.get(3, 2));
    }

    #[test]
    fn test_unknown_label_is_fatal() {
        let mut ex = example();
        ex.labels[0] = "B-mystery".to_string();
        let config = EncoderConfig::new(10);
        assert!(encode_example(&ex, &labels(), &tokenizer(), &config).is_err());
    }

    #[test]
    fn test_batch_encoding_preserves_order_and_is_idempotent() {
        let config = EncoderConfig::new(10);
        let examples = vec![example(), example()];
        let batch = encode_examples(&examples, &labels(), &tokenizer(), &config).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].span_mask, batch[1].span_mask);
        let again = encode_examples(&examples, &labels(), &tokenizer(), &config).unwrap();
        assert_eq!(batch[0].input_ids, again[0].input_ids);
        assert_eq!(batch[0].span_mask, again[0].span_mask);
    }
}
