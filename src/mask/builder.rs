//! Final attention mask assembly.
//!
//! Converts per-character leaf sets into the fixed-size boolean matrix
//! the model trainer consumes, applying truncation and the placeholder
//! token offset.

use serde::{Deserialize, Serialize};

use crate::tree::CoverageSpan;

/// Square boolean attention matrix of dimension `max_seq_length`.
///
/// `get(i, j)` is true iff token j is syntactically visible to token i.
/// The relation is directed; symmetry is not guaranteed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttentionMask {
    dim: usize,
    bits: Vec<bool>,
}

impl AttentionMask {
    /// All-false mask of the given dimension.
    pub fn empty(dim: usize) -> Self {
        Self {
            dim,
            bits: vec![false; dim * dim],
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        self.bits[row * self.dim + col]
    }

    fn set(&mut self, row: usize, col: usize) {
        self.bits[row * self.dim + col] = true;
    }

    /// Number of true cells, mostly useful in diagnostics.
    pub fn count_ones(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Rows as 0/1 vectors, in the layout the trainer expects.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.bits.chunks(self.dim)
    }

    /// Build the mask from per-character leaf sets.
    ///
    /// `char_leaves[i]` holds 1-indexed character numbers visible to the
    /// 0-indexed character position i. Characters beyond
    /// `max_seq_length - 2` (two slots are reserved for the leading and
    /// trailing placeholder tokens) are dropped on both axes before the
    /// quadratic buffer is touched, which both matches the truncation of
    /// the token and label sequences and bounds memory use. The kept
    /// block lands at offset (1, 1) when the classification token leads
    /// the sequence, (0, 0) when it trails, shifted right by the padding
    /// length when padding is on the left.
    pub fn build(char_leaves: &[Vec<usize>], opts: &MaskLayout) -> Self {
        let limit = opts.max_seq_length.saturating_sub(2);
        let kept = char_leaves.len().min(limit);

        let mut mask = Self::empty(opts.max_seq_length);
        let offset = opts.block_offset(kept);

        for (i, leaves) in char_leaves.iter().take(kept).enumerate() {
            for &leaf_char in leaves {
                // 1-indexed char number to 0-indexed position.
                let j = leaf_char - 1;
                if j < kept {
                    mask.set(offset + i, offset + j);
                }
            }
        }
        mask
    }

    /// Build the mask from per-character coverage spans instead of leaf
    /// sets: every character inside character i's coverage span attends
    /// to i. Same truncation and placement rules as [`Self::build`].
    pub fn build_from_spans(char_spans: &[CoverageSpan], opts: &MaskLayout) -> Self {
        let limit = opts.max_seq_length.saturating_sub(2);
        let kept = char_spans.len().min(limit);

        let mut mask = Self::empty(opts.max_seq_length);
        let offset = opts.block_offset(kept);

        for (j, span) in char_spans.iter().take(kept).enumerate() {
            for i in (span.lo - 1)..span.hi.min(kept) {
                mask.set(offset + i, offset + j);
            }
        }
        mask
    }
}

/// Placement options for the mask block inside the padded buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskLayout {
    pub max_seq_length: usize,
    /// Classification token trails the sequence (XLNet-style) instead of
    /// leading it (BERT-style, the default).
    pub cls_token_at_end: bool,
    /// Pad on the left instead of the right.
    pub pad_on_left: bool,
}

impl MaskLayout {
    pub fn new(max_seq_length: usize) -> Self {
        Self {
            max_seq_length,
            cls_token_at_end: false,
            pad_on_left: false,
        }
    }

    /// Top-left coordinate of the kept block for a block of `kept`
    /// characters (kept + CLS + SEP tokens precede the padding).
    fn block_offset(&self, kept: usize) -> usize {
        let lead = if self.cls_token_at_end { 0 } else { 1 };
        if self.pad_on_left {
            let used = kept + 2;
            self.max_seq_length.saturating_sub(used) + lead
        } else {
            lead
        }
    }
}
