//! Mapping node-level spans and leaf sets onto character positions.
//!
//! Node-space bookkeeping is 1-indexed throughout (node 0 is the virtual
//! root, character numbers start at 1 to match). The single off-by-one
//! conversion to 0-indexed character positions happens at the mask
//! boundary in [`crate::mask::builder`].

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::tree::CoverageSpan;

/// Mapping from lexical unit id (1..=N) to the closed, 1-indexed
/// character interval it occupies in the original text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconSpans {
    spans: Vec<(usize, usize)>,
}

impl LexiconSpans {
    /// Accumulate character intervals from the lexical units in order.
    ///
    /// Lengths are counted in characters, not bytes, so multi-byte CJK
    /// text maps one character per position.
    pub fn from_lexicons<S: AsRef<str>>(lexicons: &[S]) -> Self {
        let mut spans = Vec::with_capacity(lexicons.len());
        let mut next_char = 1usize;
        for lexicon in lexicons {
            let len = lexicon.as_ref().chars().count();
            spans.push((next_char, next_char + len - 1));
            next_char += len;
        }
        Self { spans }
    }

    /// Number of lexical units.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Character interval of a unit (1-indexed unit id).
    pub fn get(&self, unit: usize) -> Option<(usize, usize)> {
        self.spans.get(unit.checked_sub(1)?).copied()
    }

    /// Total number of characters covered by all units.
    pub fn char_count(&self) -> usize {
        self.spans.last().map(|&(_, end)| end).unwrap_or(0)
    }

    /// Verify that the mapped length matches the character count of the
    /// text the parse was produced from.
    pub fn check_char_count(&self, text_chars: usize) -> Result<()> {
        if self.char_count() != text_chars {
            return Err(anyhow!(
                "lexicon spans cover {} characters but text has {}",
                self.char_count(),
                text_chars
            ));
        }
        Ok(())
    }
}

/// Expand node coverage spans to character coverage spans.
///
/// Only the first character of a unit acts as the tree node: it gets the
/// character interval stretching from the start of the unit at the
/// coverage span's lower bound to the end of the unit at its upper bound.
/// Every other character of the unit is a placeholder and covers only
/// itself. This restriction is intentional and must not be generalized.
pub fn expand_char_spans(
    coverage: &[CoverageSpan],
    lexicons: &LexiconSpans,
) -> Result<Vec<CoverageSpan>> {
    let mut char_spans = Vec::with_capacity(lexicons.char_count());

    for unit in 1..=lexicons.len() {
        let (start_char, end_char) = lexicons
            .get(unit)
            .ok_or_else(|| anyhow!("missing character span for unit {unit}"))?;
        let node_span = coverage
            .get(unit - 1)
            .ok_or_else(|| anyhow!("missing coverage span for unit {unit}"))?;

        let (min_start, _) = lexicons
            .get(node_span.lo)
            .ok_or_else(|| anyhow!("coverage span of unit {unit} references unit {}", node_span.lo))?;
        let (_, max_end) = lexicons
            .get(node_span.hi)
            .ok_or_else(|| anyhow!("coverage span of unit {unit} references unit {}", node_span.hi))?;

        char_spans.push(CoverageSpan::new(min_start, max_end));
        for c in (start_char + 1)..=end_char {
            char_spans.push(CoverageSpan::new(c, c));
        }
    }

    Ok(char_spans)
}

/// Expand node leaf sets to per-character leaf sets.
///
/// For unit u, every character of every unit in u's leaf set is collected
/// into one list, and that same list is assigned to every character
/// position of u. Positions in the returned vector are 0-indexed; the
/// character numbers inside each list stay 1-indexed.
pub fn expand_char_leaves(
    leaf_sets: &[Vec<usize>],
    lexicons: &LexiconSpans,
) -> Result<Vec<Vec<usize>>> {
    let mut char_leaves = vec![Vec::new(); lexicons.char_count()];

    for unit in 1..=lexicons.len() {
        let (start_char, end_char) = lexicons
            .get(unit)
            .ok_or_else(|| anyhow!("missing character span for unit {unit}"))?;
        let leaf_units = leaf_sets
            .get(unit - 1)
            .ok_or_else(|| anyhow!("missing leaf set for unit {unit}"))?;

        let mut leaf_chars = Vec::new();
        for &leaf in leaf_units {
            let (leaf_start, leaf_end) = lexicons
                .get(leaf)
                .ok_or_else(|| anyhow!("leaf set of unit {unit} references unit {leaf}"))?;
            leaf_chars.extend(leaf_start..=leaf_end);
        }

        for c in start_char..=end_char {
            char_leaves[c - 1] = leaf_chars.clone();
        }
    }

    Ok(char_leaves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{coverage_spans, leaf_sets, DependencyTree};

    #[test]
    fn test_lexicon_spans_accumulate() {
        let spans = LexiconSpans::from_lexicons(&["浙商银行", "企业", "解读"]);
        assert_eq!(spans.get(1), Some((1, 4)));
        assert_eq!(spans.get(2), Some((5, 6)));
        assert_eq!(spans.get(3), Some((7, 8)));
        assert_eq!(spans.char_count(), 8);
        assert!(spans.check_char_count(8).is_ok());
        assert!(spans.check_char_count(9).is_err());
    }

    #[test]
    fn test_first_char_carries_subtree_span() {
        // Unit 1 (4 chars) governs unit 2 (2 chars).
        let tree = DependencyTree::from_heads(&[0, 1]).unwrap();
        let coverage = coverage_spans(&tree);
        let lexicons = LexiconSpans::from_lexicons(&["浙商银行", "企业"]);

        let char_spans = expand_char_spans(&coverage, &lexicons).unwrap();
        assert_eq!(char_spans.len(), 6);
        // First char of unit 1 spans the whole governed text.
        assert_eq!(char_spans[0], CoverageSpan::new(1, 6));
        // Remaining chars of unit 1 are placeholders.
        assert_eq!(char_spans[1], CoverageSpan::new(2, 2));
        assert_eq!(char_spans[2], CoverageSpan::new(3, 3));
        assert_eq!(char_spans[3], CoverageSpan::new(4, 4));
        // First char of unit 2 spans unit 2's own interval.
        assert_eq!(char_spans[4], CoverageSpan::new(5, 6));
        assert_eq!(char_spans[5], CoverageSpan::new(6, 6));
    }

    #[test]
    fn test_leaf_chars_shared_across_unit() {
        let tree = DependencyTree::from_heads(&[0, 1]).unwrap();
        let sets = leaf_sets(&tree);
        let lexicons = LexiconSpans::from_lexicons(&["浙商银行", "企业"]);

        let char_leaves = expand_char_leaves(&sets, &lexicons).unwrap();
        assert_eq!(char_leaves.len(), 6);
        // Unit 1's leaf set is {1, 2}: all six characters.
        for pos in 0..4 {
            assert_eq!(char_leaves[pos], vec![1, 2, 3, 4, 5, 6]);
        }
        // Unit 2 is a leaf: only its own characters.
        assert_eq!(char_leaves[4], vec![5, 6]);
        assert_eq!(char_leaves[5], vec![5, 6]);
    }

    #[test]
    fn test_single_char_unit() {
        let tree = DependencyTree::from_heads(&[0]).unwrap();
        let lexicons = LexiconSpans::from_lexicons(&["一"]);
        let char_spans = expand_char_spans(&coverage_spans(&tree), &lexicons).unwrap();
        assert_eq!(char_spans, vec![CoverageSpan::new(1, 1)]);
        let char_leaves = expand_char_leaves(&leaf_sets(&tree), &lexicons).unwrap();
        assert_eq!(char_leaves, vec![vec![1]]);
    }
}
