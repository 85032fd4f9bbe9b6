//! Coverage span derivation.
//!
//! The coverage span of a node is the closed interval of node ids covered
//! by its subtree, used downstream as a proxy for a syntactic constituent.

use serde::{Deserialize, Serialize};

use super::DependencyTree;

/// Closed interval `[lo, hi]` over node ids covered by a subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageSpan {
    pub lo: usize,
    pub hi: usize,
}

impl CoverageSpan {
    pub fn new(lo: usize, hi: usize) -> Self {
        Self { lo, hi }
    }

    pub fn contains(&self, other: &CoverageSpan) -> bool {
        self.lo <= other.lo && self.hi >= other.hi
    }
}

/// Compute the coverage span of every lexical node.
///
/// Leaves cover only themselves. Internal nodes are processed bottom-up
/// (reversed breadth-first visitation order), taking the min/max over
/// their own id and their children's finalized spans. Since a tree has no
/// shared subtrees, each descendant contributes exactly once before its
/// ancestor is finalized.
///
/// The returned vector is indexed by `node_id - 1`; the virtual root's
/// span is discarded because it is not a lexical unit.
pub fn coverage_spans(tree: &DependencyTree) -> Vec<CoverageSpan> {
    let n = tree.node_count();
    let mut spans = vec![CoverageSpan::new(0, 0); n + 1];

    for node in 1..=n {
        if tree.is_leaf(node) {
            spans[node] = CoverageSpan::new(node, node);
        }
    }

    let mut internal = tree.internal_nodes_top_down();
    internal.reverse();
    for node in internal {
        let mut lo = node;
        let mut hi = node;
        for &child in tree.children(node) {
            lo = lo.min(spans[child].lo);
            hi = hi.max(spans[child].hi);
        }
        spans[node] = CoverageSpan::new(lo, hi);
    }

    spans.split_off(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_node_tree() {
        let tree = DependencyTree::from_heads(&[0, 1, 1]).unwrap();
        let spans = coverage_spans(&tree);
        assert_eq!(spans[0], CoverageSpan::new(1, 3));
        assert_eq!(spans[1], CoverageSpan::new(2, 2));
        assert_eq!(spans[2], CoverageSpan::new(3, 3));
    }

    #[test]
    fn test_single_node() {
        let tree = DependencyTree::from_heads(&[0]).unwrap();
        assert_eq!(coverage_spans(&tree), vec![CoverageSpan::new(1, 1)]);
    }

    #[test]
    fn test_span_contains_self_and_children() {
        // root -> 3 -> {1, 5}, 1 -> 2, 5 -> 4
        let tree = DependencyTree::from_heads(&[3, 1, 0, 5, 3]).unwrap();
        let spans = coverage_spans(&tree);
        for (i, span) in spans.iter().enumerate() {
            let node = i + 1;
            assert!(span.lo <= node && node <= span.hi, "node {node}: {span:?}");
            for &child in tree.children(node) {
                assert!(span.contains(&spans[child - 1]));
            }
        }
        // Node 3 governs the whole sentence.
        assert_eq!(spans[2], CoverageSpan::new(1, 5));
    }
}
