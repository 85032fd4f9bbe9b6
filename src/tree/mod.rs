//! Dependency tree construction and validation.
//!
//! A parse is delivered as a flat array of parent pointers: `heads[i]` is
//! the parent node id of lexical node `i + 1`. Node 0 is the implicit
//! virtual root and is modeled explicitly in the adjacency structure, then
//! dropped from all derived output.

pub mod leaves;
pub mod span;

pub use leaves::leaf_sets;
pub use span::{coverage_spans, CoverageSpan};

use std::collections::VecDeque;
use thiserror::Error;

/// Errors raised while building a dependency tree from parser output.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("node {node}: parent id {parent} out of range (tree has {node_count} nodes)")]
    ParentOutOfRange {
        node: usize,
        parent: usize,
        node_count: usize,
    },

    #[error("node {node} is not reachable from the root (cycle or disconnected parse)")]
    Unreachable { node: usize },
}

/// A dependency tree rebuilt as a children-adjacency structure.
///
/// Nodes are numbered 1..=N matching the lexical units; index 0 is the
/// virtual root. The structure is immutable after construction and is
/// validated once: every parent pointer must be in range and every node
/// must be reachable from the root.
#[derive(Debug, Clone)]
pub struct DependencyTree {
    children: Vec<Vec<usize>>,
    node_count: usize,
}

impl DependencyTree {
    /// Build a tree from parent pointers.
    ///
    /// `heads[i]` is the parent id (1..=N, or 0 for the root) of node
    /// `i + 1`. Malformed input is a precondition violation and is
    /// reported as a [`TreeError`] rather than recovered.
    pub fn from_heads(heads: &[usize]) -> Result<Self, TreeError> {
        let node_count = heads.len();
        let mut children = vec![Vec::new(); node_count + 1];

        for (i, &parent) in heads.iter().enumerate() {
            let node = i + 1;
            if parent > node_count {
                return Err(TreeError::ParentOutOfRange {
                    node,
                    parent,
                    node_count,
                });
            }
            children[parent].push(node);
        }

        let tree = Self {
            children,
            node_count,
        };
        tree.check_reachable()?;
        Ok(tree)
    }

    /// Number of lexical nodes (the virtual root is not counted).
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Direct children of a node (0 is the virtual root).
    pub fn children(&self, node: usize) -> &[usize] {
        &self.children[node]
    }

    /// True if the node has no children.
    pub fn is_leaf(&self, node: usize) -> bool {
        self.children[node].is_empty()
    }

    /// Internal nodes in breadth-first visitation order, root first.
    ///
    /// Reversing this list gives a bottom-up processing order where every
    /// internal node appears after all of its internal descendants. The
    /// traversal is bounded by node count, so a malformed structure can
    /// never loop forever.
    pub(crate) fn internal_nodes_top_down(&self) -> Vec<usize> {
        let mut worklist = VecDeque::new();
        worklist.push_back(0);
        let mut order = Vec::new();
        let mut visited = 0usize;

        while let Some(node) = worklist.pop_front() {
            visited += 1;
            if visited > self.node_count + 1 {
                break;
            }
            if !self.is_leaf(node) {
                for &child in self.children(node) {
                    worklist.push_back(child);
                }
                order.push(node);
            }
        }
        order
    }

    /// Verify that every node is reachable from the virtual root.
    fn check_reachable(&self) -> Result<(), TreeError> {
        let mut seen = vec![false; self.node_count + 1];
        let mut worklist = VecDeque::new();
        worklist.push_back(0);
        seen[0] = true;
        let mut reached = 1usize;

        while let Some(node) = worklist.pop_front() {
            for &child in self.children(node) {
                if !seen[child] {
                    seen[child] = true;
                    reached += 1;
                    worklist.push_back(child);
                }
            }
        }

        if reached < self.node_count + 1 {
            let node = seen
                .iter()
                .position(|&s| !s)
                .expect("unreached node must exist");
            return Err(TreeError::Unreachable { node });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_adjacency_from_heads() {
        // Unit 1 hangs off the root; units 2 and 3 are children of unit 1.
        let tree = DependencyTree::from_heads(&[0, 1, 1]).unwrap();
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.children(0), &[1]);
        assert_eq!(tree.children(1), &[2, 3]);
        assert!(tree.is_leaf(2));
        assert!(tree.is_leaf(3));
    }

    #[test]
    fn test_single_node_tree() {
        let tree = DependencyTree::from_heads(&[0]).unwrap();
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.children(0), &[1]);
        assert!(tree.is_leaf(1));
    }

    #[test]
    fn test_parent_out_of_range() {
        let err = DependencyTree::from_heads(&[0, 5]).unwrap_err();
        match err {
            TreeError::ParentOutOfRange { node, parent, .. } => {
                assert_eq!(node, 2);
                assert_eq!(parent, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_cycle_is_rejected() {
        // 1 -> 2 -> 1, neither attached to the root.
        let err = DependencyTree::from_heads(&[2, 1]).unwrap_err();
        match err {
            TreeError::Unreachable { node } => assert!(node == 1 || node == 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_internal_order_is_top_down() {
        // root -> 1 -> {2 -> 4, 3}
        let tree = DependencyTree::from_heads(&[0, 1, 1, 2]).unwrap();
        assert_eq!(tree.internal_nodes_top_down(), vec![0, 1, 2]);
    }
}
