//! Leaf set derivation.
//!
//! The leaf set of a node drives the attention mask: a character attends
//! to every character belonging to a leaf of its governing unit's subtree.

use super::DependencyTree;

/// Compute the leaf set of every lexical node.
///
/// Convention: the leaf set of node n is `leaves(subtree(n)) ∪ {n}`.
/// Aggregation runs in two phases so that the result is well defined
/// regardless of processing order: a bottom-up pass unions pure leaf sets
/// (a leaf's set is `{self}`), then internal nodes have their own id
/// added. Sets come back sorted and deduplicated, indexed by
/// `node_id - 1`; the virtual root's set is discarded.
pub fn leaf_sets(tree: &DependencyTree) -> Vec<Vec<usize>> {
    let n = tree.node_count();
    let mut sets: Vec<Vec<usize>> = vec![Vec::new(); n + 1];

    for node in 1..=n {
        if tree.is_leaf(node) {
            sets[node].push(node);
        }
    }

    let mut internal = tree.internal_nodes_top_down();
    internal.reverse();
    for &node in &internal {
        let mut merged = Vec::new();
        for &child in tree.children(node) {
            merged.extend_from_slice(&sets[child]);
        }
        sets[node] = merged;
    }

    // Self-inclusion happens after all aggregation so ancestors only ever
    // pull true leaves from their descendants.
    for &node in &internal {
        if node > 0 {
            sets[node].push(node);
        }
    }

    for set in &mut sets {
        set.sort_unstable();
        set.dedup();
    }

    sets.split_off(1)
}
