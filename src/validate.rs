use thiserror::Error;

use crate::{NodeIndex, Redwood};

/// A broken structural property, reported by [`Redwood::validate`].
///
/// Nodes are identified by their position in the tree storage at the time of the check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum InvariantViolation {
    /// The root is red.
    #[error("root node {index} is red")]
    RedRoot { index: usize },
    /// A red node has a red child.
    #[error("red node {parent} has red child {child}")]
    RedRedEdge { parent: usize, child: usize },
    /// Two paths below a node cross a different number of black nodes.
    #[error("node {index} has {left} black nodes below on the left and {right} on the right")]
    BlackHeightMismatch {
        index: usize,
        left: usize,
        right: usize,
    },
    /// The in-order sequence decreases.
    #[error("node {index} holds a key smaller than its in-order predecessor")]
    OrderViolation { index: usize },
    /// A child does not point back at its parent.
    #[error("node {child} does not link back to its parent")]
    BrokenParentLink { child: usize },
    /// The cached black-height disagrees with the structure.
    #[error("node {index} caches black-height {cached}, actual black-height is {actual}")]
    StaleBlackHeight {
        index: usize,
        cached: usize,
        actual: usize,
    },
    /// The cached subtree height disagrees with the structure.
    #[error("node {index} caches height {cached}, actual height is {actual}")]
    StaleHeight {
        index: usize,
        cached: usize,
        actual: usize,
    },
    /// Some stored nodes cannot be reached from the root, or some are reachable twice.
    #[error("{reachable} nodes reachable from the root, {stored} stored")]
    NodeCountMismatch { reachable: usize, stored: usize },
}

struct SubtreeSummary {
    black_height: usize,
    height: usize,
}

struct Walk<'a, K> {
    last_key: Option<&'a K>,
    visited: usize,
}

impl<K: Ord> Redwood<K> {
    /// Recomputes every red-black property from scratch, ignoring cached values.
    ///
    /// A well-formed tree always passes; any error is a defect of the tree itself.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let stored = self.len();

        let Some(root) = self.root() else {
            return if stored == 0 {
                Ok(())
            } else {
                Err(InvariantViolation::NodeCountMismatch {
                    reachable: 0,
                    stored,
                })
            };
        };

        if !self.node(root).is_black() {
            return Err(InvariantViolation::RedRoot { index: root.0 });
        }

        let mut walk = Walk {
            last_key: None,
            visited: 0,
        };
        self.check_subtree(root, None, &mut walk)?;

        if walk.visited != stored {
            return Err(InvariantViolation::NodeCountMismatch {
                reachable: walk.visited,
                stored,
            });
        }

        Ok(())
    }

    fn check_subtree<'a>(
        &'a self,
        idx: NodeIndex,
        parent: Option<NodeIndex>,
        walk: &mut Walk<'a, K>,
    ) -> Result<SubtreeSummary, InvariantViolation> {
        let node = self.node(idx);

        if node.parent != parent {
            return Err(InvariantViolation::BrokenParentLink { child: idx.0 });
        }

        walk.visited += 1;
        if walk.visited > self.len() {
            return Err(InvariantViolation::NodeCountMismatch {
                reachable: walk.visited,
                stored: self.len(),
            });
        }

        let mut below = [0usize; 2];
        let mut heights = [0usize; 2];

        for (slot, child) in [node.left, node.right].into_iter().enumerate() {
            if slot == 1 {
                if walk.last_key.is_some_and(|last| node.key < *last) {
                    return Err(InvariantViolation::OrderViolation { index: idx.0 });
                }
                walk.last_key = Some(&node.key);
            }

            let Some(child) = child else {
                continue;
            };
            let child_node = self.node(child);

            if !node.is_black() && !child_node.is_black() {
                return Err(InvariantViolation::RedRedEdge {
                    parent: idx.0,
                    child: child.0,
                });
            }

            let summary = self.check_subtree(child, Some(idx), walk)?;
            below[slot] = summary.black_height + usize::from(child_node.is_black());
            heights[slot] = summary.height;
        }

        if below[0] != below[1] {
            return Err(InvariantViolation::BlackHeightMismatch {
                index: idx.0,
                left: below[0],
                right: below[1],
            });
        }

        let summary = SubtreeSummary {
            black_height: below[0],
            height: 1 + heights[0].max(heights[1]),
        };

        if node.black_height != summary.black_height {
            return Err(InvariantViolation::StaleBlackHeight {
                index: idx.0,
                cached: node.black_height,
                actual: summary.black_height,
            });
        }
        if node.height != summary.height {
            return Err(InvariantViolation::StaleHeight {
                index: idx.0,
                cached: node.height,
                actual: summary.height,
            });
        }

        Ok(summary)
    }
}
