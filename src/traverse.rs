use alloc::collections::VecDeque;
use alloc::vec::Vec;

use crate::{Direction, NodeColor, NodeIndex, Redwood};

/// Visiting order of a [`Traversal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Left subtree, node, right subtree.
    InOrder,
    /// Node, left subtree, right subtree.
    PreOrder,
    /// Left subtree, right subtree, node.
    PostOrder,
    /// Breadth first, left to right within a depth.
    LevelOrder,
}

/// Read-only snapshot of a node, as yielded by [`Redwood::traverse`].
#[derive(Debug, PartialEq, Eq)]
pub struct NodeView<'a, K> {
    pub key: &'a K,
    pub color: NodeColor,
    /// Distance from the root, the root being at depth `0`.
    pub depth: usize,
    pub black_height: usize,
    pub height: usize,
    /// Which child of its parent this node is, `None` for the root.
    pub side: Option<Direction>,
}

impl<K> Clone for NodeView<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for NodeView<'_, K> {}

enum TraversalState {
    InOrder {
        curr: Option<(NodeIndex, usize)>,
        stack: Vec<(NodeIndex, usize)>,
    },
    PreOrder {
        stack: Vec<(NodeIndex, usize)>,
    },
    // the flag marks nodes whose children were already pushed
    PostOrder {
        stack: Vec<(NodeIndex, usize, bool)>,
    },
    LevelOrder {
        queue: VecDeque<(NodeIndex, usize)>,
    },
}

/// Lazy walk visiting every node of a tree exactly once, created by [`Redwood::traverse`].
pub struct Traversal<'a, K: Ord> {
    tree: &'a Redwood<K>,
    state: TraversalState,
}

impl<'a, K: Ord> Traversal<'a, K> {
    fn new(tree: &'a Redwood<K>, order: Order) -> Self {
        let root = tree.root().map(|idx| (idx, 0));

        let state = match order {
            Order::InOrder => TraversalState::InOrder {
                curr: root,
                stack: Vec::with_capacity(tree.height()),
            },
            Order::PreOrder => TraversalState::PreOrder {
                stack: root.into_iter().collect(),
            },
            Order::PostOrder => TraversalState::PostOrder {
                stack: root.map(|(idx, depth)| (idx, depth, false)).into_iter().collect(),
            },
            Order::LevelOrder => TraversalState::LevelOrder {
                queue: root.into_iter().collect(),
            },
        };

        Self { tree, state }
    }

    fn view(&self, idx: NodeIndex, depth: usize) -> NodeView<'a, K> {
        let tree = self.tree;
        let node = tree.node(idx);

        NodeView {
            key: &node.key,
            color: node.color,
            depth,
            black_height: node.black_height,
            height: node.height,
            side: tree.side_of(idx),
        }
    }
}

impl<'a, K: Ord> Iterator for Traversal<'a, K> {
    type Item = NodeView<'a, K>;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;

        let (idx, depth) = match &mut self.state {
            TraversalState::InOrder { curr, stack } => {
                while let Some((idx, depth)) = *curr {
                    stack.push((idx, depth));
                    *curr = tree.node(idx).left.map(|left| (left, depth + 1));
                }

                let (idx, depth) = stack.pop()?;
                *curr = tree.node(idx).right.map(|right| (right, depth + 1));

                (idx, depth)
            }
            TraversalState::PreOrder { stack } => {
                let (idx, depth) = stack.pop()?;
                let node = tree.node(idx);

                stack.extend(node.right.map(|right| (right, depth + 1)));
                stack.extend(node.left.map(|left| (left, depth + 1)));

                (idx, depth)
            }
            TraversalState::PostOrder { stack } => loop {
                let (idx, depth, expanded) = stack.pop()?;
                if expanded {
                    break (idx, depth);
                }

                let node = tree.node(idx);
                stack.push((idx, depth, true));
                stack.extend(node.right.map(|right| (right, depth + 1, false)));
                stack.extend(node.left.map(|left| (left, depth + 1, false)));
            },
            TraversalState::LevelOrder { queue } => {
                let (idx, depth) = queue.pop_front()?;
                let node = tree.node(idx);

                queue.extend(node.left.map(|left| (left, depth + 1)));
                queue.extend(node.right.map(|right| (right, depth + 1)));

                (idx, depth)
            }
        };

        Some(self.view(idx, depth))
    }
}

impl<K: Ord> Redwood<K> {
    /// Walks every node once in the requested `order`.
    pub fn traverse(&self, order: Order) -> Traversal<'_, K> {
        Traversal::new(self, order)
    }

    /// Depth-annotated structural dump: every node in pre-order with its color and black-height.
    pub fn structure(&self) -> Traversal<'_, K> {
        self.traverse(Order::PreOrder)
    }

    /// Keys found at `depth`, from left to right.
    ///
    /// Depths are 0-based, as in [`NodeView::depth`]: the root is at depth `0`, so a 1-based level `n`
    /// is `nodes_at_depth(n - 1)`.
    pub fn nodes_at_depth(&self, depth: usize) -> Vec<&K> {
        self.traverse(Order::LevelOrder)
            .skip_while(|view| view.depth < depth)
            .take_while(|view| view.depth == depth)
            .map(|view| view.key)
            .collect()
    }

    /// Keys grouped by depth, shallowest first.
    pub fn levels(&self) -> Vec<Vec<&K>> {
        let mut levels: Vec<Vec<&K>> = Vec::with_capacity(self.height());

        for view in self.traverse(Order::LevelOrder) {
            if levels.len() <= view.depth {
                levels.push(Vec::new());
            }
            levels[view.depth].push(view.key);
        }

        levels
    }
}
