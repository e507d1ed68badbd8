extern crate alloc;

use core::cmp::Ordering;

use alloc::vec::Vec;
use log::{debug, trace};

mod iter;
mod traverse;
mod validate;

pub use iter::RedwoodSortedIterator;
pub use traverse::{NodeView, Order, Traversal};
pub use validate::InvariantViolation;

/*
nodes are stored densely in one vector. removing a node swaps the last node of the vector into the freed
slot and rewrites the (at most three) links pointing at it, so indices are only stable between two mutations.

black-height and subtree height are cached in every node. a node's cached values only depend on its children,
so they are recomputed for both nodes of a rotation, then along the ancestor path once a mutation is done.
*/

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NodeColor {
    #[default]
    Red,
    Black,
}

/// One hop of a descent from the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeIndex(pub(crate) usize);

#[derive(Debug, Clone)]
pub(crate) struct RedwoodNode<K> {
    pub(crate) key: K,
    pub(crate) color: NodeColor,
    pub(crate) parent: Option<NodeIndex>,
    pub(crate) left: Option<NodeIndex>,
    pub(crate) right: Option<NodeIndex>,
    pub(crate) black_height: usize,
    pub(crate) height: usize,
}

impl<K> RedwoodNode<K> {
    fn new_isolated(key: K, parent: Option<NodeIndex>) -> Self {
        Self {
            key,
            color: NodeColor::default(),
            parent,
            left: None,
            right: None,
            black_height: 0,
            height: 1,
        }
    }

    pub(crate) fn child(&self, direction: Direction) -> Option<NodeIndex> {
        match direction {
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    fn set_child(&mut self, direction: Direction, child: Option<NodeIndex>) {
        match direction {
            Direction::Left => self.left = child,
            Direction::Right => self.right = child,
        }
    }

    pub(crate) fn is_black(&self) -> bool {
        matches!(self.color, NodeColor::Black)
    }
}

/// An ordered multiset backed by a red-black tree.
///
/// Equal keys are kept: a key equal to an existing one is inserted to its right, and removal takes out one
/// occurrence at a time.
#[derive(Debug, Clone)]
pub struct Redwood<K: Ord> {
    storage: Vec<RedwoodNode<K>>,
    root: Option<NodeIndex>,
}

impl<K: Ord> Redwood<K> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            storage: Vec::new(),
            root: None,
        }
    }

    /// Creates an empty tree able to hold `capacity` keys without reallocating.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: Vec::with_capacity(capacity),
            root: None,
        }
    }

    pub fn reserve(&mut self, additional: usize) {
        self.storage.reserve(additional);
    }

    pub fn shrink_to_fit(&mut self) {
        self.storage.shrink_to_fit();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn clear(&mut self) {
        self.storage.clear();
        self.root = None;
    }

    /// Returns `true` if at least one key equal to `key` is stored.
    pub fn contains(&self, key: &K) -> bool {
        self.find_node(key).is_some()
    }

    /// Number of nodes on the longest path from the root to a leaf, `0` for an empty tree.
    #[must_use]
    pub fn height(&self) -> usize {
        self.root.map_or(0, |root| self.node(root).height)
    }

    /// Number of black nodes below the root on any path down to a nil leaf.
    #[must_use]
    pub fn black_height(&self) -> usize {
        self.root.map_or(0, |root| self.node(root).black_height)
    }

    #[must_use]
    pub fn first(&self) -> Option<&K> {
        self.root.map(|root| &self.node(self.extreme(root, Direction::Left)).key)
    }

    #[must_use]
    pub fn last(&self) -> Option<&K> {
        self.root.map(|root| &self.node(self.extreme(root, Direction::Right)).key)
    }

    /// Replays the descent of [`Redwood::contains`] and records every hop taken.
    ///
    /// The walk stops on the first node equal to `key`, or after stepping into a missing child. An absent
    /// key therefore yields the path to the empty slot where it would be attached.
    pub fn path_to(&self, key: &K) -> Vec<Direction> {
        let mut path = Vec::new();
        let mut current_node = self.root;

        while let Some(idx) = current_node {
            let curr_node_storage = self.node(idx);

            let direction = match key.cmp(&curr_node_storage.key) {
                Ordering::Less => Direction::Left,
                Ordering::Equal => break,
                Ordering::Greater => Direction::Right,
            };

            path.push(direction);
            current_node = curr_node_storage.child(direction);
        }

        path
    }

    /// Returns every key in ascending order, duplicates included.
    pub fn export_sorted(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.iter().cloned().collect()
    }

    pub fn iter(&self) -> RedwoodSortedIterator<'_, K> {
        RedwoodSortedIterator {
            tree: self,
            curr: self.root,
            stack: Vec::with_capacity(self.height()),
            remaining: self.len(),
        }
    }

    pub fn insert(&mut self, key: K) {
        let mut current_node = self.root;
        let mut parent_node = None;
        let mut side = Direction::Left;

        while let Some(idx) = current_node {
            parent_node = Some(idx);
            let curr_node_storage = self.node(idx);

            side = if key < curr_node_storage.key {
                Direction::Left
            } else {
                Direction::Right
            };
            current_node = curr_node_storage.child(side);
        }

        let new_node_pos = NodeIndex(self.storage.len());
        self.storage.push(RedwoodNode::new_isolated(key, parent_node));

        match parent_node {
            None => {
                debug!("node {} becomes the root of an empty tree", new_node_pos.0);
                self.root = Some(new_node_pos);
                self.node_mut(new_node_pos).color = NodeColor::Black;
            }
            Some(parent_idx) => {
                self.node_mut(parent_idx).set_child(side, Some(new_node_pos));
                self.fix_red_violation(new_node_pos);
                self.refresh_upwards(Some(parent_idx));
            }
        }
    }

    /// Removes one occurrence of `key`. Returns `false` if the key is absent, leaving the tree untouched.
    pub fn remove(&mut self, key: &K) -> bool {
        self.take(key).is_some()
    }

    /// Removes one occurrence of `key` and hands the stored key back.
    pub fn take(&mut self, key: &K) -> Option<K> {
        let target = self.find_node(key)?;

        Some(self.remove_node(target))
    }

    pub(crate) fn node(&self, idx: NodeIndex) -> &RedwoodNode<K> {
        &self.storage[idx.0]
    }

    fn node_mut(&mut self, idx: NodeIndex) -> &mut RedwoodNode<K> {
        &mut self.storage[idx.0]
    }

    pub(crate) fn root(&self) -> Option<NodeIndex> {
        self.root
    }

    pub(crate) fn side_of(&self, idx: NodeIndex) -> Option<Direction> {
        let parent = self.node(idx).parent?;

        if self.node(parent).left == Some(idx) {
            Some(Direction::Left)
        } else {
            Some(Direction::Right)
        }
    }

    fn is_red(&self, idx: Option<NodeIndex>) -> bool {
        idx.is_some_and(|idx| !self.node(idx).is_black())
    }

    fn set_color(&mut self, idx: Option<NodeIndex>, color: NodeColor) {
        if let Some(idx) = idx {
            self.node_mut(idx).color = color;
        }
    }

    fn find_node(&self, key: &K) -> Option<NodeIndex> {
        let mut current_node = self.root;

        while let Some(idx) = current_node {
            let curr_node_storage = self.node(idx);

            match key.cmp(&curr_node_storage.key) {
                Ordering::Less => {
                    current_node = curr_node_storage.left;
                }
                Ordering::Equal => {
                    return Some(idx);
                }
                Ordering::Greater => {
                    current_node = curr_node_storage.right;
                }
            }
        }

        None
    }

    fn extreme(&self, mut idx: NodeIndex, direction: Direction) -> NodeIndex {
        while let Some(next) = self.node(idx).child(direction) {
            idx = next;
        }

        idx
    }

    fn fix_red_violation(&mut self, start_node_idx: NodeIndex) {
        let mut curr_node = start_node_idx;

        while let Some(parent_idx) = self.node(curr_node).parent.filter(|&p| self.is_red(Some(p))) {
            // a red parent is never the root once the root has been painted black
            let Some(grandparent_idx) = self.node(parent_idx).parent else {
                break;
            };

            let parent_side = if self.node(grandparent_idx).left == Some(parent_idx) {
                Direction::Left
            } else {
                Direction::Right
            };
            let uncle = self.node(grandparent_idx).child(parent_side.opposite());

            if self.is_red(uncle) {
                trace!("insert fixup: red uncle, recoloring around node {}", grandparent_idx.0);
                self.node_mut(parent_idx).color = NodeColor::Black;
                self.set_color(uncle, NodeColor::Black);
                self.node_mut(grandparent_idx).color = NodeColor::Red;

                curr_node = grandparent_idx;
                continue;
            }

            if self.node(parent_idx).child(parent_side.opposite()) == Some(curr_node) {
                trace!("insert fixup: straightening zigzag at node {}", parent_idx.0);
                self.rotate(parent_idx, parent_side);

                curr_node = parent_idx;
                continue;
            }

            trace!("insert fixup: black uncle, rotating node {}", grandparent_idx.0);
            self.node_mut(parent_idx).color = NodeColor::Black;
            self.node_mut(grandparent_idx).color = NodeColor::Red;
            self.rotate(grandparent_idx, parent_side.opposite());
        }

        self.set_color(self.root, NodeColor::Black);
    }

    fn remove_node(&mut self, target: NodeIndex) -> K {
        let target_node = self.node(target);
        let (left, right) = (target_node.left, target_node.right);

        // `child` takes the place of the node leaving the tree, `child_parent` is its parent afterwards and
        // `child_side` the slot it occupies there. `child` may be nil, hence the explicit parent and side.
        let (removed_color, child, child_parent, child_side) = match (left, right) {
            (None, _) | (_, None) => {
                let child = left.or(right);
                let removed_color = target_node.color;
                let parent = target_node.parent;
                let side = self.side_of(target).unwrap_or(Direction::Left);

                self.transplant(target, child);
                if parent.is_none() {
                    debug!("root node {} removed", target.0);
                }

                (removed_color, child, parent, side)
            }
            (Some(left), Some(right)) => {
                let successor = self.extreme(right, Direction::Left);
                let removed_color = self.node(successor).color;
                let child = self.node(successor).right;

                trace!("splicing successor {} into the slot of node {}", successor.0, target.0);

                let (child_parent, child_side) = if successor == right {
                    (successor, Direction::Right)
                } else {
                    let successor_parent = self.node(successor).parent.unwrap_or(right);

                    self.transplant(successor, child);
                    self.node_mut(successor).right = Some(right);
                    self.node_mut(right).parent = Some(successor);

                    (successor_parent, Direction::Left)
                };

                self.transplant(target, Some(successor));
                self.node_mut(successor).left = Some(left);
                self.node_mut(left).parent = Some(successor);
                let target_color = self.node(target).color;
                self.node_mut(successor).color = target_color;

                (removed_color, child, Some(child_parent), child_side)
            }
        };

        if matches!(removed_color, NodeColor::Black) {
            self.fix_double_black(child, child_parent, child_side);
        }
        self.refresh_upwards(child_parent);

        if self.root.is_none() {
            debug!("tree is now empty");
        }

        self.release(target)
    }

    fn fix_double_black(
        &mut self,
        mut curr_node: Option<NodeIndex>,
        mut parent_node: Option<NodeIndex>,
        mut side: Direction,
    ) {
        while curr_node != self.root && !self.is_red(curr_node) {
            let Some(parent_idx) = parent_node else {
                break;
            };

            let mut sibling = self.node(parent_idx).child(side.opposite());

            if self.is_red(sibling) {
                trace!("delete fixup: red sibling under node {}", parent_idx.0);
                self.set_color(sibling, NodeColor::Black);
                self.node_mut(parent_idx).color = NodeColor::Red;
                self.rotate(parent_idx, side);

                sibling = self.node(parent_idx).child(side.opposite());
            }

            let Some(sibling_idx) = sibling else {
                curr_node = Some(parent_idx);
                parent_node = self.node(parent_idx).parent;
                side = self.side_of(parent_idx).unwrap_or(side);
                continue;
            };

            let near = self.node(sibling_idx).child(side);
            let far = self.node(sibling_idx).child(side.opposite());

            if !self.is_red(near) && !self.is_red(far) {
                trace!("delete fixup: black nephews, moving up from node {}", parent_idx.0);
                self.node_mut(sibling_idx).color = NodeColor::Red;

                curr_node = Some(parent_idx);
                parent_node = self.node(parent_idx).parent;
                side = self.side_of(parent_idx).unwrap_or(side);
                continue;
            }

            let sibling_idx = match (self.is_red(far), near) {
                (false, Some(near_idx)) => {
                    trace!("delete fixup: red near nephew, rotating node {}", sibling_idx.0);
                    self.node_mut(near_idx).color = NodeColor::Black;
                    self.node_mut(sibling_idx).color = NodeColor::Red;
                    self.rotate(sibling_idx, side.opposite());

                    near_idx
                }
                _ => sibling_idx,
            };

            trace!("delete fixup: red far nephew, rotating node {}", parent_idx.0);
            let parent_color = self.node(parent_idx).color;
            self.node_mut(sibling_idx).color = parent_color;
            self.node_mut(parent_idx).color = NodeColor::Black;
            let far = self.node(sibling_idx).child(side.opposite());
            self.set_color(far, NodeColor::Black);
            self.rotate(parent_idx, side);

            curr_node = self.root;
        }

        self.set_color(curr_node, NodeColor::Black);
    }

    /// Moves `center` one level down towards `direction`, its child on the other side taking its place.
    fn rotate(&mut self, center: NodeIndex, direction: Direction) {
        let pivot = self.node(center).child(direction.opposite());
        debug_assert!(
            pivot.is_some(),
            "rotation around node {} without a pivot child",
            center.0
        );
        let Some(sibling_idx) = pivot else {
            return;
        };
        trace!("rotating {:?} around node {}", direction, center.0);

        let grandparent_idx = self.node(center).parent;
        let c_idx = self.node(sibling_idx).child(direction);

        self.node_mut(center).set_child(direction.opposite(), c_idx);
        if let Some(c_idx) = c_idx {
            self.node_mut(c_idx).parent = Some(center);
        }

        self.node_mut(sibling_idx).set_child(direction, Some(center));
        self.node_mut(center).parent = Some(sibling_idx);
        self.node_mut(sibling_idx).parent = grandparent_idx;

        self.replace_child(grandparent_idx, center, Some(sibling_idx));

        self.refresh(center);
        self.refresh(sibling_idx);
    }

    /// Points the link of `parent` that currently references `old` at `new` instead, or the root when there
    /// is no parent.
    fn replace_child(&mut self, parent: Option<NodeIndex>, old: NodeIndex, new: Option<NodeIndex>) {
        match parent {
            None => self.root = new,
            Some(parent_idx) => {
                let parent_node = self.node_mut(parent_idx);

                if parent_node.left == Some(old) {
                    parent_node.left = new;
                } else {
                    parent_node.right = new;
                }
            }
        }
    }

    fn transplant(&mut self, old: NodeIndex, new: Option<NodeIndex>) {
        let parent = self.node(old).parent;

        self.replace_child(parent, old, new);
        if let Some(new_idx) = new {
            self.node_mut(new_idx).parent = parent;
        }
    }

    fn black_contribution(&self, child: Option<NodeIndex>) -> usize {
        child.map_or(0, |idx| {
            let node = self.node(idx);
            node.black_height + usize::from(node.is_black())
        })
    }

    fn subtree_height(&self, child: Option<NodeIndex>) -> usize {
        child.map_or(0, |idx| self.node(idx).height)
    }

    fn refresh(&mut self, idx: NodeIndex) {
        let node = self.node(idx);
        let (left, right) = (node.left, node.right);

        let black_height = self
            .black_contribution(left)
            .max(self.black_contribution(right));
        let height = 1 + self.subtree_height(left).max(self.subtree_height(right));

        let node = self.node_mut(idx);
        node.black_height = black_height;
        node.height = height;
    }

    fn refresh_upwards(&mut self, start: Option<NodeIndex>) {
        let mut current_node = start;

        while let Some(idx) = current_node {
            self.refresh(idx);
            current_node = self.node(idx).parent;
        }
    }

    /// Drops an unlinked node from the storage, moving the last stored node into its slot.
    fn release(&mut self, idx: NodeIndex) -> K {
        let last = NodeIndex(self.storage.len() - 1);

        if idx != last {
            let moved = self.node(last);
            let (parent, left, right) = (moved.parent, moved.left, moved.right);

            self.replace_child(parent, last, Some(idx));
            for child in [left, right].into_iter().flatten() {
                self.node_mut(child).parent = Some(idx);
            }
        }

        self.storage.swap_remove(idx.0).key
    }
}

impl<K: Ord> Default for Redwood<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord> PartialEq for Redwood<K> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Ord> Eq for Redwood<K> {}

impl<K: Ord> FromIterator<K> for Redwood<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Redwood::new();
        tree.extend(iter);

        tree
    }
}

impl<K: Ord> Extend<K> for Redwood<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);

        for key in iter {
            self.insert(key);
        }
    }
}

#[cfg(test)]
pub(crate) fn init_test_logging() {
    use simplelog::{Config, LevelFilter, TestLogger};

    let _ = TestLogger::init(LevelFilter::Debug, Config::default());
}
