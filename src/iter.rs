use core::iter::FusedIterator;

use alloc::vec::Vec;

use crate::{NodeIndex, Redwood};

/// Ascending iterator over the keys of a [`Redwood`], created by [`Redwood::iter`].
pub struct RedwoodSortedIterator<'a, K: Ord> {
    pub(crate) tree: &'a Redwood<K>,
    pub(crate) curr: Option<NodeIndex>,
    pub(crate) stack: Vec<NodeIndex>,
    pub(crate) remaining: usize,
}

impl<'a, K: Ord> Iterator for RedwoodSortedIterator<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(curr) = self.curr {
            self.stack.push(curr);
            self.curr = self.tree.node(curr).left;
        }

        let node = self.tree.node(self.stack.pop()?);
        self.curr = node.right;
        self.remaining -= 1;

        Some(&node.key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K: Ord> ExactSizeIterator for RedwoodSortedIterator<'_, K> {}

impl<K: Ord> FusedIterator for RedwoodSortedIterator<'_, K> {}

impl<'a, K: Ord> IntoIterator for &'a Redwood<K> {
    type Item = &'a K;
    type IntoIter = RedwoodSortedIterator<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
