//! In-order iteration over a B-tree.
//!
//! The iterator keeps a stack of (node, key_index) pairs representing the
//! path from the root to the current position. Each pair's index is the
//! next key of that node still to be yielded.

use super::node::Node;
use std::iter::FusedIterator;

/// Iterator over the keys of a [`BTree`](super::BTree) in ascending order
pub struct Iter<'a, T> {
    /// Path from the root to the next key
    stack: Vec<(&'a Node<T>, usize)>,
    /// Keys not yet yielded
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    /// Create an iterator positioned at the smallest key under `root`
    pub(crate) fn new(root: &'a Node<T>, len: usize) -> Self {
        let mut iter = Self {
            stack: Vec::new(),
            remaining: len,
        };
        if !root.is_empty() {
            iter.descend_to_leftmost(root);
        }
        iter
    }

    /// Push the path down the leftmost edge starting at `node`
    fn descend_to_leftmost(&mut self, node: &'a Node<T>) {
        let mut current = node;
        loop {
            self.stack.push((current, 0));
            match current.child(0) {
                Some(child) => current = child,
                None => return,
            }
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(top) = self.stack.last_mut() {
            let node = top.0;
            let index = top.1;

            if index < node.len() {
                top.1 += 1;
                // The subtree right of this key comes before the next key
                if let Some(child) = node.child(index + 1) {
                    self.descend_to_leftmost(child);
                }
                self.remaining = self.remaining.saturating_sub(1);
                return Some(&node.keys()[index]);
            }

            self.stack.pop();
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::btree::BTree;

    #[test]
    fn test_iter_empty() {
        let tree: BTree<u32> = BTree::new();
        let mut iter = tree.traverse();
        assert_eq!(iter.len(), 0);
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_iter_sorted_across_levels() {
        let mut tree = BTree::with_capacity(2).unwrap();
        for key in (0..200u32).rev() {
            tree.insert(key);
        }
        assert!(tree.height() > 3);

        let keys: Vec<u32> = tree.traverse().copied().collect();
        assert_eq!(keys, (0..200).collect::<Vec<_>>());
    }

    #[test]
    fn test_iter_exact_size() {
        let mut tree = BTree::new();
        tree.extend(1..=10);

        let mut iter = tree.traverse();
        assert_eq!(iter.len(), 10);
        iter.next();
        iter.next();
        assert_eq!(iter.len(), 8);
        assert_eq!(iter.count(), 8);
    }

    #[test]
    fn test_iter_restartable() {
        let mut tree = BTree::new();
        tree.extend(["pear", "apple", "fig"]);

        let first: Vec<_> = tree.traverse().collect();
        let second: Vec<_> = (&tree).into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(first, vec![&"apple", &"fig", &"pear"]);

        let iter = tree.traverse();
        let cloned = iter.clone();
        assert!(iter.eq(cloned));
    }
}
