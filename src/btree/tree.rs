//! B-tree core implementation.
//!
//! This module provides the main BTree struct with operations for:
//! - search: Point lookups
//! - insert: Ordered insertion with root growth
//! - remove: Deletion with rebalancing and root collapse
//! - traverse: In-order iteration

use super::cursor::Iter;
use super::node::{Checker, Node};
use crate::error::{BTreeError, Result};
use crate::types::{BTreeConfig, Rebalance};
use crate::{TreeNode, TreeStats};
use std::fmt;
use tracing::{debug, trace};

/// An in-memory B-tree holding a set of ordered keys
#[derive(Clone)]
pub struct BTree<T> {
    /// Root node (an empty leaf when the tree is empty)
    root: Box<Node<T>>,
    /// Node capacity shared by every node of this tree
    config: BTreeConfig,
    /// Number of keys stored
    len: usize,
}

/// Position of a key found by [`BTree::search`]
#[derive(Debug)]
pub struct SearchHit<'a, T> {
    node: &'a Node<T>,
    index: usize,
}

impl<'a, T> SearchHit<'a, T> {
    /// Node holding the key
    pub fn node(&self) -> &'a Node<T> {
        self.node
    }

    /// Index of the key within its node
    pub fn index(&self) -> usize {
        self.index
    }

    /// The key itself
    pub fn key(&self) -> &'a T {
        &self.node.keys()[self.index]
    }
}

impl<T> BTree<T> {
    /// Create an empty tree with the default key capacity
    pub fn new() -> Self {
        let config = BTreeConfig::default();
        Self {
            root: Box::new(Node::new(config.key_capacity)),
            config,
            len: 0,
        }
    }

    /// Create an empty tree whose nodes hold at most `key_capacity` keys
    pub fn with_capacity(key_capacity: usize) -> Result<Self> {
        Self::with_config(BTreeConfig::new(key_capacity)?)
    }

    /// Create an empty tree from a configuration
    pub fn with_config(config: BTreeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            root: Box::new(Node::new(config.key_capacity)),
            config,
            len: 0,
        })
    }

    /// Get the tree configuration
    pub fn config(&self) -> BTreeConfig {
        self.config
    }

    /// Maximum number of keys per node
    pub fn key_capacity(&self) -> usize {
        self.config.key_capacity
    }

    /// Whether the tree holds no keys
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Number of keys in the tree
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of levels (1 for a lone root, including an empty one)
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut node = self.root.as_ref();
        while let Some(child) = node.child(0) {
            node = child;
            height += 1;
        }
        height
    }

    /// The root node
    pub fn root(&self) -> &Node<T> {
        &self.root
    }

    /// Keys held by the root node
    pub fn root_keys(&self) -> Result<&[T]> {
        if self.is_empty() {
            return Err(BTreeError::EmptyTree);
        }
        Ok(self.root.keys())
    }

    /// Number of keys held by the root node (0 for an empty tree)
    pub fn root_count(&self) -> usize {
        self.root.len()
    }

    /// Iterate over all keys in ascending order
    pub fn traverse(&self) -> Iter<'_, T> {
        Iter::new(&self.root, self.len)
    }

    /// Smallest key in the tree
    pub fn first(&self) -> Option<&T> {
        self.root.min_key()
    }

    /// Largest key in the tree
    pub fn last(&self) -> Option<&T> {
        self.root.max_key()
    }

    /// Remove every key, keeping the configuration
    pub fn clear(&mut self) {
        self.root = Box::new(Node::new(self.config.key_capacity));
        self.len = 0;
    }

    /// Get statistics about the tree shape
    pub fn stats(&self) -> TreeStats {
        TreeStats {
            len: self.len,
            height: self.height(),
            node_count: self.root.node_count(),
            key_capacity: self.config.key_capacity,
        }
    }
}

impl<T: Ord> BTree<T> {
    /// Look up a key, returning the node and position holding it
    ///
    /// Fails with [`BTreeError::EmptyTree`] on an empty tree; an absent key
    /// yields `Ok(None)`.
    pub fn search(&self, key: &T) -> Result<Option<SearchHit<'_, T>>> {
        if self.is_empty() {
            return Err(BTreeError::EmptyTree);
        }
        Ok(self
            .root
            .search(key)
            .map(|(node, index)| SearchHit { node, index }))
    }

    /// Check if a key exists (false for an empty tree)
    pub fn contains(&self, key: &T) -> bool {
        self.root.search(key).is_some()
    }

    /// Insert a key
    ///
    /// Returns false, leaving the tree unchanged, if the key is already
    /// present.
    pub fn insert(&mut self, key: T) -> bool {
        let inserted = match self.config.rebalance() {
            Rebalance::TopDown => self.insert_top_down(key),
            Rebalance::BottomUp => self.insert_bottom_up(key),
        };
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Grow a full root before inserting, then split full nodes on the way
    /// down. Duplicates are rejected before any split.
    fn insert_top_down(&mut self, key: T) -> bool {
        if self.root.search(&key).is_some() {
            return false;
        }
        if self.root.is_full() {
            self.grow_root();
        }
        self.root.insert_non_full(key);
        true
    }

    /// Insert into a leaf, splitting overflowing nodes on the way back up
    fn insert_bottom_up(&mut self, key: T) -> bool {
        if !self.root.insert(key) {
            return false;
        }
        if self.root.is_overfull() {
            self.grow_root();
        }
        true
    }

    fn grow_root(&mut self) {
        let old_root = std::mem::replace(
            &mut self.root,
            Box::new(Node::new(self.config.key_capacity)),
        );
        self.root = Box::new(Node::grow(old_root));
        debug!(height = self.height(), len = self.len, "root split");
    }

    /// Remove a key
    ///
    /// Returns true if the key was found and removed. Fails with
    /// [`BTreeError::EmptyTree`] on an empty tree.
    ///
    /// With an odd capacity the search path is rebalanced on the way down,
    /// so removing an absent key may still reshape the tree; its keys stay
    /// the same.
    pub fn remove(&mut self, key: &T) -> Result<bool> {
        if self.is_empty() {
            return Err(BTreeError::EmptyTree);
        }

        let removed = self.root.remove(key).is_some();
        if removed {
            self.len -= 1;
        } else {
            trace!(len = self.len, "remove: key not found");
        }

        if let Some(child) = self.root.take_only_child() {
            self.root = child;
            debug!(height = self.height(), len = self.len, "root collapsed");
        }
        Ok(removed)
    }

    /// Verify every structural invariant of the tree
    ///
    /// Checks key order and separator bounds, node occupancy, child counts,
    /// equal leaf depth, and the stored key count.
    pub fn validate(&self) -> Result<()> {
        let mut checker = Checker::new(self.config.key_capacity);
        self.root.validate(&mut checker)?;
        if checker.keys_seen != self.len {
            return Err(BTreeError::corruption(format!(
                "tree reports {} keys but holds {}",
                self.len, checker.keys_seen
            )));
        }
        Ok(())
    }
}

impl<T: fmt::Display> BTree<T> {
    /// Export the tree structure for visualization
    pub fn export(&self) -> TreeNode {
        export_node(&self.root)
    }
}

fn export_node<T: fmt::Display>(node: &Node<T>) -> TreeNode {
    TreeNode {
        is_leaf: node.is_leaf(),
        keys: node.keys().iter().map(|key| key.to_string()).collect(),
        children: node.children().map(export_node).collect(),
    }
}

impl<T> Default for BTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for BTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.traverse()).finish()
    }
}

impl<T: Ord> Extend<T> for BTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, T> IntoIterator for &'a BTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.traverse()
    }
}
