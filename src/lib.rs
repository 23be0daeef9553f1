//! # In-memory B-tree
//!
//! An ordered set backed by a B-tree whose nodes hold a configurable number
//! of keys (2 to 1000, default 3).
//!
//! ## Architecture
//!
//! - **B-Tree Layer** (`btree`): nodes, split/borrow/merge, traversal
//! - **Types** (`types`): configuration and capacity limits
//! - **Scripts** (`script`): `<action> <key>` command files applied to a tree
//! - **Demo** (`demo`): a scripted walkthrough of the API
//! - [`SharedBTree`]: a cloneable, lock-protected handle for multi-threaded use
//!
//! ## Usage
//!
//! ```rust
//! use btree_memory::BTree;
//!
//! let mut tree = BTree::with_capacity(3)?;
//! for key in [1, 3, 2, 6, 4, 7, 5] {
//!     tree.insert(key);
//! }
//!
//! assert!(tree.search(&4)?.is_some());
//! assert!(tree.remove(&4)?);
//! assert!(!tree.remove(&4)?);
//!
//! let keys: Vec<i32> = tree.traverse().copied().collect();
//! assert_eq!(keys, vec![1, 2, 3, 5, 6, 7]);
//! # Ok::<(), btree_memory::BTreeError>(())
//! ```

pub mod btree;
pub mod demo;
pub mod error;
pub mod script;
pub mod types;

pub use error::{BTreeError, Result};
pub use types::{
    BTreeConfig, Rebalance, DEFAULT_KEY_CAPACITY, MAX_KEY_CAPACITY, MIN_KEY_CAPACITY,
};

// Re-export main public API
pub use btree::{BTree, Iter, Node, SearchHit};
pub use script::{Command, Outcome, Script, ScriptReport};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Node type for visualization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    /// Whether this is a leaf node
    pub is_leaf: bool,
    /// Keys in this node, rendered with `Display`
    pub keys: Vec<String>,
    /// Child nodes (only for interior nodes)
    pub children: Vec<TreeNode>,
}

/// Tree statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeStats {
    /// Number of keys stored
    pub len: usize,
    /// Number of levels
    pub height: usize,
    /// Total number of nodes
    pub node_count: usize,
    /// Maximum keys per node
    pub key_capacity: usize,
}

/// Thread-safe handle to a B-tree
///
/// The tree itself is single-threaded; this wrapper serializes writers
/// behind one lock per tree. Clones share the same tree.
pub struct SharedBTree<T> {
    tree: Arc<RwLock<BTree<T>>>,
}

impl<T> SharedBTree<T> {
    /// Create a handle to an empty tree
    pub fn new(config: BTreeConfig) -> Result<Self> {
        Ok(Self::from_tree(BTree::with_config(config)?))
    }

    /// Wrap an existing tree
    pub fn from_tree(tree: BTree<T>) -> Self {
        Self {
            tree: Arc::new(RwLock::new(tree)),
        }
    }

    /// Run `f` with shared access to the tree
    pub fn read<R>(&self, f: impl FnOnce(&BTree<T>) -> R) -> R {
        let tree = self.tree.read();
        f(&*tree)
    }

    /// Run `f` with exclusive access to the tree
    pub fn write<R>(&self, f: impl FnOnce(&mut BTree<T>) -> R) -> R {
        let mut tree = self.tree.write();
        f(&mut *tree)
    }

    /// Get the current configuration
    pub fn config(&self) -> BTreeConfig {
        self.tree.read().config()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.read().is_empty()
    }

    pub fn len(&self) -> usize {
        self.tree.read().len()
    }

    /// Get statistics about the tree
    pub fn stats(&self) -> TreeStats {
        self.tree.read().stats()
    }

    /// Replace the tree with an empty one using `config`
    pub fn reset(&self, config: BTreeConfig) -> Result<()> {
        let fresh = BTree::with_config(config)?;
        *self.tree.write() = fresh;
        Ok(())
    }

    /// Remove every key, keeping the configuration
    pub fn clear(&self) {
        self.tree.write().clear();
    }
}

impl<T: Ord> SharedBTree<T> {
    /// Insert a key; false if it was already present
    pub fn insert(&self, key: T) -> bool {
        self.tree.write().insert(key)
    }

    /// Remove a key; false if it was absent
    pub fn remove(&self, key: &T) -> Result<bool> {
        self.tree.write().remove(key)
    }

    /// Check if a key exists
    pub fn contains(&self, key: &T) -> bool {
        self.tree.read().contains(key)
    }

    /// Search for a key, returning its index within the holding node
    pub fn search(&self, key: &T) -> Result<Option<usize>> {
        let tree = self.tree.read();
        Ok(tree.search(key)?.map(|hit| hit.index()))
    }
}

impl<T: Clone> SharedBTree<T> {
    /// Snapshot of all keys in ascending order
    pub fn keys(&self) -> Vec<T> {
        self.tree.read().traverse().cloned().collect()
    }
}

impl<T: fmt::Display> SharedBTree<T> {
    /// Export the tree structure for visualization
    pub fn export(&self) -> TreeNode {
        self.tree.read().export()
    }
}

impl<T> Clone for SharedBTree<T> {
    fn clone(&self) -> Self {
        Self {
            tree: Arc::clone(&self.tree),
        }
    }
}

impl<T> Default for SharedBTree<T> {
    fn default() -> Self {
        Self::from_tree(BTree::new())
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedBTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedBTree")
            .field("tree", &*self.tree.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_shared_basic_operations() -> Result<()> {
        let shared = SharedBTree::new(BTreeConfig::new(4)?)?;

        assert!(shared.insert(10));
        assert!(shared.insert(5));
        assert!(!shared.insert(10));
        assert!(shared.contains(&5));
        assert_eq!(shared.search(&10)?, Some(1));
        assert!(shared.remove(&5)?);
        assert!(!shared.remove(&5)?);
        assert_eq!(shared.keys(), vec![10]);
        assert_eq!(shared.config().key_capacity, 4);
        Ok(())
    }

    #[test]
    fn test_shared_concurrent_inserts() -> Result<()> {
        let shared: SharedBTree<u32> = SharedBTree::default();

        thread::scope(|scope| {
            for worker in 0..4u32 {
                let handle = shared.clone();
                scope.spawn(move || {
                    for i in 0..250 {
                        handle.insert(worker * 1000 + i);
                    }
                });
            }
        });

        assert_eq!(shared.len(), 1000);
        shared.read(|tree| tree.validate())?;
        Ok(())
    }

    #[test]
    fn test_shared_reset_and_clear() -> Result<()> {
        let shared: SharedBTree<i32> = SharedBTree::default();
        shared.write(|tree| tree.extend(0..50));
        assert_eq!(shared.stats().len, 50);

        shared.clear();
        assert!(shared.is_empty());
        assert!(matches!(shared.search(&1), Err(BTreeError::EmptyTree)));

        assert!(shared
            .reset(BTreeConfig { key_capacity: 1 })
            .is_err());
        assert_eq!(shared.config().key_capacity, 3);

        shared.reset(BTreeConfig::new(10)?)?;
        assert_eq!(shared.config().key_capacity, 10);
        Ok(())
    }

    #[test]
    fn test_export_serializes() {
        let mut tree = BTree::new();
        tree.extend([1, 2, 3, 4]);
        let shared = SharedBTree::from_tree(tree);

        let json = serde_json::to_value(shared.export()).unwrap();
        assert_eq!(json["isLeaf"], false);
        assert_eq!(json["keys"][0], "2");
        assert_eq!(json["children"][1]["keys"][1], "4");
    }
}
