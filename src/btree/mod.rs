//! B-tree implementation.
//!
//! This module provides an in-memory B-tree that supports:
//! - Point lookups (search)
//! - Insertions (insert)
//! - Deletions with borrow/merge rebalancing (remove)
//! - In-order traversal

mod cursor;
mod node;
mod tree;

pub use cursor::Iter;
pub use node::Node;
pub use tree::{BTree, SearchHit};
