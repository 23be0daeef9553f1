//! B-tree node and its structural operations.
//!
//! A node owns a sorted run of keys and, when internal, exactly one more
//! child than it has keys. Children are exclusively owned boxes that move
//! between nodes on split, borrow and merge; there are no parent links.
//!
//! With an odd capacity, repair happens on the way down: a full child is
//! split before an insert descends into it, and a child at the minimum is
//! filled before a removal descends into it.
//!
//! With an even capacity a full node cannot split into two legal halves, so
//! repair happens on the way back up instead: an insert may leave a child
//! holding `max_keys + 1` keys, which the parent splits, and a removal may
//! leave a child one key short, which the parent fills.

use crate::error::{BTreeError, Result};
use crate::types::{self, Rebalance};
use std::fmt;
use std::mem;

/// One node of the tree
#[derive(Clone)]
pub struct Node<T> {
    /// Keys in ascending order
    keys: Vec<T>,
    /// Child nodes (empty for leaves, `keys.len() + 1` otherwise)
    children: Vec<Box<Node<T>>>,
    /// Maximum keys this node may hold between operations
    max_keys: usize,
}

impl<T> Node<T> {
    /// Create an empty leaf
    pub(crate) fn new(max_keys: usize) -> Self {
        Self {
            keys: Vec::with_capacity(max_keys + 1),
            children: Vec::new(),
            max_keys,
        }
    }

    /// Keys stored in this node, ascending
    pub fn keys(&self) -> &[T] {
        &self.keys
    }

    /// Child nodes in key order
    pub fn children(&self) -> impl ExactSizeIterator<Item = &Node<T>> + '_ {
        self.children.iter().map(|child| child.as_ref())
    }

    /// Child at `index`, if this node is internal and the index is in range
    pub fn child(&self, index: usize) -> Option<&Node<T>> {
        self.children.get(index).map(|child| child.as_ref())
    }

    /// Number of keys in this node
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether this node holds no keys
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether this node has no children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Maximum number of keys this node may hold
    pub fn key_capacity(&self) -> usize {
        self.max_keys
    }

    /// Smallest key in the subtree rooted here
    pub fn min_key(&self) -> Option<&T> {
        let mut node = self;
        while let Some(first) = node.children.first() {
            node = &**first;
        }
        node.keys.first()
    }

    /// Largest key in the subtree rooted here
    pub fn max_key(&self) -> Option<&T> {
        let mut node = self;
        while let Some(last) = node.children.last() {
            node = &**last;
        }
        node.keys.last()
    }

    /// In-order predecessor of `keys[index]`: the rightmost key of the
    /// subtree left of it. `None` for leaves.
    pub fn predecessor(&self, index: usize) -> Option<&T> {
        self.children.get(index)?.max_key()
    }

    /// In-order successor of `keys[index]`: the leftmost key of the
    /// subtree right of it. `None` for leaves.
    pub fn successor(&self, index: usize) -> Option<&T> {
        self.children.get(index + 1)?.min_key()
    }

    /// Number of nodes in the subtree rooted here
    pub(crate) fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|child| child.node_count())
            .sum::<usize>()
    }

    /// Fewest keys a non-root node may hold
    fn min_keys(&self) -> usize {
        types::min_degree(self.max_keys) - 1
    }

    pub(crate) fn rebalance(&self) -> Rebalance {
        Rebalance::for_capacity(self.max_keys)
    }

    pub(crate) fn is_full(&self) -> bool {
        self.keys.len() >= self.max_keys
    }

    pub(crate) fn is_overfull(&self) -> bool {
        self.keys.len() > self.max_keys
    }

    /// Build the root of a tree one level taller: the full or overflowing
    /// `old_root` becomes its only child and is split at once.
    pub(crate) fn grow(old_root: Box<Node<T>>) -> Self {
        let mut root = Node::new(old_root.max_keys);
        root.children.push(old_root);
        root.split_child(0);
        root
    }

    /// Detach the only child of a keyless internal node, leaving this node
    /// untouched otherwise
    pub(crate) fn take_only_child(&mut self) -> Option<Box<Node<T>>> {
        if self.keys.is_empty() && self.children.len() == 1 {
            self.children.pop()
        } else {
            None
        }
    }

    /// Split the full or overflowing child at `index`.
    ///
    /// The child keeps its lower `t - 1` keys, its key at `t - 1` moves up
    /// into this node at `index`, and a new sibling at `index + 1` takes
    /// every key above it together with the matching children.
    pub(crate) fn split_child(&mut self, index: usize) {
        let t = types::min_degree(self.max_keys);

        let (median, sibling) = {
            let child = &mut self.children[index];
            let mut upper = child.keys.split_off(t - 1);
            let median = upper.remove(0);

            let mut sibling = Node::new(child.max_keys);
            sibling.keys.extend(upper);
            if !child.is_leaf() {
                sibling.children = child.children.split_off(t);
            }
            (median, sibling)
        };

        self.keys.insert(index, median);
        self.children.insert(index + 1, Box::new(sibling));
    }

    /// Move one key from the child at `index - 1` through this node into the
    /// child at `index`, carrying the sibling's last child along.
    fn borrow_from_prev(&mut self, index: usize) {
        let (sibling_key, moved_child) = {
            let sibling = &mut self.children[index - 1];
            let Some(key) = sibling.keys.pop() else {
                return;
            };
            (key, sibling.children.pop())
        };

        let separator = mem::replace(&mut self.keys[index - 1], sibling_key);
        let child = &mut self.children[index];
        child.keys.insert(0, separator);
        if let Some(moved) = moved_child {
            child.children.insert(0, moved);
        }
    }

    /// Move one key from the child at `index + 1` through this node into the
    /// child at `index`, carrying the sibling's first child along.
    fn borrow_from_next(&mut self, index: usize) {
        let (sibling_key, moved_child) = {
            let sibling = &mut self.children[index + 1];
            if sibling.keys.is_empty() {
                return;
            }
            let key = sibling.keys.remove(0);
            let moved = if sibling.is_leaf() {
                None
            } else {
                Some(sibling.children.remove(0))
            };
            (key, moved)
        };

        let separator = mem::replace(&mut self.keys[index], sibling_key);
        let child = &mut self.children[index];
        child.keys.push(separator);
        if let Some(moved) = moved_child {
            child.children.push(moved);
        }
    }

    /// Merge the child at `index + 1` and the separator `keys[index]` into
    /// the child at `index`. The right sibling is dropped.
    fn merge(&mut self, index: usize) {
        let sibling = *self.children.remove(index + 1);
        let separator = self.keys.remove(index);

        let child = &mut self.children[index];
        child.keys.push(separator);
        child.keys.extend(sibling.keys);
        child.children.extend(sibling.children);
    }

    /// Restore the minimum occupancy of the child at `index`: borrow from the
    /// left sibling, then from the right sibling, and merge when neither can
    /// spare a key. The last child merges into its left neighbour.
    fn fill(&mut self, index: usize) {
        let t = types::min_degree(self.max_keys);
        let last = self.keys.len();

        if index != 0 && self.children[index - 1].keys.len() >= t {
            self.borrow_from_prev(index);
        } else if index != last && self.children[index + 1].keys.len() >= t {
            self.borrow_from_next(index);
        } else if index != last {
            self.merge(index);
        } else {
            self.merge(index - 1);
        }
    }

    fn fill_if_underfull(&mut self, index: usize) {
        if self.children[index].keys.len() < self.min_keys() {
            self.fill(index);
        }
    }

    /// Make sure the child at `index` can lose a key before descending into
    /// it, and return the index to descend into. Filling the last child may
    /// merge it into its left neighbour.
    fn prepare_descent(&mut self, index: usize) -> usize {
        if self.children[index].keys.len() < types::min_degree(self.max_keys) {
            self.fill(index);
            if index > self.keys.len() {
                return index - 1;
            }
        }
        index
    }

    /// Remove and return the largest key of the subtree rooted here
    fn pop_last(&mut self) -> Option<T> {
        if self.is_leaf() {
            return self.keys.pop();
        }
        match self.rebalance() {
            Rebalance::TopDown => {
                let index = self.prepare_descent(self.keys.len());
                self.children[index].pop_last()
            }
            Rebalance::BottomUp => {
                let last = self.keys.len();
                let key = self.children[last].pop_last()?;
                self.fill_if_underfull(last);
                Some(key)
            }
        }
    }

    /// Remove and return the smallest key of the subtree rooted here
    fn pop_first(&mut self) -> Option<T> {
        if self.is_leaf() {
            if self.keys.is_empty() {
                return None;
            }
            return Some(self.keys.remove(0));
        }
        match self.rebalance() {
            Rebalance::TopDown => {
                let index = self.prepare_descent(0);
                self.children[index].pop_first()
            }
            Rebalance::BottomUp => {
                let key = self.children[0].pop_first()?;
                self.fill_if_underfull(0);
                Some(key)
            }
        }
    }

    /// Remove the key at `index` of this node
    fn remove_at(&mut self, index: usize) -> Option<T> {
        if self.is_leaf() {
            Some(self.remove_from_leaf(index))
        } else {
            self.remove_from_internal(index)
        }
    }

    fn remove_from_leaf(&mut self, index: usize) -> T {
        self.keys.remove(index)
    }

    fn remove_from_internal(&mut self, index: usize) -> Option<T> {
        match self.rebalance() {
            Rebalance::TopDown => self.remove_from_internal_top_down(index),
            Rebalance::BottomUp => self.remove_from_internal_bottom_up(index),
        }
    }

    /// Replace `keys[index]` with its predecessor when the left child holds
    /// at least `t` keys, else with its successor when the right child does.
    /// Otherwise merge both children around the key and remove it from the
    /// merged node.
    fn remove_from_internal_top_down(&mut self, index: usize) -> Option<T> {
        let t = types::min_degree(self.max_keys);

        if self.children[index].keys.len() >= t {
            let predecessor = self.children[index].pop_last()?;
            Some(mem::replace(&mut self.keys[index], predecessor))
        } else if self.children[index + 1].keys.len() >= t {
            let successor = self.children[index + 1].pop_first()?;
            Some(mem::replace(&mut self.keys[index], successor))
        } else {
            let position = self.children[index].keys.len();
            self.merge(index);
            self.children[index].remove_at(position)
        }
    }

    /// Replace `keys[index]` with its predecessor when the left child can
    /// spare a key, else with its successor when the right child can. When
    /// neither can, the predecessor is taken and the refill merges both
    /// children around it; merging first would overflow the merged node.
    fn remove_from_internal_bottom_up(&mut self, index: usize) -> Option<T> {
        let t = types::min_degree(self.max_keys);
        let left_spare = self.children[index].keys.len() >= t;
        let right_spare = self.children[index + 1].keys.len() >= t;

        if right_spare && !left_spare {
            let successor = self.children[index + 1].pop_first()?;
            let key = mem::replace(&mut self.keys[index], successor);
            self.fill_if_underfull(index + 1);
            Some(key)
        } else {
            let predecessor = self.children[index].pop_last()?;
            let key = mem::replace(&mut self.keys[index], predecessor);
            self.fill_if_underfull(index);
            Some(key)
        }
    }
}

impl<T: Ord> Node<T> {
    /// Index of the first key `>= key`, and whether it is equal
    fn find(&self, key: &T) -> (usize, bool) {
        match self.keys.binary_search(key) {
            Ok(index) => (index, true),
            Err(index) => (index, false),
        }
    }

    /// Locate `key` in the subtree rooted here
    pub(crate) fn search(&self, key: &T) -> Option<(&Node<T>, usize)> {
        let mut node = self;
        loop {
            let (index, found) = node.find(key);
            if found {
                return Some((node, index));
            }
            if node.is_leaf() {
                return None;
            }
            node = &*node.children[index];
        }
    }

    /// Insert an absent `key` into the subtree rooted here, which must not
    /// be full. Full children are split before descending.
    pub(crate) fn insert_non_full(&mut self, key: T) {
        let (mut index, _) = self.find(&key);
        if self.is_leaf() {
            self.keys.insert(index, key);
            return;
        }

        if self.children[index].is_full() {
            self.split_child(index);
            if self.keys[index] < key {
                index += 1;
            }
        }
        self.children[index].insert_non_full(key);
    }

    /// Insert `key` into the subtree rooted here, splitting on the way back
    /// up.
    ///
    /// Returns false without touching the tree when the key is already
    /// present. On return this node may hold `max_keys + 1` keys; the caller
    /// splits it.
    pub(crate) fn insert(&mut self, key: T) -> bool {
        let (index, found) = self.find(&key);
        if found {
            return false;
        }
        if self.is_leaf() {
            self.keys.insert(index, key);
            return true;
        }

        let inserted = self.children[index].insert(key);
        if self.children[index].is_overfull() {
            self.split_child(index);
        }
        inserted
    }

    /// Remove `key` from the subtree rooted here and return it.
    ///
    /// Top-down, children on the search path are filled before descending,
    /// even when the key turns out to be absent. Bottom-up, this node may
    /// hold one key fewer than the minimum on return; the caller fills it.
    pub(crate) fn remove(&mut self, key: &T) -> Option<T> {
        let (index, found) = self.find(key);

        if found {
            return self.remove_at(index);
        }
        if self.is_leaf() {
            return None;
        }

        match self.rebalance() {
            Rebalance::TopDown => {
                let index = self.prepare_descent(index);
                self.children[index].remove(key)
            }
            Rebalance::BottomUp => {
                let removed = self.children[index].remove(key)?;
                self.fill_if_underfull(index);
                Some(removed)
            }
        }
    }

    /// Check ordering, bounds, occupancy and balance of the subtree
    pub(crate) fn validate(&self, checker: &mut Checker) -> Result<()> {
        self.check(checker, None, None, 0, true)
    }

    fn check(
        &self,
        checker: &mut Checker,
        lower: Option<&T>,
        upper: Option<&T>,
        depth: usize,
        is_root: bool,
    ) -> Result<()> {
        if self.max_keys != checker.max_keys {
            return Err(BTreeError::corruption(format!(
                "node at depth {} has capacity {}, tree has {}",
                depth, self.max_keys, checker.max_keys
            )));
        }
        if self.keys.len() > self.max_keys {
            return Err(BTreeError::corruption(format!(
                "node at depth {} holds {} keys (max {})",
                depth,
                self.keys.len(),
                self.max_keys
            )));
        }
        if !is_root && self.keys.len() < self.min_keys() {
            return Err(BTreeError::corruption(format!(
                "node at depth {} holds {} keys (min {})",
                depth,
                self.keys.len(),
                self.min_keys()
            )));
        }
        if self.keys.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(BTreeError::corruption(format!(
                "keys out of order at depth {}",
                depth
            )));
        }
        if let (Some(low), Some(first)) = (lower, self.keys.first()) {
            if first <= low {
                return Err(BTreeError::corruption(format!(
                    "key below separator at depth {}",
                    depth
                )));
            }
        }
        if let (Some(high), Some(last)) = (upper, self.keys.last()) {
            if last >= high {
                return Err(BTreeError::corruption(format!(
                    "key above separator at depth {}",
                    depth
                )));
            }
        }

        checker.keys_seen += self.keys.len();

        if self.is_leaf() {
            return match checker.leaf_depth {
                Some(expected) if expected != depth => Err(BTreeError::corruption(format!(
                    "leaf at depth {}, expected {}",
                    depth, expected
                ))),
                _ => {
                    checker.leaf_depth = Some(depth);
                    Ok(())
                }
            };
        }

        if self.children.len() != self.keys.len() + 1 {
            return Err(BTreeError::corruption(format!(
                "internal node at depth {} has {} keys and {} children",
                depth,
                self.keys.len(),
                self.children.len()
            )));
        }

        for (i, child) in self.children.iter().enumerate() {
            let low = if i == 0 { lower } else { self.keys.get(i - 1) };
            let high = if i == self.keys.len() {
                upper
            } else {
                self.keys.get(i)
            };
            child.check(checker, low, high, depth + 1, false)?;
        }
        Ok(())
    }
}

impl<T: fmt::Debug> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("Node");
        dbg.field("keys", &self.keys);
        if !self.is_leaf() {
            dbg.field("children", &self.children);
        }
        dbg.finish()
    }
}

/// State carried through a structural validation pass
pub(crate) struct Checker {
    max_keys: usize,
    leaf_depth: Option<usize>,
    pub(crate) keys_seen: usize,
}

impl Checker {
    pub(crate) fn new(max_keys: usize) -> Self {
        Self {
            max_keys,
            leaf_depth: None,
            keys_seen: 0,
        }
    }
}
