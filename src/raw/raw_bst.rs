use core::borrow::Borrow;
use core::cmp::Ordering;

use alloc::vec::Vec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Node, Side};

/// The core binary search tree backing `BstMultimap`.
///
/// Duplicate keys are permitted: insertion routes an equal key into the left
/// subtree, so the ordering invariant is non-strict on the left (left subtree
/// keys <= node key, right subtree keys > node key) and equal keys stay
/// adjacent in the in-order sequence.
///
/// Values are stored in their own arena, separate from the node graph (the
/// mutable value iterator relies on this split to hand out `&mut V` while the
/// node links are being read for traversal).
pub(crate) struct RawBst<K, V> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<K>>,
    /// Arena storing all values.
    values: Arena<V>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Number of live entries, equal to the node count reachable from `root`.
    len: usize,
}

impl<K, V> RawBst<K, V> {
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            values: Arena::new(),
            root: None,
            len: 0,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every entry. The arenas release their slots without walking the
    /// node links, so teardown cost does not depend on tree shape.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.values.clear();
        self.root = None;
        self.len = 0;
    }

    pub(crate) fn key(&self, handle: Handle) -> &K {
        &self.nodes.get(handle).key
    }

    pub(crate) fn value(&self, handle: Handle) -> &V {
        self.values.get(self.nodes.get(handle).value)
    }

    pub(crate) fn value_mut(&mut self, handle: Handle) -> &mut V {
        let value_handle = self.nodes.get(handle).value;
        self.values.get_mut(value_handle)
    }

    pub(crate) fn pair(&self, handle: Handle) -> (&K, &V) {
        let node = self.nodes.get(handle);
        (&node.key, self.values.get(node.value))
    }

    /// Returns a node reference by handle from a raw pointer.
    ///
    /// # Safety
    /// - `ptr` must point to a valid, allocated `RawBst<K, V>`.
    /// - No mutable reference to the node arena may exist.
    pub(crate) unsafe fn node_ptr<'a>(ptr: *const Self, handle: Handle) -> &'a Node<K> {
        // SAFETY: We only touch the `nodes` field, avoiding aliasing with `values`.
        unsafe { Arena::get_ptr(core::ptr::addr_of!((*ptr).nodes), handle) }
    }

    /// Returns a mutable value reference by node handle from a raw pointer.
    ///
    /// # Safety
    /// - `ptr` must point to a valid, allocated `RawBst<K, V>`.
    /// - The caller must have logical exclusive access to the value of the
    ///   entry at `handle`.
    pub(crate) unsafe fn value_mut_ptr<'a>(ptr: *mut Self, handle: Handle) -> &'a mut V {
        // SAFETY: The node read touches only the `nodes` field; the mutable
        // borrow touches only the `values` field. The two never alias.
        let value_handle = unsafe { Self::node_ptr(ptr.cast_const(), handle) }.value;
        unsafe { Arena::get_mut_ptr(core::ptr::addr_of_mut!((*ptr).values), value_handle) }
    }

    /// Handle of the first entry in in-order sequence.
    pub(crate) fn first(&self) -> Option<Handle> {
        self.root.map(|root| self.leftmost(root))
    }

    /// Handle of the last entry in in-order sequence.
    pub(crate) fn last(&self) -> Option<Handle> {
        self.root.map(|root| self.rightmost(root))
    }

    fn leftmost(&self, current: Handle) -> Handle {
        // SAFETY: `self` is a valid tree and we hold a shared borrow.
        unsafe { Self::leftmost_ptr(core::ptr::from_ref(self), current) }
    }

    fn rightmost(&self, current: Handle) -> Handle {
        // SAFETY: As in `leftmost`.
        unsafe { Self::rightmost_ptr(core::ptr::from_ref(self), current) }
    }

    pub(crate) fn next(&self, handle: Handle) -> Option<Handle> {
        // SAFETY: As in `leftmost`.
        unsafe { Self::next_ptr(core::ptr::from_ref(self), handle) }
    }

    pub(crate) fn prev(&self, handle: Handle) -> Option<Handle> {
        // SAFETY: As in `leftmost`.
        unsafe { Self::prev_ptr(core::ptr::from_ref(self), handle) }
    }

    /// # Safety
    /// - `ptr` must point to a valid, allocated `RawBst<K, V>` whose node
    ///   arena is not mutably borrowed.
    unsafe fn leftmost_ptr(ptr: *const Self, mut current: Handle) -> Handle {
        // SAFETY: Per this function's contract; only the node arena is read.
        while let Some(left) = unsafe { Self::node_ptr(ptr, current) }.left {
            current = left;
        }
        current
    }

    /// # Safety
    /// - As in [`leftmost_ptr`](Self::leftmost_ptr).
    unsafe fn rightmost_ptr(ptr: *const Self, mut current: Handle) -> Handle {
        // SAFETY: Per this function's contract; only the node arena is read.
        while let Some(right) = unsafe { Self::node_ptr(ptr, current) }.right {
            current = right;
        }
        current
    }

    /// In-order successor: leftmost of the right subtree if there is one,
    /// otherwise the first ancestor reached through a left edge.
    ///
    /// # Safety
    /// - As in [`leftmost_ptr`](Self::leftmost_ptr).
    pub(crate) unsafe fn next_ptr(ptr: *const Self, handle: Handle) -> Option<Handle> {
        // SAFETY: Per this function's contract; only the node arena is read.
        unsafe {
            let node = Self::node_ptr(ptr, handle);
            if let Some(right) = node.right {
                return Some(Self::leftmost_ptr(ptr, right));
            }

            let mut current = handle;
            let mut parent = node.parent;
            while let Some(p) = parent {
                let parent_node = Self::node_ptr(ptr, p);
                if parent_node.right == Some(current) {
                    current = p;
                    parent = parent_node.parent;
                } else {
                    return Some(p);
                }
            }
            None
        }
    }

    /// In-order predecessor, the mirror of [`next_ptr`](Self::next_ptr).
    ///
    /// # Safety
    /// - As in [`leftmost_ptr`](Self::leftmost_ptr).
    pub(crate) unsafe fn prev_ptr(ptr: *const Self, handle: Handle) -> Option<Handle> {
        // SAFETY: Per this function's contract; only the node arena is read.
        unsafe {
            let node = Self::node_ptr(ptr, handle);
            if let Some(left) = node.left {
                return Some(Self::rightmost_ptr(ptr, left));
            }

            let mut current = handle;
            let mut parent = node.parent;
            while let Some(p) = parent {
                let parent_node = Self::node_ptr(ptr, p);
                if parent_node.left == Some(current) {
                    current = p;
                    parent = parent_node.parent;
                } else {
                    return Some(p);
                }
            }
            None
        }
    }

    /// Empties the tree into a sorted vector of pairs.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<(K, V)> {
        // Collect handles first: in-order steps climb through ancestors that
        // were already visited, so nodes cannot be freed mid-walk.
        let mut handles = Vec::with_capacity(self.len);
        let mut current = self.first();
        while let Some(handle) = current {
            handles.push(handle);
            current = self.next(handle);
        }

        let mut result = Vec::with_capacity(handles.len());
        for handle in handles {
            let node = self.nodes.take(handle);
            let value = self.values.take(node.value);
            result.push((node.key, value));
        }

        self.nodes.clear();
        self.values.clear();
        self.root = None;
        self.len = 0;

        result
    }
}

impl<K: Ord, V> RawBst<K, V> {
    /// Inserts a new entry, always as a distinct node.
    ///
    /// An equal key descends left, so a run of duplicates grows on the left
    /// side of the first equal node. No rebalancing is performed.
    pub(crate) fn insert(&mut self, key: K, value: V) {
        let value = self.values.alloc(value);
        match self.root {
            None => {
                self.root = Some(self.nodes.alloc(Node::new(key, value, None)));
            }
            Some(root) => {
                let mut current = root;
                let (parent, side) = loop {
                    let node = self.nodes.get(current);
                    let side = if node.key >= key { Side::Left } else { Side::Right };
                    match node.child(side) {
                        Some(child) => current = child,
                        None => break (current, side),
                    }
                };
                let handle = self.nodes.alloc(Node::new(key, value, Some(parent)));
                self.nodes.get_mut(parent).set_child(side, Some(handle));
            }
        }
        self.len += 1;
    }

    /// Single-path descent for a key.
    ///
    /// When duplicates exist this returns *an arbitrary* matching entry (the
    /// first one met on the descent path), not necessarily the first of the
    /// duplicate run in in-order sequence.
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            match key.cmp(node.key.borrow()) {
                Ordering::Less => current = node.left,
                Ordering::Greater => current = node.right,
                Ordering::Equal => return Some(handle),
            }
        }
        None
    }

    /// Replaces the value of the entry at `handle` in place, returning the
    /// old value. The node and its key are untouched, avoiding alloc/free
    /// churn in the unique-key adapter's replace-on-insert path.
    pub(crate) fn replace_value(&mut self, handle: Handle, value: V) -> V {
        let value_handle = self.nodes.get(handle).value;
        core::mem::replace(self.values.get_mut(value_handle), value)
    }

    /// Finds the entry with an equal key, inserting `make()` under `key`
    /// first when there is none, and returns its handle.
    ///
    /// Only sound on trees without duplicate keys (the equality stop would
    /// otherwise pick an arbitrary entry of a run); the unique-key adapter
    /// is its sole caller.
    pub(crate) fn search_or_insert_with(&mut self, key: K, make: impl FnOnce() -> V) -> Handle {
        let Some(root) = self.root else {
            let value = self.values.alloc(make());
            let handle = self.nodes.alloc(Node::new(key, value, None));
            self.root = Some(handle);
            self.len += 1;
            return handle;
        };

        let mut current = root;
        let (parent, side) = loop {
            let node = self.nodes.get(current);
            let side = match key.cmp(&node.key) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return current,
            };
            match node.child(side) {
                Some(child) => current = child,
                None => break (current, side),
            }
        };
        let value = self.values.alloc(make());
        let handle = self.nodes.alloc(Node::new(key, value, Some(parent)));
        self.nodes.get_mut(parent).set_child(side, Some(handle));
        self.len += 1;
        handle
    }

    /// Removes the entry at `handle`, freeing exactly one node slot and one
    /// value slot and decrementing `len` by one. Returns the removed value.
    ///
    /// Iterative by design so that a degenerate (list-shaped) tree cannot
    /// overflow the stack. The three structural cases:
    ///
    /// - no children: unlink from the parent slot, or clear `root` when the
    ///   node is a childless root
    /// - one child: the node absorbs the child's content and both of the
    ///   child's subtrees, keeping its own position; the child is freed
    /// - two children: swap content with the in-order successor and loop with
    ///   the successor as the node to remove (it has no left child, so the
    ///   next turn bottoms out in one of the first two cases)
    pub(crate) fn remove_at(&mut self, handle: Handle) -> V {
        let mut current = handle;
        loop {
            let node = self.nodes.get(current);
            match (node.left, node.right) {
                (None, None) => {
                    return self.unlink_leaf(current);
                }
                (Some(child), None) | (None, Some(child)) => {
                    return self.absorb_child(current, child);
                }
                (Some(_), Some(right)) => {
                    let successor = self.leftmost(right);
                    let (doomed, succ) = self.nodes.get2_mut(current, successor);
                    core::mem::swap(&mut doomed.key, &mut succ.key);
                    core::mem::swap(&mut doomed.value, &mut succ.value);
                    current = successor;
                }
            }
        }
    }

    fn unlink_leaf(&mut self, current: Handle) -> V {
        let node = self.nodes.take(current);
        match node.parent {
            // A childless root: clear the root reference directly.
            None => self.root = None,
            Some(parent_handle) => {
                let parent = self.nodes.get_mut(parent_handle);
                if parent.left == Some(current) {
                    parent.left = None;
                } else {
                    parent.right = None;
                }
            }
        }
        self.len -= 1;
        self.values.take(node.value)
    }

    /// One-child case: `current` takes over the child's key, value, and both
    /// subtrees, so its own parent link and position are untouched.
    fn absorb_child(&mut self, current: Handle, child: Handle) -> V {
        let child_node = self.nodes.take(child);
        let node = self.nodes.get_mut(current);
        let old_value = core::mem::replace(&mut node.value, child_node.value);
        node.key = child_node.key;
        node.left = child_node.left;
        node.right = child_node.right;
        if let Some(grandchild) = child_node.left {
            self.nodes.get_mut(grandchild).parent = Some(current);
        }
        if let Some(grandchild) = child_node.right {
            self.nodes.get_mut(grandchild).parent = Some(current);
        }
        self.len -= 1;
        self.values.take(old_value)
    }

    /// Removes every entry with the given key. Cost is
    /// O(duplicate count x tree height).
    pub(crate) fn remove_all<Q>(&mut self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut removed = 0;
        while let Some(handle) = self.search(key) {
            drop(self.remove_at(handle));
            removed += 1;
        }
        removed
    }

    /// Bounds of the contiguous in-order run of entries with the given key:
    /// the first matching entry and the first entry past the run. `(None,
    /// None)` when the key is absent.
    pub(crate) fn equal_range<Q>(&self, key: &Q) -> (Option<Handle>, Option<Handle>)
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let Some(found) = self.search(key) else {
            return (None, None);
        };

        let mut first = found;
        while let Some(p) = self.prev(first) {
            if self.nodes.get(p).key.borrow() == key {
                first = p;
            } else {
                break;
            }
        }

        let mut last = found;
        while let Some(n) = self.next(last) {
            if self.nodes.get(n).key.borrow() == key {
                last = n;
            } else {
                break;
            }
        }

        (Some(first), self.next(last))
    }

    /// Scans the duplicate run of `key` for the entry whose value compares
    /// `want` against the best so far; ties keep the earlier entry. `None`
    /// when the key is absent.
    pub(crate) fn best_in_run<Q>(&self, key: &Q, want: Ordering) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
        V: Ord,
    {
        let (first, past) = self.equal_range(key);
        let mut best = first?;

        let mut current = self.next(best);
        while current != past {
            let handle = current.expect("`RawBst::best_in_run()` - run ended before its past-the-end bound!");
            if self.value(handle).cmp(self.value(best)) == want {
                best = handle;
            }
            current = self.next(handle);
        }
        Some(best)
    }
}

impl<K: Clone, V: Clone> Clone for RawBst<K, V> {
    fn clone(&self) -> Self {
        // Handles are indices into the arenas, so a structural clone of the
        // storage preserves every link as-is.
        Self {
            nodes: self.nodes.clone(),
            values: self.values.clone(),
            root: self.root,
            len: self.len,
        }
    }
}
