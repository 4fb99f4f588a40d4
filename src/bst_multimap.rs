use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::marker::PhantomData;

use crate::error::Error;
use crate::raw::{Handle, RawBst};

/// An ordered multimap based on an unbalanced binary search tree.
///
/// Unlike a map, a multimap keeps every inserted entry: inserting a key that
/// is already present adds a second, distinct entry rather than replacing the
/// first. Equal keys are adjacent in the in-order sequence, and
/// [`equal_range`](BstMultimap::equal_range) iterates exactly that run.
///
/// Keys must implement [`Ord`]. It is a logic error for a key to be modified
/// in such a way that its ordering relative to any other key changes while it
/// is in the multimap. The behavior resulting from such a logic error is not
/// specified but will not result in undefined behavior.
///
/// The tree performs no rebalancing. Operations cost O(height), which is
/// O(log n) for well-shuffled insertion orders but degrades to O(n) when keys
/// arrive in monotonic order. This is an accepted trade for structural
/// simplicity, not a defect.
///
/// # Examples
///
/// ```
/// use twig_tree::BstMultimap;
///
/// let mut sightings = BstMultimap::new();
///
/// // The same key can be recorded any number of times.
/// sightings.insert("heron", "river bank");
/// sightings.insert("heron", "weir");
/// sightings.insert("kingfisher", "old bridge");
///
/// assert_eq!(sightings.len(), 3);
/// assert_eq!(sightings.equal_range(&"heron").count(), 2);
///
/// // Removal always takes the whole duplicate run.
/// assert_eq!(sightings.remove_all(&"heron"), 2);
/// assert!(!sightings.contains_key(&"heron"));
/// ```
pub struct BstMultimap<K, V> {
    raw: RawBst<K, V>,
}

/// A bidirectional position in a [`BstMultimap`].
///
/// A cursor either points at an entry or sits at the past-the-end position,
/// in which case [`key`](Cursor::key) and [`value`](Cursor::value) return
/// `None`. Stepping follows the in-order sequence:
/// [`move_next`](Cursor::move_next) from the last entry reaches the end
/// position, and [`move_prev`](Cursor::move_prev) from the end position
/// returns to the last entry.
///
/// Cursors borrow the multimap, so the borrow checker rules out holding one
/// across a structural mutation.
///
/// # Examples
///
/// ```
/// use twig_tree::BstMultimap;
///
/// let map = BstMultimap::from([(2, "b"), (1, "a"), (3, "c")]);
///
/// let mut cursor = map.cursor_front();
/// assert_eq!(cursor.key_value(), Some((&1, &"a")));
///
/// cursor.move_next();
/// cursor.move_next();
/// cursor.move_next();
/// assert!(cursor.is_end());
///
/// cursor.move_prev();
/// assert_eq!(cursor.key(), Some(&3));
/// ```
pub struct Cursor<'a, K, V> {
    raw: &'a RawBst<K, V>,
    node: Option<Handle>,
}

/// An iterator over the entries of a `BstMultimap`, in key order.
///
/// This `struct` is created by the [`iter`] method on [`BstMultimap`].
///
/// # Examples
///
/// ```
/// use twig_tree::BstMultimap;
///
/// let map = BstMultimap::from([(1, "a"), (2, "b")]);
/// let mut iter = map.iter();
/// assert_eq!(iter.next(), Some((&1, &"a")));
/// assert_eq!(iter.next_back(), Some((&2, &"b")));
/// assert_eq!(iter.next(), None);
/// ```
///
/// [`iter`]: BstMultimap::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    raw: &'a RawBst<K, V>,
    front: Option<Handle>,
    back: Option<Handle>,
    remaining: usize,
}

/// A mutable iterator over the entries of a `BstMultimap`.
///
/// Keys are read-only (mutating a key could break the ordering invariant);
/// values are mutable.
///
/// This `struct` is created by the [`iter_mut`] method on [`BstMultimap`].
///
/// [`iter_mut`]: BstMultimap::iter_mut
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IterMut<'a, K: 'a, V: 'a> {
    raw: *mut RawBst<K, V>,
    front: Option<Handle>,
    back: Option<Handle>,
    remaining: usize,
    _marker: PhantomData<&'a mut (K, V)>,
}

// SAFETY: IterMut behaves as &mut RawBst<K, V>, so it is Send when K and V
// are Send. It is not Sync.
unsafe impl<K: Send, V: Send> Send for IterMut<'_, K, V> {}

/// An iterator over one duplicate-key run of a `BstMultimap`.
///
/// This `struct` is created by the [`equal_range`] method on [`BstMultimap`].
/// Every yielded entry carries the queried key; the iterator is empty when
/// the key is absent.
///
/// [`equal_range`]: BstMultimap::equal_range
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Range<'a, K, V> {
    raw: &'a RawBst<K, V>,
    front: Option<Handle>,
    past: Option<Handle>,
}

/// An owning iterator over the entries of a `BstMultimap`, in key order.
///
/// This `struct` is created by the [`into_iter`] method on [`BstMultimap`]
/// (provided by the [`IntoIterator`] trait).
///
/// [`into_iter`]: IntoIterator::into_iter
pub struct IntoIter<K, V> {
    inner: alloc::vec::IntoIter<(K, V)>,
}

/// An iterator over the keys of a `BstMultimap`, in order with repeats.
///
/// This `struct` is created by the [`keys`] method on [`BstMultimap`].
///
/// [`keys`]: BstMultimap::keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An iterator over the values of a `BstMultimap`, in key order.
///
/// This `struct` is created by the [`values`] method on [`BstMultimap`].
///
/// [`values`]: BstMultimap::values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// A mutable iterator over the values of a `BstMultimap`, in key order.
///
/// This `struct` is created by the [`values_mut`] method on [`BstMultimap`].
///
/// [`values_mut`]: BstMultimap::values_mut
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

/// An owning iterator over the keys of a `BstMultimap`.
///
/// This `struct` is created by the [`into_keys`] method on [`BstMultimap`].
///
/// [`into_keys`]: BstMultimap::into_keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IntoKeys<K, V> {
    inner: IntoIter<K, V>,
}

/// An owning iterator over the values of a `BstMultimap`.
///
/// This `struct` is created by the [`into_values`] method on [`BstMultimap`].
///
/// [`into_values`]: BstMultimap::into_values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IntoValues<K, V> {
    inner: IntoIter<K, V>,
}

impl<K, V> BstMultimap<K, V> {
    /// Makes a new, empty `BstMultimap`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use twig_tree::BstMultimap;
    ///
    /// let mut map = BstMultimap::new();
    /// map.insert(1, "a");
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self { raw: RawBst::new() }
    }

    /// Returns the number of entries in the multimap, counting duplicates
    /// separately.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the multimap contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Clears the multimap, removing all entries.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Gets an iterator over the entries, sorted by key.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            raw: &self.raw,
            front: self.raw.first(),
            back: self.raw.last(),
            remaining: self.raw.len(),
        }
    }

    /// Gets a mutable iterator over the entries, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use twig_tree::BstMultimap;
    ///
    /// let mut map = BstMultimap::from([(2, 20), (1, 10), (3, 30)]);
    /// for (_, value) in map.iter_mut() {
    ///     *value += 1;
    /// }
    /// let values: Vec<_> = map.values().copied().collect();
    /// assert_eq!(values, [11, 21, 31]);
    /// ```
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            front: self.raw.first(),
            back: self.raw.last(),
            remaining: self.raw.len(),
            raw: &mut self.raw,
            _marker: PhantomData,
        }
    }

    /// Gets an iterator over the keys, in sorted order. Duplicate keys are
    /// yielded once per entry.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values, ordered by their keys.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Gets a mutable iterator over the values, ordered by their keys.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut { inner: self.iter_mut() }
    }

    /// Creates a consuming iterator over the keys, in sorted order.
    #[must_use = "`self` will be dropped if the result is not used"]
    pub fn into_keys(self) -> IntoKeys<K, V> {
        IntoKeys { inner: self.into_iter() }
    }

    /// Creates a consuming iterator over the values, ordered by their keys.
    #[must_use = "`self` will be dropped if the result is not used"]
    pub fn into_values(self) -> IntoValues<K, V> {
        IntoValues { inner: self.into_iter() }
    }

    /// Returns a cursor at the first entry in key order, or at the end
    /// position if the multimap is empty.
    #[must_use]
    pub fn cursor_front(&self) -> Cursor<'_, K, V> {
        Cursor {
            raw: &self.raw,
            node: self.raw.first(),
        }
    }

    /// Returns a cursor at the last entry in key order, or at the end
    /// position if the multimap is empty.
    #[must_use]
    pub fn cursor_back(&self) -> Cursor<'_, K, V> {
        Cursor {
            raw: &self.raw,
            node: self.raw.last(),
        }
    }

    /// Returns the first entry in key order.
    #[must_use]
    pub fn first(&self) -> Option<(&K, &V)> {
        self.raw.first().map(|handle| self.raw.pair(handle))
    }

    /// Returns the last entry in key order.
    #[must_use]
    pub fn last(&self) -> Option<(&K, &V)> {
        self.raw.last().map(|handle| self.raw.pair(handle))
    }
}

impl<K: Ord, V> BstMultimap<K, V> {
    /// Inserts a new entry into the multimap.
    ///
    /// An existing entry with an equal key is never replaced; the new entry
    /// is stored alongside it and [`len`](BstMultimap::len) always grows by
    /// one.
    ///
    /// # Examples
    ///
    /// ```
    /// use twig_tree::BstMultimap;
    ///
    /// let mut map = BstMultimap::new();
    /// map.insert(15, "hello");
    /// map.insert(15, "world");
    /// assert_eq!(map.len(), 2);
    /// ```
    pub fn insert(&mut self, key: K, value: V) {
        self.raw.insert(key, value);
    }

    /// Removes every entry with the given key, returning how many were
    /// removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use twig_tree::BstMultimap;
    ///
    /// let mut map = BstMultimap::from([(21, "a"), (21, "b"), (16, "c")]);
    /// assert_eq!(map.remove_all(&21), 2);
    /// assert_eq!(map.remove_all(&21), 0);
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn remove_all<Q>(&mut self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove_all(key)
    }

    /// Returns `true` if the multimap contains at least one entry with the
    /// given key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key).is_some()
    }

    /// Returns a reference to one value stored under the key.
    ///
    /// When the key has duplicates, which entry is returned is arbitrary (it
    /// depends on the descent path, not on the in-order position).
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key).map(|handle| self.raw.value(handle))
    }

    /// Returns a mutable reference to one value stored under the key.
    ///
    /// As with [`get`](BstMultimap::get), the choice among duplicates is
    /// arbitrary.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key).map(|handle| self.raw.value_mut(handle))
    }

    /// Returns a cursor at one entry with the given key, or at the end
    /// position if the key is absent.
    ///
    /// When the key has duplicates, the cursor lands on an arbitrary one of
    /// them; use [`equal_range`](BstMultimap::equal_range) for the whole run.
    ///
    /// # Examples
    ///
    /// ```
    /// use twig_tree::BstMultimap;
    ///
    /// let map = BstMultimap::from([(1, "a"), (2, "b")]);
    /// assert_eq!(map.find(&2).value(), Some(&"b"));
    /// assert!(map.find(&9).is_end());
    /// ```
    pub fn find<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        Cursor {
            raw: &self.raw,
            node: self.raw.search(key),
        }
    }

    /// Gets an iterator over the contiguous run of entries with the given
    /// key, in in-order sequence. The iterator is empty when the key is
    /// absent.
    ///
    /// Cost is O(height) for the initial search plus O(run length) for the
    /// walk to the run's edges.
    ///
    /// # Examples
    ///
    /// ```
    /// use twig_tree::BstMultimap;
    ///
    /// let map = BstMultimap::from([(21, "a"), (16, "b"), (21, "c")]);
    /// let run: Vec<_> = map.equal_range(&21).map(|(k, _)| *k).collect();
    /// assert_eq!(run, [21, 21]);
    /// assert_eq!(map.equal_range(&99).count(), 0);
    /// ```
    pub fn equal_range<Q>(&self, key: &Q) -> Range<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (front, past) = self.raw.equal_range(key);
        Range {
            raw: &self.raw,
            front,
            past,
        }
    }

    /// Returns the entry with the *least value* among all entries with the
    /// given key.
    ///
    /// Values, not keys, are compared; ties keep the entry found first in the
    /// run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] when no entry has the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use twig_tree::{BstMultimap, Error};
    ///
    /// let map = BstMultimap::from([(21, 4), (21, 1), (21, 9)]);
    /// assert_eq!(map.min(&21), Ok((&21, &1)));
    /// assert_eq!(map.min(&5), Err(Error::KeyNotFound));
    /// ```
    pub fn min<Q>(&self, key: &Q) -> Result<(&K, &V), Error>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
        V: Ord,
    {
        self.raw
            .best_in_run(key, Ordering::Less)
            .map(|handle| self.raw.pair(handle))
            .ok_or(Error::KeyNotFound)
    }

    /// Returns the entry with the *greatest value* among all entries with
    /// the given key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] when no entry has the key.
    pub fn max<Q>(&self, key: &Q) -> Result<(&K, &V), Error>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
        V: Ord,
    {
        self.raw
            .best_in_run(key, Ordering::Greater)
            .map(|handle| self.raw.pair(handle))
            .ok_or(Error::KeyNotFound)
    }

    /// Unique-key helper: replaces the value of the existing entry in place,
    /// or inserts a fresh entry. Only meaningful on trees kept free of
    /// duplicates by the caller (`BstMap`).
    pub(crate) fn replace_or_insert(&mut self, key: K, value: V) -> Option<V> {
        match self.raw.search(&key) {
            Some(handle) => Some(self.raw.replace_value(handle, value)),
            None => {
                self.raw.insert(key, value);
                None
            }
        }
    }

    /// Unique-key helper: returns the value under `key`, inserting `make()`
    /// first when the key is absent.
    pub(crate) fn get_or_insert_with(&mut self, key: K, make: impl FnOnce() -> V) -> &mut V {
        let handle = self.raw.search_or_insert_with(key, make);
        self.raw.value_mut(handle)
    }

    /// Removes one entry with the given key, returning its value. Only
    /// meaningful on trees kept free of duplicates by the caller (`BstMap`).
    pub(crate) fn remove_one<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key).map(|handle| self.raw.remove_at(handle))
    }
}

impl<K, V> Default for BstMultimap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone> Clone for BstMultimap<K, V> {
    fn clone(&self) -> Self {
        Self { raw: self.raw.clone() }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for BstMultimap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for BstMultimap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for BstMultimap<K, V> {}

impl<K: Hash, V: Hash> Hash for BstMultimap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for pair in self.iter() {
            pair.hash(state);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for BstMultimap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V> Extend<(K, V)> for BstMultimap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for BstMultimap<K, V> {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<'a, K, V> IntoIterator for &'a BstMultimap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut BstMultimap<K, V> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}

impl<K, V> IntoIterator for BstMultimap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(mut self) -> IntoIter<K, V> {
        IntoIter {
            inner: self.raw.drain_to_vec().into_iter(),
        }
    }
}

impl<'a, K, V> Cursor<'a, K, V> {
    /// Returns `true` if the cursor sits at the past-the-end position.
    #[must_use]
    pub const fn is_end(&self) -> bool {
        self.node.is_none()
    }

    /// Returns the key of the entry under the cursor, or `None` at the end
    /// position.
    #[must_use]
    pub fn key(&self) -> Option<&'a K> {
        self.node.map(|handle| self.raw.key(handle))
    }

    /// Returns the value of the entry under the cursor, or `None` at the end
    /// position.
    #[must_use]
    pub fn value(&self) -> Option<&'a V> {
        self.node.map(|handle| self.raw.value(handle))
    }

    /// Returns the entry under the cursor, or `None` at the end position.
    #[must_use]
    pub fn key_value(&self) -> Option<(&'a K, &'a V)> {
        self.node.map(|handle| self.raw.pair(handle))
    }

    /// Steps to the next entry in key order. Stepping past the last entry
    /// reaches the end position; stepping from the end position does
    /// nothing.
    pub fn move_next(&mut self) {
        if let Some(handle) = self.node {
            self.node = self.raw.next(handle);
        }
    }

    /// Steps to the previous entry in key order. Stepping from the end
    /// position reaches the last entry; stepping from the first entry
    /// reaches the end position.
    pub fn move_prev(&mut self) {
        self.node = match self.node {
            Some(handle) => self.raw.prev(handle),
            None => self.raw.last(),
        };
    }
}

impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Cursor<'_, K, V> {}

impl<K, V> PartialEq for Cursor<'_, K, V> {
    /// Two cursors are equal when they sit at the same position; all end
    /// cursors of a multimap compare equal.
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl<K, V> Eq for Cursor<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Cursor<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.key_value()).finish()
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.front.expect("`Iter::next()` - front exhausted with items remaining!");
        self.front = self.raw.next(handle);
        self.remaining -= 1;
        Some(self.raw.pair(handle))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<(&'a K, &'a V)> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.back.expect("`Iter::next_back()` - back exhausted with items remaining!");
        self.back = self.raw.prev(handle);
        self.remaining -= 1;
        Some(self.raw.pair(handle))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            raw: self.raw,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<(&'a K, &'a mut V)> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.front.expect("`IterMut::next()` - front exhausted with items remaining!");
        // SAFETY: The iterator holds the only access to the tree. Each handle
        // is yielded at most once (the front/back bounds never cross thanks
        // to `remaining`), so the returned &mut V is exclusive; the node
        // arena is only ever read.
        let key = unsafe { &RawBst::node_ptr(self.raw.cast_const(), handle).key };
        let value = unsafe { RawBst::value_mut_ptr(self.raw, handle) };
        self.front = unsafe { RawBst::next_ptr(self.raw.cast_const(), handle) };
        self.remaining -= 1;
        Some((key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> DoubleEndedIterator for IterMut<'a, K, V> {
    fn next_back(&mut self) -> Option<(&'a K, &'a mut V)> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.back.expect("`IterMut::next_back()` - back exhausted with items remaining!");
        // SAFETY: As in `next`.
        let key = unsafe { &RawBst::node_ptr(self.raw.cast_const(), handle).key };
        let value = unsafe { RawBst::value_mut_ptr(self.raw, handle) };
        self.back = unsafe { RawBst::prev_ptr(self.raw.cast_const(), handle) };
        self.remaining -= 1;
        Some((key, value))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

impl<'a, K, V> Iterator for Range<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        if self.front == self.past {
            return None;
        }
        let handle = self.front.expect("`Range::next()` - run ended before its past-the-end bound!");
        self.front = self.raw.next(handle);
        Some(self.raw.pair(handle))
    }
}

impl<K, V> FusedIterator for Range<'_, K, V> {}

impl<K, V> Clone for Range<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            raw: self.raw,
            front: self.front,
            past: self.past,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Range<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<(K, V)> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for Keys<'a, K, V> {
    fn next_back(&mut self) -> Option<&'a K> {
        self.inner.next_back().map(|(key, _)| key)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for Values<'a, K, V> {
    fn next_back(&mut self) -> Option<&'a V> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<&'a mut V> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for ValuesMut<'a, K, V> {
    fn next_back(&mut self) -> Option<&'a mut V> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

impl<K, V> Iterator for IntoKeys<K, V> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoKeys<K, V> {
    fn next_back(&mut self) -> Option<K> {
        self.inner.next_back().map(|(key, _)| key)
    }
}

impl<K, V> ExactSizeIterator for IntoKeys<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoKeys<K, V> {}

impl<K, V> Iterator for IntoValues<K, V> {
    type Item = V;

    fn next(&mut self) -> Option<V> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoValues<K, V> {
    fn next_back(&mut self) -> Option<V> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V> ExactSizeIterator for IntoValues<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoValues<K, V> {}
