use core::borrow::Borrow;
use core::fmt;
use core::hash::{Hash, Hasher};

use crate::bst_multimap::{BstMultimap, Cursor, IntoIter, IntoKeys, IntoValues, Iter, IterMut, Keys, Values, ValuesMut};
use crate::error::Error;

/// An ordered map with unique keys, built on [`BstMultimap`].
///
/// Every operation delegates to the underlying tree; the map's only job is
/// the uniqueness invariant: inserting a key that is already present replaces
/// the stored value, so at most one entry per key ever exists.
///
/// The two lookup styles are deliberately split:
///
/// - [`get_or_insert`](BstMap::get_or_insert) may grow the map, creating a
///   default entry for an absent key before handing out a mutable reference.
/// - [`get`](BstMap::get) never mutates; an absent key is reported as
///   [`Error::KeyNotFound`], never papered over with a default.
///
/// # Examples
///
/// ```
/// use twig_tree::BstMap;
///
/// let mut prices = BstMap::new();
/// prices.insert("apple", 3);
/// prices.insert("pear", 4);
///
/// // Re-inserting a key replaces the value and returns the old one.
/// assert_eq!(prices.insert("apple", 5), Some(3));
/// assert_eq!(prices.len(), 2);
///
/// assert_eq!(prices.get(&"apple"), Ok(&5));
/// assert!(prices.get(&"quince").is_err());
/// ```
pub struct BstMap<K, V> {
    tree: BstMultimap<K, V>,
}

impl<K, V> BstMap<K, V> {
    /// Makes a new, empty `BstMap`.
    ///
    /// Does not allocate anything on its own.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tree: BstMultimap::new(),
        }
    }

    /// Returns the number of entries in the map.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Clears the map, removing all entries.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Gets an iterator over the entries, sorted by key.
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.tree.iter()
    }

    /// Gets a mutable iterator over the entries, sorted by key.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        self.tree.iter_mut()
    }

    /// Gets an iterator over the keys, in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        self.tree.keys()
    }

    /// Gets an iterator over the values, ordered by their keys.
    pub fn values(&self) -> Values<'_, K, V> {
        self.tree.values()
    }

    /// Gets a mutable iterator over the values, ordered by their keys.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        self.tree.values_mut()
    }

    /// Creates a consuming iterator over the keys, in sorted order.
    #[must_use = "`self` will be dropped if the result is not used"]
    pub fn into_keys(self) -> IntoKeys<K, V> {
        self.tree.into_keys()
    }

    /// Creates a consuming iterator over the values, ordered by their keys.
    #[must_use = "`self` will be dropped if the result is not used"]
    pub fn into_values(self) -> IntoValues<K, V> {
        self.tree.into_values()
    }

    /// Returns a cursor at the first entry in key order, or at the end
    /// position if the map is empty.
    #[must_use]
    pub fn cursor_front(&self) -> Cursor<'_, K, V> {
        self.tree.cursor_front()
    }

    /// Returns a cursor at the last entry in key order, or at the end
    /// position if the map is empty.
    #[must_use]
    pub fn cursor_back(&self) -> Cursor<'_, K, V> {
        self.tree.cursor_back()
    }

    /// Returns the first entry in key order.
    #[must_use]
    pub fn first(&self) -> Option<(&K, &V)> {
        self.tree.first()
    }

    /// Returns the last entry in key order.
    #[must_use]
    pub fn last(&self) -> Option<(&K, &V)> {
        self.tree.last()
    }
}

impl<K: Ord, V> BstMap<K, V> {
    /// Inserts a key-value pair into the map.
    ///
    /// If the key is already present its value is replaced and the previous
    /// value returned; the map's length is unchanged in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use twig_tree::BstMap;
    ///
    /// let mut map = BstMap::new();
    /// assert_eq!(map.insert(15, "hello"), None);
    /// assert_eq!(map.insert(15, "world"), Some("hello"));
    /// assert_eq!(map.len(), 1);
    /// assert_eq!(map.get(&15), Ok(&"world"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.tree.replace_or_insert(key, value)
    }

    /// Returns a reference to the value stored under the key.
    ///
    /// This accessor never mutates the map.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] when the key is absent.
    pub fn get<Q>(&self, key: &Q) -> Result<&V, Error>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.get(key).ok_or(Error::KeyNotFound)
    }

    /// Returns a mutable reference to the value stored under the key, or
    /// `None` when the key is absent.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.get_mut(key)
    }

    /// Returns a mutable reference to the value stored under the key,
    /// inserting the value type's default first when the key is absent.
    ///
    /// This is the associative-array-style accessor: reading through it can
    /// grow the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use twig_tree::BstMap;
    ///
    /// let mut counts: BstMap<&str, u32> = BstMap::new();
    /// *counts.get_or_insert("six") += 1;
    /// *counts.get_or_insert("six") += 1;
    /// assert_eq!(counts.get(&"six"), Ok(&2));
    /// assert_eq!(counts.len(), 1);
    /// ```
    pub fn get_or_insert(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.tree.get_or_insert_with(key, V::default)
    }

    /// Like [`get_or_insert`](BstMap::get_or_insert), but the absent-key
    /// value comes from the given closure.
    pub fn get_or_insert_with(&mut self, key: K, make: impl FnOnce() -> V) -> &mut V {
        self.tree.get_or_insert_with(key, make)
    }

    /// Returns `true` if the map contains the key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.contains_key(key)
    }

    /// Returns a cursor at the entry with the given key, or at the end
    /// position if the key is absent.
    pub fn find<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.find(key)
    }

    /// Removes the entry with the given key, returning its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.remove_one(key)
    }
}

impl<K, V> Default for BstMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone> Clone for BstMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for BstMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for BstMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree
    }
}

impl<K: Eq, V: Eq> Eq for BstMap<K, V> {}

impl<K: Hash, V: Hash> Hash for BstMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tree.hash(state);
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for BstMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V> Extend<(K, V)> for BstMap<K, V> {
    /// Later pairs win when the iterator repeats a key.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for BstMap<K, V> {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<'a, K, V> IntoIterator for &'a BstMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut BstMap<K, V> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}

impl<K, V> IntoIterator for BstMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        self.tree.into_iter()
    }
}
