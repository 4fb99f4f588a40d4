use core::borrow::Borrow;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;

use crate::bst_map::BstMap;
use crate::bst_multimap::{Cursor, IntoKeys, Keys};

/// An ordered set of unique values, built on [`BstMap`].
///
/// Each element is stored as both key and value of the underlying map, so
/// the set inherits every map invariant with key and value identical:
/// inserting an element that is already present is a no-op, and lookups cost
/// one tree descent.
///
/// # Examples
///
/// ```
/// use twig_tree::BstSet;
///
/// let mut seen = BstSet::new();
///
/// assert!(!seen.contains(&20));
/// assert!(seen.insert(20));
/// assert!(seen.contains(&20));
///
/// // A second insert of the same value changes nothing.
/// assert!(!seen.insert(20));
/// assert_eq!(seen.len(), 1);
///
/// assert!(seen.remove(&20));
/// assert!(!seen.contains(&20));
/// ```
pub struct BstSet<T> {
    map: BstMap<T, T>,
}

/// An iterator over the elements of a `BstSet`, in sorted order.
///
/// This `struct` is created by the [`iter`] method on [`BstSet`].
///
/// [`iter`]: BstSet::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T> {
    inner: Keys<'a, T, T>,
}

/// An owning iterator over the elements of a `BstSet`, in sorted order.
///
/// This `struct` is created by the [`into_iter`] method on [`BstSet`]
/// (provided by the [`IntoIterator`] trait).
///
/// [`into_iter`]: IntoIterator::into_iter
pub struct IntoIter<T> {
    inner: IntoKeys<T, T>,
}

impl<T> BstSet<T> {
    /// Makes a new, empty `BstSet`.
    ///
    /// Does not allocate anything on its own.
    #[must_use]
    pub const fn new() -> Self {
        Self { map: BstMap::new() }
    }

    /// Returns the number of elements in the set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the set contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Clears the set, removing all elements.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Gets an iterator over the elements, in sorted order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { inner: self.map.keys() }
    }

    /// Returns the least element of the set.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.map.first().map(|(element, _)| element)
    }

    /// Returns the greatest element of the set.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.map.last().map(|(element, _)| element)
    }
}

impl<T: Ord> BstSet<T> {
    /// Adds a value to the set.
    ///
    /// Returns `true` if the set did not previously contain it.
    pub fn insert(&mut self, value: T) -> bool
    where
        T: Clone,
    {
        self.map.insert(value.clone(), value).is_none()
    }

    /// Returns `true` if the set contains the value.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.contains_key(value)
    }

    /// Returns a cursor at the entry for the value, or at the end position
    /// if the value is absent.
    pub fn find<Q>(&self, value: &Q) -> Cursor<'_, T, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.find(value)
    }

    /// Removes a value from the set. Returns `true` if it was present.
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.remove(value).is_some()
    }
}

impl<T> Default for BstSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for BstSet<T> {
    fn clone(&self) -> Self {
        Self {
            map: self.map.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for BstSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for BstSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl<T: Eq> Eq for BstSet<T> {}

impl<T: Hash> Hash for BstSet<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.map.hash(state);
    }
}

impl<T: Clone + Ord> FromIterator<T> for BstSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T: Clone + Ord> Extend<T> for BstSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T: Clone + Ord, const N: usize> From<[T; N]> for BstSet<T> {
    fn from(elements: [T; N]) -> Self {
        elements.into_iter().collect()
    }
}

impl<'a, T> IntoIterator for &'a BstSet<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T> IntoIterator for BstSet<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter {
            inner: self.map.into_keys(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T> FusedIterator for IntoIter<T> {}
