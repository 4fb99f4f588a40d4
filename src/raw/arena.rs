use alloc::vec::Vec;

use super::handle::Handle;

/// Slot storage with a free list.
///
/// Handles stay valid for the lifetime of the element they name, regardless
/// of how many other elements are allocated or freed in between. Dropping or
/// clearing the arena releases every live element with no ordering
/// constraint, which is what lets the tree tear down without walking parent
/// or child links.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<Handle>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.free.len())
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        if let Some(h) = self.free.pop() {
            // Reuse a free slot/handle.
            self.slots[h.to_index()] = Some(element);
            h
        } else {
            // Strict less-than: slots.len() < Handle::MAX before the push
            // keeps every live index representable as a Handle.
            assert!(
                self.slots.len() < Handle::MAX,
                "`Arena::alloc()` - arena is at maximum capacity ({})",
                Handle::MAX
            );
            self.slots.push(Some(element));
            Handle::from_index(self.slots.len() - 1)
        }
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        self.slots[handle.to_index()].as_ref().expect("`Arena::get()` - `handle` is invalid!")
    }

    /// Returns a reference to an element by handle from a raw pointer.
    ///
    /// # Safety
    /// - `ptr` must point to a valid, allocated `Arena<T>`.
    #[inline]
    pub(crate) unsafe fn get_ptr<'a>(ptr: *const Self, handle: Handle) -> &'a T {
        // SAFETY: Caller guarantees ptr is valid. We only read from the slots field.
        unsafe { (&(*ptr).slots)[handle.to_index()].as_ref().expect("`Arena::get_ptr()` - `handle` is invalid!") }
    }

    /// Returns a mutable reference to an element by handle from a raw pointer.
    ///
    /// # Safety
    /// - `ptr` must point to a valid, allocated `Arena<T>`.
    /// - The caller must have logical exclusive access to the element at `handle`.
    #[inline]
    pub(crate) unsafe fn get_mut_ptr<'a>(ptr: *mut Self, handle: Handle) -> &'a mut T {
        // SAFETY: Caller guarantees ptr validity and exclusive access to this slot.
        unsafe { (&mut (*ptr).slots)[handle.to_index()].as_mut().expect("`Arena::get_mut_ptr()` - `handle` is invalid!") }
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.slots[handle.to_index()].as_mut().expect("`Arena::get_mut()` - `handle` is invalid!")
    }

    /// Returns mutable references to two distinct elements at once.
    pub(crate) fn get2_mut(&mut self, a: Handle, b: Handle) -> (&mut T, &mut T) {
        let (ai, bi) = (a.to_index(), b.to_index());
        assert_ne!(ai, bi, "`Arena::get2_mut()` - handles must be distinct!");
        let (first, second) = self.slots.split_at_mut(ai.max(bi));
        let (lo, hi) = (
            first[ai.min(bi)].as_mut().expect("`Arena::get2_mut()` - `handle` is invalid!"),
            second[0].as_mut().expect("`Arena::get2_mut()` - `handle` is invalid!"),
        );
        if ai < bi { (lo, hi) } else { (hi, lo) }
    }

    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let element = self.slots[handle.to_index()].take().expect("`Arena::take()` - `handle` is invalid!");
        self.free.push(handle);
        element
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}
