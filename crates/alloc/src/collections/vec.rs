//! Growable array backed by a pool

use core::fmt;
use core::ops::{Deref, DerefMut};
use core::ptr::{self, NonNull};
use core::slice;

use crate::adapter::PoolAdapter;
use crate::allocator::{AllocResult, Allocator};
use crate::error::MemoryError;

/// Minimal `Vec` that draws storage through a [`PoolAdapter`]
///
/// Grows by doubling. Capacity always reflects what the pool actually handed
/// out, so a bucket pool's class rounding is used rather than wasted.
pub struct PoolVec<'a, T, A: Allocator + ?Sized> {
    ptr: NonNull<T>,
    cap: usize,
    len: usize,
    adapter: PoolAdapter<'a, T, A>,
}

impl<'a, T, A: Allocator + ?Sized> PoolVec<'a, T, A> {
    const MIN_CAPACITY: usize = 4;

    /// Empty vector; nothing is allocated until the first push
    #[must_use]
    pub fn new_in(pool: &'a A) -> Self {
        let cap = if core::mem::size_of::<T>() == 0 { usize::MAX } else { 0 };
        Self {
            ptr: NonNull::dangling(),
            cap,
            len: 0,
            adapter: PoolAdapter::new(pool),
        }
    }

    /// Vector with room for at least `capacity` values
    ///
    /// # Errors
    /// Fails if the pool rejects the storage layout.
    pub fn with_capacity_in(capacity: usize, pool: &'a A) -> AllocResult<Self> {
        let mut vec = Self::new_in(pool);
        vec.reserve(capacity)?;
        Ok(vec)
    }

    /// The adapter storage is drawn through
    #[must_use]
    pub fn adapter(&self) -> PoolAdapter<'a, T, A> {
        self.adapter
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Makes room for `additional` more values
    ///
    /// # Errors
    /// Fails if the new capacity overflows or the pool rejects it; the vector
    /// is unchanged in that case.
    pub fn reserve(&mut self, additional: usize) -> AllocResult<()> {
        let needed = self
            .len
            .checked_add(additional)
            .ok_or_else(|| MemoryError::size_overflow("vector capacity"))?;
        if needed <= self.cap {
            return Ok(());
        }

        let target = needed
            .max(self.cap.saturating_mul(2))
            .max(Self::MIN_CAPACITY);
        let (ptr, cap) = self.adapter.allocate_at_least(target)?;

        if self.cap > 0 {
            // SAFETY: the old buffer holds len initialized values, the new one
            // has room for at least needed >= len, and they do not overlap.
            unsafe {
                ptr::copy_nonoverlapping(self.ptr.as_ptr(), ptr.as_ptr(), self.len);
                self.adapter.deallocate(self.ptr, self.cap);
            }
        }

        self.ptr = ptr;
        self.cap = cap;
        Ok(())
    }

    /// Appends a value
    ///
    /// # Errors
    /// Fails if growing the storage fails; `value` is dropped in that case.
    pub fn push(&mut self, value: T) -> AllocResult<()> {
        if self.len == self.cap {
            self.reserve(1)?;
        }
        // SAFETY: len < cap, so the slot is inside the allocation and
        // uninitialized.
        unsafe { self.adapter.construct(self.ptr.add(self.len), value) };
        self.len += 1;
        Ok(())
    }

    /// Removes the last value
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot at the old last index is initialized and is no
        // longer counted by len.
        Some(unsafe { ptr::read(self.ptr.as_ptr().add(self.len)) })
    }

    /// Drops every value, keeping the storage
    pub fn clear(&mut self) {
        let values = ptr::slice_from_raw_parts_mut(self.ptr.as_ptr(), self.len);
        self.len = 0;
        // SAFETY: the slice covers exactly the initialized values, which are
        // no longer counted by len.
        unsafe { ptr::drop_in_place(values) };
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: ptr is aligned and non-null and the first len values are
        // initialized.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in as_slice, and &mut self is exclusive.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<T: Clone, A: Allocator + ?Sized> PoolVec<'_, T, A> {
    /// Appends clones of every value in `values`
    ///
    /// # Errors
    /// Fails if growing the storage fails.
    pub fn extend_from_slice(&mut self, values: &[T]) -> AllocResult<()> {
        self.reserve(values.len())?;
        for value in values {
            self.push(value.clone())?;
        }
        Ok(())
    }
}

impl<T, A: Allocator + ?Sized> Deref for PoolVec<'_, T, A> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: Allocator + ?Sized> DerefMut for PoolVec<'_, T, A> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, A: Allocator + ?Sized> Drop for PoolVec<'_, T, A> {
    fn drop(&mut self) {
        self.clear();
        if core::mem::size_of::<T>() != 0 && self.cap > 0 {
            // SAFETY: ptr/cap come from allocate_at_least on this adapter.
            unsafe { self.adapter.deallocate(self.ptr, self.cap) };
        }
    }
}

impl<T: fmt::Debug, A: Allocator + ?Sized> fmt::Debug for PoolVec<'_, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
