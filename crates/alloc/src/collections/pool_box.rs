//! Smart pointer for pool-allocated objects

use core::fmt;
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};
use core::ptr::{self, NonNull};

use crate::adapter;
use crate::allocator::{AllocResult, Allocator};

/// RAII smart pointer for pool-allocated values
///
/// Drops the value and returns its memory to the pool when dropped. The pool
/// stays borrowed for the box's lifetime.
pub struct PoolBox<'a, T, A: Allocator + ?Sized> {
    ptr: NonNull<T>,
    pool: &'a A,
    _owns: PhantomData<T>,
}

impl<'a, T, A: Allocator + ?Sized> PoolBox<'a, T, A> {
    /// Moves `value` into memory allocated from `pool`
    ///
    /// # Errors
    /// Fails if the pool rejects `T`'s layout.
    pub fn new_in(value: T, pool: &'a A) -> AllocResult<Self> {
        let ptr = adapter::create(pool, value)?;
        Ok(Self {
            ptr,
            pool,
            _owns: PhantomData,
        })
    }

    /// The pool the value lives in
    #[must_use]
    pub fn allocator(this: &Self) -> &'a A {
        this.pool
    }

    /// Raw pointer to the value
    #[must_use]
    pub fn as_ptr(this: &Self) -> NonNull<T> {
        this.ptr
    }

    /// Consumes the box and returns the contained value
    #[must_use]
    pub fn into_inner(this: Self) -> T {
        let this = core::mem::ManuallyDrop::new(this);
        // SAFETY: ptr holds an initialized T owned by this box; the box is
        // not dropped, so the value is read exactly once.
        let value = unsafe { ptr::read(this.ptr.as_ptr()) };
        // SAFETY: the storage came from create on this pool and the value
        // has been moved out.
        unsafe {
            this.pool
                .deallocate(this.ptr.cast(), core::alloc::Layout::new::<T>());
        }
        value
    }
}

impl<T, A: Allocator + ?Sized> Deref for PoolBox<'_, T, A> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: ptr holds an initialized T owned by this box.
        unsafe { self.ptr.as_ref() }
    }
}

impl<T, A: Allocator + ?Sized> DerefMut for PoolBox<'_, T, A> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: ptr holds an initialized T and &mut self is exclusive.
        unsafe { self.ptr.as_mut() }
    }
}

impl<T, A: Allocator + ?Sized> Drop for PoolBox<'_, T, A> {
    fn drop(&mut self) {
        // SAFETY: ptr came from create on this pool and is dropped once.
        unsafe { adapter::destroy(self.pool, self.ptr) };
    }
}

impl<T: fmt::Debug, A: Allocator + ?Sized> fmt::Debug for PoolBox<'_, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<T: fmt::Display, A: Allocator + ?Sized> fmt::Display for PoolBox<'_, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&**self, f)
    }
}

impl<T: PartialEq, A: Allocator + ?Sized> PartialEq for PoolBox<'_, T, A> {
    fn eq(&self, other: &Self) -> bool {
        **self == **other
    }
}
