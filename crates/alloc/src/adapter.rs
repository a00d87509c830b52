//! Container-facing adapters over the pool allocators
//!
//! [`PoolAdapter`] is a typed, copyable handle to one pool instance. It
//! borrows the pool, so no adapter can outlive it, and two adapters compare
//! equal exactly when they refer to the same instance, whatever their element
//! types.
//!
//! [`create`] and [`destroy`] place a single value in any pool without an
//! adapter.

use core::alloc::Layout;
use core::fmt;
use core::marker::PhantomData;
use core::ptr::{self, NonNull};

use crate::allocator::{
    AllocResult, Allocator, BucketPool, BumpChunks, ScratchArena, SlabPool,
};
use crate::error::MemoryError;

/// Typed allocation handle over a pool
pub struct PoolAdapter<'a, T, A: Allocator + ?Sized> {
    pool: &'a A,
    _marker: PhantomData<fn() -> T>,
}

/// Adapter over a [`SlabPool`]
pub type SlabAdapter<'a, T> = PoolAdapter<'a, T, SlabPool>;

/// Adapter over a [`BumpChunks`]
pub type BumpAdapter<'a, T> = PoolAdapter<'a, T, BumpChunks>;

/// Adapter over a [`ScratchArena`]
pub type ScratchAdapter<'a, 'buf, T> = PoolAdapter<'a, T, ScratchArena<'buf>>;

/// Adapter over a [`BucketPool`]
pub type BucketAdapter<'a, T> = PoolAdapter<'a, T, BucketPool>;

impl<'a, T, A: Allocator + ?Sized> PoolAdapter<'a, T, A> {
    /// Copying a container does not carry its adapter along
    pub const PROPAGATE_ON_COPY: bool = false;

    /// Adapters are equal only when they share a pool instance
    pub const IS_ALWAYS_EQUAL: bool = false;

    #[inline]
    #[must_use]
    pub const fn new(pool: &'a A) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }

    /// The underlying pool
    #[inline]
    #[must_use]
    pub fn allocator(&self) -> &'a A {
        self.pool
    }

    /// Allocates uninitialized storage for `n` values
    ///
    /// # Errors
    /// - the array size overflows
    /// - the pool rejects the layout
    pub fn allocate(&self, n: usize) -> AllocResult<NonNull<T>> {
        self.allocate_at_least(n).map(|(ptr, _)| ptr)
    }

    /// Allocates storage for at least `n` values and reports how many fit
    ///
    /// The returned capacity may be passed to [`deallocate`](Self::deallocate)
    /// in place of `n`.
    ///
    /// # Errors
    /// Same as [`allocate`](Self::allocate).
    pub fn allocate_at_least(&self, n: usize) -> AllocResult<(NonNull<T>, usize)> {
        let layout = array_layout::<T>(n)?;
        let block = self.pool.allocate(layout)?;

        let capacity = match core::mem::size_of::<T>() {
            0 => usize::MAX,
            size => block.len() / size,
        };
        Ok((block.cast::<T>(), capacity))
    }

    /// Returns storage for `n` values to the pool
    ///
    /// # Safety
    /// - `ptr` must come from `allocate`/`allocate_at_least` on an adapter
    ///   over the same pool
    /// - `n` must be the requested count or the reported capacity
    /// - any values still in the storage are not dropped
    pub unsafe fn deallocate(&self, ptr: NonNull<T>, n: usize) {
        if let Ok(layout) = array_layout::<T>(n) {
            // SAFETY: forwarded caller contract.
            unsafe { self.pool.deallocate(ptr.cast(), layout) };
        }
    }

    /// Moves `value` into uninitialized storage
    ///
    /// # Safety
    /// `ptr` must be valid for writes and properly aligned.
    pub unsafe fn construct(&self, ptr: NonNull<T>, value: T) {
        // SAFETY: forwarded caller contract.
        unsafe { ptr.as_ptr().write(value) };
    }

    /// Runs the destructor of the value at `ptr`, leaving the storage
    ///
    /// # Safety
    /// `ptr` must point to an initialized value that is not used afterwards.
    pub unsafe fn destroy(&self, ptr: NonNull<T>) {
        // SAFETY: forwarded caller contract.
        unsafe { ptr::drop_in_place(ptr.as_ptr()) };
    }

    /// Same pool, different element type
    #[inline]
    #[must_use]
    pub fn rebind<U>(&self) -> PoolAdapter<'a, U, A> {
        PoolAdapter::new(self.pool)
    }

    /// Largest `n` whose array layout can be described
    #[must_use]
    pub fn max_size(&self) -> usize {
        isize::MAX as usize / core::mem::size_of::<T>().max(1)
    }
}

fn array_layout<T>(n: usize) -> AllocResult<Layout> {
    Layout::array::<T>(n).map_err(|_| MemoryError::size_overflow("array layout"))
}

impl<T, A: Allocator + ?Sized> Clone for PoolAdapter<'_, T, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, A: Allocator + ?Sized> Copy for PoolAdapter<'_, T, A> {}

impl<T, U, A, B> PartialEq<PoolAdapter<'_, U, B>> for PoolAdapter<'_, T, A>
where
    A: Allocator + ?Sized,
    B: Allocator + ?Sized,
{
    fn eq(&self, other: &PoolAdapter<'_, U, B>) -> bool {
        self.pool.id() == other.pool.id()
    }
}

impl<T, A: Allocator + ?Sized> Eq for PoolAdapter<'_, T, A> {}

impl<T, A: Allocator + ?Sized> fmt::Debug for PoolAdapter<'_, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolAdapter")
            .field("pool", &self.pool.id())
            .field("element", &core::any::type_name::<T>())
            .finish()
    }
}

/// Allocates a `T` from `pool` and moves `value` into it
///
/// # Errors
/// Fails if the pool rejects `T`'s layout; `value` is dropped in that case.
pub fn create<T, A: Allocator + ?Sized>(pool: &A, value: T) -> AllocResult<NonNull<T>> {
    let ptr = pool.allocate(Layout::new::<T>())?.cast::<T>();
    // SAFETY: ptr is fresh storage sized and aligned for T.
    unsafe { ptr.as_ptr().write(value) };
    Ok(ptr)
}

/// Drops the value at `ptr` and returns its storage to `pool`
///
/// # Safety
/// `ptr` must come from [`create`] on the same pool and not be used
/// afterwards.
pub unsafe fn destroy<T, A: Allocator + ?Sized>(pool: &A, ptr: NonNull<T>) {
    // SAFETY: caller guarantees ptr holds a live T created in pool.
    unsafe {
        ptr::drop_in_place(ptr.as_ptr());
        pool.deallocate(ptr.cast(), Layout::new::<T>());
    }
}
