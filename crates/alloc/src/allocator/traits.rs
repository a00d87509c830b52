//! Allocator trait shared by the four pool types
//!
//! The inherent `alloc`/`dealloc` methods on each pool take sizes and
//! [`Alignment`] values and treat misuse as a debug-checked contract. This
//! trait is the container-facing surface: it speaks [`Layout`], rejects
//! layouts a pool cannot serve with an error instead of undefined behavior, and
//! carries the [`AllocatorId`] that adapters compare.
//!
//! # Safety
//!
//! Implementors must return pointers that are valid for reads and writes of
//! the reported length, aligned to the requested alignment, and not handed out
//! again until deallocated.

use core::alloc::Layout;
use core::num::NonZeroUsize;
use core::ptr::{self, NonNull};
use core::sync::atomic::{AtomicUsize, Ordering};

use crate::core::Alignment;
use crate::error::AllocResult;

/// Process-unique identity of one allocator instance
///
/// Two handles referring to the same pool share an id; two pools never do,
/// even when configured identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AllocatorId(NonZeroUsize);

impl AllocatorId {
    /// Generate a new unique allocator ID
    ///
    /// The only atomic in the crate; it runs once per construction and never
    /// on an allocation path.
    #[must_use]
    pub fn new() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(1);
        let id = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(NonZeroUsize::new(id).unwrap_or(NonZeroUsize::MIN))
    }

    /// Raw id value
    #[inline]
    #[must_use]
    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for AllocatorId {
    fn default() -> Self {
        Self::new()
    }
}

/// Allocator trait implemented by every pool type
///
/// # Safety
/// See the module documentation for the contract implementors uphold.
pub unsafe trait Allocator {
    /// Identity of the underlying pool instance
    fn id(&self) -> AllocatorId;

    /// Allocates memory for `layout`
    ///
    /// The returned slice length is the usable size of the block, which may
    /// exceed `layout.size()`. Zero-sized layouts yield a dangling, aligned
    /// pointer that must not be dereferenced.
    ///
    /// # Errors
    /// - alignment above 16 bytes
    /// - a layout the pool cannot serve (e.g. larger than a slab slot)
    fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>>;

    /// Deallocates memory at the given pointer with the specified layout
    ///
    /// # Safety
    /// - `ptr` must have been allocated by this allocator
    /// - `layout` must have the alignment of the original request and a size
    ///   between the requested size and the usable size that was returned
    /// - After this call, `ptr` becomes invalid and must not be used
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Usable bytes a request for `layout` would receive
    fn usable_size(&self, layout: Layout) -> usize {
        layout.size()
    }
}

/// Validates the alignment of a trait-level request
#[inline]
pub(crate) fn request_alignment(layout: Layout) -> AllocResult<Alignment> {
    Alignment::from_layout(layout)
}

/// Dangling pointer for zero-sized layouts
#[inline]
pub(crate) fn dangling(layout: Layout) -> NonNull<[u8]> {
    let ptr = NonNull::new(ptr::without_provenance_mut::<u8>(layout.align()))
        .unwrap_or(NonNull::dangling());
    NonNull::slice_from_raw_parts(ptr, 0)
}

/// Dangling pointer for zero-sized requests on the inherent `alloc` paths
#[inline]
pub(crate) fn dangling_aligned(alignment: Alignment) -> NonNull<u8> {
    NonNull::new(ptr::without_provenance_mut::<u8>(alignment.get())).unwrap_or(NonNull::dangling())
}

// ============================================================================
// Blanket implementations for references
// ============================================================================

// SAFETY: forwards every call to the underlying allocator.
unsafe impl<A: Allocator + ?Sized> Allocator for &A {
    fn id(&self) -> AllocatorId {
        (**self).id()
    }

    fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
        (**self).allocate(layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: same contract as A::deallocate.
        unsafe { (**self).deallocate(ptr, layout) }
    }

    fn usable_size(&self, layout: Layout) -> usize {
        (**self).usable_size(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = AllocatorId::new();
        let b = AllocatorId::new();
        assert_ne!(a, b);
        assert!(a.get() > 0);
    }

    #[test]
    fn test_dangling_is_aligned() {
        let layout = Layout::from_size_align(0, 16).unwrap();
        let ptr = dangling(layout);
        assert_eq!(ptr.cast::<u8>().as_ptr() as usize % 16, 0);
        assert_eq!(ptr.len(), 0);
    }
}
