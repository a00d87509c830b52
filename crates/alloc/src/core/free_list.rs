//! Intrusive free list
//!
//! A freed block's first pointer-sized bytes are reused as the link to the
//! next free block. The list is private to the allocator that owns the blocks;
//! callers never observe a node.

use core::cell::Cell;
use core::ptr::NonNull;

/// Node in the free list
///
/// Overlays the leading bytes of a free block.
#[repr(C)]
struct FreeNode {
    next: Option<NonNull<FreeNode>>,
}

/// LIFO chain of free, equally sized blocks
#[derive(Default)]
pub(crate) struct FreeList {
    head: Cell<Option<NonNull<FreeNode>>>,
    len: Cell<usize>,
}

impl FreeList {
    pub(crate) const fn new() -> Self {
        Self {
            head: Cell::new(None),
            len: Cell::new(0),
        }
    }

    /// Pushes a block onto the list
    ///
    /// # Safety
    /// - `block` must be valid for writes of a pointer and aligned for one
    /// - the caller gives up the block until it is popped again
    pub(crate) unsafe fn push(&self, block: NonNull<u8>) {
        debug_assert!(
            (block.as_ptr() as usize) % core::mem::align_of::<FreeNode>() == 0,
            "free-list block is not pointer aligned"
        );
        let node = block.cast::<FreeNode>();
        // SAFETY: caller guarantees the block is writable, aligned and no
        // longer in use.
        unsafe {
            node.as_ptr().write(FreeNode {
                next: self.head.get(),
            });
        }
        self.head.set(Some(node));
        self.len.set(self.len.get() + 1);
    }

    /// Pops the most recently pushed block
    pub(crate) fn pop(&self) -> Option<NonNull<u8>> {
        let node = self.head.get()?;
        // SAFETY: every node on the list was written by `push` and its block
        // is untouched until it is popped here.
        let next = unsafe { node.as_ptr().read().next };
        self.head.set(next);
        self.len.set(self.len.get() - 1);
        Some(node.cast())
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len.get()
    }

    /// Forgets every node; the backing memory is released by its owner
    pub(crate) fn clear(&self) {
        self.head.set(None);
        self.len.set(0);
    }
}
