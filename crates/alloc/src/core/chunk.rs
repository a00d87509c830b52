//! Owned heap blocks and the per-allocator chunk list
//!
//! Every byte an allocator hands out lives in a [`Chunk`] it owns. Chunks are
//! released in bulk by dropping the owning [`ChunkList`]; there is no chaining
//! pointer stored inside the block itself.

use core::alloc::Layout;
use core::ptr::{self, NonNull};
use std::alloc;

/// Builds a layout for a request the caller has already validated.
///
/// Sizes that cannot be described by a `Layout` are treated like any other
/// heap exhaustion: the process aborts instead of unwinding with a
/// half-updated allocator.
#[inline]
pub(crate) fn layout_for(size: usize, align: usize) -> Layout {
    match Layout::from_size_align(size, align) {
        Ok(layout) => layout,
        Err(_) => capacity_overflow(size),
    }
}

#[cold]
#[inline(never)]
fn capacity_overflow(size: usize) -> ! {
    panic!("capacity overflow: cannot allocate {size} bytes")
}

/// Allocates raw heap memory, aborting on exhaustion.
pub(crate) fn heap_alloc(layout: Layout) -> NonNull<u8> {
    debug_assert!(layout.size() > 0, "zero-sized heap allocation");
    // SAFETY: layout has a non-zero size (checked by every caller).
    let raw = unsafe { alloc::alloc(layout) };
    match NonNull::new(raw) {
        Some(ptr) => ptr,
        None => alloc::handle_alloc_error(layout),
    }
}

/// Releases memory obtained from [`heap_alloc`].
///
/// # Safety
/// `ptr` must have been returned by `heap_alloc(layout)` and not freed since.
pub(crate) unsafe fn heap_dealloc(ptr: NonNull<u8>, layout: Layout) {
    // SAFETY: forwarded caller contract.
    unsafe { alloc::dealloc(ptr.as_ptr(), layout) };
}

/// A heap block owned by exactly one allocator
pub(crate) struct Chunk {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl Chunk {
    /// Allocates a block for `layout`; optionally fills it with `pattern`
    pub(crate) fn allocate(layout: Layout, pattern: Option<u8>) -> Self {
        let ptr = heap_alloc(layout);
        if let Some(byte) = pattern {
            // SAFETY: ptr is valid for writes of layout.size() bytes.
            unsafe { ptr::write_bytes(ptr.as_ptr(), byte, layout.size()) };
        }
        Self { ptr, layout }
    }

    #[inline]
    pub(crate) fn start(&self) -> NonNull<u8> {
        self.ptr
    }

    #[inline]
    pub(crate) fn size(&self) -> usize {
        self.layout.size()
    }

    #[inline]
    pub(crate) fn contains(&self, addr: usize) -> bool {
        let start = self.ptr.as_ptr() as usize;
        addr >= start && addr < start + self.layout.size()
    }
}

impl Drop for Chunk {
    fn drop(&mut self) {
        // SAFETY: ptr/layout come from heap_alloc in Chunk::allocate and the
        // chunk is dropped exactly once.
        unsafe { heap_dealloc(self.ptr, self.layout) };
    }
}

/// Chunks owned by one allocator, released together
#[derive(Default)]
pub(crate) struct ChunkList {
    chunks: Vec<Chunk>,
    reserved: usize,
}

impl ChunkList {
    /// Takes ownership of `chunk` and returns its start
    pub(crate) fn push(&mut self, chunk: Chunk) -> NonNull<u8> {
        let start = chunk.start();
        self.reserved += chunk.size();
        self.chunks.push(chunk);
        start
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    pub(crate) fn reserved_bytes(&self) -> usize {
        self.reserved
    }

    pub(crate) fn contains(&self, addr: usize) -> bool {
        self.chunks.iter().any(|chunk| chunk.contains(addr))
    }

    /// Frees every chunk
    pub(crate) fn clear(&mut self) {
        self.chunks.clear();
        self.reserved = 0;
    }
}
