//! Stack-discipline scratch arena
//!
//! Bump-allocates from one contiguous buffer, either borrowed from the caller
//! or owned by the arena. Only the most recent in-buffer allocation can be
//! reclaimed individually; anything else stays in place until the arena is
//! reset. Requests that do not fit are served straight from the heap and must
//! be deallocated like any other allocation.
//!
//! # Safety
//!
//! - `top` is an offset into the buffer, never larger than `capacity`
//! - A pointer inside `[base, base + capacity)` belongs to the buffer; any
//!   other non-dangling pointer passed to `dealloc` is a heap fallback
//! - The buffer outlives the arena (`'buf`) or is owned by it

mod config;
mod frame;

pub use config::ScratchConfig;
pub use frame::ScratchFrame;

use core::alloc::Layout;
use core::cell::Cell;
use core::fmt;
use core::marker::PhantomData;
use core::ptr::{self, NonNull};

use crate::allocator::traits::{dangling, dangling_aligned, request_alignment};
use crate::allocator::{
    AllocResult, Allocator, AllocatorId, AllocatorStats, Counters, StatisticsProvider,
};
use crate::core::chunk::{Chunk, heap_alloc, heap_dealloc, layout_for};
use crate::core::{Alignment, DebugPatterns, MemoryUsage};
use crate::error::{MemoryError, MemoryResult};

/// Saved position of a [`ScratchArena`]
///
/// Returned by [`ScratchArena::mark`] and consumed by
/// [`ScratchArena::release`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScratchMarker {
    arena: AllocatorId,
    offset: usize,
}

impl ScratchMarker {
    /// Buffer offset this marker restores to
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// LIFO arena over one buffer with heap fallback
///
/// # Memory Layout
/// ```text
/// base                     top                  base + capacity
///  |  live allocations      |      free          |
/// ```
pub struct ScratchArena<'buf> {
    id: AllocatorId,
    base: NonNull<u8>,
    capacity: usize,
    owned: Option<Chunk>,
    top: Cell<usize>,
    patterns: DebugPatterns,
    fallbacks: Cell<usize>,
    fallback_bytes: Cell<usize>,
    counters: Counters,
    _buffer: PhantomData<&'buf mut [u8]>,
}

impl<'buf> ScratchArena<'buf> {
    /// Creates an arena over a buffer it owns
    ///
    /// # Errors
    /// Returns the error from [`ScratchConfig::validate`].
    pub fn new(config: ScratchConfig) -> MemoryResult<Self> {
        config.validate()?;

        let chunk = Chunk::allocate(layout_for(config.capacity, Alignment::MAX.get()), None);
        let base = chunk.start();

        log_debug!(capacity = config.capacity, "scratch arena allocated");

        Ok(Self {
            id: AllocatorId::new(),
            base,
            capacity: config.capacity,
            owned: Some(chunk),
            top: Cell::new(0),
            patterns: config.patterns,
            fallbacks: Cell::new(0),
            fallback_bytes: Cell::new(0),
            counters: Counters::default(),
            _buffer: PhantomData,
        })
    }

    /// Creates an arena over a caller-supplied buffer
    ///
    /// The buffer stays borrowed for the arena's lifetime. An empty buffer is
    /// allowed; every request then falls back to the heap.
    #[must_use]
    pub fn with_buffer(buffer: &'buf mut [u8]) -> Self {
        Self {
            id: AllocatorId::new(),
            base: NonNull::from(&mut *buffer).cast(),
            capacity: buffer.len(),
            owned: None,
            top: Cell::new(0),
            patterns: DebugPatterns::default(),
            fallbacks: Cell::new(0),
            fallback_bytes: Cell::new(0),
            counters: Counters::default(),
            _buffer: PhantomData,
        }
    }

    #[must_use]
    pub fn with_patterns(mut self, patterns: DebugPatterns) -> Self {
        self.patterns = patterns;
        self
    }

    /// Switches to a new caller-supplied buffer
    ///
    /// Every in-buffer allocation is discarded and an owned buffer is freed.
    /// Outstanding heap fallbacks stay valid and can still be deallocated.
    pub fn init(&mut self, buffer: &'buf mut [u8]) {
        self.base = NonNull::from(&mut *buffer).cast();
        self.capacity = buffer.len();
        self.owned = None;
        self.top.set(0);

        log_debug!(capacity = self.capacity, "scratch arena re-initialized");
    }

    /// Discards every in-buffer allocation
    pub fn reset(&mut self) {
        self.top.set(0);
        log_trace!("scratch arena reset");
    }

    /// Allocates `size` bytes aligned to `alignment`
    ///
    /// Falls back to the heap when the buffer cannot hold the request. A zero
    /// `size` yields a dangling, aligned pointer.
    #[must_use]
    pub fn alloc(&self, size: usize, alignment: Alignment) -> NonNull<u8> {
        if size == 0 {
            return dangling_aligned(alignment);
        }

        let ptr = match self.try_bump(size, alignment) {
            Some(ptr) => ptr,
            None => self.alloc_fallback(size, alignment),
        };

        debug_assert!(
            alignment.is_aligned(ptr.as_ptr() as usize),
            "scratch allocation is misaligned"
        );

        if let Some(pattern) = self.patterns.alloc {
            // SAFETY: ptr is valid for writes of size bytes just handed out.
            unsafe { ptr::write_bytes(ptr.as_ptr(), pattern, size) };
        }

        self.counters.record_alloc();
        ptr
    }

    /// Returns an allocation to the arena
    ///
    /// - the topmost in-buffer allocation moves the top back to `ptr`
    /// - any other in-buffer allocation is left in place until `reset`
    /// - a heap fallback is freed immediately
    ///
    /// # Safety
    /// - `ptr`, `size` and `alignment` must match an earlier `alloc` on this
    ///   arena that has not been deallocated, reset or released since
    /// - `ptr` must not be used afterwards
    pub unsafe fn dealloc(&self, ptr: NonNull<u8>, size: usize, alignment: Alignment) {
        if size == 0 {
            return;
        }

        if self.contains(ptr) {
            let offset = ptr.as_ptr() as usize - self.base.as_ptr() as usize;
            if offset + size == self.top.get() {
                self.poison(offset, size);
                self.top.set(offset);
            }
        } else {
            // SAFETY: pointers outside the buffer come from alloc_fallback
            // with this size and alignment (caller contract).
            unsafe { heap_dealloc(ptr, layout_for(size, alignment.get())) };
            self.fallbacks.set(self.fallbacks.get().saturating_sub(1));
            self.fallback_bytes
                .set(self.fallback_bytes.get().saturating_sub(size));
        }

        self.counters.record_dealloc();
    }

    /// Records the current top
    #[must_use]
    pub fn mark(&self) -> ScratchMarker {
        ScratchMarker {
            arena: self.id,
            offset: self.top.get(),
        }
    }

    /// Restores the top to `marker`, discarding everything allocated since
    ///
    /// Heap fallbacks are not affected and still need `dealloc`.
    ///
    /// # Errors
    /// - the marker was taken on a different arena
    /// - the marker lies above the current top (it was already released)
    ///
    /// # Safety
    /// In-buffer allocations made after `mark` must not be used afterwards.
    pub unsafe fn release(&self, marker: ScratchMarker) -> MemoryResult<()> {
        if marker.arena != self.id {
            return Err(MemoryError::invalid_operation(
                "marker belongs to a different scratch arena",
            ));
        }

        let top = self.top.get();
        if marker.offset > top {
            return Err(MemoryError::invalid_operation(
                "marker lies above the current top",
            ));
        }

        self.poison(marker.offset, top - marker.offset);
        self.top.set(marker.offset);
        Ok(())
    }

    /// Opens a frame that releases back to the current top when dropped
    ///
    /// # Safety
    /// Nothing allocated from the arena while the frame is open may be used
    /// after the frame is dropped; in particular no `PoolBox` or `PoolVec`
    /// created inside it may outlive it.
    #[must_use]
    pub unsafe fn frame(&self) -> ScratchFrame<'_, 'buf> {
        // SAFETY: forwarded caller contract.
        unsafe { ScratchFrame::new(self) }
    }

    /// Buffer size in bytes
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Offset of the first free byte
    #[inline]
    #[must_use]
    pub fn top(&self) -> usize {
        self.top.get()
    }

    /// Bytes left above the top (before alignment padding)
    #[inline]
    #[must_use]
    pub fn available(&self) -> usize {
        self.capacity - self.top.get()
    }

    /// Heap fallbacks not yet deallocated
    #[must_use]
    pub fn fallback_count(&self) -> usize {
        self.fallbacks.get()
    }

    /// Whether the buffer is owned by the arena
    #[must_use]
    pub fn owns_buffer(&self) -> bool {
        self.owned.is_some()
    }

    /// Checks whether `ptr` lies inside the buffer
    #[must_use]
    pub fn contains(&self, ptr: NonNull<u8>) -> bool {
        let start = self.base.as_ptr() as usize;
        let addr = ptr.as_ptr() as usize;
        addr >= start && addr - start < self.capacity
    }

    fn try_bump(&self, size: usize, alignment: Alignment) -> Option<NonNull<u8>> {
        let start = self.base.as_ptr() as usize;
        let top = self.top.get();
        let aligned = alignment.align_up(start + top) - start;
        let end = aligned.checked_add(size)?;

        if end > self.capacity {
            return None;
        }

        self.top.set(end);
        // SAFETY: aligned + size <= capacity, so the offset is inside the
        // buffer.
        Some(unsafe { self.base.add(aligned) })
    }

    #[cold]
    fn alloc_fallback(&self, size: usize, alignment: Alignment) -> NonNull<u8> {
        let ptr = heap_alloc(layout_for(size, alignment.get()));
        self.fallbacks.set(self.fallbacks.get() + 1);
        self.fallback_bytes.set(self.fallback_bytes.get() + size);

        log_trace!(
            size,
            top = self.top.get(),
            capacity = self.capacity,
            "scratch arena fell back to the heap"
        );
        ptr
    }

    fn poison(&self, offset: usize, len: usize) {
        if let Some(pattern) = self.patterns.dealloc {
            // SAFETY: offset + len <= top <= capacity and the range is no
            // longer handed out.
            unsafe { ptr::write_bytes(self.base.as_ptr().add(offset), pattern, len) };
        }
    }
}

impl Drop for ScratchArena<'_> {
    fn drop(&mut self) {
        let leaked = self.fallbacks.get();
        if leaked > 0 {
            log_warn!(
                leaked,
                bytes = self.fallback_bytes.get(),
                "scratch arena dropped with live heap fallbacks"
            );
        }
    }
}

impl fmt::Debug for ScratchArena<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScratchArena")
            .field("id", &self.id)
            .field("capacity", &self.capacity)
            .field("top", &self.top.get())
            .field("owned", &self.owned.is_some())
            .field("fallbacks", &self.fallbacks.get())
            .finish_non_exhaustive()
    }
}

// SAFETY: the buffer is owned by the arena or exclusively borrowed for
// `'buf`, and fallbacks are plain heap blocks, so moving the arena moves
// everything it points to. The `Cell` state keeps it `!Sync`; callers
// serialize access themselves.
unsafe impl Send for ScratchArena<'_> {}

// SAFETY: ScratchArena never hands out overlapping live ranges.
// - In-buffer allocations sit above the top at the time they are made
// - The top only moves down over ranges the caller gave back
// - Heap fallbacks are independent allocations
unsafe impl Allocator for ScratchArena<'_> {
    fn id(&self) -> AllocatorId {
        self.id
    }

    fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
        let alignment = request_alignment(layout)?;

        if layout.size() == 0 {
            return Ok(dangling(layout));
        }

        let ptr = self.alloc(layout.size(), alignment);
        Ok(NonNull::slice_from_raw_parts(ptr, layout.size()))
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if let Ok(alignment) = Alignment::from_layout(layout) {
            // SAFETY: caller guarantees ptr came from allocate with layout.
            unsafe { self.dealloc(ptr, layout.size(), alignment) };
        }
    }
}

impl MemoryUsage for ScratchArena<'_> {
    fn used_memory(&self) -> usize {
        self.top.get() + self.fallback_bytes.get()
    }

    fn total_memory(&self) -> Option<usize> {
        Some(self.capacity + self.fallback_bytes.get())
    }
}

impl StatisticsProvider for ScratchArena<'_> {
    fn statistics(&self) -> AllocatorStats {
        let owned = self.owned.as_ref().map_or(0, Chunk::size);
        AllocatorStats {
            allocation_count: self.counters.allocs(),
            deallocation_count: self.counters.deallocs(),
            chunk_count: usize::from(self.owned.is_some()),
            large_count: 0,
            reserved_bytes: owned + self.fallback_bytes.get(),
            live_fallbacks: self.fallbacks.get(),
        }
    }

    fn reset_statistics(&self) {
        self.counters.reset();
    }
}
