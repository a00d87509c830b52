//! Grow-only chunked bump allocator
//!
//! Allocations advance a cursor through the newest chunk. When the chunk runs
//! out a fresh one is allocated and the tail of the old one is abandoned.
//! Requests above the large threshold get a dedicated heap block instead.
//! Nothing is reclaimed individually; `clear`, `init` and drop release
//! everything at once.
//!
//! # Safety
//!
//! - Every chunk is allocated with 16-byte alignment, so any request that fits
//!   a fresh chunk needs no padding there
//! - `remaining` is the number of bytes between `cursor` and the end of the
//!   newest chunk
//! - Memory is only released with exclusive access

mod config;

pub use config::BumpConfig;

use core::alloc::Layout;
use core::cell::{Cell, RefCell};
use core::fmt;
use core::ptr::{self, NonNull};

use crate::allocator::traits::{dangling, dangling_aligned, request_alignment};
use crate::allocator::{
    AllocResult, Allocator, AllocatorId, AllocatorStats, Counters, StatisticsProvider,
};
use crate::core::chunk::{Chunk, ChunkList, layout_for};
use crate::core::{Alignment, MemoryUsage};
use crate::error::MemoryResult;

/// Grow-only allocator over a list of chunks
pub struct BumpChunks {
    id: AllocatorId,
    config: BumpConfig,
    large_size: usize,
    chunks: RefCell<ChunkList>,
    large: RefCell<ChunkList>,
    cursor: Cell<NonNull<u8>>,
    remaining: Cell<usize>,
    used: Cell<usize>,
    counters: Counters,
}

impl BumpChunks {
    /// Creates an empty allocator; the first chunk is allocated on demand
    ///
    /// # Errors
    /// Returns the error from [`BumpConfig::validate`].
    pub fn new(config: BumpConfig) -> MemoryResult<Self> {
        Self::build(AllocatorId::new(), config)
    }

    fn build(id: AllocatorId, config: BumpConfig) -> MemoryResult<Self> {
        config.validate()?;
        let large_size = config.effective_large_size();

        log_debug!(
            chunk_size = config.chunk_size,
            large_size,
            "bump allocator configured"
        );

        Ok(Self {
            id,
            config,
            large_size,
            chunks: RefCell::new(ChunkList::default()),
            large: RefCell::new(ChunkList::default()),
            cursor: Cell::new(NonNull::dangling()),
            remaining: Cell::new(0),
            used: Cell::new(0),
            counters: Counters::default(),
        })
    }

    /// Re-initializes with a new configuration, releasing all memory
    ///
    /// On error the allocator is left untouched.
    ///
    /// # Errors
    /// Returns the error from [`BumpConfig::validate`].
    pub fn init(&mut self, config: BumpConfig) -> MemoryResult<()> {
        *self = Self::build(self.id, config)?;
        Ok(())
    }

    /// Allocates `size` bytes aligned to `alignment`
    ///
    /// A zero `size` yields a dangling, aligned pointer.
    #[must_use]
    pub fn alloc(&self, size: usize, alignment: Alignment) -> NonNull<u8> {
        if size == 0 {
            return dangling_aligned(alignment);
        }

        let ptr = if size > self.large_size {
            self.alloc_large(size, alignment)
        } else {
            match self.try_bump(size, alignment) {
                Some(ptr) => ptr,
                None => self.grow_for(size),
            }
        };

        debug_assert!(
            alignment.is_aligned(ptr.as_ptr() as usize),
            "bump allocation is misaligned"
        );

        if let Some(pattern) = self.config.patterns.alloc {
            // SAFETY: ptr is valid for writes of size bytes just handed out.
            unsafe { ptr::write_bytes(ptr.as_ptr(), pattern, size) };
        }

        self.used.set(self.used.get() + size);
        self.counters.record_alloc();
        ptr
    }

    /// Does nothing with the memory
    ///
    /// Bump memory is only reclaimed by `clear`, `init` or drop. The call is
    /// counted so statistics stay meaningful for code that pairs every
    /// allocation with a deallocation.
    pub fn dealloc(&self, ptr: NonNull<u8>, size: usize, alignment: Alignment) {
        let _ = (ptr, alignment);
        if size != 0 {
            self.counters.record_dealloc();
        }
    }

    /// Releases every chunk and large block
    pub fn clear(&mut self) {
        let chunks = self.chunks.get_mut().len();
        let large = self.large.get_mut().len();
        self.chunks.get_mut().clear();
        self.large.get_mut().clear();
        self.cursor.set(NonNull::dangling());
        self.remaining.set(0);
        self.used.set(0);

        log_debug!(chunks, large, "bump allocator cleared");
    }

    /// Requests above this size bypass the chunks
    #[inline]
    #[must_use]
    pub fn large_size(&self) -> usize {
        self.large_size
    }

    #[inline]
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.config.chunk_size
    }

    #[must_use]
    pub fn config(&self) -> &BumpConfig {
        &self.config
    }

    /// Number of chunks currently held
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.borrow().len()
    }

    /// Number of large blocks currently held
    #[must_use]
    pub fn large_count(&self) -> usize {
        self.large.borrow().len()
    }

    /// Bytes left in the newest chunk (before alignment padding)
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining.get()
    }

    /// Checks whether `ptr` lies inside a chunk or large block of this allocator
    #[must_use]
    pub fn owns(&self, ptr: NonNull<u8>) -> bool {
        let addr = ptr.as_ptr() as usize;
        self.chunks.borrow().contains(addr) || self.large.borrow().contains(addr)
    }

    fn try_bump(&self, size: usize, alignment: Alignment) -> Option<NonNull<u8>> {
        let cursor = self.cursor.get();
        let addr = cursor.as_ptr() as usize;
        let padding = alignment.align_up(addr).wrapping_sub(addr);
        let needed = padding.checked_add(size)?;

        if needed > self.remaining.get() {
            return None;
        }

        // SAFETY: padding + size <= remaining, so both offsets stay inside the
        // newest chunk or land one past its end.
        let (ptr, next) = unsafe {
            let ptr = cursor.add(padding);
            (ptr, ptr.add(size))
        };
        self.cursor.set(next);
        self.remaining.set(self.remaining.get() - needed);
        Some(ptr)
    }

    /// Starts a fresh chunk and carves `size` bytes from its start
    #[cold]
    fn grow_for(&self, size: usize) -> NonNull<u8> {
        debug_assert!(size <= self.config.chunk_size);

        let chunk = Chunk::allocate(layout_for(self.config.chunk_size, Alignment::MAX.get()), None);
        let start = self.chunks.borrow_mut().push(chunk);

        // SAFETY: size <= chunk_size, so the new cursor is inside the chunk or
        // one past its end.
        self.cursor.set(unsafe { start.add(size) });
        self.remaining.set(self.config.chunk_size - size);

        log_trace!(
            chunk_size = self.config.chunk_size,
            chunks = self.chunks.borrow().len(),
            "bump allocator grew"
        );
        start
    }

    #[cold]
    fn alloc_large(&self, size: usize, alignment: Alignment) -> NonNull<u8> {
        let chunk = Chunk::allocate(layout_for(size, alignment.get()), None);
        let ptr = self.large.borrow_mut().push(chunk);

        log_debug!(size, align = alignment.get(), "bump allocator large block");
        ptr
    }
}

impl fmt::Debug for BumpChunks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BumpChunks")
            .field("id", &self.id)
            .field("chunk_size", &self.config.chunk_size)
            .field("large_size", &self.large_size)
            .field("chunks", &self.chunk_count())
            .field("large", &self.large_count())
            .field("remaining", &self.remaining.get())
            .finish_non_exhaustive()
    }
}

// SAFETY: the cursor and every chunk handle point into memory the allocator
// owns, so moving it moves all of it. The `Cell` state keeps it `!Sync`;
// callers serialize access themselves.
unsafe impl Send for BumpChunks {}

// SAFETY: BumpChunks never hands out overlapping ranges.
// - The cursor only moves forward within a chunk
// - Large blocks are separate heap allocations
// - Nothing is freed until clear/init/drop, which require &mut self
unsafe impl Allocator for BumpChunks {
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
            self.dealloc(ptr, layout.size(), alignment);
        }
    }
}

impl MemoryUsage for BumpChunks {
    fn used_memory(&self) -> usize {
        self.used.get()
    }

    fn total_memory(&self) -> Option<usize> {
        Some(self.chunks.borrow().reserved_bytes() + self.large.borrow().reserved_bytes())
    }
}

impl StatisticsProvider for BumpChunks {
    fn statistics(&self) -> AllocatorStats {
        let chunks = self.chunks.borrow();
        let large = self.large.borrow();
        AllocatorStats {
            allocation_count: self.counters.allocs(),
            deallocation_count: self.counters.deallocs(),
            chunk_count: chunks.len(),
            large_count: large.len(),
            reserved_bytes: chunks.reserved_bytes() + large.reserved_bytes(),
            live_fallbacks: 0,
        }
    }

    fn reset_statistics(&self) {
        self.counters.reset();
    }
}
