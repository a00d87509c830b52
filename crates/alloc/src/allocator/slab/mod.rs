//! Fixed-size slab allocator
//!
//! # Safety
//!
//! - Slots are carved from chunks owned by the pool's [`ChunkList`]
//! - A freed slot stores the free-list link in its first bytes, so every slot
//!   is at least pointer sized and pointer aligned
//! - Chunks are released only by `clear`, `init` or drop, all of which need
//!   exclusive access
//!
//! ## Invariants
//!
//! - Every slot address is a multiple of `slot_align`
//! - `remaining` counts untouched slots after `cursor` in the newest chunk
//! - The free list holds only slots of this pool that are not handed out

mod config;

pub use config::SlabConfig;

use core::alloc::Layout;
use core::cell::{Cell, RefCell};
use core::fmt;
use core::ptr::{self, NonNull};

use crate::allocator::traits::{dangling, request_alignment};
use crate::allocator::{
    AllocResult, Allocator, AllocatorId, AllocatorStats, Counters, StatisticsProvider,
};
use crate::core::chunk::{Chunk, ChunkList};
use crate::core::free_list::FreeList;
use crate::core::{Alignment, MemoryUsage};
use crate::error::{MemoryError, MemoryResult};

/// Slab allocator for one item size
///
/// Hands out identically sized slots. Freed slots are reused in LIFO order
/// before the pool touches untouched chunk space, and a new chunk of
/// `max_count` slots is allocated only when both are exhausted.
///
/// # Memory Layout
/// ```text
/// chunk 0: [slot][slot][slot]...[slot]
/// chunk 1: [slot][slot][ cursor ->    ]
///
/// free list: slot -> slot -> None
/// ```
pub struct SlabPool {
    id: AllocatorId,
    config: SlabConfig,
    slot_size: usize,
    slot_align: Alignment,
    chunk_layout: Layout,
    chunks: RefCell<ChunkList>,
    cursor: Cell<NonNull<u8>>,
    remaining: Cell<usize>,
    free: FreeList,
    live: Cell<usize>,
    counters: Counters,
}

impl SlabPool {
    /// Creates an empty pool; no memory is reserved until the first `alloc`
    ///
    /// # Errors
    /// Returns the error from [`SlabConfig::validate`].
    pub fn new(config: SlabConfig) -> MemoryResult<Self> {
        Self::build(AllocatorId::new(), config)
    }

    /// Creates a pool sized and aligned for `T`
    ///
    /// # Errors
    /// Fails if `T` needs an alignment above 16 bytes.
    pub fn for_type<T>() -> MemoryResult<Self> {
        Self::new(SlabConfig::for_type::<T>()?)
    }

    fn build(id: AllocatorId, config: SlabConfig) -> MemoryResult<Self> {
        config.validate()?;

        let slot_align = config.slot_align();
        let slot_size = config
            .slot_size()
            .ok_or_else(|| MemoryError::size_overflow("slab slot size"))?;
        let chunk_bytes = config
            .chunk_bytes()
            .ok_or_else(|| MemoryError::size_overflow("slab chunk size"))?;
        let chunk_layout = Layout::from_size_align(chunk_bytes, slot_align.get())
            .map_err(|_| MemoryError::invalid_layout("slab chunk layout"))?;

        log_debug!(
            slot_size,
            slot_align = slot_align.get(),
            max_count = config.max_count,
            "slab pool configured"
        );

        Ok(Self {
            id,
            config,
            slot_size,
            slot_align,
            chunk_layout,
            chunks: RefCell::new(ChunkList::default()),
            cursor: Cell::new(NonNull::dangling()),
            remaining: Cell::new(0),
            free: FreeList::new(),
            live: Cell::new(0),
            counters: Counters::default(),
        })
    }

    /// Re-initializes the pool with a new configuration
    ///
    /// Every chunk is released. On error the pool is left untouched.
    ///
    /// # Errors
    /// Returns the error from [`SlabConfig::validate`].
    pub fn init(&mut self, config: SlabConfig) -> MemoryResult<()> {
        *self = Self::build(self.id, config)?;
        Ok(())
    }

    /// Allocates one slot
    ///
    /// The slot is `slot_size()` bytes long and aligned to `slot_align()`.
    #[must_use]
    pub fn alloc(&self) -> NonNull<u8> {
        let ptr = match self.free.pop() {
            Some(ptr) => ptr,
            None => self.bump(),
        };

        debug_assert!(
            self.slot_align.is_aligned(ptr.as_ptr() as usize),
            "slab slot is misaligned"
        );

        if let Some(pattern) = self.config.patterns.alloc {
            // SAFETY: ptr is a whole slot of slot_size bytes now owned by the
            // caller.
            unsafe { ptr::write_bytes(ptr.as_ptr(), pattern, self.slot_size) };
        }

        self.live.set(self.live.get() + 1);
        self.counters.record_alloc();
        ptr
    }

    /// Returns a slot to the pool
    ///
    /// The next `alloc` returns this same slot.
    ///
    /// # Safety
    /// - `ptr` must come from `alloc` on this pool since the last `clear`/`init`
    /// - `ptr` must not be deallocated twice or used afterwards
    pub unsafe fn dealloc(&self, ptr: NonNull<u8>) {
        debug_assert!(self.owns(ptr), "pointer does not belong to this slab pool");

        if let Some(pattern) = self.config.patterns.dealloc {
            // SAFETY: caller guarantees ptr is a live slot of this pool.
            unsafe { ptr::write_bytes(ptr.as_ptr(), pattern, self.slot_size) };
        }

        // SAFETY: slots are pointer sized and aligned and the caller gives the
        // slot back.
        unsafe { self.free.push(ptr) };
        self.live.set(self.live.get().saturating_sub(1));
        self.counters.record_dealloc();
    }

    /// Releases every chunk; the configuration is kept
    pub fn clear(&mut self) {
        let chunks = self.chunks.get_mut().len();
        self.chunks.get_mut().clear();
        self.free.clear();
        self.cursor.set(NonNull::dangling());
        self.remaining.set(0);
        self.live.set(0);

        log_debug!(chunks, "slab pool cleared");
    }

    /// Size of every slot in bytes
    #[inline]
    #[must_use]
    pub fn slot_size(&self) -> usize {
        self.slot_size
    }

    /// Alignment of every slot
    #[inline]
    #[must_use]
    pub fn slot_align(&self) -> Alignment {
        self.slot_align
    }

    /// Slots per chunk
    #[inline]
    #[must_use]
    pub fn max_count(&self) -> usize {
        self.config.max_count
    }

    #[must_use]
    pub fn config(&self) -> &SlabConfig {
        &self.config
    }

    /// Number of chunks currently held
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.borrow().len()
    }

    /// Number of slots on the free list
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Checks whether `ptr` lies inside one of this pool's chunks
    #[must_use]
    pub fn owns(&self, ptr: NonNull<u8>) -> bool {
        self.chunks.borrow().contains(ptr.as_ptr() as usize)
    }

    /// Takes the next untouched slot, growing when the chunk is used up
    fn bump(&self) -> NonNull<u8> {
        if self.remaining.get() == 0 {
            self.grow();
        }

        let ptr = self.cursor.get();
        // SAFETY: remaining > 0, so at least one whole slot follows the cursor
        // inside the newest chunk; the result is at most one past its end.
        self.cursor.set(unsafe { ptr.add(self.slot_size) });
        self.remaining.set(self.remaining.get() - 1);
        ptr
    }

    #[cold]
    fn grow(&self) {
        let chunk = Chunk::allocate(self.chunk_layout, None);
        let start = self.chunks.borrow_mut().push(chunk);
        self.cursor.set(start);
        self.remaining.set(self.config.max_count);

        log_trace!(
            chunk_bytes = self.chunk_layout.size(),
            chunks = self.chunks.borrow().len(),
            "slab pool grew"
        );
    }
}

impl fmt::Debug for SlabPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlabPool")
            .field("id", &self.id)
            .field("slot_size", &self.slot_size)
            .field("slot_align", &self.slot_align)
            .field("max_count", &self.config.max_count)
            .field("chunks", &self.chunk_count())
            .field("free", &self.free.len())
            .finish_non_exhaustive()
    }
}

// SAFETY: every pointer the pool holds (chunks, free list, cursor) points
// into memory the pool owns, so moving the pool moves all of it. The `Cell`
// state keeps it `!Sync`; callers serialize access themselves.
unsafe impl Send for SlabPool {}

// SAFETY: SlabPool hands out whole slots.
// - Every slot is aligned to slot_align and requests with a stricter
//   alignment are rejected
// - Requests larger than a slot are rejected instead of overrunning it
// - A slot is reachable from the free list only after it was deallocated
unsafe impl Allocator for SlabPool {
    fn id(&self) -> AllocatorId {
        self.id
    }

    fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
        let align = request_alignment(layout)?;

        if layout.size() == 0 {
            return Ok(dangling(layout));
        }

        if align > self.slot_align {
            return Err(MemoryError::invalid_alignment(layout.align()));
        }

        if layout.size() > self.slot_size {
            return Err(MemoryError::allocation_too_large(
                layout.size(),
                self.slot_size,
            ));
        }

        Ok(NonNull::slice_from_raw_parts(self.alloc(), self.slot_size))
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() == 0 {
            return;
        }

        // SAFETY: caller guarantees ptr came from allocate on this pool.
        unsafe { self.dealloc(ptr) };
    }

    fn usable_size(&self, layout: Layout) -> usize {
        if layout.size() == 0 {
            0
        } else {
            self.slot_size
        }
    }
}

impl MemoryUsage for SlabPool {
    fn used_memory(&self) -> usize {
        self.live.get() * self.slot_size
    }

    fn total_memory(&self) -> Option<usize> {
        Some(self.chunks.borrow().reserved_bytes())
    }
}

impl StatisticsProvider for SlabPool {
    fn statistics(&self) -> AllocatorStats {
        let chunks = self.chunks.borrow();
        AllocatorStats {
            allocation_count: self.counters.allocs(),
            deallocation_count: self.counters.deallocs(),
            chunk_count: chunks.len(),
            large_count: 0,
            reserved_bytes: chunks.reserved_bytes(),
            live_fallbacks: 0,
        }
    }

    fn reset_statistics(&self) {
        self.counters.reset();
    }
}
