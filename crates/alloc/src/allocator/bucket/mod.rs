//! General-purpose bucketed pool
//!
//! Small requests are rounded up to one of nine size classes, each with its
//! own free list. An empty bucket is refilled by carving one slab's worth of
//! blocks from a private [`BumpChunks`] in a single request. Requests above
//! the largest class get their own heap block, tracked by address and freed as
//! soon as they are deallocated.
//!
//! # Safety
//!
//! - Every block of a class is carved at the class alignment, and class sizes
//!   are multiples of it, so consecutive blocks stay aligned
//! - A block only ever returns to the bucket of the class it was carved for
//! - Backing memory is released only with exclusive access

mod classes;
mod config;

pub use classes::{CLASSES, MAX_CLASS_SIZE, NUM_CLASSES};
pub use config::BucketConfig;

use core::alloc::Layout;
use core::cell::{Cell, RefCell};
use core::fmt;
use core::ptr::{self, NonNull};

use hashbrown::HashMap;

use self::classes::{class_alignment, class_index, class_size};
use crate::allocator::bump::BumpChunks;
use crate::allocator::traits::{dangling, dangling_aligned, request_alignment};
use crate::allocator::{
    AllocResult, Allocator, AllocatorId, AllocatorStats, Counters, StatisticsProvider,
};
use crate::core::chunk::{Chunk, layout_for};
use crate::core::free_list::FreeList;
use crate::core::{Alignment, MemoryUsage};
use crate::error::MemoryResult;

/// Size-class pool for small objects
pub struct BucketPool {
    id: AllocatorId,
    config: BucketConfig,
    backing: BumpChunks,
    buckets: [FreeList; NUM_CLASSES],
    large: RefCell<HashMap<usize, Chunk>>,
    large_bytes: Cell<usize>,
    used: Cell<usize>,
    counters: Counters,
}

impl BucketPool {
    /// Creates an empty pool; buckets are filled on demand
    ///
    /// # Errors
    /// Returns the error from [`BucketConfig::validate`].
    pub fn new(config: BucketConfig) -> MemoryResult<Self> {
        Self::build(AllocatorId::new(), config)
    }

    fn build(id: AllocatorId, config: BucketConfig) -> MemoryResult<Self> {
        config.validate()?;
        let backing = BumpChunks::new(config.backing())?;

        log_debug!(
            chunk_size = config.chunk_size,
            slab_bytes = config.slab_bytes,
            "bucket pool configured"
        );

        Ok(Self {
            id,
            config,
            backing,
            buckets: core::array::from_fn(|_| FreeList::new()),
            large: RefCell::new(HashMap::new()),
            large_bytes: Cell::new(0),
            used: Cell::new(0),
            counters: Counters::default(),
        })
    }

    /// Re-initializes with a new configuration, releasing all memory
    ///
    /// On error the pool is left untouched.
    ///
    /// # Errors
    /// Returns the error from [`BucketConfig::validate`].
    pub fn init(&mut self, config: BucketConfig) -> MemoryResult<()> {
        *self = Self::build(self.id, config)?;
        Ok(())
    }

    /// Allocates at least `size` bytes aligned to `alignment`
    ///
    /// The block is [`bucket_size`](Self::bucket_size)`(max(size, alignment))`
    /// bytes long. A zero `size` yields a dangling, aligned pointer.
    #[must_use]
    pub fn alloc(&self, size: usize, alignment: Alignment) -> NonNull<u8> {
        if size == 0 {
            return dangling_aligned(alignment);
        }

        let (ptr, usable) = match class_index(size, alignment) {
            Some(index) => {
                let ptr = match self.buckets[index].pop() {
                    Some(ptr) => ptr,
                    None => self.refill(index),
                };
                (ptr, class_size(index))
            }
            None => (self.alloc_large(size, alignment), size),
        };

        debug_assert!(
            alignment.is_aligned(ptr.as_ptr() as usize),
            "bucket allocation is misaligned"
        );
        debug_assert!(usable >= size, "bucket is smaller than the request");

        if let Some(pattern) = self.config.patterns.alloc {
            // SAFETY: ptr is valid for writes of usable bytes just handed out.
            unsafe { ptr::write_bytes(ptr.as_ptr(), pattern, usable) };
        }

        self.used.set(self.used.get() + usable);
        self.counters.record_alloc();
        ptr
    }

    /// Returns a block to its bucket, or frees a large block
    ///
    /// # Safety
    /// - `ptr`, `size` and `alignment` must match an earlier `alloc` on this
    ///   pool that has not been deallocated since (any size up to the usable
    ///   size maps to the same class)
    /// - `ptr` must not be used afterwards
    pub unsafe fn dealloc(&self, ptr: NonNull<u8>, size: usize, alignment: Alignment) {
        if size == 0 {
            return;
        }

        match class_index(size, alignment) {
            Some(index) => {
                let usable = class_size(index);
                if let Some(pattern) = self.config.patterns.dealloc {
                    // SAFETY: caller guarantees ptr is a live block of this
                    // class.
                    unsafe { ptr::write_bytes(ptr.as_ptr(), pattern, usable) };
                }
                // SAFETY: every class is at least pointer sized and aligned
                // and the caller gives the block back.
                unsafe { self.buckets[index].push(ptr) };
                self.used.set(self.used.get().saturating_sub(usable));
            }
            None => self.free_large(ptr),
        }

        self.counters.record_dealloc();
    }

    /// Usable size of the block that would serve a `size`-byte request
    ///
    /// Always at least `size`; sizes above the largest class are returned
    /// unchanged.
    #[inline]
    #[must_use]
    pub fn bucket_size(&self, size: usize) -> usize {
        bucket_size(size)
    }

    /// Releases the backing chunks and every large block
    pub fn clear(&mut self) {
        let large = self.large.get_mut().len();
        self.backing.clear();
        for bucket in &self.buckets {
            bucket.clear();
        }
        self.large.get_mut().clear();
        self.large_bytes.set(0);
        self.used.set(0);

        log_debug!(large, "bucket pool cleared");
    }

    #[must_use]
    pub fn config(&self) -> &BucketConfig {
        &self.config
    }

    /// Number of backing chunks currently held
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.backing.chunk_count()
    }

    /// Number of large blocks currently live
    #[must_use]
    pub fn large_count(&self) -> usize {
        self.large.borrow().len()
    }

    /// Free blocks waiting in the bucket that serves `size` bytes
    #[must_use]
    pub fn free_count(&self, size: usize) -> usize {
        class_index(size, Alignment::Align1).map_or(0, |index| self.buckets[index].len())
    }

    /// Carves a slab for class `index`, threads all but the first block onto
    /// its free list and returns the first
    #[cold]
    fn refill(&self, index: usize) -> NonNull<u8> {
        let class = class_size(index);
        let count = self.config.items_per_slab(class);
        let base = self.backing.alloc(class * count, class_alignment(index));

        for item in (1..count).rev() {
            // SAFETY: item < count, so the block lies inside the carved slab;
            // it is class aligned and at least pointer sized.
            unsafe { self.buckets[index].push(base.add(item * class)) };
        }

        log_trace!(class, count, "bucket refilled");
        base
    }

    #[cold]
    fn alloc_large(&self, size: usize, alignment: Alignment) -> NonNull<u8> {
        let chunk = Chunk::allocate(layout_for(size, alignment.get()), None);
        let ptr = chunk.start();
        self.large_bytes.set(self.large_bytes.get() + chunk.size());
        self.large.borrow_mut().insert(ptr.as_ptr() as usize, chunk);

        log_debug!(size, "bucket pool large block");
        ptr
    }

    fn free_large(&self, ptr: NonNull<u8>) {
        let removed = self.large.borrow_mut().remove(&(ptr.as_ptr() as usize));
        debug_assert!(removed.is_some(), "unknown large block");

        if let Some(chunk) = removed {
            self.large_bytes
                .set(self.large_bytes.get().saturating_sub(chunk.size()));
            self.used.set(self.used.get().saturating_sub(chunk.size()));
            log_debug!(size = chunk.size(), "bucket pool freed large block");
        }
    }
}

/// Usable size of the block that would serve a `size`-byte request
#[must_use]
pub fn bucket_size(size: usize) -> usize {
    match class_index(size, Alignment::Align1) {
        Some(index) => class_size(index),
        None => size,
    }
}

impl fmt::Debug for BucketPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let free: [usize; NUM_CLASSES] = core::array::from_fn(|index| self.buckets[index].len());
        f.debug_struct("BucketPool")
            .field("id", &self.id)
            .field("backing", &self.backing)
            .field("free", &free)
            .field("large", &self.large_count())
            .finish_non_exhaustive()
    }
}

// SAFETY: the free lists, the backing arena and the large-block map only
// reference memory the pool owns, so moving the pool moves all of it. The
// `Cell` state keeps it `!Sync`; callers serialize access themselves.
unsafe impl Send for BucketPool {}

// SAFETY: BucketPool never hands out a block twice.
// - Blocks come from disjoint slab carves or separate heap allocations
// - A block re-enters a free list only when deallocated
// - Class alignment covers every alignment mapped to the class
unsafe impl Allocator for BucketPool {
    fn id(&self) -> AllocatorId {
        self.id
    }

    fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
        let alignment = request_alignment(layout)?;

        if layout.size() == 0 {
            return Ok(dangling(layout));
        }

        let ptr = self.alloc(layout.size(), alignment);
        Ok(NonNull::slice_from_raw_parts(ptr, self.usable_size(layout)))
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if let Ok(alignment) = Alignment::from_layout(layout) {
            // SAFETY: caller guarantees ptr came from allocate with a layout
            // that maps to the same class.
            unsafe { self.dealloc(ptr, layout.size(), alignment) };
        }
    }

    fn usable_size(&self, layout: Layout) -> usize {
        match Alignment::from_layout(layout) {
            Ok(alignment) if layout.size() != 0 => class_index(layout.size(), alignment)
                .map_or(layout.size(), class_size),
            _ => layout.size(),
        }
    }
}

impl MemoryUsage for BucketPool {
    fn used_memory(&self) -> usize {
        self.used.get()
    }

    fn total_memory(&self) -> Option<usize> {
        Some(self.backing.total_memory().unwrap_or(0) + self.large_bytes.get())
    }
}

impl StatisticsProvider for BucketPool {
    fn statistics(&self) -> AllocatorStats {
        let backing = self.backing.statistics();
        AllocatorStats {
            allocation_count: self.counters.allocs(),
            deallocation_count: self.counters.deallocs(),
            chunk_count: backing.chunk_count,
            large_count: self.large_count(),
            reserved_bytes: backing.reserved_bytes + self.large_bytes.get(),
            live_fallbacks: 0,
        }
    }

    fn reset_statistics(&self) {
        self.counters.reset();
    }
}
