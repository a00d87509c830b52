//! Allocation statistics
//!
//! Counters are plain `Cell`s: every allocator here is single-threaded, so a
//! snapshot is just a read of the current values.

use core::cell::Cell;

/// Snapshot of one allocator's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocatorStats {
    /// Successful `alloc` calls since creation or the last reset
    pub allocation_count: usize,
    /// `dealloc` calls since creation or the last reset
    pub deallocation_count: usize,
    /// Chunks currently held
    pub chunk_count: usize,
    /// Large (heap-bypass) blocks currently held
    pub large_count: usize,
    /// Bytes currently reserved from the heap (chunks and large blocks)
    pub reserved_bytes: usize,
    /// Scratch heap fallbacks not yet returned
    pub live_fallbacks: usize,
}

impl AllocatorStats {
    /// Allocations not yet matched by a deallocation
    #[must_use]
    pub fn live_allocations(&self) -> usize {
        self.allocation_count
            .saturating_sub(self.deallocation_count)
    }
}

/// Trait for allocators that expose statistics
pub trait StatisticsProvider {
    /// Current counters
    fn statistics(&self) -> AllocatorStats;

    /// Resets the allocation/deallocation counters
    ///
    /// Structural figures (chunks, reserved bytes) describe live state and are
    /// not affected.
    fn reset_statistics(&self);
}

/// Allocation/deallocation counters embedded in each allocator
#[derive(Debug, Default)]
pub(crate) struct Counters {
    allocs: Cell<usize>,
    deallocs: Cell<usize>,
}

impl Counters {
    #[inline]
    pub(crate) fn record_alloc(&self) {
        self.allocs.set(self.allocs.get() + 1);
    }

    #[inline]
    pub(crate) fn record_dealloc(&self) {
        self.deallocs.set(self.deallocs.get() + 1);
    }

    #[inline]
    pub(crate) fn allocs(&self) -> usize {
        self.allocs.get()
    }

    #[inline]
    pub(crate) fn deallocs(&self) -> usize {
        self.deallocs.get()
    }

    pub(crate) fn reset(&self) {
        self.allocs.set(0);
        self.deallocs.set(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_and_live() {
        let counters = Counters::default();
        counters.record_alloc();
        counters.record_alloc();
        counters.record_dealloc();

        let stats = AllocatorStats {
            allocation_count: counters.allocs(),
            deallocation_count: counters.deallocs(),
            ..AllocatorStats::default()
        };
        assert_eq!(stats.live_allocations(), 1);

        counters.reset();
        assert_eq!(counters.allocs(), 0);
        assert_eq!(counters.deallocs(), 0);
    }
}
