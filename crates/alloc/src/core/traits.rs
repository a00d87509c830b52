//! Core traits for memory management

/// Memory usage tracking trait
///
/// Implemented by every allocator in this crate. "Used" counts bytes handed
/// out and not yet returned; "total" counts bytes the allocator currently
/// holds from the heap.
pub trait MemoryUsage {
    /// Get currently used memory in bytes
    fn used_memory(&self) -> usize;

    /// Get total memory held from the heap in bytes (if known)
    fn total_memory(&self) -> Option<usize>;

    /// Get available memory in bytes (if known)
    fn available_memory(&self) -> Option<usize> {
        self.total_memory()
            .map(|total| total.saturating_sub(self.used_memory()))
    }

    /// Returns memory usage as a percentage (0.0 to 100.0)
    ///
    /// Returns `None` if total memory is unknown.
    fn memory_usage_percent(&self) -> Option<f32> {
        self.total_memory().map(|total| {
            if total == 0 {
                0.0
            } else {
                (self.used_memory() as f32 / total as f32) * 100.0
            }
        })
    }
}

/// Blanket implementation of `MemoryUsage` for references
impl<T: MemoryUsage + ?Sized> MemoryUsage for &T {
    fn used_memory(&self) -> usize {
        (**self).used_memory()
    }

    fn total_memory(&self) -> Option<usize> {
        (**self).total_memory()
    }

    fn available_memory(&self) -> Option<usize> {
        (**self).available_memory()
    }
}
