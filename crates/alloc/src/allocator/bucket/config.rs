//! Bucket pool configuration

use super::classes::MAX_CLASS_SIZE;
use crate::allocator::bump::BumpConfig;
use crate::core::DebugPatterns;
use crate::core::size::KB;
use crate::error::{MemoryError, MemoryResult};

/// Configuration for [`BucketPool`](super::BucketPool)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketConfig {
    /// Chunk size of the backing bump allocator
    pub chunk_size: usize,

    /// Bytes carved per bucket refill
    pub slab_bytes: usize,

    /// Fill patterns for debugging
    pub patterns: DebugPatterns,
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            chunk_size: BumpConfig::DEFAULT_CHUNK_SIZE,
            slab_bytes: Self::DEFAULT_SLAB_BYTES,
            patterns: DebugPatterns::default(),
        }
    }
}

impl BucketConfig {
    /// Default refill size (4 KiB)
    pub const DEFAULT_SLAB_BYTES: usize = 4 * KB;

    /// Production configuration - optimized for performance
    #[must_use]
    pub fn production() -> Self {
        Self::default().with_patterns(DebugPatterns::NONE)
    }

    /// Debug configuration - optimized for debugging
    #[must_use]
    pub fn debug() -> Self {
        Self::default().with_patterns(DebugPatterns::DEBUG)
    }

    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    #[must_use]
    pub fn with_slab_bytes(mut self, slab_bytes: usize) -> Self {
        self.slab_bytes = slab_bytes;
        self
    }

    #[must_use]
    pub fn with_patterns(mut self, patterns: DebugPatterns) -> Self {
        self.patterns = patterns;
        self
    }

    /// Items carved per refill for a class of `class_size` bytes
    #[inline]
    #[must_use]
    pub fn items_per_slab(&self, class_size: usize) -> usize {
        (self.slab_bytes / class_size).max(1)
    }

    /// Configuration of the private backing allocator
    #[must_use]
    pub fn backing(&self) -> BumpConfig {
        BumpConfig::new(self.chunk_size).with_patterns(DebugPatterns::NONE)
    }

    /// Validate configuration
    ///
    /// # Errors
    /// - `slab_bytes` is zero
    /// - the backing configuration is invalid
    /// - a refill of the largest class would not fit half a chunk
    pub fn validate(&self) -> MemoryResult<()> {
        if self.slab_bytes == 0 {
            return Err(MemoryError::invalid_config("slab_bytes must be non-zero"));
        }

        self.backing().validate()?;

        if self.slab_bytes.max(MAX_CLASS_SIZE) > self.chunk_size / 2 {
            return Err(MemoryError::invalid_config(
                "slab_bytes must fit in half a backing chunk",
            ));
        }

        Ok(())
    }
}
