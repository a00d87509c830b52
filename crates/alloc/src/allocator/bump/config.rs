//! Bump allocator configuration

use crate::core::DebugPatterns;
use crate::core::size::KB;
use crate::error::{MemoryError, MemoryResult};

/// Configuration for [`BumpChunks`](super::BumpChunks)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BumpConfig {
    /// Size of each backing chunk in bytes
    pub chunk_size: usize,

    /// Requests above this size bypass the chunks; `None` means half a chunk
    pub large_size: Option<usize>,

    /// Fill patterns for debugging (only `alloc` applies; bump memory is never
    /// returned individually)
    pub patterns: DebugPatterns,
}

impl Default for BumpConfig {
    fn default() -> Self {
        Self {
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
            large_size: None,
            patterns: DebugPatterns::default(),
        }
    }
}

impl BumpConfig {
    /// Default chunk size (64 KiB)
    pub const DEFAULT_CHUNK_SIZE: usize = 64 * KB;

    /// Configuration with `chunk_size`-byte chunks
    #[must_use]
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            ..Self::default()
        }
    }

    /// Production configuration - optimized for performance
    #[must_use]
    pub fn production() -> Self {
        Self::default().with_patterns(DebugPatterns::NONE)
    }

    /// Debug configuration - fresh memory is poisoned
    #[must_use]
    pub fn debug() -> Self {
        Self::default().with_patterns(DebugPatterns::DEBUG)
    }

    /// Small chunks for short-lived arenas
    #[must_use]
    pub fn small() -> Self {
        Self::new(4 * KB)
    }

    #[must_use]
    pub fn with_large_size(mut self, large_size: usize) -> Self {
        self.large_size = Some(large_size);
        self
    }

    #[must_use]
    pub fn with_patterns(mut self, patterns: DebugPatterns) -> Self {
        self.patterns = patterns;
        self
    }

    /// Effective large-request threshold
    #[inline]
    #[must_use]
    pub fn effective_large_size(&self) -> usize {
        self.large_size.unwrap_or(self.chunk_size / 2)
    }

    /// Validate configuration
    ///
    /// # Errors
    /// - `chunk_size` is zero or larger than `isize::MAX`
    /// - `large_size` exceeds `chunk_size`
    pub fn validate(&self) -> MemoryResult<()> {
        if self.chunk_size == 0 {
            return Err(MemoryError::invalid_config("chunk_size must be non-zero"));
        }

        if self.chunk_size > isize::MAX as usize {
            return Err(MemoryError::size_overflow("bump chunk size"));
        }

        if self.effective_large_size() > self.chunk_size {
            return Err(MemoryError::invalid_config(
                "large_size must not exceed chunk_size",
            ));
        }

        Ok(())
    }
}
