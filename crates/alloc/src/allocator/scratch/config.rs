//! Scratch arena configuration

use crate::core::DebugPatterns;
use crate::core::size::KB;
use crate::error::{MemoryError, MemoryResult};

/// Configuration for a self-owned [`ScratchArena`](super::ScratchArena)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScratchConfig {
    /// Size of the owned buffer in bytes
    pub capacity: usize,

    /// Fill patterns for debugging
    pub patterns: DebugPatterns,
}

impl Default for ScratchConfig {
    fn default() -> Self {
        Self {
            capacity: Self::DEFAULT_CAPACITY,
            patterns: DebugPatterns::default(),
        }
    }
}

impl ScratchConfig {
    /// Default buffer size (16 KiB)
    pub const DEFAULT_CAPACITY: usize = 16 * KB;

    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

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
    pub fn with_patterns(mut self, patterns: DebugPatterns) -> Self {
        self.patterns = patterns;
        self
    }

    /// Validate configuration
    ///
    /// # Errors
    /// - `capacity` is zero or larger than `isize::MAX`
    pub fn validate(&self) -> MemoryResult<()> {
        if self.capacity == 0 {
            return Err(MemoryError::invalid_config("capacity must be non-zero"));
        }

        if self.capacity > isize::MAX as usize {
            return Err(MemoryError::size_overflow("scratch buffer size"));
        }

        Ok(())
    }
}
