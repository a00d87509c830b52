//! Slab pool configuration

use crate::core::{Alignment, DebugPatterns};
use crate::error::{MemoryError, MemoryResult};

/// Configuration for [`SlabPool`](super::SlabPool)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlabConfig {
    /// Requested item size in bytes
    pub item_size: usize,

    /// Slots per chunk
    pub max_count: usize,

    /// Requested item alignment
    pub alignment: Alignment,

    /// Fill patterns for debugging
    pub patterns: DebugPatterns,
}

impl SlabConfig {
    /// Default number of slots per chunk
    pub const DEFAULT_MAX_COUNT: usize = 64;

    /// Configuration for `item_size`-byte items with default alignment
    #[must_use]
    pub fn new(item_size: usize) -> Self {
        Self {
            item_size,
            max_count: Self::DEFAULT_MAX_COUNT,
            alignment: Alignment::default(),
            patterns: DebugPatterns::default(),
        }
    }

    /// Configuration sized and aligned for values of `T`
    ///
    /// # Errors
    /// Fails if `T` needs an alignment above 16 bytes.
    pub fn for_type<T>() -> MemoryResult<Self> {
        let alignment = Alignment::of::<T>()?;
        Ok(Self::new(core::mem::size_of::<T>().max(1)).with_alignment(alignment))
    }

    /// Production configuration - no fill patterns
    #[must_use]
    pub fn production(item_size: usize) -> Self {
        Self::new(item_size).with_patterns(DebugPatterns::NONE)
    }

    /// Debug configuration - fresh and freed slots are poisoned
    #[must_use]
    pub fn debug(item_size: usize) -> Self {
        Self::new(item_size).with_patterns(DebugPatterns::DEBUG)
    }

    #[must_use]
    pub fn with_max_count(mut self, max_count: usize) -> Self {
        self.max_count = max_count;
        self
    }

    #[must_use]
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    #[must_use]
    pub fn with_patterns(mut self, patterns: DebugPatterns) -> Self {
        self.patterns = patterns;
        self
    }

    /// Alignment of every slot: the requested alignment, raised to hold a
    /// free-list link
    #[inline]
    #[must_use]
    pub fn slot_align(&self) -> Alignment {
        self.alignment.max(Alignment::WORD)
    }

    /// Size of every slot, or `None` if it overflows
    #[must_use]
    pub fn slot_size(&self) -> Option<usize> {
        let align = self.slot_align().get();
        let raw = self.item_size.max(core::mem::size_of::<*mut u8>());
        crate::utils::checked_align_up(raw, align)
    }

    /// Bytes of one chunk, or `None` if it overflows
    #[must_use]
    pub fn chunk_bytes(&self) -> Option<usize> {
        self.slot_size()?.checked_mul(self.max_count)
    }

    /// Validate configuration
    ///
    /// # Errors
    /// - `item_size` is zero
    /// - `max_count` is less than two
    /// - the chunk size overflows or exceeds `isize::MAX`
    pub fn validate(&self) -> MemoryResult<()> {
        if self.item_size == 0 {
            return Err(MemoryError::invalid_config("item_size must be non-zero"));
        }

        if self.max_count <= 1 {
            return Err(MemoryError::invalid_config(
                "max_count must be greater than one",
            ));
        }

        match self.chunk_bytes() {
            Some(bytes) if bytes <= isize::MAX as usize => Ok(()),
            _ => Err(MemoryError::size_overflow("slab chunk size")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_geometry() {
        let config = SlabConfig::new(3).with_alignment(Alignment::Align1);
        assert_eq!(config.slot_align(), Alignment::WORD);
        assert_eq!(config.slot_size(), Some(core::mem::size_of::<usize>()));

        let config = SlabConfig::new(20).with_alignment(Alignment::Align16);
        assert_eq!(config.slot_align(), Alignment::Align16);
        assert_eq!(config.slot_size(), Some(32));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(SlabConfig::new(0).validate().unwrap_err().is_config_error());
        assert!(
            SlabConfig::new(8)
                .with_max_count(1)
                .validate()
                .unwrap_err()
                .is_config_error()
        );
        assert_eq!(
            SlabConfig::new(usize::MAX / 2)
                .validate()
                .unwrap_err()
                .code(),
            "MEM:ALLOC:OVERFLOW"
        );
    }

    #[test]
    fn test_for_type() {
        let config = SlabConfig::for_type::<u64>().unwrap();
        assert_eq!(config.item_size, 8);
        assert_eq!(config.alignment, Alignment::of::<u64>().unwrap());

        let config = SlabConfig::for_type::<()>().unwrap();
        assert_eq!(config.item_size, 1);
    }

    #[test]
    fn test_presets() {
        assert_eq!(SlabConfig::production(8).patterns, DebugPatterns::NONE);
        assert_eq!(SlabConfig::debug(8).patterns, DebugPatterns::DEBUG);
        assert!(SlabConfig::production(8).validate().is_ok());
    }
}
