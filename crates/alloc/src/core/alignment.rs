//! Validated allocation alignment

use core::alloc::Layout;
use core::fmt;

use crate::error::{MemoryError, MemoryResult};
use crate::utils;

/// Alignment accepted by every allocator in this crate
///
/// Only powers of two up to 16 bytes exist as values of this type, so an
/// out-of-range alignment is rejected when it is converted, not deep inside an
/// allocation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(usize)]
pub enum Alignment {
    /// 1-byte alignment
    Align1 = 1,
    /// 2-byte alignment
    Align2 = 2,
    /// 4-byte alignment
    Align4 = 4,
    /// 8-byte alignment
    Align8 = 8,
    /// 16-byte alignment
    Align16 = 16,
}

impl Alignment {
    /// Strictest supported alignment; every chunk is allocated with it
    pub const MAX: Self = Self::Align16;

    /// Alignment of a native pointer, the minimum for intrusive free-list slots
    pub const WORD: Self = match core::mem::align_of::<*mut u8>() {
        1 => Self::Align1,
        2 => Self::Align2,
        4 => Self::Align4,
        8 => Self::Align8,
        _ => Self::Align16,
    };

    /// Converts a raw value, returning `None` unless it is a power of two `<= 16`
    #[must_use]
    pub const fn new(value: usize) -> Option<Self> {
        match value {
            1 => Some(Self::Align1),
            2 => Some(Self::Align2),
            4 => Some(Self::Align4),
            8 => Some(Self::Align8),
            16 => Some(Self::Align16),
            _ => None,
        }
    }

    /// Alignment required by `T`
    pub fn of<T>() -> MemoryResult<Self> {
        Self::try_from(core::mem::align_of::<T>())
    }

    /// Alignment requested by `layout`
    pub fn from_layout(layout: Layout) -> MemoryResult<Self> {
        Self::try_from(layout.align())
    }

    /// Raw alignment in bytes
    #[inline]
    #[must_use]
    pub const fn get(self) -> usize {
        self as usize
    }

    /// Rounds `value` up to a multiple of this alignment
    #[inline]
    #[must_use]
    pub const fn align_up(self, value: usize) -> usize {
        utils::align_up(value, self.get())
    }

    /// Checks whether `addr` is a multiple of this alignment
    #[inline]
    #[must_use]
    pub const fn is_aligned(self, addr: usize) -> bool {
        utils::is_aligned(addr, self.get())
    }
}

impl Default for Alignment {
    fn default() -> Self {
        Self::WORD
    }
}

impl TryFrom<usize> for Alignment {
    type Error = MemoryError;

    fn try_from(value: usize) -> MemoryResult<Self> {
        Self::new(value).ok_or_else(|| MemoryError::invalid_alignment(value))
    }
}

impl From<Alignment> for usize {
    fn from(alignment: Alignment) -> Self {
        alignment.get()
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}
