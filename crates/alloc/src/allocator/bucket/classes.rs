//! Size classes served by the bucket pool
//!
//! Nine classes from 8 to 256 bytes. A request maps to the smallest class at
//! least as large as `max(size, alignment)`; anything above 256 bytes takes
//! the large path.

use crate::core::Alignment;
use crate::utils::natural_alignment;

/// Number of size classes
pub const NUM_CLASSES: usize = 9;

/// Class sizes in bytes, ascending
pub const CLASSES: [usize; NUM_CLASSES] = [8, 16, 32, 48, 64, 96, 128, 192, 256];

/// Largest size served from a bucket
pub const MAX_CLASS_SIZE: usize = CLASSES[NUM_CLASSES - 1];

/// Index of the class serving `size` bytes at `alignment`, or `None` for the
/// large path
#[inline]
#[must_use]
pub fn class_index(size: usize, alignment: Alignment) -> Option<usize> {
    let needed = size.max(alignment.get());
    if needed > MAX_CLASS_SIZE {
        return None;
    }
    CLASSES.iter().position(|&class| needed <= class)
}

/// Size of class `index`
#[inline]
#[must_use]
pub fn class_size(index: usize) -> usize {
    CLASSES[index]
}

/// Alignment every block of class `index` is carved at
///
/// The largest power of two dividing the class size, capped at 16.
#[inline]
#[must_use]
pub fn class_alignment(index: usize) -> Alignment {
    match Alignment::new(natural_alignment(CLASSES[index], Alignment::MAX.get())) {
        Some(alignment) => alignment,
        None => Alignment::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_lookup() {
        assert_eq!(class_index(1, Alignment::Align1), Some(0));
        assert_eq!(class_index(8, Alignment::Align8), Some(0));
        assert_eq!(class_index(9, Alignment::Align1), Some(1));
        assert_eq!(class_index(40, Alignment::Align8), Some(3));
        assert_eq!(class_index(256, Alignment::Align16), Some(8));
        assert_eq!(class_index(257, Alignment::Align1), None);
    }

    #[test]
    fn test_alignment_raises_class() {
        assert_eq!(class_index(1, Alignment::Align16), Some(1));
    }

    #[test]
    fn test_class_alignment() {
        assert_eq!(class_alignment(0), Alignment::Align8);
        for index in 1..NUM_CLASSES {
            assert_eq!(class_alignment(index), Alignment::Align16, "class {index}");
        }
    }

    #[test]
    fn test_every_class_satisfies_its_requests() {
        for size in 1..=MAX_CLASS_SIZE {
            for alignment in [
                Alignment::Align1,
                Alignment::Align2,
                Alignment::Align4,
                Alignment::Align8,
                Alignment::Align16,
            ] {
                let index = class_index(size, alignment).unwrap();
                assert!(class_size(index) >= size);
                assert!(class_alignment(index) >= alignment);
            }
        }
    }
}
