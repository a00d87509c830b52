//! Address arithmetic helpers shared by the allocators

/// Aligns a value up to the nearest multiple of alignment
///
/// # Examples
/// ```
/// use nebula_alloc::utils::align_up;
///
/// assert_eq!(align_up(7, 8), 8);
/// assert_eq!(align_up(8, 8), 8);
/// assert_eq!(align_up(9, 8), 16);
/// ```
#[inline(always)]
#[must_use]
pub const fn align_up(value: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two());
    (value + alignment - 1) & !(alignment - 1)
}

/// Like [`align_up`], but returns `None` instead of wrapping
#[inline]
#[must_use]
pub const fn checked_align_up(value: usize, alignment: usize) -> Option<usize> {
    debug_assert!(alignment.is_power_of_two());
    match value.checked_add(alignment - 1) {
        Some(bumped) => Some(bumped & !(alignment - 1)),
        None => None,
    }
}

/// Checks if an address is aligned to the given power-of-two alignment
#[inline(always)]
#[must_use]
pub const fn is_aligned(addr: usize, alignment: usize) -> bool {
    addr & (alignment - 1) == 0
}

/// Largest power of two dividing `value`, capped at `cap`
#[inline]
#[must_use]
pub const fn natural_alignment(value: usize, cap: usize) -> usize {
    if value == 0 {
        return cap;
    }
    let low_bit = value & value.wrapping_neg();
    if low_bit < cap { low_bit } else { cap }
}
