//! Growable UTF-8 buffer on a bucket pool

use core::fmt;
use core::ops::Deref;
use core::ptr::{self, NonNull};

use crate::allocator::BucketPool;
use crate::core::Alignment;

/// `String`-like buffer whose storage comes from a [`BucketPool`]
///
/// Growth doubles the capacity and then rounds it up to the bucket that will
/// serve it, so the whole block the pool hands out is usable.
pub struct PoolString<'a> {
    ptr: NonNull<u8>,
    len: usize,
    cap: usize,
    pool: &'a BucketPool,
}

impl<'a> PoolString<'a> {
    const MIN_CAPACITY: usize = 8;

    /// Empty string; nothing is allocated until text is added
    #[must_use]
    pub fn new_in(pool: &'a BucketPool) -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            cap: 0,
            pool,
        }
    }

    /// Empty string with room for at least `capacity` bytes
    #[must_use]
    pub fn with_capacity_in(capacity: usize, pool: &'a BucketPool) -> Self {
        let mut string = Self::new_in(pool);
        string.reserve(capacity);
        string
    }

    /// Copies `text` into a new string
    #[must_use]
    pub fn from_str_in(text: &str, pool: &'a BucketPool) -> Self {
        let mut string = Self::with_capacity_in(text.len(), pool);
        string.push_str(text);
        string
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        // SAFETY: the first len bytes are initialized and were copied from
        // &str/char values only, so they are valid UTF-8.
        unsafe {
            core::str::from_utf8_unchecked(core::slice::from_raw_parts(
                self.ptr.as_ptr(),
                self.len,
            ))
        }
    }

    /// Makes room for `additional` more bytes
    ///
    /// # Panics
    /// Panics if the new capacity overflows `usize`.
    pub fn reserve(&mut self, additional: usize) {
        let Some(needed) = self.len.checked_add(additional) else {
            capacity_overflow()
        };
        if needed <= self.cap {
            return;
        }

        let target = needed
            .max(self.cap.saturating_mul(2))
            .max(Self::MIN_CAPACITY);
        let cap = self.pool.bucket_size(target);
        let ptr = self.pool.alloc(cap, Alignment::Align1);

        if self.cap > 0 {
            // SAFETY: the old block holds len initialized bytes, the new one
            // has cap >= needed >= len, and they are distinct blocks. The old
            // block was allocated with (self.cap, Align1).
            unsafe {
                ptr::copy_nonoverlapping(self.ptr.as_ptr(), ptr.as_ptr(), self.len);
                self.pool.dealloc(self.ptr, self.cap, Alignment::Align1);
            }
        }

        self.ptr = ptr;
        self.cap = cap;
    }

    pub fn push_str(&mut self, text: &str) {
        self.reserve(text.len());
        // SAFETY: reserve made room for text.len() bytes after len.
        unsafe {
            ptr::copy_nonoverlapping(
                text.as_ptr(),
                self.ptr.as_ptr().add(self.len),
                text.len(),
            );
        }
        self.len += text.len();
    }

    pub fn push(&mut self, ch: char) {
        self.push_str(ch.encode_utf8(&mut [0; 4]));
    }

    /// Empties the string, keeping its storage
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

#[cold]
#[inline(never)]
fn capacity_overflow() -> ! {
    panic!("capacity overflow")
}

impl Deref for PoolString<'_> {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl Drop for PoolString<'_> {
    fn drop(&mut self) {
        if self.cap > 0 {
            // SAFETY: the block was allocated with (cap, Align1) on this pool.
            unsafe { self.pool.dealloc(self.ptr, self.cap, Alignment::Align1) };
        }
    }
}

impl fmt::Write for PoolString<'_> {
    fn write_str(&mut self, text: &str) -> fmt::Result {
        self.push_str(text);
        Ok(())
    }
}

impl fmt::Display for PoolString<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

impl fmt::Debug for PoolString<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl PartialEq<str> for PoolString<'_> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for PoolString<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}
