//! RAII-based scratch frame for automatic restoration

use super::{ScratchArena, ScratchMarker};

/// Restores a [`ScratchArena`] to a marked position when dropped
///
/// Created by [`ScratchArena::frame`].
pub struct ScratchFrame<'a, 'buf> {
    arena: &'a ScratchArena<'buf>,
    marker: ScratchMarker,
}

impl<'a, 'buf> ScratchFrame<'a, 'buf> {
    /// # Safety
    /// Same contract as [`ScratchArena::frame`].
    pub(super) unsafe fn new(arena: &'a ScratchArena<'buf>) -> Self {
        Self {
            arena,
            marker: arena.mark(),
        }
    }

    /// Gets the underlying arena
    #[must_use]
    pub fn arena(&self) -> &'a ScratchArena<'buf> {
        self.arena
    }

    /// Position this frame restores to
    #[must_use]
    pub fn marker(&self) -> ScratchMarker {
        self.marker
    }

    /// Manually restore and consume this frame
    pub fn restore(self) {
        drop(self);
    }
}

impl Drop for ScratchFrame<'_, '_> {
    fn drop(&mut self) {
        // SAFETY: the creator of the frame promised that nothing allocated
        // inside it outlives it. The marker comes from this arena, so release
        // only fails if an enclosing frame was already restored, in which case
        // there is nothing left to roll back.
        let _ = unsafe { self.arena.release(self.marker) };
    }
}
