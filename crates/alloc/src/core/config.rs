//! Configuration shared by all allocator configs

/// Fill patterns for debugging
///
/// `alloc` poisons memory as it is handed out (fresh chunks, recycled slots);
/// `dealloc` poisons memory as it is returned. Both default to on only in
/// debug builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugPatterns {
    /// Fill byte for newly allocated memory
    pub alloc: Option<u8>,
    /// Fill byte for deallocated memory
    pub dealloc: Option<u8>,
}

impl DebugPatterns {
    /// No filling at all
    pub const NONE: Self = Self {
        alloc: None,
        dealloc: None,
    };

    /// Fill with recognizable bytes regardless of build profile
    pub const DEBUG: Self = Self {
        alloc: Some(0xAA),
        dealloc: Some(0xDD),
    };
}

impl Default for DebugPatterns {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::DEBUG
        } else {
            Self::NONE
        }
    }
}
