//! Core functionality for nebula-alloc
//!
//! The building blocks shared by every allocator:
//! - [`Alignment`], the validated alignment type
//! - owned heap chunks and the intrusive free list (crate-internal)
//! - [`DebugPatterns`] fill configuration
//! - the [`MemoryUsage`] trait

pub mod alignment;
pub(crate) mod chunk;
pub mod config;
pub(crate) mod free_list;
pub mod traits;

pub use alignment::Alignment;
pub use config::DebugPatterns;
pub use traits::MemoryUsage;

/// Memory size constants
pub mod size {
    /// 1 Kilobyte
    pub const KB: usize = 1024;
}
