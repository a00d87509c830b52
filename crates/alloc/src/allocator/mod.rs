//! Allocator implementations
//!
//! Four strategies with one shared [`Allocator`] surface:
//! - [`SlabPool`] - fixed-size slots with LIFO reuse
//! - [`BumpChunks`] - grow-only, released in bulk
//! - [`ScratchArena`] - stack discipline over one buffer, heap fallback
//! - [`BucketPool`] - size classes over a private [`BumpChunks`]

mod stats;
mod traits;

pub mod bucket;
pub mod bump;
pub mod scratch;
pub mod slab;

pub use bucket::{BucketConfig, BucketPool, bucket_size};
pub use bump::{BumpChunks, BumpConfig};
pub use scratch::{ScratchArena, ScratchConfig, ScratchFrame, ScratchMarker};
pub use slab::{SlabConfig, SlabPool};

pub use crate::error::{AllocError, AllocResult};
pub(crate) use stats::Counters;
pub use stats::{AllocatorStats, StatisticsProvider};
pub use traits::{Allocator, AllocatorId};
