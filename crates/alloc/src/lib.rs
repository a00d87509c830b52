//! # nebula-alloc
//!
//! Manually managed, single-threaded allocators for the Nebula workflow
//! automation ecosystem.
//!
//! Four strategies share one [`Allocator`](allocator::Allocator) surface:
//! - [`SlabPool`](allocator::SlabPool) - fixed-size slots reused through an
//!   intrusive free list
//! - [`BumpChunks`](allocator::BumpChunks) - grow-only arena released in bulk
//! - [`ScratchArena`](allocator::ScratchArena) - LIFO arena over one buffer
//!   with heap fallback
//! - [`BucketPool`](allocator::BucketPool) - size classes backed by a private
//!   bump arena
//!
//! The [`adapter`] module turns any of them into a typed handle for
//! containers; [`collections`] holds a few containers built on it.
//!
//! ## Quick Start
//!
//! ```rust
//! use nebula_alloc::prelude::*;
//!
//! let pool = BucketPool::new(BucketConfig::default())?;
//!
//! // Raw blocks
//! let ptr = pool.alloc(24, Alignment::Align8);
//! unsafe { pool.dealloc(ptr, 24, Alignment::Align8) };
//!
//! // Containers
//! let mut names = PoolVec::new_in(&pool);
//! names.push(PoolString::from_str_in("nebula", &pool))?;
//! assert_eq!(names[0], "nebula");
//! # Ok::<(), nebula_alloc::MemoryError>(())
//! ```
//!
//! ## Features
//!
//! - `logging` (default): structured `tracing` events for chunk growth,
//!   large blocks, heap fallbacks and rejected configurations
//!
//! ## Threading
//!
//! Every allocator is `Send` but `!Sync`: it uses `Cell`-based state and no
//! locks. Move one into the thread that uses it, or share it behind an
//! external lock such as `Arc<Mutex<_>>`.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::perf)]
#![warn(clippy::pedantic)]
#![warn(rust_2018_idioms)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
// Explicit lifetimes are clearer in arena code even when elidable
#![allow(clippy::elidable_lifetime_names)]
// inline(always) on small alignment helpers is intentional for hot paths
#![allow(clippy::inline_always)]
#![allow(clippy::cast_precision_loss)]
// #[must_use] on fns returning Self/Result documents intent even if type is already must_use
#![allow(clippy::double_must_use)]
#![allow(clippy::return_self_not_must_use)]
// Free-list nodes overlay slots that are checked to be pointer aligned
#![allow(clippy::cast_ptr_alignment)]

#[macro_use]
mod macros;

pub mod error;

pub mod adapter;
pub mod allocator;
pub mod collections;
pub mod core;
pub mod utils;

pub use crate::core::Alignment;
pub use crate::error::{MemoryError, MemoryResult, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::core::{Alignment, DebugPatterns, MemoryUsage};

    pub use crate::error::{MemoryError, MemoryResult, Result};

    pub use crate::allocator::{
        AllocError, AllocResult, Allocator, AllocatorId, AllocatorStats, BucketConfig,
        BucketPool, BumpChunks, BumpConfig, ScratchArena, ScratchConfig, ScratchFrame,
        ScratchMarker, SlabConfig, SlabPool, StatisticsProvider,
    };

    pub use crate::adapter::{
        BucketAdapter, BumpAdapter, PoolAdapter, ScratchAdapter, SlabAdapter, create, destroy,
    };

    pub use crate::collections::{PoolBox, PoolString, PoolVec};
}
