//! Containers that draw their storage from a pool
//!
//! - [`PoolBox`] - owning pointer to one value
//! - [`PoolVec`] - growable array through a [`PoolAdapter`](crate::adapter::PoolAdapter)
//! - [`PoolString`] - growable UTF-8 buffer sized by bucket classes

mod pool_box;
mod string;
mod vec;

pub use pool_box::PoolBox;
pub use string::PoolString;
pub use vec::PoolVec;
