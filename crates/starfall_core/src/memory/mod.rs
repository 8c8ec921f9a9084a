//! Memory management for high-churn objects.
//!
//! One primitive lives here: the grow-on-demand [`ObjectPool`]. Frame
//! code acquires and releases pooled objects through copyable
//! generational handles; the pool owns every object for its whole life.

mod pool;

pub use pool::{ObjectPool, PoolHandle};
