//! Bounded recycling pool for transient visual entities.
//!
//! Pools hand out [`PoolHandle`]s instead of references so gameplay code can
//! hold on to an entity across frames while the pool keeps exclusive
//! ownership of storage. Handles are generation-checked: once an object is
//! released or evicted, old handles stop resolving.
//!
//! Capacity policy:
//! - `acquire` never fails; past `max_size` it evicts the oldest active
//!   object (FIFO), resets it and hands it out again
//! - `try_acquire` never evicts; use it for entities whose loss matters
//! - released objects are kept for reuse only while fewer than
//!   `max_size / 2` are idle

mod handle;
mod pool;

pub use handle::PoolHandle;
pub use pool::{Pool, PoolConfig, PoolStats, Recycle};
