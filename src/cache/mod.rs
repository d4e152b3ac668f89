//! Cache Module
//!
//! Provides a byte-bounded in-memory cache with LRU eviction.

mod entry;
mod listener;
mod lru;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{ByteSize, CacheEntry};
pub use listener::EvictionListener;
pub use lru::{Iter, LruList, NodeId};
pub use stats::CacheStats;
pub use store::{LruCache, ValueMut};

// == Public Constants ==
/// Byte budget that disables eviction entirely
pub const UNBOUNDED: usize = 0;
