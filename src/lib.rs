//! Byte LRU - A byte-bounded in-memory LRU cache
//!
//! Stores values that report their own size and evicts the least recently
//! used entries once the configured byte budget is exceeded.
//!
//! ```
//! use byte_lru::LruCache;
//!
//! // "a" + "12345" and "bb" + "12345" charge 6 and 7 bytes
//! let mut cache = LruCache::new(20);
//! cache.insert("a", "12345".to_string());
//! cache.insert("bb", "12345".to_string());
//! cache.get("a");
//!
//! // 13 more bytes push usage to 26, so "bb" is evicted
//! cache.insert("ccc", "0123456789".to_string());
//! assert!(cache.get("bb").is_none());
//! assert_eq!(cache.used_bytes(), 19);
//! ```

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{ByteSize, CacheStats, EvictionListener, LruCache, UNBOUNDED};
pub use config::CacheConfig;
pub use error::{ConfigError, Result};
