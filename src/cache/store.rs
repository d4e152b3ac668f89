//! Cache Store Module
//!
//! Main cache engine combining a HashMap index with the LRU list and byte
//! accounting against a fixed budget.

use std::collections::HashMap;
use std::fmt;
use std::ops::{Deref, DerefMut};

use tracing::{debug, trace, warn};

use crate::cache::lru::{LruList, NodeId};
use crate::cache::{ByteSize, CacheEntry, CacheStats, EvictionListener, UNBOUNDED};
use crate::config::CacheConfig;

// == LRU Cache ==
/// Byte-bounded cache that evicts the least recently used entry.
///
/// Each entry is charged `key.len() + value.byte_size()` bytes. When an
/// insert pushes usage over `max_bytes`, the oldest entries are evicted
/// until usage fits again. A `max_bytes` of zero disables eviction.
///
/// An entry larger than the whole budget is still accepted: it evicts
/// everything else and stays, leaving the cache over budget until the next
/// insert or eviction.
///
/// The cache does no locking. Share it across threads only behind the
/// caller's own synchronization.
pub struct LruCache<V> {
    /// Key to list handle
    index: HashMap<String, NodeId>,
    /// Entries ordered by recency
    order: LruList<CacheEntry<V>>,
    /// Sum of every live entry's charge
    used_bytes: usize,
    /// Byte budget, 0 = unbounded
    max_bytes: usize,
    /// Optional eviction hook
    on_evicted: Option<Box<dyn EvictionListener<V>>>,
    /// Activity counters
    stats: CacheStats,
}

impl<V> fmt::Debug for LruCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("len", &self.order.len())
            .field("used_bytes", &self.used_bytes)
            .field("max_bytes", &self.max_bytes)
            .field("has_listener", &self.on_evicted.is_some())
            .field("stats", &self.stats)
            .finish()
    }
}

impl<V: ByteSize> LruCache<V> {
    // == Constructor ==
    /// Creates an empty cache with a byte budget and no eviction listener.
    ///
    /// # Arguments
    /// * `max_bytes` - Byte budget, or 0 for an unbounded cache
    pub fn new(max_bytes: usize) -> Self {
        Self {
            index: HashMap::new(),
            order: LruList::new(),
            used_bytes: 0,
            max_bytes,
            on_evicted: None,
            stats: CacheStats::new(),
        }
    }

    /// Creates an empty cache that reports every eviction to `listener`.
    pub fn with_listener<L>(max_bytes: usize, listener: L) -> Self
    where
        L: EvictionListener<V> + 'static,
    {
        let mut cache = Self::new(max_bytes);
        cache.on_evicted = Some(Box::new(listener));
        cache
    }

    /// Creates an empty cache sized from configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_bytes)
    }

    // == Insert ==
    /// Inserts or updates an entry and makes it the most recently used.
    ///
    /// Replacing an existing value adjusts usage by the difference in value
    /// size. Afterwards, least recently used entries are evicted while usage
    /// exceeds the budget, stopping before the entry just written.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();

        if let Some(&id) = self.index.get(&key) {
            let entry = self
                .order
                .get_mut(id)
                .expect("indexed key has no live list node");
            let old_size = entry.value.byte_size();
            let new_size = value.byte_size();
            entry.value = value;
            self.used_bytes -= old_size;
            self.used_bytes += new_size;
            trace!(key = %key, old_size, new_size, "updated cache entry");
            self.order.move_to_front(id);
            self.stats.record_update();
        } else {
            let entry = CacheEntry::new(key.clone(), value);
            let charge = entry.charge();
            self.used_bytes += charge;
            let id = self.order.push_front(entry);
            trace!(key = %key, charge, "inserted cache entry");
            self.index.insert(key, id);
            self.stats.record_insertion();
        }

        self.enforce_budget();
    }

    // == Get ==
    /// Looks up a value and marks it as the most recently used.
    ///
    /// Returns None on a miss; a miss changes nothing but the miss counter.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        match self.index.get(key) {
            Some(&id) => {
                self.stats.record_hit();
                self.order.move_to_front(id);
                self.order.get(id).map(|entry| &entry.value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Like [`get`](Self::get), but returns a guard that derefs to the
    /// value mutably.
    ///
    /// When the guard drops, the value is re-measured. A size change is
    /// applied to `used_bytes` and the budget is enforced again, so growing
    /// a value can evict older entries.
    pub fn get_mut(&mut self, key: &str) -> Option<ValueMut<'_, V>> {
        match self.index.get(key) {
            Some(&id) => {
                self.stats.record_hit();
                self.order.move_to_front(id);
                let old_size = self.order.get(id)?.value.byte_size();
                Some(ValueMut {
                    cache: self,
                    id,
                    old_size,
                })
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Peek ==
    /// Looks up a value without touching recency or statistics.
    pub fn peek(&self, key: &str) -> Option<&V> {
        self.index
            .get(key)
            .and_then(|&id| self.order.get(id))
            .map(|entry| &entry.value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    // == Peek Oldest ==
    /// Returns the entry the next eviction would remove.
    pub fn peek_oldest(&self) -> Option<(&str, &V)> {
        self.order
            .peek_back()
            .map(|entry| (entry.key.as_str(), &entry.value))
    }

    // == Evict Oldest ==
    /// Evicts the least recently used entry and notifies the listener.
    ///
    /// Does nothing on an empty cache.
    pub fn evict_oldest(&mut self) {
        if let Some(entry) = self.order.pop_back() {
            self.index.remove(&entry.key);
            let charge = entry.charge();
            self.used_bytes -= charge;
            self.stats.record_eviction();

            debug!(
                key = %entry.key,
                freed_bytes = charge,
                used_bytes = self.used_bytes,
                "evicted least recently used entry"
            );

            if let Some(listener) = self.on_evicted.as_mut() {
                listener.on_evicted(entry.key, entry.value);
            }
        }
    }

    // == Remove ==
    /// Removes an entry by key and returns its value.
    ///
    /// This is not an eviction: the listener is not called.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let id = self.index.remove(key)?;
        let entry = self.order.remove(id)?;
        self.used_bytes -= entry.charge();
        self.stats.record_removal();
        Some(entry.value)
    }

    // == Clear ==
    /// Drops every entry without notifying the listener.
    pub fn clear(&mut self) {
        self.index.clear();
        self.order.clear();
        self.used_bytes = 0;
    }

    // == Iterate ==
    /// Iterates entries from most to least recently used without touching
    /// recency.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> + '_ {
        self.order
            .iter()
            .map(|entry| (entry.key.as_str(), &entry.value))
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Bytes currently charged against the budget.
    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    /// The byte budget; 0 means unbounded.
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_occupancy(self.order.len(), self.used_bytes);
        stats
    }

    // The newest entry sits at the front, so with more than one entry
    // left the back is never the entry just written.
    fn enforce_budget(&mut self) {
        if self.max_bytes == UNBOUNDED {
            return;
        }

        while self.used_bytes > self.max_bytes && self.order.len() > 1 {
            self.evict_oldest();
        }

        if self.used_bytes > self.max_bytes {
            warn!(
                used_bytes = self.used_bytes,
                max_bytes = self.max_bytes,
                "single entry exceeds the byte budget, keeping it"
            );
        }
    }

    // == Invariant Check ==
    /// Recomputes accounting from scratch and checks index/list agreement.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        assert_eq!(self.index.len(), self.order.len(), "index and list sizes differ");
        assert_eq!(self.order.iter().count(), self.order.len(), "list length drifted");

        for (key, &id) in &self.index {
            let entry = self.order.get(id).expect("index points at a dead node");
            assert_eq!(&entry.key, key, "index points at the wrong entry");
        }

        let recomputed: usize = self.order.iter().map(CacheEntry::charge).sum();
        assert_eq!(self.used_bytes, recomputed, "used_bytes out of sync");
    }
}

// == Value Guard ==
/// Mutable access to a cached value, returned by [`LruCache::get_mut`].
///
/// Re-measures the value on drop and updates the cache's byte accounting.
pub struct ValueMut<'a, V: ByteSize> {
    cache: &'a mut LruCache<V>,
    id: NodeId,
    old_size: usize,
}

impl<V: ByteSize> Deref for ValueMut<'_, V> {
    type Target = V;

    fn deref(&self) -> &V {
        &self
            .cache
            .order
            .get(self.id)
            .expect("guarded node removed while borrowed")
            .value
    }
}

impl<V: ByteSize> DerefMut for ValueMut<'_, V> {
    fn deref_mut(&mut self) -> &mut V {
        &mut self
            .cache
            .order
            .get_mut(self.id)
            .expect("guarded node removed while borrowed")
            .value
    }
}

impl<V: ByteSize> Drop for ValueMut<'_, V> {
    fn drop(&mut self) {
        let new_size = match self.cache.order.get(self.id) {
            Some(entry) => entry.value.byte_size(),
            None => return,
        };
        if new_size == self.old_size {
            return;
        }

        self.cache.used_bytes -= self.old_size;
        self.cache.used_bytes += new_size;
        trace!(old_size = self.old_size, new_size, "resized cache entry in place");
        self.cache.enforce_budget();
    }
}
