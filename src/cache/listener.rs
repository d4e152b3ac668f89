//! Eviction Listener Module
//!
//! Hook invoked synchronously whenever the cache evicts an entry.

// == Eviction Listener ==
/// Receives entries the cache evicts to stay within its byte budget.
///
/// Called once per evicted entry, from inside the `insert` or
/// `evict_oldest` call that caused the eviction. Explicit removals and
/// `clear` do not notify the listener.
///
/// Any `FnMut(String, V)` closure is a listener.
pub trait EvictionListener<V> {
    /// Takes ownership of the evicted key and value.
    fn on_evicted(&mut self, key: String, value: V);
}

impl<V, F> EvictionListener<V> for F
where
    F: FnMut(String, V),
{
    fn on_evicted(&mut self, key: String, value: V) {
        self(key, value)
    }
}
