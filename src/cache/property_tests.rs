//! Property-Based Tests for Cache Module
//!
//! Uses proptest to drive random operation sequences against the cache and
//! re-check its bookkeeping after every step.

use proptest::prelude::*;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::cache::{ByteSize, LruCache};

// == Test Value ==
/// Value with an arbitrary declared size.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Blob(usize);

impl ByteSize for Blob {
    fn byte_size(&self) -> usize {
        self.0
    }
}

// == Strategies ==
/// Small key alphabet so operations collide on the same keys often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-e]{1,3}".prop_map(|s| s)
}

fn size_strategy() -> impl Strategy<Value = usize> {
    0usize..40
}

#[derive(Debug, Clone)]
enum CacheOp {
    Insert { key: String, size: usize },
    Get { key: String },
    Remove { key: String },
    EvictOldest,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        3 => (key_strategy(), size_strategy())
            .prop_map(|(key, size)| CacheOp::Insert { key, size }),
        2 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        1 => key_strategy().prop_map(|key| CacheOp::Remove { key }),
        1 => Just(CacheOp::EvictOldest),
    ]
}

/// Reference model: keys ordered most recent first.
#[derive(Debug, Default)]
struct Model {
    order: Vec<(String, usize)>,
}

impl Model {
    fn position(&self, key: &str) -> Option<usize> {
        self.order.iter().position(|(k, _)| k == key)
    }

    fn used_bytes(&self) -> usize {
        self.order.iter().map(|(k, size)| k.len() + size).sum()
    }

    fn touch(&mut self, key: &str) -> bool {
        match self.position(key) {
            Some(pos) => {
                let item = self.order.remove(pos);
                self.order.insert(0, item);
                true
            }
            None => false,
        }
    }

    fn insert(&mut self, key: &str, size: usize, max_bytes: usize) -> Vec<String> {
        if let Some(pos) = self.position(key) {
            self.order.remove(pos);
        }
        self.order.insert(0, (key.to_string(), size));

        let mut evicted = Vec::new();
        while max_bytes != 0 && self.used_bytes() > max_bytes && self.order.len() > 1 {
            if let Some((k, _)) = self.order.pop() {
                evicted.push(k);
            }
        }
        evicted
    }
}

fn recording_cache(max_bytes: usize) -> (LruCache<Blob>, Rc<RefCell<Vec<String>>>) {
    let evicted = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&evicted);
    let cache = LruCache::with_listener(max_bytes, move |key: String, _value: Blob| {
        sink.borrow_mut().push(key);
    });
    (cache, evicted)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Index/list bijection and byte accounting hold after every operation,
    // and the cache agrees with a naive reference model.
    #[test]
    fn prop_matches_reference_model(
        max_bytes in prop_oneof![Just(0usize), 1usize..120],
        ops in prop::collection::vec(cache_op_strategy(), 1..80)
    ) {
        let (mut cache, evicted) = recording_cache(max_bytes);
        let mut model = Model::default();

        for op in ops {
            evicted.borrow_mut().clear();
            let mut expected_evicted = Vec::new();

            match op {
                CacheOp::Insert { key, size } => {
                    expected_evicted = model.insert(&key, size, max_bytes);
                    cache.insert(key, Blob(size));
                }
                CacheOp::Get { key } => {
                    let found = model.touch(&key);
                    prop_assert_eq!(cache.get(&key).is_some(), found);
                }
                CacheOp::Remove { key } => {
                    let expected = model.position(&key).map(|pos| model.order.remove(pos).1);
                    prop_assert_eq!(cache.remove(&key).map(|b| b.0), expected);
                }
                CacheOp::EvictOldest => {
                    if let Some((k, _)) = model.order.pop() {
                        expected_evicted.push(k);
                    }
                    cache.evict_oldest();
                }
            }

            cache.assert_invariants();
            prop_assert_eq!(&*evicted.borrow(), &expected_evicted);
            prop_assert_eq!(cache.used_bytes(), model.used_bytes());

            let cache_keys: Vec<&str> = cache.iter().map(|(k, _)| k).collect();
            let model_keys: Vec<&str> = model.order.iter().map(|(k, _)| k.as_str()).collect();
            prop_assert_eq!(cache_keys, model_keys);
        }
    }

    // After any insert, usage fits the budget unless the budget is
    // unbounded or a single oversized entry remains.
    #[test]
    fn prop_capacity_enforcement(
        max_bytes in 0usize..100,
        entries in prop::collection::vec((key_strategy(), size_strategy()), 1..100)
    ) {
        let mut cache = LruCache::new(max_bytes);

        for (key, size) in entries {
            cache.insert(key, Blob(size));
            prop_assert!(
                max_bytes == 0 || cache.used_bytes() <= max_bytes || cache.len() == 1,
                "used {} bytes over budget {} with {} entries",
                cache.used_bytes(),
                max_bytes,
                cache.len()
            );
        }
    }

    // A key just read or written is the last to be evicted.
    #[test]
    fn prop_recency_law(
        keys in prop::collection::hash_set("[a-z]{2,6}", 2..10),
        pick in any::<prop::sample::Index>()
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let mut cache = LruCache::new(0);
        for key in &keys {
            cache.insert(key.clone(), Blob(1));
        }

        let touched = pick.get(&keys).clone();
        prop_assert!(cache.get(&touched).is_some());

        for _ in 0..keys.len() - 1 {
            let oldest = cache.peek_oldest().map(|(k, _)| k.to_string());
            prop_assert_ne!(oldest.as_deref(), Some(touched.as_str()));
            cache.evict_oldest();
        }
        prop_assert_eq!(cache.peek_oldest().map(|(k, _)| k), Some(touched.as_str()));
    }

    // Consecutive forced evictions run strictly oldest first.
    #[test]
    fn prop_eviction_order(
        keys in prop::collection::hash_set("[a-z]{4}", 3..12),
        big in 1usize..4
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let per_entry = 4 + 4;
        let max_bytes = per_entry * keys.len();
        let (mut cache, evicted) = recording_cache(max_bytes);

        for key in &keys {
            cache.insert(key.clone(), Blob(4));
        }
        prop_assert!(evicted.borrow().is_empty());

        // Charges `big` entries' worth of bytes, so exactly `big` must go
        cache.insert("ZZZZ", Blob(4 + per_entry * (big - 1)));

        prop_assert_eq!(&*evicted.borrow(), &keys[..big].to_vec());
        cache.assert_invariants();
    }

    // Rewriting a key keeps one entry charged only for the latest value.
    #[test]
    fn prop_update_in_place(
        key in key_strategy(),
        first in size_strategy(),
        second in size_strategy()
    ) {
        let mut cache = LruCache::new(0);

        cache.insert(key.clone(), Blob(first));
        cache.insert(key.clone(), Blob(second));

        prop_assert_eq!(cache.len(), 1);
        prop_assert_eq!(cache.used_bytes(), key.len() + second);
        prop_assert_eq!(cache.peek(&key), Some(&Blob(second)));
    }
}

// Unbounded caches keep every distinct key.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn prop_unbounded_keeps_everything(sizes in prop::collection::vec(0usize..10_000, 1..300)) {
        let mut cache = LruCache::new(0);
        let mut expected = HashMap::new();

        for (i, size) in sizes.iter().enumerate() {
            let key = format!("key{}", i);
            cache.insert(key.clone(), Blob(*size));
            expected.insert(key, *size);
        }

        prop_assert_eq!(cache.len(), expected.len());
        prop_assert_eq!(cache.stats().evictions, 0);
        for (key, size) in &expected {
            prop_assert_eq!(cache.peek(key), Some(&Blob(*size)));
        }
    }
}
