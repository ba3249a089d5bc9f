use std::collections::VecDeque;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use dashmap::DashMap;

/// A concurrent, size-capped LRU cache: `dashmap` gives the sharded-lock
/// concurrent map (§9, "bounded maps with size cap and sharded locks");
/// a small recency queue bounds it, evicting the least-recently-used
/// entry once capacity is exceeded. A hit moves its key to the back of
/// the queue, so eviction order tracks use, not just insertion. Hit/miss
/// counts are atomic and independent of the map's own locking.
pub struct BoundedCache<K, V> {
    capacity: usize,
    map: DashMap<K, V>,
    order: Mutex<VecDeque<K>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K: Eq + Hash + Clone, V: Clone> BoundedCache<K, V> {
    pub fn new(capacity: usize) -> BoundedCache<K, V> {
        BoundedCache {
            capacity,
            map: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        match self.map.get(key) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                let value = entry.clone();
                drop(entry);
                self.touch(key);
                Some(value)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Moves `key` to the back of the recency queue, marking it most
    /// recently used.
    fn touch(&self, key: &K) {
        let mut order = self.order.lock().expect("cache order lock poisoned");
        if let Some(pos) = order.iter().position(|k| k == key) {
            let key = order.remove(pos).expect("position just found");
            order.push_back(key);
        }
    }

    pub fn insert(&self, key: K, value: V) {
        if self.map.insert(key.clone(), value).is_none() {
            let mut order = self.order.lock().expect("cache order lock poisoned");
            order.push_back(key);
            if order.len() > self.capacity {
                if let Some(oldest) = order.pop_front() {
                    self.map.remove(&oldest);
                }
            }
        } else {
            self.touch(&key);
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits() as f64;
        let misses = self.misses() as f64;
        if hits + misses == 0.0 {
            0.0
        } else {
            hits / (hits + misses)
        }
    }

    /// Invalidates the cache wholesale; called on policy reload (§4.5).
    pub fn clear(&self) {
        self.map.clear();
        self.order.lock().expect("cache order lock poisoned").clear();
    }
}
