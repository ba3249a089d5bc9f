use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use dashmap::DashMap;

use crate::adjudicator::CachedDecision;

/// Default bound on the decision cache (§4.6).
pub const DEFAULT_CAPACITY: usize = 10_000;

/// The same sharded-map-plus-LRU-eviction shape as
/// `gatekeeper-semantic::BoundedCache`, specialized to decision records
/// rather than bare scores — kept as its own small type instead of a
/// shared generic across crates, since `gatekeeper-agent` has no other
/// reason to depend on `gatekeeper-semantic`. A hit moves its key to the
/// back of the recency queue, so eviction order tracks use.
pub struct DecisionCache {
    capacity: usize,
    map: DashMap<String, CachedDecision>,
    order: Mutex<VecDeque<String>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl DecisionCache {
    pub fn new(capacity: usize) -> DecisionCache {
        DecisionCache {
            capacity,
            map: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get(&self, key: &str) -> Option<CachedDecision> {
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
    fn touch(&self, key: &str) {
        let mut order = self.order.lock().expect("decision cache order lock poisoned");
        if let Some(pos) = order.iter().position(|k| k == key) {
            let key = order.remove(pos).expect("position just found");
            order.push_back(key);
        }
    }

    pub fn insert(&self, key: String, value: CachedDecision) {
        if self.map.insert(key.clone(), value).is_none() {
            let mut order = self.order.lock().expect("decision cache order lock poisoned");
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

    pub fn size(&self) -> usize {
        self.map.len()
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

    /// Purged on policy reload (§4.6) — a stale adjudication is strictly
    /// worse than re-paying for one.
    pub fn clear(&self) {
        self.map.clear();
        self.order.lock().expect("decision cache order lock poisoned").clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AgentVerdict;

    fn decision() -> CachedDecision {
        CachedDecision {
            verdict: AgentVerdict::Allow,
            confidence: 0.7,
            reasoning: "test".to_string(),
        }
    }

    #[test]
    fn hit_miss_and_eviction() {
        let cache = DecisionCache::new(1);
        cache.insert("a".to_string(), decision());
        assert!(cache.get("a").is_some());
        assert!(cache.get("missing").is_none());
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);

        cache.insert("b".to_string(), decision());
        assert_eq!(cache.size(), 1);
        assert!(cache.get("a").is_none());
    }

    #[test]
    fn access_protects_key_from_eviction() {
        let cache = DecisionCache::new(2);
        cache.insert("a".to_string(), decision());
        cache.insert("b".to_string(), decision());
        assert!(cache.get("a").is_some());
        cache.insert("c".to_string(), decision());
        assert!(cache.get("b").is_none());
        assert!(cache.get("a").is_some());
        assert!(cache.get("c").is_some());
    }
}
