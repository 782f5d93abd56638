//! Capacity-bounded cache of particle clouds.

use std::collections::HashMap;

use tracing::debug;

use crate::cache::entry::{eviction_batch, CacheEntry};
use crate::sampling::SampleSet;

/// Score-evicting cache keyed by the full request signature. The
/// cache owns the canonical copy of every payload; `get` hands out a
/// clone, so a consumer mutating its copy never corrupts the cached
/// one. One instance serves atomic clouds and a second one serves
/// molecular clouds.
pub struct SampleCache {
    entries: HashMap<String, CacheEntry<SampleSet>>,
    capacity: usize,
    frequency_weight: u64,
    clock: u64,
}

impl SampleCache {
    pub fn new(capacity: usize, frequency_weight: u64) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            frequency_weight,
            clock: 0,
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Deep copy of the payload under `key`, if cached.
    pub fn get(&mut self, key: &str) -> Option<SampleSet> {
        let tick = self.tick();
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.touch(tick);
                debug!(key, "sample cache hit");
                Some(entry.payload.clone())
            }
            None => {
                debug!(key, "sample cache miss");
                None
            }
        }
    }

    /// Store a deep copy of `payload`, then evict the lowest-scoring
    /// batch if capacity was exceeded.
    pub fn insert(&mut self, key: &str, payload: &SampleSet) {
        let tick = self.tick();
        self.entries
            .insert(key.to_string(), CacheEntry::new(key.to_string(), payload.clone(), tick));
        if self.entries.len() > self.capacity {
            for evicted in eviction_batch(&self.entries, self.frequency_weight) {
                self.entries.remove(&evicted);
                debug!(key = evicted.as_str(), "sample cache evicted");
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::{SampleMetadata, ThemeMode};

    fn cloud(seed: f32) -> SampleSet {
        SampleSet {
            positions: vec![seed, seed + 1.0, seed + 2.0],
            base_positions: vec![seed, seed + 1.0, seed + 2.0],
            max_probability: 0.25,
            metadata: SampleMetadata {
                requested: 1,
                collected: 1,
                iterations: 10,
                accepted: 5,
                truncated: false,
                theme: ThemeMode::Dark,
            },
        }
    }

    #[test]
    fn test_get_returns_independent_deep_copy() {
        let mut cache = SampleCache::new(4, 8);
        let original = cloud(1.0);
        cache.insert("a", &original);

        let mut copy = cache.get("a").unwrap();
        assert_eq!(copy, original);
        copy.positions[0] = 99.0;

        // the cached canonical copy is untouched
        let again = cache.get("a").unwrap();
        assert_eq!(again.positions[0], 1.0);
    }

    #[test]
    fn test_miss_returns_none() {
        let mut cache = SampleCache::new(4, 8);
        assert!(cache.get("missing").is_none());
        assert!(!cache.contains("missing"));
    }

    #[test]
    fn test_capacity_triggers_batch_eviction() {
        let mut cache = SampleCache::new(4, 8);
        for i in 0..5 {
            cache.insert(&format!("k{i}"), &cloud(i as f32));
        }
        // exceeding capacity drops the lowest-scoring entry, k0
        assert!(cache.len() <= 4);
        assert!(!cache.contains("k0"));
        assert!(cache.contains("k4"));
    }

    #[test]
    fn test_hot_entries_survive_eviction() {
        let mut cache = SampleCache::new(4, 8);
        cache.insert("hot", &cloud(0.0));
        for _ in 0..6 {
            cache.get("hot");
        }
        for i in 0..4 {
            cache.insert(&format!("k{i}"), &cloud(i as f32));
        }
        assert!(cache.contains("hot"));
    }

    #[test]
    fn test_clear() {
        let mut cache = SampleCache::new(4, 8);
        cache.insert("a", &cloud(0.0));
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("a").is_none());
    }
}
