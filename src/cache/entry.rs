//! Entry bookkeeping shared by every cache tier.
//!
//! Caches advance a logical tick on every operation instead of
//! reading wall clocks, so eviction order is deterministic under
//! test and identical across platforms.

use std::collections::HashMap;

/// One cached payload with its access statistics.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub key: String,
    pub payload: T,
    /// Tick at which the entry was created.
    pub created_at: u64,
    pub access_count: u64,
    /// Tick of the most recent hit or insertion.
    pub last_accessed: u64,
}

impl<T> CacheEntry<T> {
    pub fn new(key: String, payload: T, tick: u64) -> Self {
        Self { key, payload, created_at: tick, access_count: 1, last_accessed: tick }
    }

    /// Record a hit.
    pub fn touch(&mut self, tick: u64) {
        self.access_count += 1;
        self.last_accessed = tick;
    }

    /// Retention score: recency plus frequency-weighted popularity.
    /// Lowest scores are evicted first.
    pub fn score(&self, frequency_weight: u64) -> u64 {
        self.last_accessed + self.access_count * frequency_weight
    }
}

/// Keys of the lowest-scoring ~20% of entries, at least one. The
/// most recently touched entry is never a candidate, whatever its
/// score. Called when a cache has grown past capacity; evicting a
/// batch amortizes the scan instead of rescoring on every insert.
pub fn eviction_batch<T>(
    entries: &HashMap<String, CacheEntry<T>>,
    frequency_weight: u64,
) -> Vec<String> {
    let newest = entries.values().map(|e| e.last_accessed).max().unwrap_or(0);
    let mut scored: Vec<(u64, &String)> = entries
        .values()
        .filter(|entry| entry.last_accessed != newest)
        .map(|entry| (entry.score(frequency_weight), &entry.key))
        .collect();
    scored.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));

    let batch = (entries.len() / 5).max(1);
    scored.into_iter().take(batch).map(|(_, key)| key.clone()).collect()
}
