//! Tolerance-matching cache for density-field grids.
//!
//! Field payloads are expensive and small in number, and a grid
//! computed for nearly identical normalization parameters is visually
//! interchangeable. Lookups therefore match extent and maximum
//! probability within tolerances instead of exactly, and may return
//! a grid at a different resolution than requested.

use std::collections::HashMap;

use tracing::debug;

use crate::cache::entry::{eviction_batch, CacheEntry};
use crate::field::DensityFieldData;

/// Absolute tolerance on the grid half-width.
pub const EXTENT_TOLERANCE: f64 = 1e-3;

/// Relative tolerance on the normalization maximum.
pub const MAX_PROBABILITY_TOLERANCE: f64 = 0.02;

/// Entries live under keys "<group>#r<resolution>", where the group
/// string encodes everything except the tolerance-matched fields.
pub struct FieldCache {
    entries: HashMap<String, CacheEntry<DensityFieldData>>,
    capacity: usize,
    frequency_weight: u64,
    clock: u64,
}

impl FieldCache {
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

    fn full_key(group: &str, resolution: u32) -> String {
        format!("{group}#r{resolution}")
    }

    /// Find a reusable grid for the group. `resolution` is the target
    /// after adaptive scaling; among tolerance-passing entries the
    /// smallest resolution >= target wins, then the largest below it.
    pub fn get(
        &mut self,
        group: &str,
        resolution: u32,
        extent: f64,
        max_probability: f64,
    ) -> Option<DensityFieldData> {
        let tick = self.tick();
        let prefix = format!("{group}#r");

        let mut above: Option<(u32, String)> = None;
        let mut below: Option<(u32, String)> = None;
        for entry in self.entries.values() {
            if !entry.key.starts_with(&prefix) {
                continue;
            }
            let data = &entry.payload;
            if (data.extent - extent).abs() >= EXTENT_TOLERANCE {
                continue;
            }
            let relative = (data.max_probability - max_probability).abs()
                / max_probability.abs().max(f64::MIN_POSITIVE);
            if relative >= MAX_PROBABILITY_TOLERANCE {
                continue;
            }
            if data.resolution >= resolution {
                if above.as_ref().map_or(true, |(r, _)| data.resolution < *r) {
                    above = Some((data.resolution, entry.key.clone()));
                }
            } else if below.as_ref().map_or(true, |(r, _)| data.resolution > *r) {
                below = Some((data.resolution, entry.key.clone()));
            }
        }

        let (matched_resolution, key) = match above.or(below) {
            Some(found) => found,
            None => {
                debug!(group, resolution, "field cache miss");
                return None;
            }
        };
        let entry = self.entries.get_mut(&key)?;
        entry.touch(tick);
        debug!(group, resolution, matched_resolution, "field cache hit");
        Some(entry.payload.clone())
    }

    /// Store a deep copy of the grid under its group and resolution,
    /// then evict the lowest-scoring batch if capacity was exceeded.
    pub fn insert(&mut self, group: &str, data: &DensityFieldData) {
        let tick = self.tick();
        let key = Self::full_key(group, data.resolution);
        self.entries
            .insert(key.clone(), CacheEntry::new(key, data.clone(), tick));
        if self.entries.len() > self.capacity {
            for evicted in eviction_batch(&self.entries, self.frequency_weight) {
                self.entries.remove(&evicted);
                debug!(key = evicted.as_str(), "field cache evicted");
            }
        }
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

    fn grid(resolution: u32, extent: f64, max_probability: f64) -> DensityFieldData {
        DensityFieldData {
            resolution,
            extent,
            field: vec![0.5; (resolution as usize).pow(3).min(64)],
            max_sample: 0.9,
            max_probability,
        }
    }

    #[test]
    fn test_tolerance_reuse() {
        let mut cache = FieldCache::new(8, 8);
        cache.insert("g", &grid(60, 5.0, 0.02));
        // nearby request parameters reuse the cached grid as-is
        let hit = cache.get("g", 50, 5.0005, 0.0203).unwrap();
        assert_eq!(hit.resolution, 60);
        assert_eq!(hit.max_probability, 0.02);
    }

    #[test]
    fn test_prefers_smallest_resolution_at_or_above_target() {
        let mut cache = FieldCache::new(8, 8);
        cache.insert("g", &grid(40, 5.0, 0.02));
        cache.insert("g", &grid(96, 5.0, 0.02));
        cache.insert("g", &grid(60, 5.0, 0.02));
        let hit = cache.get("g", 50, 5.0, 0.02).unwrap();
        assert_eq!(hit.resolution, 60);
    }

    #[test]
    fn test_falls_back_to_highest_resolution_below_target() {
        let mut cache = FieldCache::new(8, 8);
        cache.insert("g", &grid(24, 5.0, 0.02));
        cache.insert("g", &grid(32, 5.0, 0.02));
        let hit = cache.get("g", 50, 5.0, 0.02).unwrap();
        assert_eq!(hit.resolution, 32);
    }

    #[test]
    fn test_out_of_tolerance_misses() {
        let mut cache = FieldCache::new(8, 8);
        cache.insert("g", &grid(60, 5.0, 0.02));
        // extent off by 2e-3
        assert!(cache.get("g", 60, 5.002, 0.02).is_none());
        // max probability off by ~4.8%
        assert!(cache.get("g", 60, 5.0, 0.021).is_none());
    }

    #[test]
    fn test_groups_are_isolated() {
        let mut cache = FieldCache::new(8, 8);
        cache.insert("g1", &grid(60, 5.0, 0.02));
        assert!(cache.get("g2", 60, 5.0, 0.02).is_none());
    }

    #[test]
    fn test_hit_returns_deep_copy() {
        let mut cache = FieldCache::new(8, 8);
        cache.insert("g", &grid(16, 5.0, 0.02));
        let mut copy = cache.get("g", 16, 5.0, 0.02).unwrap();
        copy.field[0] = 42.0;
        let again = cache.get("g", 16, 5.0, 0.02).unwrap();
        assert_eq!(again.field[0], 0.5);
    }

    #[test]
    fn test_eviction_on_capacity() {
        let mut cache = FieldCache::new(4, 8);
        for i in 0..5 {
            cache.insert(&format!("g{i}"), &grid(16, 5.0, 0.02));
        }
        assert!(cache.len() <= 4);
    }
}
