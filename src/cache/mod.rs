//! In-memory caches and the prefetch queue that wrap the compute
//! functions. All tiers share the entry/score bookkeeping.

mod entry;
mod fields;
mod prefetch;
mod samples;

pub use entry::{eviction_batch, CacheEntry};
pub use fields::{FieldCache, EXTENT_TOLERANCE, MAX_PROBABILITY_TOLERANCE};
pub use prefetch::{neighbor_states, PrefetchItem, PrefetchPriority, PrefetchQueue};
pub use samples::SampleCache;
