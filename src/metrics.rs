//! Operation counters for expiring maps.
//!
//! Counters are recorded with relaxed atomics at the call sites that decide
//! hit/miss/eviction outcomes and snapshotted into an owned, comparable
//! struct. Nothing here is required for correctness; the counters exist so
//! callers can observe cache effectiveness without wrapping every call.
//!
//! ## Key Components
//!
//! - [`MapMetrics`]: point-in-time snapshot of all counters.
//! - [`MetricCounters`]: the live atomic counters owned by a map core.
//!
//! ## Counter Semantics
//!
//! | Counter       | Incremented when                                         |
//! |---------------|----------------------------------------------------------|
//! | `hits`        | `get`/`get_with_age`/`ttl` finds a fresh entry           |
//! | `misses`      | `get`/`get_with_age`/`ttl` finds nothing, or only an expired entry |
//! | `inserts`     | `insert` stores a brand-new key                          |
//! | `updates`     | `insert` overwrites an existing physical entry           |
//! | `removes`     | `remove`/`pop_oldest` deletes an entry (expired or not)  |
//! | `evictions`   | the capacity pass drops an oldest-inserted entry         |
//! | `expirations` | a lazy expiry check deletes a stale entry                |
//!
//! An expired entry found by `get` counts both a miss and an expiration:
//! the caller saw a miss, and the map shrank. `contains` is a membership
//! test and records only the expirations it triggers.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of map-level operation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapMetrics {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub updates: u64,
    pub removes: u64,
    pub evictions: u64,
    pub expirations: u64,
}

/// Live counters backing [`MapMetrics`] snapshots.
#[derive(Debug, Default)]
pub struct MetricCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    updates: AtomicU64,
    removes: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
}

impl MetricCounters {
    /// Snapshot current counter values.
    pub fn snapshot(&self) -> MapMetrics {
        MapMetrics {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
            removes: self.removes.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
        }
    }

    /// Increment hit counter.
    pub fn inc_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment miss counter.
    pub fn inc_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment insert counter.
    pub fn inc_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment update counter.
    pub fn inc_update(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment remove counter.
    pub fn inc_remove(&self) {
        self.removes.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment eviction counter.
    pub fn inc_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment expiration counter.
    pub fn inc_expiration(&self) {
        self.expirations.fetch_add(1, Ordering::Relaxed);
    }
}
