//! # Expiring Map Trait Layer
//!
//! Defines the curated operation set of the bounded expiring map as a
//! trait, so call sites can stay generic over how the structure is held
//! (the single-threaded [`ExpiringCore`](crate::core::ExpiringCore) today,
//! alternative cores tomorrow), plus a marker for the thread-safe form.
//!
//! ## Key Components
//!
//! - [`CoreMap`]: insert/get/contains/remove/ttl and the size accessors —
//!   the operations every expiring-map form must provide with identical
//!   expiry semantics.
//! - [`ConcurrentMap`]: marker for wrappers that are safe to share across
//!   threads without external synchronization.
//!
//! ## Example Usage
//!
//! ```
//! use std::time::Duration;
//!
//! use expirekit::core::ExpiringCore;
//! use expirekit::traits::CoreMap;
//!
//! fn warm<M: CoreMap<u64, String>>(map: &mut M, data: &[(u64, String)]) {
//!     for (key, value) in data {
//!         map.insert(*key, value.clone());
//!     }
//! }
//!
//! let mut map = ExpiringCore::new(Duration::from_secs(60), Some(100));
//! warm(&mut map, &[(1, "one".into()), (2, "two".into())]);
//! assert_eq!(map.len(), 2);
//! ```

use std::time::Duration;

/// Core operations of a bounded expiring map.
///
/// Read-style operations take `&mut self`: discovering an expired entry
/// removes it as a side effect, so even a lookup may mutate. Expired
/// entries must be reported as absent by `get`/`contains`/`ttl`, while
/// `remove` must return them — the destructive-retrieval exception.
pub trait CoreMap<K, V> {
    /// Insert or refresh a key, returning the previous physical value.
    ///
    /// Must reset the entry's expiration clock and its eviction-order
    /// position, then enforce the capacity invariant.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Fetch a fresh value by key, lazily removing it if expired.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Check for a fresh entry, lazily removing it if expired.
    fn contains(&mut self, key: &K) -> bool;

    /// Remove a key, returning its value regardless of expiration state.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Remaining lifetime of a fresh entry, if strictly positive.
    fn ttl(&mut self, key: &K) -> Option<Duration>;

    /// Number of physical entries (expired-but-untouched ones included).
    fn len(&self) -> usize;

    /// Whether the map holds no physical entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The capacity cap, or `None` when unbounded.
    fn max_len(&self) -> Option<usize>;

    /// Remove all entries.
    fn clear(&mut self);
}

/// Marker for expiring-map forms that are safe to share across threads.
///
/// Implementors guarantee that every operation acquires whatever internal
/// synchronization it needs; callers share the value via `Arc` and call
/// concurrently.
///
/// # Example
///
/// ```
/// use expirekit::map::ExpiringMap;
/// use expirekit::traits::ConcurrentMap;
///
/// fn assert_concurrent<M: ConcurrentMap>() {}
/// assert_concurrent::<ExpiringMap<u64, String>>();
/// ```
pub trait ConcurrentMap: Send + Sync {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ExpiringCore;

    #[test]
    fn core_map_is_object_safe_enough_for_generics() {
        fn touch<M: CoreMap<u64, u64>>(map: &mut M) -> bool {
            map.insert(1, 10);
            map.contains(&1)
        }

        let mut map = ExpiringCore::new(Duration::from_secs(60), None);
        assert!(touch(&mut map));
    }

    #[test]
    fn default_is_empty_tracks_len() {
        let mut map: ExpiringCore<u64, u64> = ExpiringCore::new(Duration::from_secs(60), None);
        assert!(CoreMap::is_empty(&map));
        CoreMap::insert(&mut map, 1, 1);
        assert!(!CoreMap::is_empty(&map));
    }
}
