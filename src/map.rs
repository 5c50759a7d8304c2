//! Thread-safe bounded expiring map.
//!
//! [`ExpiringMap`] wraps [`ExpiringCore`](crate::core::ExpiringCore) in a
//! single `parking_lot::Mutex` so the structure can be called from many
//! threads without external synchronization. Every point operation —
//! including reads, because a read may lazily remove an expired entry —
//! acquires the lock once for its whole read-check-evict-write sequence.
//!
//! ## Locking Discipline
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  insert / get / contains / remove / ttl / pop_oldest                 │
//! │      one lock acquisition, O(1)-ish critical section                 │
//! │      (eviction loop bounded by capacity drift)                       │
//! │                                                                      │
//! │  entries / values                                                    │
//! │      lock → clone key snapshot → unlock                              │
//! │      then per key: lock → expiry-checked read → unlock               │
//! │                                                                      │
//! │      NOT atomic as a whole: keys may be added, removed, or expire    │
//! │      mid-enumeration. Each per-key read is individually consistent;  │
//! │      the result is a logically consistent view per key, not a        │
//! │      single global snapshot.                                         │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The original design this follows required a reentrant lock because its
//! insert path re-entered the locked eviction helper. Here eviction and
//! lazy expiry are private core methods invoked while the single lock is
//! already held, so a plain mutex suffices and no operation ever blocks on
//! itself.
//!
//! ## Key Components
//!
//! - [`ExpiringMap`]: the concurrent wrapper; share it via `Arc`.
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//! use std::time::Duration;
//!
//! use expirekit::map::ExpiringMap;
//!
//! let map = Arc::new(ExpiringMap::with_limits(Duration::from_secs(60), Some(1000)));
//!
//! let writer = {
//!     let map = Arc::clone(&map);
//!     thread::spawn(move || {
//!         for i in 0..100u64 {
//!             map.insert(i, i * 10);
//!         }
//!     })
//! };
//! writer.join().unwrap();
//!
//! assert_eq!(map.get(&7), Some(70));
//! assert_eq!(map.get_or(&7777, 0), 0);
//! ```
//!
//! ## Thread Safety
//!
//! - `ExpiringMap` is `Send + Sync` (see the
//!   [`ConcurrentMap`](crate::traits::ConcurrentMap) marker); readers
//!   receive owned clones of values, never references into the locked
//!   region.

use std::hash::Hash;
use std::time::Duration;

use parking_lot::Mutex;

use crate::clock::{Clock, SystemClock};
use crate::core::{DEFAULT_MAX_AGE, ExpiringCore};
use crate::error::UnsupportedError;
use crate::metrics::MapMetrics;
use crate::traits::ConcurrentMap;

/// Thread-safe bounded expiring map.
///
/// All of the core's semantics apply: entries expire `max_age` after their
/// last assignment and are removed lazily on access; the oldest-inserted
/// entry is evicted when a finite `max_len` is exceeded. Values are
/// returned as owned clones (`V: Clone` on read methods) because the lock
/// is released before the caller sees them.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use expirekit::map::ExpiringMap;
///
/// let map = ExpiringMap::with_limits(Duration::from_secs(60), Some(2));
///
/// map.insert("a", 1);
/// map.insert("b", 2);
/// map.insert("c", 3); // evicts "a"
///
/// assert!(!map.contains(&"a"));
/// assert_eq!(map.get(&"b"), Some(2));
/// assert_eq!(map.entries(), vec![("b", 2), ("c", 3)]);
/// ```
pub struct ExpiringMap<K, V, C = SystemClock>
where
    K: Clone + Eq + Hash,
    C: Clock,
{
    inner: Mutex<ExpiringCore<K, V, C>>,
}

impl<K, V> ExpiringMap<K, V, SystemClock>
where
    K: Clone + Eq + Hash,
{
    /// Creates an unbounded map with the default 60-second lifetime.
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_AGE, None)
    }

    /// Creates a map with the given limits and the system clock.
    ///
    /// `max_len` of `None` means unbounded.
    pub fn with_limits(max_age: Duration, max_len: Option<usize>) -> Self {
        Self::with_clock(max_age, max_len, SystemClock)
    }

    /// Creates a map from an initial batch of entries.
    ///
    /// The batch is fed through `insert`, so construction itself enforces
    /// the capacity invariant: with a finite `max_len`, only the last
    /// `max_len` entries of the batch survive (oldest-first truncation).
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use expirekit::map::ExpiringMap;
    ///
    /// let batch = vec![("a", 1), ("b", 2), ("c", 3)];
    /// let map = ExpiringMap::with_entries(batch, Duration::from_secs(60), Some(2));
    ///
    /// assert_eq!(map.len(), 2);
    /// assert!(!map.contains(&"a"));
    /// assert_eq!(map.get(&"c"), Some(3));
    /// ```
    pub fn with_entries<I>(entries: I, max_age: Duration, max_len: Option<usize>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let map = Self::with_limits(max_age, max_len);
        {
            let mut core = map.inner.lock();
            for (key, value) in entries {
                core.insert(key, value);
            }
        }
        map
    }

    /// Creates a map assigning the same value to every key in `keys`.
    ///
    /// Normal capacity eviction applies along the way if `keys` exceeds a
    /// finite `max_len`.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use expirekit::map::ExpiringMap;
    ///
    /// let map = ExpiringMap::from_keys(1..=5, 0u32, Duration::from_secs(60), None);
    /// assert_eq!(map.len(), 5);
    /// assert_eq!(map.get(&3), Some(0));
    /// ```
    pub fn from_keys<I>(keys: I, value: V, max_age: Duration, max_len: Option<usize>) -> Self
    where
        I: IntoIterator<Item = K>,
        V: Clone,
    {
        let map = Self::with_limits(max_age, max_len);
        {
            let mut core = map.inner.lock();
            for key in keys {
                core.insert(key, value.clone());
            }
        }
        map
    }
}

impl<K, V> Default for ExpiringMap<K, V, SystemClock>
where
    K: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> ExpiringMap<K, V, C>
where
    K: Clone + Eq + Hash,
    C: Clock,
{
    /// Creates a map with the given limits and an explicit time source.
    pub fn with_clock(max_age: Duration, max_len: Option<usize>, clock: C) -> Self {
        Self {
            inner: Mutex::new(ExpiringCore::with_clock(max_age, max_len, clock)),
        }
    }

    /// Inserts or refreshes a key, returning the previous physical value.
    ///
    /// The whole write-then-evict sequence runs under the lock, so the
    /// capacity invariant holds the instant the call returns.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.inner.lock().insert(key, value)
    }

    /// Returns a clone of the value for `key` if present and not expired.
    ///
    /// An expired entry is removed as part of this call and reported as
    /// absent — indistinguishable from a plain miss.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.inner.lock().get(key).cloned()
    }

    /// Returns the value for `key`, or `default` on a miss.
    ///
    /// # Example
    ///
    /// ```
    /// use expirekit::map::ExpiringMap;
    ///
    /// let map: ExpiringMap<&str, i32> = ExpiringMap::new();
    /// assert_eq!(map.get_or(&"absent", -1), -1);
    /// ```
    pub fn get_or(&self, key: &K, default: V) -> V
    where
        V: Clone,
    {
        self.get(key).unwrap_or(default)
    }

    /// Returns the value and its elapsed age if present and not expired.
    pub fn get_with_age(&self, key: &K) -> Option<(V, Duration)>
    where
        V: Clone,
    {
        self.inner
            .lock()
            .get_with_age(key)
            .map(|(value, age)| (value.clone(), age))
    }

    /// Returns `true` iff `key` is present and not expired.
    ///
    /// An expired entry is removed as part of this call.
    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    /// Removes `key`, returning its value **regardless of expiration**.
    ///
    /// See [`ExpiringCore::remove`] for the rationale; `None` only means
    /// the key was physically absent.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.inner.lock().remove(key)
    }

    /// Removes `key`, returning its value or `default` if absent.
    pub fn remove_or(&self, key: &K, default: V) -> V {
        self.remove(key).unwrap_or(default)
    }

    /// Returns the remaining lifetime of `key`, if strictly positive.
    pub fn ttl(&self, key: &K) -> Option<Duration> {
        self.inner.lock().ttl(key)
    }

    /// Removes and returns the oldest-inserted entry, expired or not.
    pub fn pop_oldest(&self) -> Option<(K, V)> {
        self.inner.lock().pop_oldest()
    }

    /// Returns a snapshot of all fresh `(key, value)` pairs.
    ///
    /// Weak-consistency enumeration: the key list is cloned under the
    /// lock, then each key is re-read under its own lock acquisition.
    /// Keys that expire or are removed mid-enumeration are silently
    /// omitted; keys inserted mid-enumeration may or may not appear.
    /// Never fails, even when every entry has expired.
    pub fn entries(&self) -> Vec<(K, V)>
    where
        V: Clone,
    {
        let keys = self.keys();
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(value) = self.get(&key) {
                out.push((key, value));
            }
        }
        out
    }

    /// Returns a snapshot of all fresh values.
    ///
    /// Same weak-consistency contract as [`entries`](Self::entries).
    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.entries().into_iter().map(|(_, value)| value).collect()
    }

    /// Returns the physical key list in insertion order, oldest first.
    ///
    /// Raw snapshot: no expiration check, no removal. Expired-but-
    /// untouched keys are included; use [`entries`](Self::entries) for
    /// expiration-aware enumeration.
    pub fn keys(&self) -> Vec<K> {
        self.inner.lock().keys().cloned().collect()
    }

    /// Returns the number of physical entries.
    ///
    /// Expired entries count until lazily removed by an access.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if the map holds no physical entries.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Returns the configured maximum entry age.
    pub fn max_age(&self) -> Duration {
        self.inner.lock().max_age()
    }

    /// Returns the configured capacity cap, if any.
    pub fn max_len(&self) -> Option<usize> {
        self.inner.lock().max_len()
    }

    /// Removes all entries.
    pub fn clear(&self) {
        self.inner.lock().clear()
    }

    /// Snapshots the operation counters.
    pub fn metrics(&self) -> MapMetrics {
        self.inner.lock().metrics()
    }

    /// Disabled: a live view of `(key, value)` pairs.
    ///
    /// A view would either expose the internal `(value, timestamp)`
    /// representation or hand out entries that bypass the per-key
    /// expiration check, so it fails loudly instead. Use
    /// [`entries`](Self::entries).
    pub fn view_entries(&self) -> Result<Vec<(K, V)>, UnsupportedError> {
        Err(UnsupportedError::new(
            "entry views are not supported: use entries() for an expiration-checked snapshot",
        ))
    }

    /// Disabled: a live view of keys. See [`view_entries`](Self::view_entries).
    pub fn view_keys(&self) -> Result<Vec<K>, UnsupportedError> {
        Err(UnsupportedError::new(
            "key views are not supported: use keys() for a raw snapshot or entries() for a fresh one",
        ))
    }

    /// Disabled: a live view of values. See [`view_entries`](Self::view_entries).
    pub fn view_values(&self) -> Result<Vec<V>, UnsupportedError> {
        Err(UnsupportedError::new(
            "value views are not supported: use values() for an expiration-checked snapshot",
        ))
    }
}

impl<K, V, C> std::fmt::Debug for ExpiringMap<K, V, C>
where
    K: Clone + Eq + Hash + std::fmt::Debug,
    C: Clock,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.inner.lock();
        f.debug_struct("ExpiringMap")
            .field("len", &core.len())
            .field("max_age", &core.max_age())
            .field("max_len", &core.max_len())
            .finish_non_exhaustive()
    }
}

impl<K, V, C> ConcurrentMap for ExpiringMap<K, V, C>
where
    K: Clone + Eq + Hash + Send,
    V: Send,
    C: Clock + Send,
{
}
