//! Bounded expiring map core: TTL expiration plus oldest-first eviction.
//!
//! Implements an insertion-ordered key/value store where entries become
//! logically invisible once their age reaches `max_age`, and where the
//! oldest-inserted entry is evicted whenever a finite `max_len` capacity is
//! exceeded. Expired entries are never swept proactively; they are removed
//! lazily when the owning key is next read, tested, or overwritten.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       ExpiringCore<K, V> Layout                         │
//! │                                                                         │
//! │   map: FxHashMap<K, Entry<V>>         order: VecDeque<(slot, K)>        │
//! │        key → (value, created_at,            insertion queue             │
//! │               slot)                                                     │
//! │                                                                         │
//! │   ┌─────────┬───────────────┐         ┌───────────────────────────┐     │
//! │   │   Key   │ Entry         │         │ Front              Back   │     │
//! │   ├─────────┼───────────────┤         ├───────────────────────────┤     │
//! │   │  "a"    │ v1, t0, s1    │         │ (s1,a) (s2,b) (s4,c)      │     │
//! │   │  "b"    │ v2, t1, s2    │         │   ↑               ↑       │     │
//! │   │  "c"    │ v3, t4, s4    │         │ oldest          newest    │     │
//! │   └─────────┴───────────────┘         │ EVICT           keep      │     │
//! │                                       └───────────────────────────┘     │
//! │                                                                         │
//! │   A queue slot is live iff its slot number matches the map entry's.     │
//! │   Re-inserting "c" pushed (s4,c) and left (s3,c) behind as a stale      │
//! │   slot; stale slots are skipped when popped and dropped wholesale       │
//! │   when they outnumber live entries.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//!
//! Insert Flow
//! ───────────
//!
//!   insert(key, value):
//!     1. Stamp (value, now, next slot), push slot to queue back
//!     2. Overwrite any previous entry (its queue slot goes stale)
//!     3. While len > max_len: pop queue front, skip stale, evict live
//!
//! Read Flow
//! ─────────
//!
//!   get(key):
//!     1. Lookup entry; absent → miss
//!     2. Fresh (now - created_at < max_age) → hit, return &value
//!     3. Expired → remove entry (lazy cleanup), report miss
//! ```
//!
//! ## Key Components
//!
//! - [`ExpiringCore`]: single-threaded core holding all container logic.
//! - [`DEFAULT_MAX_AGE`]: the 60-second default entry lifetime.
//!
//! ## Operations
//!
//! | Operation       | Expiry check | Lazy removal | Notes                        |
//! |-----------------|--------------|--------------|------------------------------|
//! | `get`           | yes          | yes          | O(1)                         |
//! | `get_with_age`  | yes          | yes          | O(1), also returns age       |
//! | `contains`      | yes          | yes          | O(1)                         |
//! | `ttl`           | yes          | yes          | remaining lifetime           |
//! | `insert`        | no           | n/a          | refreshes age + order, O(1)* |
//! | `remove`        | **no**       | n/a          | returns even expired values  |
//! | `entries`/`values` | per key   | yes          | snapshot, skips expired      |
//! | `iter`/`keys`   | **no**       | no           | raw physical traversal       |
//! | `pop_oldest`    | **no**       | n/a          | oldest-inserted entry        |
//!
//! `remove` deliberately ignores expiration: a caller popping a key wants
//! the stored value deterministically, and re-checking age here would
//! silently discard it. `iter`/`keys` reflect physical contents including
//! entries that are already past their age; callers needing filtered
//! enumeration use `entries`/`values`.
//!
//! ## Example Usage
//!
//! ```
//! use std::time::Duration;
//!
//! use expirekit::clock::ManualClock;
//! use expirekit::core::ExpiringCore;
//!
//! let clock = ManualClock::new();
//! let mut map = ExpiringCore::with_clock(Duration::from_secs(10), Some(2), clock.clone());
//!
//! map.insert("a", 1);
//! map.insert("b", 2);
//! map.insert("c", 3); // capacity 2: evicts "a", the oldest insert
//! assert!(!map.contains(&"a"));
//!
//! clock.advance(Duration::from_secs(10));
//! assert_eq!(map.get(&"b"), None); // aged out, removed lazily
//! assert_eq!(map.len(), 1); // "c" is expired too, but untouched so far
//! ```
//!
//! ## Thread Safety
//!
//! - [`ExpiringCore`] is not thread-safe; it is the inner structure of
//!   [`ExpiringMap`](crate::map::ExpiringMap), which wraps it in a mutex.
//!
//! ## Implementation Notes
//!
//! - Insertion order lives in a `VecDeque<(u64, K)>` of monotonically
//!   numbered slots. Refreshing a key pushes a new slot and abandons the
//!   old one, keeping re-insertion O(1); abandoned slots are skipped at
//!   pop time and compacted once they outnumber live entries.
//! - `len()` counts physical entries: an expired entry still counts until
//!   a later access to its key removes it.

use std::collections::VecDeque;
use std::hash::Hash;
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use crate::clock::{Clock, SystemClock};
use crate::metrics::{MapMetrics, MetricCounters};
use crate::traits::CoreMap;

/// Default entry lifetime when none is configured.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(60);

/// Stale queue slots may outnumber live entries by this margin before the
/// order queue is compacted.
const COMPACT_SLACK: usize = 32;

/// A stored value plus its creation stamp and live queue slot.
#[derive(Debug)]
struct Entry<V> {
    value: V,
    created_at: Instant,
    slot: u64,
}

impl<V> Entry<V> {
    #[inline]
    fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    #[inline]
    fn is_expired(&self, now: Instant, max_age: Duration) -> bool {
        self.age(now) >= max_age
    }
}

/// Single-threaded bounded expiring map.
///
/// Composes a hash index with an insertion-order queue and applies two
/// independent invalidation policies: age (`max_age`, checked lazily on
/// access) and capacity (`max_len`, enforced eagerly after every insert).
///
/// # Type Parameters
///
/// - `K`: Key type, must be `Clone + Eq + Hash`
/// - `V`: Value type
/// - `C`: Time source, defaults to [`SystemClock`]
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use expirekit::core::ExpiringCore;
///
/// let mut map: ExpiringCore<&str, i32> = ExpiringCore::new(Duration::from_secs(60), Some(100));
///
/// map.insert("key", 42);
/// assert_eq!(map.get(&"key"), Some(&42));
/// assert!(map.ttl(&"key").is_some());
///
/// // remove returns the value even if the entry had already aged out
/// assert_eq!(map.remove(&"key"), Some(42));
/// assert_eq!(map.remove(&"key"), None);
/// ```
pub struct ExpiringCore<K, V, C = SystemClock>
where
    K: Clone + Eq + Hash,
    C: Clock,
{
    /// Maps key to its live entry.
    map: FxHashMap<K, Entry<V>>,
    /// Insertion-order queue of (slot, key); front = oldest.
    order: VecDeque<(u64, K)>,
    /// Next slot number to hand out.
    next_slot: u64,
    /// Age at which an entry becomes logically invisible.
    max_age: Duration,
    /// Capacity cap; `None` means unbounded.
    max_len: Option<usize>,
    clock: C,
    counters: MetricCounters,
}

impl<K, V> ExpiringCore<K, V, SystemClock>
where
    K: Clone + Eq + Hash,
{
    /// Creates a core with the given limits and the system clock.
    ///
    /// `max_len` of `None` means unbounded. A `max_age` of zero makes every
    /// entry expired on its next access; a `max_len` of `Some(0)` makes the
    /// capacity pass evict every insert immediately.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use expirekit::core::ExpiringCore;
    ///
    /// let map: ExpiringCore<u64, String> = ExpiringCore::new(Duration::from_secs(30), None);
    /// assert!(map.is_empty());
    /// assert_eq!(map.max_len(), None);
    /// ```
    pub fn new(max_age: Duration, max_len: Option<usize>) -> Self {
        Self::with_clock(max_age, max_len, SystemClock)
    }
}

impl<K, V> Default for ExpiringCore<K, V, SystemClock>
where
    K: Clone + Eq + Hash,
{
    /// Creates an unbounded core with the default 60-second lifetime.
    fn default() -> Self {
        Self::new(DEFAULT_MAX_AGE, None)
    }
}

impl<K, V, C> ExpiringCore<K, V, C>
where
    K: Clone + Eq + Hash,
    C: Clock,
{
    /// Creates a core with the given limits and an explicit time source.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use expirekit::clock::ManualClock;
    /// use expirekit::core::ExpiringCore;
    ///
    /// let clock = ManualClock::new();
    /// let mut map = ExpiringCore::with_clock(Duration::from_secs(5), None, clock.clone());
    ///
    /// map.insert(1, "one");
    /// clock.advance(Duration::from_secs(5));
    /// assert_eq!(map.get(&1), None);
    /// ```
    pub fn with_clock(max_age: Duration, max_len: Option<usize>, clock: C) -> Self {
        let reserve = max_len.unwrap_or(0);
        Self {
            map: FxHashMap::with_capacity_and_hasher(reserve, Default::default()),
            order: VecDeque::with_capacity(reserve),
            next_slot: 0,
            max_age,
            max_len,
            clock,
            counters: MetricCounters::default(),
        }
    }

    /// Inserts or refreshes a key, returning the previous physical value.
    ///
    /// The entry is stamped with the current instant; re-assignment resets
    /// the expiration clock and moves the key to the newest position in the
    /// eviction order. After the write, the capacity pass evicts
    /// oldest-inserted entries until the size invariant holds again.
    /// Capacity eviction is unconditional: it does not care whether the
    /// evicted entry happened to be expired too.
    ///
    /// The previous value is returned even when it is logically expired,
    /// matching the physical overwrite that occurred.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use expirekit::core::ExpiringCore;
    ///
    /// let mut map = ExpiringCore::new(Duration::from_secs(60), Some(2));
    ///
    /// assert_eq!(map.insert("a", 1), None);
    /// map.insert("b", 2);
    /// assert_eq!(map.insert("a", 3), Some(1)); // refresh: "a" is now newest
    ///
    /// map.insert("c", 4); // capacity pass evicts "b", the oldest insert
    /// assert!(map.contains(&"a"));
    /// assert!(!map.contains(&"b"));
    /// assert!(map.contains(&"c"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let created_at = self.clock.now();
        let slot = self.next_slot;
        self.next_slot += 1;

        self.order.push_back((slot, key.clone()));
        let previous = self.map.insert(
            key,
            Entry {
                value,
                created_at,
                slot,
            },
        );

        if previous.is_some() {
            self.counters.inc_update();
        } else {
            self.counters.inc_insert();
        }

        self.evict_over_capacity();
        self.compact_if_stale();

        #[cfg(debug_assertions)]
        self.validate_invariants();

        previous.map(|entry| entry.value)
    }

    /// Returns the value for `key` if present and not expired.
    ///
    /// An expired entry is removed as a side effect and reported as absent;
    /// a second call after expiry is an ordinary miss, not an error.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use expirekit::core::ExpiringCore;
    ///
    /// let mut map = ExpiringCore::new(Duration::from_secs(60), None);
    /// map.insert("key", 7);
    ///
    /// assert_eq!(map.get(&"key"), Some(&7));
    /// assert_eq!(map.get(&"missing"), None);
    /// ```
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if !self.check_live(key) {
            self.counters.inc_miss();
            return None;
        }
        self.counters.inc_hit();
        self.map.get(key).map(|entry| &entry.value)
    }

    /// Returns the value and its elapsed age if present and not expired.
    ///
    /// Same lazy-removal side effect as [`get`](Self::get).
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use expirekit::clock::ManualClock;
    /// use expirekit::core::ExpiringCore;
    ///
    /// let clock = ManualClock::new();
    /// let mut map = ExpiringCore::with_clock(Duration::from_secs(60), None, clock.clone());
    ///
    /// map.insert("key", 7);
    /// clock.advance(Duration::from_secs(2));
    ///
    /// let (value, age) = map.get_with_age(&"key").unwrap();
    /// assert_eq!(*value, 7);
    /// assert_eq!(age, Duration::from_secs(2));
    /// ```
    pub fn get_with_age(&mut self, key: &K) -> Option<(&V, Duration)> {
        if !self.check_live(key) {
            self.counters.inc_miss();
            return None;
        }
        self.counters.inc_hit();
        let now = self.clock.now();
        self.map.get(key).map(|entry| (&entry.value, entry.age(now)))
    }

    /// Returns `true` iff `key` is present and not expired.
    ///
    /// An expired entry is removed as part of this call, which then
    /// returns `false`.
    pub fn contains(&mut self, key: &K) -> bool {
        self.check_live(key)
    }

    /// Removes `key`, returning its value **regardless of expiration**.
    ///
    /// Expiration is deliberately not consulted here: a caller popping a
    /// key wants the stored value deterministically, and an age check
    /// would silently discard what they are trying to retrieve. Returns
    /// `None` only when the key is physically absent.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use expirekit::clock::ManualClock;
    /// use expirekit::core::ExpiringCore;
    ///
    /// let clock = ManualClock::new();
    /// let mut map = ExpiringCore::with_clock(Duration::from_secs(1), None, clock.clone());
    ///
    /// map.insert("key", 9);
    /// clock.advance(Duration::from_secs(5)); // long past expiry
    ///
    /// assert_eq!(map.remove(&"key"), Some(9));
    /// assert_eq!(map.remove(&"key"), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let removed = self.map.remove(key);
        if removed.is_some() {
            self.counters.inc_remove();
        }

        #[cfg(debug_assertions)]
        self.validate_invariants();

        removed.map(|entry| entry.value)
    }

    /// Returns the remaining lifetime of `key`, if any.
    ///
    /// `Some` iff the key is present, not expired, and has strictly
    /// positive time left. Carries the same lazy-removal side effect as
    /// [`get`](Self::get).
    pub fn ttl(&mut self, key: &K) -> Option<Duration> {
        if !self.check_live(key) {
            self.counters.inc_miss();
            return None;
        }
        self.counters.inc_hit();
        let now = self.clock.now();
        let max_age = self.max_age;
        self.map
            .get(key)
            .map(|entry| max_age.saturating_sub(entry.age(now)))
            .filter(|remaining| *remaining > Duration::ZERO)
    }

    /// Returns a snapshot of all fresh `(key, value)` pairs.
    ///
    /// Takes the key list as of the call, then performs a point read per
    /// key: entries found expired are silently omitted (and removed, as
    /// any point read removes them). Never fails — a fully expired map
    /// yields an empty vector.
    pub fn entries(&mut self) -> Vec<(K, V)>
    where
        V: Clone,
    {
        let keys: Vec<K> = self.keys().cloned().collect();
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            let value = self.get(&key).cloned();
            if let Some(value) = value {
                out.push((key, value));
            }
        }
        out
    }

    /// Returns a snapshot of all fresh values.
    ///
    /// See [`entries`](Self::entries) for the snapshot semantics.
    pub fn values(&mut self) -> Vec<V>
    where
        V: Clone,
    {
        let keys: Vec<K> = self.keys().cloned().collect();
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            let value = self.get(&key).cloned();
            if let Some(value) = value {
                out.push(value);
            }
        }
        out
    }

    /// Iterates physical keys in insertion order, oldest first.
    ///
    /// Raw traversal: no expiration check, no removal. Entries past their
    /// age still appear here until a point access removes them; use
    /// [`entries`](Self::entries) for expiration-aware enumeration.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.order
            .iter()
            .filter_map(move |(slot, key)| match self.map.get(key) {
                Some(entry) if entry.slot == *slot => Some(key),
                _ => None,
            })
    }

    /// Iterates physical `(key, value)` pairs in insertion order.
    ///
    /// Raw traversal, same contract as [`keys`](Self::keys): expired
    /// entries are included and nothing is removed.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.order
            .iter()
            .filter_map(move |(slot, key)| match self.map.get(key) {
                Some(entry) if entry.slot == *slot => Some((key, &entry.value)),
                _ => None,
            })
    }

    /// Removes and returns the oldest-inserted entry, expired or not.
    pub fn pop_oldest(&mut self) -> Option<(K, V)> {
        let popped = self.take_oldest();
        if popped.is_some() {
            self.counters.inc_remove();
        }

        #[cfg(debug_assertions)]
        self.validate_invariants();

        popped
    }

    /// Returns the oldest-inserted entry without removing it.
    pub fn peek_oldest(&self) -> Option<(&K, &V)> {
        self.iter().next()
    }

    /// Returns the number of physical entries.
    ///
    /// Expired entries count until they are lazily removed by a later
    /// access to their key.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the map holds no physical entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the configured maximum entry age.
    #[inline]
    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Returns the configured capacity cap, if any.
    #[inline]
    pub fn max_len(&self) -> Option<usize> {
        self.max_len
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.map.clear();
        self.order.clear();

        #[cfg(debug_assertions)]
        self.validate_invariants();
    }

    /// Snapshots the operation counters.
    pub fn metrics(&self) -> MapMetrics {
        self.counters.snapshot()
    }

    /// Checks liveness of `key`, removing it if expired.
    ///
    /// Returns `true` iff the key is present and fresh. Must only be
    /// called while the caller already owns the structure exclusively; it
    /// never re-enters any public operation.
    fn check_live(&mut self, key: &K) -> bool {
        let now = self.clock.now();
        let expired = match self.map.get(key) {
            Some(entry) => entry.is_expired(now, self.max_age),
            None => return false,
        };
        if expired {
            self.map.remove(key);
            self.counters.inc_expiration();

            #[cfg(debug_assertions)]
            self.validate_invariants();

            return false;
        }
        true
    }

    /// Evicts oldest-inserted entries until the size invariant holds.
    ///
    /// Runs only when `max_len` is finite. Eviction is unconditional with
    /// respect to expiration. Always called with the structure already
    /// exclusively owned; never re-enters a public operation.
    fn evict_over_capacity(&mut self) {
        let Some(cap) = self.max_len else {
            return;
        };
        while self.map.len() > cap {
            if self.take_oldest().is_none() {
                break;
            }
            self.counters.inc_eviction();
        }
    }

    /// Pops the oldest live entry, draining stale queue slots on the way.
    fn take_oldest(&mut self) -> Option<(K, V)> {
        while let Some((slot, key)) = self.order.pop_front() {
            let live = self
                .map
                .get(&key)
                .map(|entry| entry.slot == slot)
                .unwrap_or(false);
            if live {
                if let Some(entry) = self.map.remove(&key) {
                    return Some((key, entry.value));
                }
            }
        }
        None
    }

    /// Drops stale queue slots once they outnumber live entries.
    fn compact_if_stale(&mut self) {
        if self.order.len() > 2 * self.map.len() + COMPACT_SLACK {
            let map = &self.map;
            self.order.retain(|(slot, key)| {
                map.get(key)
                    .map(|entry| entry.slot == *slot)
                    .unwrap_or(false)
            });
        }
    }

    /// Validates internal data structure invariants.
    ///
    /// Checks that:
    /// - the physical size respects `max_len`
    /// - queue slot numbers are strictly increasing
    /// - every map entry owns exactly one live queue slot
    ///
    /// Only runs when debug assertions are enabled.
    #[cfg(debug_assertions)]
    fn validate_invariants(&self) {
        if let Some(cap) = self.max_len {
            debug_assert!(
                self.map.len() <= cap,
                "size {} exceeds max_len {}",
                self.map.len(),
                cap
            );
        }

        // Slot numbers strictly increase, so each queue slot can match at
        // most one entry and vice versa; counting matches therefore checks
        // the one-live-slot-per-entry invariant in a single pass.
        let mut live = 0usize;
        let mut prev = None;
        for (slot, key) in &self.order {
            if let Some(p) = prev {
                debug_assert!(*slot > p, "queue slots must be strictly increasing");
            }
            prev = Some(*slot);
            if self
                .map
                .get(key)
                .map(|entry| entry.slot == *slot)
                .unwrap_or(false)
            {
                live += 1;
            }
        }
        debug_assert_eq!(
            live,
            self.map.len(),
            "each entry must own exactly one live queue slot"
        );
    }
}

impl<K, V, C> std::fmt::Debug for ExpiringCore<K, V, C>
where
    K: Clone + Eq + Hash + std::fmt::Debug,
    C: Clock,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiringCore")
            .field("len", &self.map.len())
            .field("max_age", &self.max_age)
            .field("max_len", &self.max_len)
            .field("order_len", &self.order.len())
            .finish_non_exhaustive()
    }
}

/// Implementation of the [`CoreMap`] trait.
///
/// Lets the core be used through the curated operation set where call
/// sites are generic over the storage form.
impl<K, V, C> CoreMap<K, V> for ExpiringCore<K, V, C>
where
    K: Clone + Eq + Hash,
    C: Clock,
{
    #[inline]
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        ExpiringCore::insert(self, key, value)
    }

    #[inline]
    fn get(&mut self, key: &K) -> Option<&V> {
        ExpiringCore::get(self, key)
    }

    #[inline]
    fn contains(&mut self, key: &K) -> bool {
        ExpiringCore::contains(self, key)
    }

    #[inline]
    fn remove(&mut self, key: &K) -> Option<V> {
        ExpiringCore::remove(self, key)
    }

    #[inline]
    fn ttl(&mut self, key: &K) -> Option<Duration> {
        ExpiringCore::ttl(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        ExpiringCore::len(self)
    }

    #[inline]
    fn max_len(&self) -> Option<usize> {
        ExpiringCore::max_len(self)
    }

    fn clear(&mut self) {
        ExpiringCore::clear(self);
    }
}
