//! Fluent builder for expiring maps.
//!
//! Collects the construction-time configuration (`max_age`, `max_len`,
//! time source) and produces either the single-threaded core or the
//! thread-safe map.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//!
//! use expirekit::builder::MapBuilder;
//!
//! let map = MapBuilder::new()
//!     .max_age(Duration::from_secs(30))
//!     .max_len(1000)
//!     .build::<u64, String>();
//!
//! map.insert(1, "hello".to_string());
//! assert_eq!(map.get(&1), Some("hello".to_string()));
//! ```

use std::hash::Hash;
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::core::{DEFAULT_MAX_AGE, ExpiringCore};
use crate::map::ExpiringMap;

/// Builder for [`ExpiringCore`] and [`ExpiringMap`] instances.
///
/// Defaults: `max_age` of 60 seconds, unbounded capacity, system clock.
#[derive(Debug, Clone)]
pub struct MapBuilder<C = SystemClock>
where
    C: Clock,
{
    max_age: Duration,
    max_len: Option<usize>,
    clock: C,
}

impl MapBuilder<SystemClock> {
    /// Creates a builder with the default configuration.
    pub fn new() -> Self {
        Self {
            max_age: DEFAULT_MAX_AGE,
            max_len: None,
            clock: SystemClock,
        }
    }
}

impl Default for MapBuilder<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> MapBuilder<C>
where
    C: Clock,
{
    /// Sets the maximum entry age. Zero means entries expire on their
    /// next access.
    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Caps the map at `max_len` entries, evicting oldest-first beyond it.
    pub fn max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    /// Removes any capacity cap (the default).
    pub fn unbounded(mut self) -> Self {
        self.max_len = None;
        self
    }

    /// Replaces the time source, e.g. with a
    /// [`ManualClock`](crate::clock::ManualClock) in tests.
    pub fn clock<C2>(self, clock: C2) -> MapBuilder<C2>
    where
        C2: Clock,
    {
        MapBuilder {
            max_age: self.max_age,
            max_len: self.max_len,
            clock,
        }
    }

    /// Builds the single-threaded core.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use expirekit::builder::MapBuilder;
    ///
    /// let mut core = MapBuilder::new()
    ///     .max_age(Duration::from_secs(5))
    ///     .build_core::<&str, i32>();
    ///
    /// core.insert("k", 1);
    /// assert_eq!(core.get(&"k"), Some(&1));
    /// ```
    pub fn build_core<K, V>(self) -> ExpiringCore<K, V, C>
    where
        K: Clone + Eq + Hash,
    {
        ExpiringCore::with_clock(self.max_age, self.max_len, self.clock)
    }

    /// Builds the thread-safe map.
    pub fn build<K, V>(self) -> ExpiringMap<K, V, C>
    where
        K: Clone + Eq + Hash,
    {
        ExpiringMap::with_clock(self.max_age, self.max_len, self.clock)
    }

    /// Builds the thread-safe map pre-populated from `entries`.
    ///
    /// The batch is fed through `insert`, so a batch larger than a finite
    /// `max_len` keeps only its last `max_len` entries.
    pub fn build_with_entries<K, V, I>(self, entries: I) -> ExpiringMap<K, V, C>
    where
        K: Clone + Eq + Hash,
        I: IntoIterator<Item = (K, V)>,
    {
        let map = self.build();
        for (key, value) in entries {
            map.insert(key, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    #[test]
    fn defaults_match_documented_values() {
        let core = MapBuilder::new().build_core::<u64, u64>();
        assert_eq!(core.max_age(), DEFAULT_MAX_AGE);
        assert_eq!(core.max_len(), None);
    }

    #[test]
    fn max_len_and_unbounded_toggle() {
        let core = MapBuilder::new().max_len(5).build_core::<u64, u64>();
        assert_eq!(core.max_len(), Some(5));

        let core = MapBuilder::new()
            .max_len(5)
            .unbounded()
            .build_core::<u64, u64>();
        assert_eq!(core.max_len(), None);
    }

    #[test]
    fn clock_override_drives_expiry() {
        let clock = ManualClock::new();
        let map = MapBuilder::new()
            .max_age(Duration::from_secs(10))
            .clock(clock.clone())
            .build::<&str, i32>();

        map.insert("key", 1);
        clock.advance(Duration::from_secs(10));
        assert_eq!(map.get(&"key"), None);
    }

    #[test]
    fn build_with_entries_enforces_capacity() {
        let map = MapBuilder::new()
            .max_len(2)
            .build_with_entries::<u64, u64, _>(vec![(1, 10), (2, 20), (3, 30)]);

        assert_eq!(map.len(), 2);
        assert!(!map.contains(&1));
        assert!(map.contains(&2));
        assert!(map.contains(&3));
    }
}
