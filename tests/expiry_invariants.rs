// ==============================================
// EXPIRY & CAPACITY INVARIANT TESTS (integration)
// ==============================================
//
// End-to-end checks of the map's observable contract: the capacity and
// age invariants, the lazy-removal semantics, and the enumeration
// behavior. Time is driven by ManualClock so nothing here sleeps.

use std::time::Duration;

use expirekit::clock::ManualClock;
use expirekit::map::ExpiringMap;

fn manual_map<K, V>(
    max_age_secs: u64,
    max_len: Option<usize>,
) -> (ExpiringMap<K, V, ManualClock>, ManualClock)
where
    K: Clone + Eq + std::hash::Hash,
{
    let clock = ManualClock::new();
    let map = ExpiringMap::with_clock(Duration::from_secs(max_age_secs), max_len, clock.clone());
    (map, clock)
}

// ==============================================
// Capacity Invariant
// ==============================================

mod capacity_invariant {
    use super::*;

    #[test]
    fn size_bounded_after_every_insert() {
        let (map, _clock) = manual_map(60, Some(7));

        for i in 0..500u64 {
            map.insert(i, i);
            assert!(map.len() <= 7, "size invariant violated after insert {}", i);
        }
    }

    #[test]
    fn eviction_victim_is_least_recently_inserted() {
        let (map, _clock) = manual_map(60, Some(3));

        map.insert("a", 1);
        map.insert("b", 2);
        map.insert("c", 3);
        map.insert("b", 20); // refresh: "b" becomes newest
        map.insert("d", 4); // over capacity: "a" is the oldest insert

        assert!(!map.contains(&"a"));
        assert_eq!(map.get(&"b"), Some(20));
        assert_eq!(map.get(&"c"), Some(3));
        assert_eq!(map.get(&"d"), Some(4));
    }

    #[test]
    fn unbounded_map_retains_a_thousand_keys() {
        let (map, _clock) = manual_map(60, None);

        for i in 0..1000u64 {
            map.insert(i, i * 2);
        }

        assert_eq!(map.len(), 1000);
        for i in 0..1000u64 {
            assert_eq!(map.get(&i), Some(i * 2));
        }
    }

    #[test]
    fn capacity_zero_is_honored() {
        let (map, _clock) = manual_map(60, Some(0));

        map.insert("a", 1);
        map.insert("b", 2);

        assert_eq!(map.len(), 0, "max_len=0 must be honored, not coerced");
        assert!(!map.contains(&"a"));
        assert!(!map.contains(&"b"));
    }
}

// ==============================================
// Age Invariant
// ==============================================

mod age_invariant {
    use super::*;

    #[test]
    fn visible_strictly_before_max_age_gone_at_max_age() {
        let (map, clock) = manual_map(10, None);
        map.insert("k", 1);

        for _ in 0..9 {
            assert_eq!(map.get(&"k"), Some(1));
            clock.advance(Duration::from_secs(1));
        }
        // t = 9s: still within [t, t + max_age)
        assert_eq!(map.get(&"k"), Some(1));

        clock.advance(Duration::from_secs(1)); // t = 10s = max_age
        assert_eq!(map.get(&"k"), None);
    }

    #[test]
    fn refresh_resets_expiration_clock_and_order() {
        let (map, clock) = manual_map(10, Some(2));

        map.insert("x", 1);
        clock.advance(Duration::from_secs(9));
        map.insert("x", 2); // refresh at t=9
        map.insert("y", 3);

        clock.advance(Duration::from_secs(9)); // t=18: "x" is 9s old again
        assert_eq!(map.get(&"x"), Some(2));

        // Order was reset too: the refresh re-queued "x" at t=9, but "y"
        // arrived after it, so "x" is still the oldest survivor.
        map.insert("z", 4);
        assert!(!map.contains(&"x"));
        assert!(map.contains(&"y"));
        assert!(map.contains(&"z"));
    }

    #[test]
    fn idempotent_expiry_reads() {
        let (map, clock) = manual_map(5, None);
        map.insert("k", 1);

        clock.advance(Duration::from_secs(5));
        assert_eq!(map.get(&"k"), None, "first read after expiry");
        assert_eq!(map.get(&"k"), None, "second read must be a plain miss");
        assert!(!map.contains(&"k"));
        assert_eq!(map.ttl(&"k"), None);
    }

    #[test]
    fn zero_max_age_expires_everything_on_access() {
        let (map, _clock) = manual_map(0, None);

        for i in 0..10u64 {
            map.insert(i, i);
        }
        for i in 0..10u64 {
            assert_eq!(map.get(&i), None);
        }
        assert!(map.is_empty());
    }
}

// ==============================================
// Remove Ignores Expiration
// ==============================================

mod remove_semantics {
    use super::*;

    #[test]
    fn remove_returns_expired_value() {
        let (map, clock) = manual_map(5, None);
        map.insert("k", 99);

        clock.advance(Duration::from_secs(50));
        assert_eq!(map.remove(&"k"), Some(99), "pop must not re-check age");
    }

    #[test]
    fn remove_of_absent_key_yields_default() {
        let (map, _clock) = manual_map::<&str, i32>(5, None);
        assert_eq!(map.remove_or(&"nope", -1), -1);
    }
}

// ==============================================
// Spec Scenario: max_age=10, max_len=2
// ==============================================

mod combined_scenario {
    use super::*;

    #[test]
    fn capacity_then_age_expiry() {
        let (map, clock) = manual_map(10, Some(2));

        map.insert("a", 1); // t=0
        clock.advance(Duration::from_secs(1));
        map.insert("b", 2); // t=1
        clock.advance(Duration::from_secs(1));
        map.insert("c", 3); // t=2, evicts "a"

        assert!(!map.contains(&"a"));
        assert_eq!(map.get(&"b"), Some(2));
        assert_eq!(map.get(&"c"), Some(3));

        clock.advance(Duration::from_secs(10)); // t=12
        assert_eq!(map.get(&"b"), None);
        assert_eq!(map.get(&"c"), None);
        assert!(map.is_empty());
    }
}

// ==============================================
// Enumeration Never Fails
// ==============================================

mod enumeration {
    use super::*;

    #[test]
    fn mixed_fresh_and_expired_yields_only_fresh() {
        let (map, clock) = manual_map(10, None);

        map.insert("stale1", 1);
        map.insert("stale2", 2);
        clock.advance(Duration::from_secs(6));
        map.insert("fresh1", 3);
        map.insert("fresh2", 4);
        clock.advance(Duration::from_secs(6)); // stale* at 12s, fresh* at 6s

        let entries = map.entries();
        assert_eq!(entries, vec![("fresh1", 3), ("fresh2", 4)]);
        assert_eq!(map.values(), vec![3, 4]);
    }

    #[test]
    fn fully_expired_map_yields_empty_sequences() {
        let (map, clock) = manual_map(1, None);

        for i in 0..25u64 {
            map.insert(i, i);
        }
        clock.advance(Duration::from_secs(2));

        assert!(map.entries().is_empty());
        assert!(map.values().is_empty());
    }

    #[test]
    fn raw_keys_expose_physical_contents() {
        let (map, clock) = manual_map(1, None);

        map.insert("a", 1);
        map.insert("b", 2);
        clock.advance(Duration::from_secs(10));

        // Raw traversal: stale entries visible, nothing removed.
        assert_eq!(map.keys(), vec!["a", "b"]);
        assert_eq!(map.len(), 2);

        // Expiration-aware traversal: empty, and it cleaned up.
        assert!(map.entries().is_empty());
        assert_eq!(map.len(), 0);
    }
}

// ==============================================
// Metrics Accounting
// ==============================================

mod metrics {
    use super::*;

    #[test]
    fn counters_reflect_observed_traffic() {
        let (map, clock) = manual_map(10, Some(2));

        map.insert("a", 1);
        map.insert("b", 2);
        map.insert("c", 3); // evicts "a"
        map.get(&"b"); // hit
        map.get(&"gone"); // miss
        clock.advance(Duration::from_secs(10));
        map.get(&"c"); // miss + expiration

        let snap = map.metrics();
        assert_eq!(snap.inserts, 3);
        assert_eq!(snap.evictions, 1);
        assert_eq!(snap.hits, 1);
        assert_eq!(snap.misses, 2);
        assert_eq!(snap.expirations, 1);
    }
}
