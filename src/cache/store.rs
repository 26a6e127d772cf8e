//! In-memory TTL cache protecting upstream provider calls
//!
//! Provides a generic `TtlCache` keyed by string, with per-entry absolute
//! expiry computed at insertion time. Expired entries are evicted lazily by
//! `get`, but `peek` can still see them, which is what allows serving stale
//! data when the provider is unavailable.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Source of the current instant, injectable so TTL behavior is testable
/// without sleeping.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Returns the current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Controllable clock for deterministic cache tests
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a manual clock starting at the given instant
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Moves the clock forward by the given duration
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("clock lock poisoned");
        *now += chrono::Duration::from_std(by).unwrap_or(chrono::Duration::MAX);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock poisoned")
    }
}

/// A single cached value with its expiry instant
#[derive(Debug)]
struct CacheEntry<T> {
    /// The cached value
    value: T,
    /// When the value was stored
    cached_at: DateTime<Utc>,
    /// Absolute instant after which the entry is no longer fresh
    expires_at: DateTime<Utc>,
}

/// Result of a non-evicting `peek`, including freshness metadata
#[derive(Debug, Clone)]
pub struct Peeked<T> {
    /// The cached value, possibly past its expiry
    pub value: T,
    /// When the value was stored
    #[allow(dead_code)]
    pub cached_at: DateTime<Utc>,
    /// Whether the entry's TTL has elapsed
    pub is_expired: bool,
}

/// Generic in-memory key/value store with per-entry time-to-live
///
/// The cache is TTL-agnostic: callers pass a TTL with every `set`, and policy
/// constants (movers vs. historical windows) live with the calling layer.
/// There is no size cap and no background sweep; unbounded key growth is an
/// accepted non-goal, distinct from the stale-fallback policy layered on top.
#[derive(Debug)]
pub struct TtlCache<T> {
    entries: Mutex<HashMap<String, CacheEntry<T>>>,
    clock: Arc<dyn Clock>,
}

impl<T> Default for TtlCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TtlCache<T> {
    /// Creates an empty cache driven by the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty cache with a custom clock (for testing)
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Stores a value under `key`, overwriting any prior entry unconditionally
    ///
    /// The expiry is computed here as an absolute instant; `ttl` only matters
    /// at insertion time.
    pub fn set(&self, key: &str, value: T, ttl: Duration) {
        let now = self.clock.now();
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let expires_at = now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                cached_at: now,
                expires_at,
            },
        );
    }

    /// Returns the stored value if it has not expired
    ///
    /// An entry whose expiry has passed is removed by the very read that
    /// discovers it, and `None` is returned. Unknown keys return `None`.
    pub fn get(&self, key: &str) -> Option<T>
    where
        T: Clone,
    {
        let now = self.clock.now();
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        match entries.get(key) {
            Some(entry) if now < entry.expires_at => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Reads an entry regardless of expiry, without evicting it
    ///
    /// This is the stale-fallback read path: a last-known-good value stays
    /// visible here until the next successful `set` overwrites it, even
    /// though `get` would refuse to return it.
    pub fn peek(&self, key: &str) -> Option<Peeked<T>>
    where
        T: Clone,
    {
        let now = self.clock.now();
        let entries = self.entries.lock().expect("cache lock poisoned");
        entries.get(key).map(|entry| Peeked {
            value: entry.value.clone(),
            cached_at: entry.cached_at,
            is_expired: now >= entry.expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn manual_clock() -> Arc<ManualClock> {
        let start = Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap();
        Arc::new(ManualClock::new(start))
    }

    #[test]
    fn test_get_returns_value_before_expiry() {
        let clock = manual_clock();
        let cache: TtlCache<i32> = TtlCache::with_clock(clock.clone());

        cache.set("answer", 42, Duration::from_secs(60));
        clock.advance(Duration::from_secs(59));

        assert_eq!(cache.get("answer"), Some(42));
    }

    #[test]
    fn test_get_returns_none_at_exact_expiry() {
        let clock = manual_clock();
        let cache: TtlCache<i32> = TtlCache::with_clock(clock.clone());

        cache.set("answer", 42, Duration::from_secs(60));
        clock.advance(Duration::from_secs(60));

        assert_eq!(cache.get("answer"), None);
    }

    #[test]
    fn test_get_returns_none_after_expiry() {
        let clock = manual_clock();
        let cache: TtlCache<i32> = TtlCache::with_clock(clock.clone());

        cache.set("answer", 42, Duration::from_secs(60));
        clock.advance(Duration::from_secs(3600));

        assert_eq!(cache.get("answer"), None);
    }

    #[test]
    fn test_get_unknown_key_returns_none() {
        let cache: TtlCache<String> = TtlCache::new();
        assert!(cache.get("missing").is_none());
    }

    #[test]
    fn test_expired_entry_removed_on_get() {
        let clock = manual_clock();
        let cache: TtlCache<i32> = TtlCache::with_clock(clock.clone());

        cache.set("answer", 42, Duration::from_secs(1));
        clock.advance(Duration::from_secs(2));

        // The get that discovers the expiry evicts the entry, so even the
        // expiry-ignoring peek no longer sees it.
        assert_eq!(cache.get("answer"), None);
        assert!(cache.peek("answer").is_none());
    }

    #[test]
    fn test_peek_sees_expired_entry() {
        let clock = manual_clock();
        let cache: TtlCache<i32> = TtlCache::with_clock(clock.clone());

        cache.set("answer", 42, Duration::from_secs(1));
        clock.advance(Duration::from_secs(2));

        let peeked = cache.peek("answer").expect("peek should see expired entry");
        assert_eq!(peeked.value, 42);
        assert!(peeked.is_expired);
    }

    #[test]
    fn test_peek_fresh_entry_not_expired() {
        let clock = manual_clock();
        let cache: TtlCache<i32> = TtlCache::with_clock(clock.clone());

        cache.set("answer", 42, Duration::from_secs(60));

        let peeked = cache.peek("answer").expect("peek should see fresh entry");
        assert_eq!(peeked.value, 42);
        assert!(!peeked.is_expired);
    }

    #[test]
    fn test_peek_does_not_evict() {
        let clock = manual_clock();
        let cache: TtlCache<i32> = TtlCache::with_clock(clock.clone());

        cache.set("answer", 42, Duration::from_secs(1));
        clock.advance(Duration::from_secs(2));

        assert!(cache.peek("answer").is_some());
        assert!(cache.peek("answer").is_some(), "peek must not remove entries");
    }

    #[test]
    fn test_set_overwrites_existing_entry() {
        let clock = manual_clock();
        let cache: TtlCache<i32> = TtlCache::with_clock(clock.clone());

        cache.set("answer", 1, Duration::from_secs(60));
        cache.set("answer", 2, Duration::from_secs(60));

        assert_eq!(cache.get("answer"), Some(2));
    }

    #[test]
    fn test_overwrite_resets_expiry() {
        let clock = manual_clock();
        let cache: TtlCache<i32> = TtlCache::with_clock(clock.clone());

        cache.set("answer", 1, Duration::from_secs(60));
        clock.advance(Duration::from_secs(50));
        cache.set("answer", 2, Duration::from_secs(60));
        clock.advance(Duration::from_secs(50));

        // 100s after the first set, but only 50s after the overwrite
        assert_eq!(cache.get("answer"), Some(2));
    }

    #[test]
    fn test_keys_are_independent() {
        let clock = manual_clock();
        let cache: TtlCache<i32> = TtlCache::with_clock(clock.clone());

        cache.set("short", 1, Duration::from_secs(10));
        cache.set("long", 2, Duration::from_secs(1000));
        clock.advance(Duration::from_secs(100));

        assert_eq!(cache.get("short"), None);
        assert_eq!(cache.get("long"), Some(2));
    }

    #[test]
    fn test_manual_clock_advances() {
        let clock = manual_clock();
        let before = clock.now();
        clock.advance(Duration::from_secs(30));
        assert_eq!((clock.now() - before).num_seconds(), 30);
    }
}
