//! In-memory TTL cache for raw response bodies
//!
//! Provides a `TtlCache` that maps a request identity to the exact bytes
//! returned by the API, together with an expiry instant. There is no sweeper:
//! expired entries are ignored on lookup and overwritten on the next `put`.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use tracing::trace;

/// A single cached response body
#[derive(Debug, Clone)]
struct CacheEntry {
    /// Raw response body as received from the network
    body: Vec<u8>,
    /// Instant after which the entry is stale; `None` never expires
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires_at) => now < expires_at,
            None => true,
        }
    }
}

/// Thread-safe cache of response bodies with per-entry expiry
///
/// Concurrent lookups share a read lock; writes take the write lock and swap
/// in a fully built entry, so readers never observe a partially written body.
#[derive(Debug, Default)]
pub struct TtlCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl TtlCache {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the cached body for `identity` if present and unexpired
    ///
    /// A miss (absent or expired) leaves the cache untouched.
    pub fn get(&self, identity: &str) -> Option<Vec<u8>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(identity)?;

        if entry.is_fresh(Instant::now()) {
            trace!(identity, "cache entry fresh");
            Some(entry.body.clone())
        } else {
            trace!(identity, "cache entry expired");
            None
        }
    }

    /// Stores `body` for `identity`, replacing any existing entry
    ///
    /// The entry expires `ttl` from now. A zero TTL stores an entry that is
    /// already stale, which effectively disables caching for that identity.
    pub fn put(&self, identity: impl Into<String>, body: Vec<u8>, ttl: Duration) {
        let entry = CacheEntry {
            body,
            expires_at: Instant::now().checked_add(ttl),
        };

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(identity.into(), entry);
    }

    /// Time left before the entry for `identity` expires
    ///
    /// Returns `None` for absent or expired entries.
    pub fn remaining_ttl(&self, identity: &str) -> Option<Duration> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(identity)?;
        let now = Instant::now();

        match entry.expires_at {
            Some(expires_at) if now < expires_at => Some(expires_at - now),
            Some(_) => None,
            None => Some(Duration::MAX),
        }
    }

    /// Number of stored entries, fresh or not
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing has ever been stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    const TODAY_URL: &str = "https://example.test/api/jourTempo/today";

    #[test]
    fn test_get_returns_none_for_missing_identity() {
        let cache = TtlCache::new();

        assert!(cache.get(TODAY_URL).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_get_after_put_returns_exact_bytes() {
        let cache = TtlCache::new();
        let body = br#"{"dateJour":"2024-01-15","codeJour":3}"#.to_vec();

        cache.put(TODAY_URL, body.clone(), Duration::from_secs(60));

        assert_eq!(cache.get(TODAY_URL), Some(body));
    }

    #[test]
    fn test_get_after_ttl_elapsed_is_a_miss() {
        let cache = TtlCache::new();
        cache.put(TODAY_URL, b"{}".to_vec(), Duration::from_millis(20));

        thread::sleep(Duration::from_millis(50));

        assert!(cache.get(TODAY_URL).is_none());
        // Lazy eviction: the stale entry is still stored
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_zero_ttl_is_never_served() {
        let cache = TtlCache::new();
        cache.put(TODAY_URL, b"{}".to_vec(), Duration::ZERO);

        assert!(cache.get(TODAY_URL).is_none());
        assert!(cache.remaining_ttl(TODAY_URL).is_none());
    }

    #[test]
    fn test_put_overwrites_expired_entry() {
        let cache = TtlCache::new();
        cache.put(TODAY_URL, b"old".to_vec(), Duration::ZERO);
        cache.put(TODAY_URL, b"new".to_vec(), Duration::from_secs(60));

        assert_eq!(cache.get(TODAY_URL), Some(b"new".to_vec()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_put_overwrites_fresh_entry() {
        let cache = TtlCache::new();
        cache.put(TODAY_URL, b"first".to_vec(), Duration::from_secs(60));
        cache.put(TODAY_URL, b"second".to_vec(), Duration::from_secs(60));

        assert_eq!(cache.get(TODAY_URL), Some(b"second".to_vec()));
    }

    #[test]
    fn test_identities_are_independent() {
        let cache = TtlCache::new();
        cache.put("a", b"1".to_vec(), Duration::from_secs(60));
        cache.put("b", b"2".to_vec(), Duration::ZERO);

        assert_eq!(cache.get("a"), Some(b"1".to_vec()));
        assert!(cache.get("b").is_none());
    }

    #[test]
    fn test_remaining_ttl_is_bounded_by_configured_ttl() {
        let cache = TtlCache::new();
        let ttl = Duration::from_secs(30 * 60);
        cache.put(TODAY_URL, b"{}".to_vec(), ttl);

        let remaining = cache.remaining_ttl(TODAY_URL).expect("entry should be fresh");
        assert!(remaining <= ttl);
        assert!(remaining > ttl - Duration::from_secs(5));
    }

    #[test]
    fn test_concurrent_readers_never_see_partial_entries() {
        let cache = Arc::new(TtlCache::new());
        let long_a = vec![b'a'; 4096];
        let long_b = vec![b'b'; 4096];
        cache.put(TODAY_URL, long_a.clone(), Duration::from_secs(60));

        let writer = {
            let cache = Arc::clone(&cache);
            let (a, b) = (long_a.clone(), long_b.clone());
            thread::spawn(move || {
                for i in 0..200 {
                    let body = if i % 2 == 0 { b.clone() } else { a.clone() };
                    cache.put(TODAY_URL, body, Duration::from_secs(60));
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for _ in 0..200 {
                        let body = cache.get(TODAY_URL).expect("entry should be fresh");
                        assert_eq!(body.len(), 4096);
                        assert!(body.iter().all(|&c| c == body[0]));
                    }
                })
            })
            .collect();

        writer.join().expect("writer panicked");
        for reader in readers {
            reader.join().expect("reader panicked");
        }
    }
}
