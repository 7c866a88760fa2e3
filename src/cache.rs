//! Bounded-lifetime cache shared by the lookup-facing components.
//!
//! Entries carry a per-entry expiry and are value copies: `get` hands back a
//! clone, so callers can never corrupt cache state by mutating a returned
//! result. Expiry is lazy — a stale entry is removed on the access that
//! observes it; there is no background sweep.
//!
//! The clock is `tokio::time::Instant` so expiry is testable under paused
//! time. The lock is a plain `std::sync::Mutex` and is never held across an
//! await point.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::time::{Duration, Instant};

use crate::types::{CanonicalFeature, EntityStats, Suggestion};

/// A cached value with its expiry deadline. Owned exclusively by the cache.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Generic key → value store with per-entry time-to-live.
#[derive(Debug, Default)]
pub struct BoundedCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> BoundedCache<V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch a live entry, cloning the value. A lazily-expired entry is
    /// removed here and reported as a miss.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if Instant::now() < entry.expires_at => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.lock().unwrap().insert(key.into(), entry);
    }

    /// Remove every entry whose key starts with `prefix`.
    ///
    /// Deliberately coarse: change notifications carry no dependent-key
    /// graph, so invalidation over-approximates by key namespace.
    pub fn invalidate_prefix(&self, prefix: &str) {
        self.entries
            .lock()
            .unwrap()
            .retain(|key, _| !key.starts_with(prefix));
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    /// Number of stored entries, expired or not. Used by diagnostics and
    /// tests; `get` is what decides liveness.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Shared keyspace
// ---------------------------------------------------------------------------

/// Value union for the cache shared by the matcher (`search:`), the
/// canonicalizer (`canonical:`), and entity-statistics lookups (`stats:`).
#[derive(Debug, Clone)]
pub enum CachedValue {
    Suggestions(Vec<Suggestion>),
    /// A canonical lookup result; `None` records a clean zero-match, which
    /// is cacheable just like a hit.
    Canonical(Option<CanonicalFeature>),
    Stats(EntityStats),
}

/// The one cache instance all lookup-facing components share.
pub type SharedCache = BoundedCache<CachedValue>;
