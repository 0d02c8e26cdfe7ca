//! In-memory result cache with per-entry expiry.
//!
//! [`ResultCache`] memoizes derived, re-computable results (dashboard
//! aggregates) for a bounded time window. Each entry is either *live*
//! (`now < expires_at`) or *expired*; the transition is time-driven and only
//! observed on access. Expired entries are evicted lazily by the lookup that
//! finds them, there is no background sweeper.
//!
//! The cache is an explicit object owned by the application state rather than
//! a process global, so tests get isolated instances. Concurrent misses on the
//! same key may both compute; the last `set` wins. That is fine for read-mostly
//! aggregates and not fine for anything needing linearizability.
//!
//! Expiry is measured with [`tokio::time::Instant`], so tests can pause and
//! advance the clock.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use hiremetrics_persistence::cache::{CacheKey, ResultCache};
//!
//! let cache: ResultCache<String> = ResultCache::new(Duration::from_secs(300));
//! let key = CacheKey::new("top_companies", "top_companies")
//!     .kwarg("limit", &20)
//!     .kwarg("seniority", &Some("Senior"))
//!     .build();
//!
//! cache.set(key.clone(), "rows".to_string());
//! assert_eq!(cache.get(&key), Some("rows".to_string()));
//! assert_eq!(cache.size(), 1);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::time::Instant;
use tracing::{debug, warn};

/// Default time-to-live for cache entries.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Hit/miss counters and current size, for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of live entries plus expired entries not yet evicted.
    pub size: usize,
    /// Lookups that returned a live entry.
    pub hits: u64,
    /// Lookups that found nothing or an expired entry.
    pub misses: u64,
}

/// A key/value store whose entries expire after a TTL.
pub struct ResultCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    default_ttl: Duration,
    enabled: bool,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V> std::fmt::Debug for ResultCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("size", &self.entries.lock().len())
            .field("default_ttl", &self.default_ttl)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl<V: Clone> Default for ResultCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl<V: Clone> ResultCache<V> {
    /// Creates an enabled cache with the given default TTL.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
            enabled: true,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Creates a cache that never stores anything.
    ///
    /// Every lookup misses, so [`ResultCache::get_or_compute`] always runs the
    /// computation.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new(DEFAULT_TTL)
        }
    }

    /// Returns whether the cache stores entries.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the TTL applied by [`ResultCache::set`].
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Returns the value for `key` if it is still live.
    ///
    /// An expired entry is removed and reported as a miss.
    pub fn get(&self, key: &str) -> Option<V> {
        if !self.enabled {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        }

        let mut entries = self.entries.lock();
        let live = match entries.get(key) {
            Some(entry) if Instant::now() < entry.expires_at => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        };
        drop(entries);

        if live.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        live
    }

    /// Stores `value` under `key` with the default TTL, replacing any prior entry.
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    /// Stores `value` under `key` for `ttl`, replacing any prior entry.
    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        if !self.enabled {
            return;
        }
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.lock().insert(key.into(), entry);
    }

    /// Drops every entry.
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        let dropped = entries.len();
        entries.clear();
        debug!(dropped, "Cache cleared");
    }

    /// Returns the number of stored entries, including expired ones not yet evicted.
    pub fn size(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns the current counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.size(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Returns the cached value for `key`, or runs `compute` and caches its result.
    ///
    /// Only successful results are stored. `ttl` defaults to the cache's
    /// default TTL. The lock is not held while `compute` runs.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        compute: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            debug!(key = %key, "Cache hit");
            return Ok(value);
        }

        let value = compute().await?;
        self.set_with_ttl(key, value.clone(), ttl.unwrap_or(self.default_ttl));
        debug!(key = %key, "Cache miss, cached result");
        Ok(value)
    }
}

/// Derives deterministic cache keys from a function identity and its arguments.
///
/// The key has the shape `<prefix>:<function>:<sha256>`, where the digest
/// covers the JSON encoding of the positional arguments in order and the
/// keyword arguments sorted by name. Keyword order therefore does not matter,
/// and arguments that merely print alike (`1` and `"1"`) hash differently.
#[derive(Debug, Clone, Default)]
pub struct CacheKey {
    prefix: String,
    function: String,
    args: Vec<Value>,
    kwargs: BTreeMap<String, Value>,
}

impl CacheKey {
    /// Starts a key for `function` namespaced under `prefix`.
    pub fn new(prefix: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            function: function.into(),
            ..Default::default()
        }
    }

    /// Adds a positional argument.
    pub fn arg<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.args.push(encode(value));
        self
    }

    /// Adds a keyword argument.
    pub fn kwarg<T: Serialize + ?Sized>(mut self, name: impl Into<String>, value: &T) -> Self {
        self.kwargs.insert(name.into(), encode(value));
        self
    }

    /// Renders the key.
    pub fn build(&self) -> String {
        let payload = serde_json::json!([self.args, self.kwargs]);
        let digest = Sha256::digest(payload.to_string().as_bytes());
        format!("{}:{}:{:x}", self.prefix, self.function, digest)
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        warn!(error = %e, "Cache key argument is not serializable, hashing as null");
        Value::Null
    })
}
