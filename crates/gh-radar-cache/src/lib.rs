//! In-memory TTL cache for upstream API responses
//!
//! Maps a stable query key to a serialized response body plus the instant it
//! was fetched. Entries older than the TTL are treated as absent and removed
//! as a side effect of the lookup (lazy expiry); there is no sweeper thread.
//!
//! The cache itself is not synchronized; callers share it as
//! `Arc<Mutex<TtlCache>>` and keep the critical sections short. Values are
//! JSON strings produced by the caller, which also owns deserialization and
//! falls back to a fresh fetch when a cached body no longer parses.

use log::debug;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Default entry lifetime (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// A cached response body and when it was fetched.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    fetched_at: Instant,
}

/// Hit/miss/eviction counters, readable in-process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Keyed TTL cache with lazy expiry.
#[derive(Debug)]
pub struct TtlCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
    stats: CacheStats,
}

impl Default for TtlCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl TtlCache {
    /// Create a cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            stats: CacheStats::default(),
        }
    }

    /// The configured entry lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up `key`, removing the entry if it has outlived the TTL.
    pub fn get(&mut self, key: &str) -> Option<String> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.fetched_at.elapsed() >= self.ttl,
            None => {
                self.stats.misses += 1;
                return None;
            }
        };

        if expired {
            // Lazy expiry: the stale entry goes away on the read that saw it.
            self.entries.remove(key);
            self.stats.evictions += 1;
            self.stats.misses += 1;
            debug!("cache entry '{}' expired", key);
            return None;
        }

        self.stats.hits += 1;
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Store `value` under `key`, resetting its age.
    pub fn set(&mut self, key: &str, value: String) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Drop `key` regardless of age. Returns whether an entry existed.
    pub fn invalidate(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of stored entries, including ones that would expire on read.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Counters accumulated since construction.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
