//! TTL-bounded result cache keyed by query and options.
//!
//! The key is a SHA-256 digest over the raw query string and the
//! canonical (recursively key-sorted) JSON of the options, so two calls
//! that differ only in JSON field order share an entry.
//!
//! Eviction is deliberately not LRU: entries carry a wall-clock
//! `cached_at` timestamp, lookups reject anything past the TTL, and a
//! size-triggered sweep on insert drops every expired entry. The capacity
//! is advisory — after a sweep the insert always proceeds, so a burst of
//! distinct queries can push the map past the cap until entries age out.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::EngineResult;
use crate::query::SearchOptions;
use crate::results::SearchReply;

/// Default maximum cache entries.
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 1000;

/// Default cache TTL in seconds.
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 3600;

/// Configuration for the result cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Advisory maximum number of entries.
    pub max_entries: usize,
    /// Time-to-live for entries.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECONDS),
        }
    }
}

/// Snapshot of cache occupancy and traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Current entry count.
    pub size: usize,
    /// Configured (advisory) capacity.
    pub max_size: usize,
    /// Configured TTL in seconds.
    pub ttl: u64,
    /// Lookups served from the cache.
    pub hits: u64,
    /// Lookups that found nothing usable.
    pub misses: u64,
}

/// One cached reply.
#[derive(Debug, Clone)]
struct CacheEntry {
    reply: SearchReply,
    cached_at: DateTime<Utc>,
}

/// Bounded TTL cache for search replies.
pub struct ResultCache {
    config: CacheConfig,
    entries: RwLock<HashMap<String, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResultCache {
    /// Create a cache with the given config.
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Create a cache with default capacity and TTL.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default())
    }

    /// Compute the cache key for a query/options pair.
    pub fn key(query: &str, options: &SearchOptions) -> EngineResult<String> {
        let options_value = serde_json::to_value(options)?;
        let canonical = canonical_json(&options_value);

        let mut hasher = Sha256::new();
        hasher.update(query.as_bytes());
        hasher.update([0x1f]);
        hasher.update(canonical.as_bytes());
        Ok(hex::encode(hasher.finalize()))
    }

    /// Fetch a cached reply if present and within TTL.
    ///
    /// The returned clone carries `from_cache = true`; the stored entry is
    /// untouched.
    pub fn get(&self, key: &str) -> Option<SearchReply> {
        let entries = self.entries.read().ok()?;
        let usable = entries.get(key).filter(|entry| !self.is_expired(entry));

        match usable {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                let mut reply = entry.reply.clone();
                reply.from_cache = true;
                Some(reply)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a reply. At capacity, expired entries are swept first; the
    /// insert itself always proceeds.
    pub fn put(&self, key: String, reply: SearchReply) {
        let Ok(mut entries) = self.entries.write() else {
            return;
        };

        if entries.len() >= self.config.max_entries {
            let before = entries.len();
            entries.retain(|_, entry| !self.is_expired(entry));
            debug!(
                swept = before - entries.len(),
                remaining = entries.len(),
                "cache capacity sweep"
            );
        }

        entries.insert(
            key,
            CacheEntry {
                reply,
                cached_at: Utc::now(),
            },
        );
    }

    /// Drop every entry.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    /// Current occupancy and traffic counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.entries.read().map(|e| e.len()).unwrap_or_default(),
            max_size: self.config.max_entries,
            ttl: self.config.ttl.as_secs(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        let ttl = chrono::Duration::from_std(self.config.ttl)
            .unwrap_or_else(|_| chrono::Duration::MAX);
        Utc::now().signed_duration_since(entry.cached_at) >= ttl
    }
}

/// Render a JSON value with every object's keys sorted, recursively.
fn canonical_json(value: &Value) -> String {
    canonicalize(value).to_string()
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = serde_json::Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
