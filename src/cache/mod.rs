//! # Result Cache
//!
//! Dual-backend cache for finished analysis payloads, keyed by a
//! deterministic fingerprint of the request. Redis is the preferred
//! backend; when it is unreachable at startup or at call time, the cache
//! transparently degrades to an in-process map with the same TTL semantics.
//! No operation here ever raises past the caller; caching is an internal
//! optimization, invisible in the response payload.

pub mod memory;
pub mod redis;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::options::AnalyzeOptions;
use crate::types::Source;

pub use memory::MemoryBackend;
pub use redis::RedisBackend;

/// Namespace tag prefixed to every key.
pub const KEY_PREFIX: &str = "sentiment:";
/// Default entry lifetime: 30 minutes.
pub const DEFAULT_TTL_SECS: u64 = 1800;
/// Env var with the Redis connection URL.
pub const ENV_REDIS_URL: &str = "REDIS_URL";

/// One cached payload with its own creation timestamp and TTL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub payload: Value,
    pub cached_at: String,
    pub ttl_seconds: u64,
}

/// Derive the cache key for a request: texts and tickers are sorted, options
/// are serialized with sorted keys, the canonical string is SHA-256 hashed
/// and truncated to a 16-hex prefix under `sentiment:{source}:`.
///
/// Sorting trades literal-order fidelity for hit rate: a batch and its
/// permutation map to the same entry, so callers relying on positional
/// `texts[i]`/`tickers[i]` correspondence across differently-ordered but
/// set-equal batches should not share a cache.
pub fn derive_key(
    texts: &[String],
    tickers: &[String],
    source: Source,
    options: &AnalyzeOptions,
) -> String {
    let mut sorted_texts: Vec<&str> = texts.iter().map(String::as_str).collect();
    sorted_texts.sort_unstable();
    let mut sorted_tickers: Vec<&str> = tickers.iter().map(String::as_str).collect();
    sorted_tickers.sort_unstable();

    let canonical = serde_json::json!({
        "options": options.canonical_json(),
        "source": source.as_str(),
        "texts": sorted_texts,
        "tickers": sorted_tickers,
    })
    .to_string();

    let digest = Sha256::digest(canonical.as_bytes());
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();

    format!("{KEY_PREFIX}{}:{}", source.as_str(), &hex[..16])
}

/// Cache statistics for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub backend: &'static str,
    pub connected: bool,
    pub total_keys: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub default_ttl: u64,
    pub key_prefix: &'static str,
}

/// Owned cache object passed to callers: Redis primary when available,
/// in-process fallback always present.
pub struct ResultCache {
    primary: Option<RedisBackend>,
    fallback: MemoryBackend,
    default_ttl: u64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResultCache {
    /// Build from `REDIS_URL`. A missing var or failed connection degrades
    /// to in-process caching with a warning; it is never fatal.
    pub async fn from_env() -> Self {
        let primary = match std::env::var(ENV_REDIS_URL) {
            Ok(url) => match RedisBackend::connect(&url).await {
                Ok(backend) => {
                    tracing::info!("connected to redis cache backend");
                    Some(backend)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "redis unavailable, using in-process cache");
                    None
                }
            },
            Err(_) => {
                tracing::info!("REDIS_URL not set, using in-process cache");
                None
            }
        };

        Self {
            primary,
            fallback: MemoryBackend::new(),
            default_ttl: default_ttl_from_env(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Purely in-process cache (tests, or when Redis is knowingly absent).
    pub fn in_memory() -> Self {
        Self {
            primary: None,
            fallback: MemoryBackend::new(),
            default_ttl: DEFAULT_TTL_SECS,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    /// Look up a finished payload. A hit returns the payload exactly as it
    /// was stored; expiry aside, the cache never mutates payloads.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let raw = match &self.primary {
            Some(redis) => match redis.get(key).await {
                Some(v) => Some(v),
                None => self.fallback.get(key),
            },
            None => self.fallback.get(key),
        };

        match raw.and_then(|s| serde_json::from_str::<CacheEntry>(&s).ok()) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("sentiment_cache_hits_total").increment(1);
                Some(entry.payload)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("sentiment_cache_misses_total").increment(1);
                None
            }
        }
    }

    /// Store a finished payload. Failures are absorbed (logged); a broken
    /// cache write never fails a request.
    pub async fn put(&self, key: &str, payload: Value, ttl_secs: u64) -> bool {
        let entry = CacheEntry {
            payload,
            cached_at: chrono::Utc::now().to_rfc3339(),
            ttl_seconds: ttl_secs,
        };
        let raw = match serde_json::to_string(&entry) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize cache entry");
                return false;
            }
        };

        if let Some(redis) = &self.primary {
            if redis.set_with_expiry(key, &raw, ttl_secs).await {
                return true;
            }
            tracing::warn!("redis write failed, falling back to in-process cache");
        }
        self.fallback.put(key, raw, ttl_secs);
        true
    }

    /// Drop every entry under the namespace prefix; returns how many were
    /// removed (best-effort for the Redis side).
    pub async fn invalidate_all(&self) -> usize {
        let mut removed = 0usize;
        if let Some(redis) = &self.primary {
            for key in redis.keys_by_prefix(KEY_PREFIX).await {
                if redis.delete(&key).await {
                    removed += 1;
                }
            }
        }
        removed += self.fallback.clear();
        tracing::info!(removed, "cache invalidated");
        removed
    }

    pub async fn stats(&self) -> CacheStats {
        let (backend, connected, total_keys) = match &self.primary {
            Some(redis) => {
                let connected = redis.ping().await;
                let keys = redis.keys_by_prefix(KEY_PREFIX).await.len();
                ("redis", connected, keys)
            }
            None => ("memory", false, self.fallback.live_entries()),
        };

        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;
        let hit_rate = if lookups > 0 {
            hits as f64 / lookups as f64
        } else {
            0.0
        };

        CacheStats {
            backend,
            connected,
            total_keys,
            hits,
            misses,
            hit_rate,
            default_ttl: self.default_ttl,
            key_prefix: KEY_PREFIX,
        }
    }
}

fn default_ttl_from_env() -> u64 {
    std::env::var("SENTIMENT_CACHE_TTL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_TTL_SECS)
}
