//! In-process fallback cache with per-entry TTL.
//!
//! Expiry is lazy (checked on read) plus a periodic sweep on the write path,
//! throttled to at most once per [`SWEEP_INTERVAL_SECS`], so memory stays
//! bounded between reads. The map and the sweep clock share one mutex, so a
//! sweep can never drop a just-written, not-yet-expired entry.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Minimum seconds between sweeps of expired entries.
pub const SWEEP_INTERVAL_SECS: u64 = 300;

#[derive(Debug, Clone)]
struct StoredEntry {
    value: String,
    stored_at: u64,
    ttl_secs: u64,
}

impl StoredEntry {
    fn is_expired(&self, now: u64) -> bool {
        now.saturating_sub(self.stored_at) >= self.ttl_secs
    }
}

#[derive(Debug)]
struct Inner {
    map: HashMap<String, StoredEntry>,
    last_sweep: u64,
}

/// Thread-safe in-process store with TTL semantics.
#[derive(Debug)]
pub struct MemoryBackend {
    inner: Mutex<Inner>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                map: HashMap::new(),
                last_sweep: now_unix(),
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.get_at(key, now_unix())
    }

    pub fn put(&self, key: &str, value: String, ttl_secs: u64) {
        self.put_at(key, value, ttl_secs, now_unix());
    }

    /// Read with an explicit clock; expired entries are removed on the spot.
    pub fn get_at(&self, key: &str, now: u64) -> Option<String> {
        let mut inner = self.inner.lock().expect("memory cache mutex poisoned");
        match inner.map.get(key) {
            Some(entry) if !entry.is_expired(now) => Some(entry.value.clone()),
            Some(_) => {
                inner.map.remove(key);
                None
            }
            None => None,
        }
    }

    /// Write with an explicit clock; runs the throttled sweep afterwards.
    pub fn put_at(&self, key: &str, value: String, ttl_secs: u64, now: u64) {
        let mut inner = self.inner.lock().expect("memory cache mutex poisoned");
        inner.map.insert(
            key.to_string(),
            StoredEntry {
                value,
                stored_at: now,
                ttl_secs,
            },
        );

        if now.saturating_sub(inner.last_sweep) >= SWEEP_INTERVAL_SECS {
            let before = inner.map.len();
            inner.map.retain(|_, e| !e.is_expired(now));
            let removed = before - inner.map.len();
            if removed > 0 {
                tracing::debug!(removed, "swept expired cache entries");
            }
            inner.last_sweep = now;
        }
    }

    pub fn delete(&self, key: &str) -> bool {
        let mut inner = self.inner.lock().expect("memory cache mutex poisoned");
        inner.map.remove(key).is_some()
    }

    /// Remove everything, returning the number of entries dropped.
    pub fn clear(&self) -> usize {
        let mut inner = self.inner.lock().expect("memory cache mutex poisoned");
        let n = inner.map.len();
        inner.map.clear();
        n
    }

    /// Count of entries still alive at `now`.
    pub fn live_entries(&self) -> usize {
        let now = now_unix();
        let inner = self.inner.lock().expect("memory cache mutex poisoned");
        inner.map.values().filter(|e| !e.is_expired(now)).count()
    }

    /// Total stored entries, expired or not.
    pub fn total_entries(&self) -> usize {
        let inner = self.inner.lock().expect("memory cache mutex poisoned");
        inner.map.len()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Current UNIX time in seconds.
pub(crate) fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_secs()
}
