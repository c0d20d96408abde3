//! Redis-backed primary cache.
//!
//! Every operation returns success/failure data instead of raising past the
//! caller; connection trouble is logged and the result cache falls back to
//! the in-process backend.

use redis::aio::ConnectionManager;
use redis::AsyncCommands;

/// Thin wrapper over a managed Redis connection.
#[derive(Clone)]
pub struct RedisBackend {
    conn: ConnectionManager,
}

impl RedisBackend {
    /// Connect and verify with a PING. Any failure is returned, not raised
    /// later; callers treat it as "primary unavailable".
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        let backend = Self { conn };
        if !backend.ping().await {
            anyhow::bail!("redis at {url} did not answer PING");
        }
        Ok(backend)
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.conn.clone();
        match conn.get::<_, Option<String>>(key).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "redis GET failed");
                None
            }
        }
    }

    pub async fn set_with_expiry(&self, key: &str, value: &str, ttl_secs: u64) -> bool {
        let mut conn = self.conn.clone();
        match conn.set_ex::<_, _, ()>(key, value, ttl_secs).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "redis SETEX failed");
                false
            }
        }
    }

    pub async fn delete(&self, key: &str) -> bool {
        let mut conn = self.conn.clone();
        matches!(conn.del::<_, i64>(key).await, Ok(n) if n > 0)
    }

    pub async fn keys_by_prefix(&self, prefix: &str) -> Vec<String> {
        let mut conn = self.conn.clone();
        match conn.keys::<_, Vec<String>>(format!("{prefix}*")).await {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(error = %e, "redis KEYS failed");
                Vec::new()
            }
        }
    }

    pub async fn ping(&self) -> bool {
        let mut conn = self.conn.clone();
        let pong: redis::RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
        matches!(pong.as_deref(), Ok("PONG"))
    }
}
