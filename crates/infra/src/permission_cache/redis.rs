//! Redis-backed permission cache (optional).
//!
//! Entries are JSON-encoded permission lists stored with `SET .. EX ttl`, so
//! Redis handles expiry. Keys follow [`cache_key`]. Every call opens a
//! blocking connection, so the gateway drives it from the blocking pool.

use std::time::Duration;

use redis::Commands;

use stockroom_auth::cache::cache_key;
use stockroom_auth::{CacheError, PermissionCache, PermissionSet, SubjectId};

#[derive(Debug, Clone)]
pub struct RedisPermissionCache {
    client: redis::Client,
    ttl: Duration,
}

impl RedisPermissionCache {
    pub fn new(redis_url: impl AsRef<str>, ttl: Duration) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url.as_ref())
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;
        Ok(Self { client, ttl })
    }

    fn connection(&self) -> Result<redis::Connection, CacheError> {
        self.client
            .get_connection()
            .map_err(|e| CacheError::Unavailable(e.to_string()))
    }
}

impl PermissionCache for RedisPermissionCache {
    fn get(&self, subject: &SubjectId) -> Result<Option<PermissionSet>, CacheError> {
        let mut conn = self.connection()?;
        let raw: Option<String> = conn
            .get(cache_key(subject))
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;

        raw.map(|json| {
            serde_json::from_str(&json).map_err(|e| CacheError::Corrupt(e.to_string()))
        })
        .transpose()
    }

    fn put(&self, subject: &SubjectId, permissions: &PermissionSet) -> Result<(), CacheError> {
        let payload =
            serde_json::to_string(permissions).map_err(|e| CacheError::Corrupt(e.to_string()))?;
        // SET EX rejects 0; a zero TTL means "do not cache".
        let ttl_secs = self.ttl.as_secs();
        if ttl_secs == 0 {
            return Ok(());
        }

        let mut conn = self.connection()?;
        let _: () = conn
            .set_ex(cache_key(subject), payload, ttl_secs)
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;
        Ok(())
    }

    fn invalidate(&self, subject: &SubjectId) -> Result<(), CacheError> {
        let mut conn = self.connection()?;
        let _: i64 = conn
            .del(cache_key(subject))
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;
        Ok(())
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}
