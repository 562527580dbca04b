//! Redis-backed cache service with typed keys and per-key TTLs
//!
//! Cached projections are best-effort: a Redis failure on read falls through
//! to the database, a failure on write is logged and dropped. Handlers never
//! see a cache error.

use redis::{AsyncCommands, Client};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::CacheConfig,
    error::{AppError, AppResult},
};

/// Typed cache keys for the projections this server caches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKey {
    /// Full title listing
    Books,
    /// Full author listing
    Authors,
    /// Full publisher listing
    Publishers,
    /// Per-user reservation list
    UserReservations(i32),
}

impl CacheKey {
    /// Redis key string
    pub fn key(&self) -> String {
        match self {
            CacheKey::Books => "catalog:books".to_string(),
            CacheKey::Authors => "catalog:authors".to_string(),
            CacheKey::Publishers => "catalog:publishers".to_string(),
            CacheKey::UserReservations(user_id) => format!("reservations:{}", user_id),
        }
    }
}

#[derive(Clone)]
pub struct CacheService {
    client: Client,
    listing_ttl: u64,
    reservations_ttl: u64,
}

impl CacheService {
    /// Create a new cache service and verify the connection
    pub async fn new(url: &str, config: &CacheConfig) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(Self {
            client,
            listing_ttl: config.listing_ttl_seconds,
            reservations_ttl: config.reservations_ttl_seconds,
        })
    }

    /// True if Redis answers a PING (readiness probe)
    pub async fn ping(&self) -> bool {
        match self.client.get_multiplexed_async_connection().await {
            Ok(mut conn) => redis::cmd("PING")
                .query_async::<_, String>(&mut conn)
                .await
                .is_ok(),
            Err(_) => false,
        }
    }

    /// TTL applied when storing under the given key
    fn ttl_for(&self, key: &CacheKey) -> u64 {
        match key {
            CacheKey::Books | CacheKey::Authors | CacheKey::Publishers => self.listing_ttl,
            CacheKey::UserReservations(_) => self.reservations_ttl,
        }
    }

    /// Fetch and deserialize a cached value, or None on miss or failure
    pub async fn get_json<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!("Cache read skipped, Redis unavailable: {}", e);
                return None;
            }
        };

        let raw: Option<String> = match conn.get(key.key()).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Cache read failed for {}: {}", key.key(), e);
                return None;
            }
        };

        raw.and_then(|raw| match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Discarding undecodable cache entry {}: {}", key.key(), e);
                None
            }
        })
    }

    /// Serialize and store a value under the key's TTL
    pub async fn put_json<T: Serialize>(&self, key: &CacheKey, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Cache write skipped for {}: {}", key.key(), e);
                return;
            }
        };

        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!("Cache write skipped, Redis unavailable: {}", e);
                return;
            }
        };

        if let Err(e) = conn
            .set_ex::<_, _, ()>(key.key(), raw, self.ttl_for(key))
            .await
        {
            tracing::warn!("Cache write failed for {}: {}", key.key(), e);
        }
    }

    /// Drop a cached entry (write-through invalidation)
    pub async fn invalidate(&self, key: &CacheKey) {
        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!("Cache invalidation skipped, Redis unavailable: {}", e);
                return;
            }
        };

        if let Err(e) = conn.del::<_, ()>(key.key()).await {
            tracing::warn!("Cache invalidation failed for {}: {}", key.key(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_stable() {
        assert_eq!(CacheKey::Books.key(), "catalog:books");
        assert_eq!(CacheKey::Authors.key(), "catalog:authors");
        assert_eq!(CacheKey::Publishers.key(), "catalog:publishers");
        assert_eq!(CacheKey::UserReservations(42).key(), "reservations:42");
    }

    #[test]
    fn user_keys_are_distinct_per_user() {
        assert_ne!(
            CacheKey::UserReservations(1).key(),
            CacheKey::UserReservations(2).key()
        );
    }
}
