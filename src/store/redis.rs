//! Redis-backed [`SharedStore`].

use crate::error::FetchError;
use crate::store::SharedStore;
use async_trait::async_trait;
use log::{debug, error, info};
use redis::{aio::ConnectionManager, AsyncCommands};
use std::fmt;

/// A shared Redis store client.
/// Uses a `ConnectionManager` for automatic reconnection and resilience.
#[derive(Clone)]
pub struct RedisStore {
    conn_manager: ConnectionManager,
    redis_url: String,
}

// Manual Debug implementation, ConnectionManager does not implement Debug.
impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("redis_url", &self.redis_url)
            .field("conn_manager", &"<ConnectionManager instance>")
            .finish()
    }
}

impl RedisStore {
    pub async fn new(redis_url: &str) -> Result<Self, FetchError> {
        info!("Initializing Redis connection manager for URL: {}", redis_url);
        let client = redis::Client::open(redis_url)
            .map_err(|e| FetchError::Store(format!("Invalid Redis URL: {}", e)))?;
        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            error!("Failed to create Redis ConnectionManager: {}", e);
            FetchError::Store(format!("Failed to create Redis ConnectionManager: {}", e))
        })?;
        Ok(Self {
            conn_manager,
            redis_url: redis_url.to_string(),
        })
    }
}

#[async_trait]
impl SharedStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, FetchError> {
        debug!("Redis GET {}", key);
        let mut conn = self.conn_manager.clone();
        conn.get::<_, Option<String>>(key).await.map_err(|e| {
            error!("Redis GET error for key {}: {}", key, e);
            FetchError::Store(format!("Redis GET error for key {}: {}", key, e))
        })
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), FetchError> {
        debug!("Redis SETEX {} (ttl {}s)", key, ttl_secs);
        let mut conn = self.conn_manager.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .map_err(|e| {
                error!("Redis SETEX error for key {}: {}", key, e);
                FetchError::Store(format!("Redis SETEX error for key {}: {}", key, e))
            })
    }

    async fn set_nx_px(&self, key: &str, value: &str, ttl_ms: u64) -> Result<bool, FetchError> {
        debug!("Redis SET NX PX {} (ttl {}ms)", key, ttl_ms);
        let mut conn = self.conn_manager.clone();
        // One atomic command; a separate EXISTS + SET would race.
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("PX")
            .arg(ttl_ms)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                error!("Redis SET NX error for key {}: {}", key, e);
                FetchError::Store(format!("Redis SET NX error for key {}: {}", key, e))
            })?;
        Ok(reply.is_some())
    }

    async fn del(&self, key: &str) -> Result<bool, FetchError> {
        debug!("Redis DEL {}", key);
        let mut conn = self.conn_manager.clone();
        let count: i32 = conn.del(key).await.map_err(|e| {
            error!("Redis DEL error for key {}: {}", key, e);
            FetchError::Store(format!("Redis DEL error for key {}: {}", key, e))
        })?;
        Ok(count > 0)
    }
}
