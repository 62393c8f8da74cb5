//! Redis connection handling.
//!
//! The session store keeps its token records here; keys carry a TTL so
//! expiry happens server-side without a sweeper.

use redis::{AsyncCommands, Client};
use tracing::info;

use crate::error::InfraResult;

/// Redis connection settings.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL, e.g. "redis://localhost:6379".
    pub url: String,
}

impl RedisConfig {
    /// Read the configuration from the environment.
    ///
    /// # Environment Variables
    /// - `REDIS_URL`: connection URL (default: "redis://localhost:6379")
    pub fn from_env() -> InfraResult<Self> {
        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

        Ok(RedisConfig { url })
    }
}

/// Clonable handle to the Redis server.
///
/// The underlying client hands out multiplexed connections, so handles
/// can be cloned into shared application state freely.
#[derive(Clone)]
pub struct RedisPool {
    client: Client,
}

impl RedisPool {
    /// Connect to the configured Redis server.
    pub async fn new(config: &RedisConfig) -> InfraResult<Self> {
        let client = Client::open(config.url.clone())?;
        info!("Redis client initialized with URL: {}", config.url);
        Ok(RedisPool { client })
    }

    async fn get_connection(&self) -> InfraResult<redis::aio::MultiplexedConnection> {
        let conn = self.client.get_multiplexed_async_connection().await?;
        Ok(conn)
    }

    /// Store a value under `key`, optionally expiring after `ttl_seconds`.
    pub async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> InfraResult<()> {
        let mut conn = self.get_connection().await?;

        if let Some(ttl) = ttl_seconds {
            let _: () = conn.set_ex(key, value, ttl).await?;
        } else {
            let _: () = conn.set(key, value).await?;
        }

        Ok(())
    }

    /// Fetch the value stored under `key`, if any.
    pub async fn get(&self, key: &str) -> InfraResult<Option<String>> {
        let mut conn = self.get_connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    /// Remove `key`.
    pub async fn delete(&self, key: &str) -> InfraResult<()> {
        let mut conn = self.get_connection().await?;
        let _: u64 = conn.del(key).await?;
        Ok(())
    }

    /// PING the server.
    pub async fn health_check(&self) -> InfraResult<bool> {
        let mut conn = self.get_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong == "PONG")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Requires a Redis server at localhost:6379.
    #[tokio::test]
    async fn set_get_delete_round_trip() -> InfraResult<()> {
        let config = RedisConfig {
            url: "redis://localhost:6379".to_string(),
        };
        let pool = RedisPool::new(&config).await?;

        pool.set("common_cache_test", "value", Some(5)).await?;
        assert_eq!(
            pool.get("common_cache_test").await?,
            Some("value".to_string())
        );

        pool.delete("common_cache_test").await?;
        assert_eq!(pool.get("common_cache_test").await?, None);

        Ok(())
    }
}
