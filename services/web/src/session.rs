//! Session identity binder.
//!
//! Binds an opaque client-held token to a user id in Redis. Expiry is
//! delegated to the store's TTL; an expired or unknown token simply
//! resolves to no identity. The middleware re-resolves the user row on
//! every request, so a token that outlives its user also yields no
//! identity rather than an error.

use anyhow::Result;
use common::cache::RedisPool;
use tracing::info;
use uuid::Uuid;

/// Default session lifetime: 24 hours.
const DEFAULT_TTL_SECONDS: u64 = 86_400;

/// Session lifetime settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Fixed time-to-live for each session, in seconds.
    pub ttl_seconds: u64,
}

impl SessionConfig {
    /// Read the configuration from the environment.
    ///
    /// # Environment Variables
    /// - `SESSION_TTL_SECONDS`: session lifetime (default: 86400)
    pub fn from_env() -> Result<Self> {
        let ttl_seconds = std::env::var("SESSION_TTL_SECONDS")
            .unwrap_or_else(|_| DEFAULT_TTL_SECONDS.to_string())
            .parse()
            .unwrap_or(DEFAULT_TTL_SECONDS);

        Ok(SessionConfig { ttl_seconds })
    }
}

/// Server-side session store keyed by opaque token.
#[derive(Clone)]
pub struct SessionStore {
    redis_pool: RedisPool,
    config: SessionConfig,
}

impl SessionStore {
    pub fn new(redis_pool: RedisPool, config: SessionConfig) -> Self {
        SessionStore { redis_pool, config }
    }

    fn key(token: &str) -> String {
        format!("session:{}", token)
    }

    /// Bind a fresh opaque token to `user_id`.
    pub async fn create(&self, user_id: Uuid) -> Result<String> {
        let token = Uuid::new_v4().to_string();

        self.redis_pool
            .set(
                &Self::key(&token),
                &user_id.to_string(),
                Some(self.config.ttl_seconds),
            )
            .await?;

        info!(%user_id, "Session created");
        Ok(token)
    }

    /// Resolve a token back to the bound user id.
    ///
    /// Unknown, expired, and malformed records all resolve to `None`.
    pub async fn user_id(&self, token: &str) -> Result<Option<Uuid>> {
        let value = self.redis_pool.get(&Self::key(token)).await?;

        Ok(value.and_then(|v| Uuid::parse_str(&v).ok()))
    }

    /// Remove a session, if it exists.
    pub async fn destroy(&self, token: &str) -> Result<()> {
        self.redis_pool.delete(&Self::key(token)).await?;
        info!("Session destroyed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::cache::RedisConfig;

    async fn store() -> Result<SessionStore> {
        let pool = RedisPool::new(&RedisConfig {
            url: "redis://localhost:6379".to_string(),
        })
        .await?;

        Ok(SessionStore::new(pool, SessionConfig { ttl_seconds: 60 }))
    }

    // Requires a Redis server at localhost:6379.
    #[tokio::test]
    async fn token_round_trips_to_the_same_user() -> Result<()> {
        let store = store().await?;
        let user_id = Uuid::new_v4();

        let token = store.create(user_id).await?;
        assert_eq!(store.user_id(&token).await?, Some(user_id));

        store.destroy(&token).await?;
        assert_eq!(store.user_id(&token).await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn unknown_token_resolves_to_none() -> Result<()> {
        let store = store().await?;
        assert_eq!(store.user_id("no-such-token").await?, None);
        Ok(())
    }
}
