use anyhow::Context;
use async_trait::async_trait;
use redis::{aio::ConnectionManager, Client};

use crate::config::{EphemeralTokenConfig, RedisConfig};
use crate::services::token_store::{normalize_email, TokenStore};
use crate::services::AuthError;

const DEFAULT_KEY_PREFIX: &str = "ephemeral_token";
const SCAN_BATCH: usize = 100;

/// Redis-backed [`TokenStore`]. Every write is a single `SET .. EX`, so
/// concurrent writers for one email resolve to the last one and entries
/// expire after the configured TTL.
#[derive(Clone)]
pub struct RedisTokenStore {
    _client: Client,
    manager: ConnectionManager,
    key_prefix: String,
    ttl_seconds: u64,
}

impl RedisTokenStore {
    pub async fn new(
        config: &RedisConfig,
        tokens: &EphemeralTokenConfig,
    ) -> Result<Self, anyhow::Error> {
        Self::with_prefix(config, tokens, DEFAULT_KEY_PREFIX).await
    }

    /// Like [`Self::new`] but with a custom key namespace, so separate
    /// deployments or test runs can share one Redis.
    pub async fn with_prefix(
        config: &RedisConfig,
        tokens: &EphemeralTokenConfig,
        key_prefix: &str,
    ) -> Result<Self, anyhow::Error> {
        tracing::info!(url = %config.url, "Connecting to Redis");
        let client = Client::open(config.url.clone()).context("Invalid Redis URL")?;

        // Use ConnectionManager for automatic reconnection
        let manager = client.get_connection_manager().await.map_err(|e| {
            tracing::error!("Failed to get Redis connection manager: {}", e);
            anyhow::Error::new(e).context("Failed to connect to Redis")
        })?;

        tracing::info!(ttl_seconds = tokens.ttl_seconds, "Successfully connected to Redis");

        Ok(Self {
            _client: client,
            manager,
            key_prefix: key_prefix.to_string(),
            ttl_seconds: tokens.ttl_seconds,
        })
    }

    fn key(&self, email: &str) -> String {
        format!("{}:{}", self.key_prefix, normalize_email(email))
    }
}

#[async_trait]
impl TokenStore for RedisTokenStore {
    async fn add_token(&self, email: &str, token: &str) -> Result<(), AuthError> {
        let mut conn = self.manager.clone();
        tracing::debug!(email = %email, "Storing ephemeral token");

        let _: () = redis::cmd("SET")
            .arg(self.key(email))
            .arg(token)
            .arg("EX")
            .arg(self.ttl_seconds)
            .query_async(&mut conn)
            .await
            .context("Failed to store token")
            .map_err(AuthError::Store)?;

        Ok(())
    }

    async fn get_token(&self, email: &str) -> Result<Option<String>, AuthError> {
        let mut conn = self.manager.clone();
        tracing::debug!(email = %email, "Retrieving ephemeral token");

        redis::cmd("GET")
            .arg(self.key(email))
            .query_async(&mut conn)
            .await
            .context("Failed to read token")
            .map_err(AuthError::Store)
    }

    async fn clear(&self) -> Result<(), AuthError> {
        let mut conn = self.manager.clone();
        let pattern = format!("{}:*", self.key_prefix);
        let mut cursor: u64 = 0;
        let mut removed = 0usize;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .context("Failed to scan tokens")
                .map_err(AuthError::Store)?;

            if !keys.is_empty() {
                removed += keys.len();
                let _: () = redis::cmd("DEL")
                    .arg(&keys)
                    .query_async(&mut conn)
                    .await
                    .context("Failed to delete tokens")
                    .map_err(AuthError::Store)?;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        tracing::info!(removed, "Cleared ephemeral tokens");
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AuthError> {
        let mut conn = self.manager.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .context("Redis health check failed")
            .map_err(AuthError::Store)?;
        Ok(())
    }
}
