//! Redis-backed session store

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use sg_core::errors::DomainError;
use sg_core::repositories::SessionStore;
use sg_shared::config::CacheConfig;

use super::redis_client::RedisClient;
use crate::InfrastructureError;

/// Session store keeping registry and blacklist entries in Redis
///
/// Keys are namespaced with the configured prefix on the way in and
/// stripped on the way out, so callers only ever see their own keys.
#[derive(Clone)]
pub struct RedisSessionStore {
    client: RedisClient,
}

impl RedisSessionStore {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Connects to Redis and wraps the client
    pub async fn connect(config: CacheConfig) -> Result<Self, InfrastructureError> {
        let client = RedisClient::new(config).await?;
        Ok(Self::new(client))
    }

    pub fn client(&self) -> &RedisClient {
        &self.client
    }

    fn key(&self, key: &str) -> String {
        self.client.config().make_key(key)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        self.client
            .set_with_expiry(&self.key(key), value, ttl)
            .await
            .map_err(DomainError::from)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        self.client
            .get(&self.key(key))
            .await
            .map_err(DomainError::from)
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        self.client
            .delete(&self.key(key))
            .await
            .map_err(DomainError::from)
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        self.client
            .exists(&self.key(key))
            .await
            .map_err(DomainError::from)
    }

    async fn scan(&self, prefix: &str) -> Result<Vec<String>, DomainError> {
        let config = self.client.config();
        let keys = self.client.scan_prefix(&self.key(prefix)).await?;
        debug!(prefix = %prefix, found = keys.len(), "Scanned session keys");

        Ok(keys
            .iter()
            .map(|key| config.strip_key(key).to_string())
            .collect())
    }
}
