//! No-op implementation of SessionStore for running without a backing store

use std::time::Duration;

use async_trait::async_trait;

use crate::errors::DomainError;
use super::SessionStore;

/// No-op implementation of SessionStore
///
/// Writes are discarded and reads find nothing, so tokens can still be issued
/// and verified but revocation has no effect.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSessionStore;

impl NoOpSessionStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SessionStore for NoOpSessionStore {
    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), DomainError> {
        Ok(())
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, DomainError> {
        Ok(None)
    }

    async fn delete(&self, _key: &str) -> Result<bool, DomainError> {
        Ok(false)
    }

    async fn exists(&self, _key: &str) -> Result<bool, DomainError> {
        Ok(false)
    }

    async fn scan(&self, _prefix: &str) -> Result<Vec<String>, DomainError> {
        Ok(Vec::new())
    }
}
