//! In-memory implementation of SessionStore for testing

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::{DomainError, TokenError};

use super::r#trait::SessionStore;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    ttl: Duration,
    expires_at: Instant,
}

/// Mock session store honouring expiry, with a switch to simulate outages
#[derive(Clone, Default)]
pub struct MockSessionStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    unavailable: Arc<AtomicBool>,
}

impl MockSessionStore {
    /// Create a new, reachable mock store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock store whose every call fails
    pub fn unavailable() -> Self {
        let store = Self::new();
        store.set_available(false);
        store
    }

    /// Toggle simulated connectivity
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// The TTL a live key was last written with
    pub async fn ttl_of(&self, key: &str) -> Option<Duration> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|e| e.expires_at > Instant::now())
            .map(|e| e.ttl)
    }

    /// Number of live keys
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries.values().filter(|e| e.expires_at > now).count()
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(DomainError::Token(TokenError::store_unavailable(
                "mock store offline",
            )))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SessionStore for MockSessionStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        self.check_available()?;
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                ttl,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        self.check_available()?;
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|e| e.expires_at > Instant::now())
            .map(|e| e.value.clone()))
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        self.check_available()?;
        let mut entries = self.entries.write().await;
        Ok(entries
            .remove(key)
            .map(|e| e.expires_at > Instant::now())
            .unwrap_or(false))
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.get(key).await?.is_some())
    }

    async fn scan(&self, prefix: &str) -> Result<Vec<String>, DomainError> {
        self.check_available()?;
        let now = Instant::now();
        let entries = self.entries.read().await;
        let mut keys: Vec<String> = entries
            .iter()
            .filter(|(k, e)| k.starts_with(prefix) && e.expires_at > now)
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();
        Ok(keys)
    }
}
