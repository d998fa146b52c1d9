//! Session store trait defining the key-value contract behind the token
//! registry and blacklist.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::DomainError;

/// Key-value store with per-key expiry
///
/// Any store supporting set-with-expiry, get, delete, exists and prefix
/// scans satisfies this contract. Implementations report connectivity or
/// protocol failures as `TokenError::StoreUnavailable`; callers in the
/// session manager treat those as soft failures.
///
/// Individual operations must be atomic per key. No cross-key transactions
/// are required.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store `value` under `key`, replacing any previous value and expiry
    ///
    /// # Arguments
    /// * `key` - The full key, including any namespace
    /// * `value` - The value to store
    /// * `ttl` - Time until the key disappears on its own
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError>;

    /// Fetch the value stored under `key`
    ///
    /// # Returns
    /// * `Ok(Some(value))` - Key present and not expired
    /// * `Ok(None)` - Key absent or expired
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Remove `key`
    ///
    /// # Returns
    /// * `Ok(true)` - The key existed and was removed
    /// * `Ok(false)` - There was nothing to remove
    async fn delete(&self, key: &str) -> Result<bool, DomainError>;

    /// Whether `key` is present and not expired
    async fn exists(&self, key: &str) -> Result<bool, DomainError>;

    /// List every live key starting with `prefix`
    ///
    /// Implementations may walk the keyspace incrementally; the result is a
    /// best-effort snapshot and can miss keys written during the scan.
    async fn scan(&self, prefix: &str) -> Result<Vec<String>, DomainError>;
}

#[async_trait]
impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        (**self).set(key, value, ttl).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        (**self).get(key).await
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        (**self).delete(key).await
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        (**self).exists(key).await
    }

    async fn scan(&self, prefix: &str) -> Result<Vec<String>, DomainError> {
        (**self).scan(prefix).await
    }
}
