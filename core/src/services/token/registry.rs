//! Active-token registry and blacklist on top of a session store
//!
//! Key layout:
//! - `jwt:active:{jti}` - issued access tokens, expiring with the token
//! - `jwt:refresh:{jti}` - issued refresh tokens, expiring with the token
//! - `jwt:blacklist:{jti}` - revoked token ids
//!
//! Every operation here is fail-open: a missing or unreachable store is
//! logged and treated as "nothing recorded", so issuance and verification
//! keep working without revocation guarantees.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, warn};

use crate::domain::entities::token::TokenType;
use crate::errors::DomainError;
use crate::repositories::SessionStore;

pub const ACTIVE_PREFIX: &str = "jwt:active:";
pub const REFRESH_PREFIX: &str = "jwt:refresh:";
pub const BLACKLIST_PREFIX: &str = "jwt:blacklist:";

const REVOKED_MARKER: &str = "revoked";

/// Fail-open view of the token registry and blacklist
pub struct TokenRegistry<S: SessionStore> {
    store: Option<Arc<S>>,
}

impl<S: SessionStore> TokenRegistry<S> {
    pub fn new(store: Option<Arc<S>>) -> Self {
        Self { store }
    }

    /// Whether a backing store was configured
    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    pub fn registry_prefix(token_type: TokenType) -> &'static str {
        match token_type {
            TokenType::Access => ACTIVE_PREFIX,
            TokenType::Refresh => REFRESH_PREFIX,
        }
    }

    pub fn registry_key(token_type: TokenType, jti: &str) -> String {
        format!("{}{}", Self::registry_prefix(token_type), jti)
    }

    pub fn blacklist_key(jti: &str) -> String {
        format!("{}{}", BLACKLIST_PREFIX, jti)
    }

    /// Record an issued token for `ttl`. Non-positive TTLs are skipped.
    pub async fn register(&self, token_type: TokenType, jti: &str, token: &str, ttl: Duration) {
        let Some(store) = &self.store else {
            debug!(jti = %jti, "No session store configured, token not registered");
            return;
        };
        let Some(ttl) = positive_std(ttl) else {
            debug!(jti = %jti, "Token already expired, not registered");
            return;
        };

        let key = Self::registry_key(token_type, jti);
        if let Err(e) = store.set(&key, token, ttl).await {
            log_degraded("register token", jti, &e);
        }
    }

    /// Drop the registry entries for `jti`
    pub async fn unregister(&self, jti: &str) {
        let Some(store) = &self.store else {
            return;
        };

        for token_type in [TokenType::Access, TokenType::Refresh] {
            let key = Self::registry_key(token_type, jti);
            if let Err(e) = store.delete(&key).await {
                log_degraded("unregister token", jti, &e);
            }
        }
    }

    /// Blacklist `jti` for `ttl`.
    ///
    /// Returns whether the entry was written.
    pub async fn blacklist(&self, jti: &str, ttl: Duration) -> bool {
        let Some(store) = &self.store else {
            warn!(jti = %jti, "Session store not available, cannot revoke token");
            return false;
        };
        let Some(ttl) = positive_std(ttl) else {
            warn!(jti = %jti, "Refusing to blacklist with a non-positive TTL");
            return false;
        };

        match store.set(&Self::blacklist_key(jti), REVOKED_MARKER, ttl).await {
            Ok(()) => true,
            Err(e) => {
                log_degraded("blacklist token", jti, &e);
                false
            }
        }
    }

    /// Whether `jti` is blacklisted. Unknown when the store is down, which
    /// is reported as not blacklisted.
    pub async fn is_blacklisted(&self, jti: &str) -> bool {
        let Some(store) = &self.store else {
            return false;
        };

        match store.exists(&Self::blacklist_key(jti)).await {
            Ok(found) => found,
            Err(e) => {
                log_degraded("check blacklist", jti, &e);
                false
            }
        }
    }

    /// Serialized tokens currently registered for `token_type`.
    ///
    /// Entries that vanish between the scan and the read are skipped.
    pub async fn registered_tokens(&self, token_type: TokenType) -> Vec<String> {
        let Some(store) = &self.store else {
            warn!("Session store not available, registry is empty");
            return Vec::new();
        };

        let prefix = Self::registry_prefix(token_type);
        let keys = match store.scan(prefix).await {
            Ok(keys) => keys,
            Err(e) => {
                log_degraded("scan registry", prefix, &e);
                return Vec::new();
            }
        };

        let mut tokens = Vec::with_capacity(keys.len());
        for key in keys {
            match store.get(&key).await {
                Ok(Some(token)) => tokens.push(token),
                Ok(None) => {}
                Err(e) => log_degraded("read registry entry", &key, &e),
            }
        }
        tokens
    }
}

fn positive_std(ttl: Duration) -> Option<std::time::Duration> {
    if ttl <= Duration::zero() {
        return None;
    }
    ttl.to_std().ok()
}

fn log_degraded(operation: &str, subject: &str, error: &DomainError) {
    warn!(
        operation = operation,
        subject = %subject,
        error = %error,
        "Session store call failed, continuing without it"
    );
}
