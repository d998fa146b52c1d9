//! # SessionGate Infrastructure
//!
//! Concrete adapters for the session core:
//! - **Cache**: Redis client and the Redis-backed `SessionStore`
//! - **Telemetry**: tracing subscriber setup driven by `LoggingConfig`

pub mod cache;
pub mod telemetry;

pub use cache::{CacheConfig, RedisClient, RedisSessionStore};

use sg_core::errors::{DomainError, TokenError};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfrastructureError> for TokenError {
    fn from(err: InfrastructureError) -> Self {
        TokenError::store_unavailable(err.to_string())
    }
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        DomainError::Token(err.into())
    }
}
