//! Shared configuration types for the SessionGate workspace
//!
//! This crate provides the configuration structures used across all crates:
//! token signing and lifetimes, the Redis-backed store, and logging.

pub mod config;

// Re-export commonly used items at crate root
pub use config::{AppConfig, CacheConfig, Environment, JwtConfig, LogFormat, LoggingConfig};
