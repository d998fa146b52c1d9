//! Token service module for JWT session management
//!
//! This module handles all token-related operations including:
//! - Access and refresh token issuance
//! - Verification against signature, expiry, type and blacklist
//! - Refresh-token exchange for new access tokens
//! - Single-token and per-user revocation via the session store

mod config;
mod registry;
mod service;

#[cfg(test)]
mod tests;

pub use config::{parse_algorithm, TokenServiceConfig};
pub use registry::{TokenRegistry, ACTIVE_PREFIX, BLACKLIST_PREFIX, REFRESH_PREFIX};
pub use service::TokenSessionManager;
