//! # SessionGate Core
//!
//! Token lifecycle for stateless session authentication: signed access and
//! refresh tokens, a revocation blacklist, and an active-token registry kept
//! in a pluggable key-value store with per-key expiry.
//!
//! When the store is missing or unreachable the manager keeps issuing and
//! verifying tokens and only loses revocation.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::{IdentityContext, SessionGuard, TokenServiceConfig, TokenSessionManager};
