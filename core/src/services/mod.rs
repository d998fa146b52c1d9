//! Session services: token lifecycle and request authentication.

pub mod guard;
pub mod token;

pub use guard::{IdentityContext, SessionGuard};
pub use token::{TokenServiceConfig, TokenSessionManager};
