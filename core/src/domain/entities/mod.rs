//! Domain entities representing core session objects.

pub mod token;

// Re-export commonly used types
pub use token::{Claims, SessionIdentity, TokenPair, TokenType, WILDCARD_PERMISSION};
