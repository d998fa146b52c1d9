//! Domain-specific error types and error handling.

mod types;


pub use types::{AuthError, TokenError};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl DomainError {
    /// Returns the token error, if this is one
    pub fn as_token_error(&self) -> Option<&TokenError> {
        match self {
            DomainError::Token(e) => Some(e),
            _ => None,
        }
    }

    /// Whether this is a store unavailability failure
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, DomainError::Token(TokenError::StoreUnavailable { .. }))
    }
}
