//! Domain-specific error types for token and request authentication
//!
//! Callers map these onto their own transport (HTTP status codes, gRPC
//! statuses); the messages here are for logs and operators.

use thiserror::Error;

use crate::domain::entities::token::TokenType;

/// Request authentication errors raised by the session guard
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authorization header missing")]
    MissingAuthorization,

    #[error("Invalid authorization header format")]
    InvalidAuthorizationHeader,

    #[error("Permission '{permission}' required")]
    InsufficientPermissions { permission: String },
}

/// Token lifecycle errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token type: expected {expected}, got {actual}")]
    TokenTypeMismatch {
        expected: TokenType,
        actual: TokenType,
    },

    #[error("Token has been revoked")]
    TokenRevoked,

    #[error("Could not validate credentials")]
    MalformedToken,

    #[error("Device verification failed")]
    DeviceMismatch,

    #[error("Token store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Token generation failed")]
    TokenGenerationFailed,
}

impl TokenError {
    /// Shorthand for store failures
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        TokenError::StoreUnavailable {
            message: message.into(),
        }
    }

    /// Whether this error means the caller presented an unusable token,
    /// as opposed to a server-side failure
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            TokenError::StoreUnavailable { .. } | TokenError::TokenGenerationFailed
        )
    }
}
