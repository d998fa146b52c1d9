//! Token entities for JWT-based session management.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::TokenError;

/// Wildcard permission granting every permission check
pub const WILDCARD_PERMISSION: &str = "*";

/// Kind of session token, carried in the `type` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived token presented on every request
    Access,
    /// Long-lived token exchanged for new access tokens
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TokenType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "access" => Ok(TokenType::Access),
            "refresh" => Ok(TokenType::Refresh),
            _ => Err(format!("Invalid token type: {}", s)),
        }
    }
}

/// Identity and authorization facts embedded in every token
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub user_id: String,
    pub username: String,
    #[serde(default)]
    pub roles: BTreeSet<String>,
    #[serde(default)]
    pub permissions: BTreeSet<String>,
}

impl SessionIdentity {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            roles: BTreeSet::new(),
            permissions: BTreeSet::new(),
        }
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions.extend(permissions.into_iter().map(Into::into));
        self
    }
}

/// Claims structure for JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Owning user
    pub user_id: String,

    /// Display name of the owning user
    pub username: String,

    /// Roles granted to the user
    #[serde(default)]
    pub roles: BTreeSet<String>,

    /// Permissions granted to the user
    #[serde(default)]
    pub permissions: BTreeSet<String>,

    /// Device the session is bound to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,

    /// Access or refresh
    #[serde(rename = "type")]
    pub token_type: TokenType,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// JWT ID (unique identifier for the token)
    pub jti: String,

    /// Issuer
    pub iss: String,
}

impl Claims {
    /// Creates claims for `identity` valid for `lifetime` starting at `now`,
    /// with a fresh unique identifier
    ///
    /// Fails with `TokenGenerationFailed` when the expiry falls outside the
    /// representable date range.
    pub fn new(
        identity: &SessionIdentity,
        token_type: TokenType,
        device_id: Option<String>,
        issuer: &str,
        now: DateTime<Utc>,
        lifetime: Duration,
    ) -> Result<Self, TokenError> {
        let expiry = now
            .checked_add_signed(lifetime)
            .ok_or(TokenError::TokenGenerationFailed)?;

        Ok(Self {
            user_id: identity.user_id.clone(),
            username: identity.username.clone(),
            roles: identity.roles.clone(),
            permissions: identity.permissions.clone(),
            device_id,
            token_type,
            iat: now.timestamp(),
            exp: expiry.timestamp(),
            jti: Uuid::new_v4().to_string(),
            iss: issuer.to_string(),
        })
    }

    /// A token is expired from its `exp` second onwards
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Time left until expiry, zero once expired
    pub fn remaining_lifetime(&self, now: DateTime<Utc>) -> Duration {
        let remaining = self.exp - now.timestamp();
        if remaining > 0 {
            Duration::seconds(remaining)
        } else {
            Duration::zero()
        }
    }

    /// The identity fields carried by this token
    pub fn identity(&self) -> SessionIdentity {
        SessionIdentity {
            user_id: self.user_id.clone(),
            username: self.username.clone(),
            roles: self.roles.clone(),
            permissions: self.permissions.clone(),
        }
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission) || self.permissions.contains(WILDCARD_PERMISSION)
    }
}

/// Token pair returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// JWT access token
    pub access_token: String,

    /// JWT refresh token
    pub refresh_token: String,

    /// Access token expiry time in seconds
    pub access_expires_in: i64,

    /// Refresh token expiry time in seconds
    pub refresh_expires_in: i64,

    /// Authorization scheme the access token is presented with
    pub token_type: String,
}

impl TokenPair {
    pub fn new(
        access_token: String,
        refresh_token: String,
        access_expires_in: i64,
        refresh_expires_in: i64,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            access_expires_in,
            refresh_expires_in,
            token_type: String::from("Bearer"),
        }
    }
}
