//! Authenticated identity attached to a request

use std::collections::BTreeSet;

use crate::domain::entities::token::{Claims, WILDCARD_PERMISSION};
use crate::errors::AuthError;

/// Identity extracted from a verified access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityContext {
    pub user_id: String,
    pub username: String,
    pub roles: BTreeSet<String>,
    pub permissions: BTreeSet<String>,
    pub device_id: Option<String>,
    /// Token id, for logout of the current session
    pub jti: String,
}

impl IdentityContext {
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
            roles: claims.roles,
            permissions: claims.permissions,
            device_id: claims.device_id,
            jti: claims.jti,
        }
    }

    /// Whether the identity holds `permission` directly or through `*`
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission) || self.permissions.contains(WILDCARD_PERMISSION)
    }

    /// Fails with `InsufficientPermissions` unless `permission` is held
    pub fn require_permission(&self, permission: &str) -> Result<(), AuthError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(AuthError::InsufficientPermissions {
                permission: permission.to_string(),
            })
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

impl From<Claims> for IdentityContext {
    fn from(claims: Claims) -> Self {
        Self::from_claims(claims)
    }
}
