//! Authorization header handling

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::entities::token::TokenType;
use crate::errors::{AuthError, DomainError, TokenError};
use crate::repositories::{NoOpSessionStore, SessionStore};
use crate::services::token::TokenSessionManager;

use super::context::IdentityContext;

/// Header carrying the caller's device identifier
pub const DEVICE_HEADER: &str = "X-Device-ID";

/// Authenticates requests with access tokens
pub struct SessionGuard<S: SessionStore = NoOpSessionStore> {
    manager: Arc<TokenSessionManager<S>>,
}

impl<S: SessionStore> Clone for SessionGuard<S> {
    fn clone(&self) -> Self {
        Self {
            manager: Arc::clone(&self.manager),
        }
    }
}

impl<S: SessionStore> SessionGuard<S> {
    pub fn new(manager: Arc<TokenSessionManager<S>>) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &TokenSessionManager<S> {
        &self.manager
    }

    /// Authenticates a request from its raw headers
    ///
    /// # Arguments
    ///
    /// * `authorization` - Value of the `Authorization` header, if sent
    /// * `device_id` - Value of the device header, if sent
    ///
    /// # Returns
    ///
    /// * `Ok(IdentityContext)` - A usable access token was presented
    /// * `Err(AuthError::MissingAuthorization)` - No header
    /// * `Err(AuthError::InvalidAuthorizationHeader)` - Not `Bearer <token>`
    /// * `Err(TokenError::DeviceMismatch)` - Token bound to another device
    /// * `Err(TokenError)` - Any verification failure
    pub async fn authenticate(
        &self,
        authorization: Option<&str>,
        device_id: Option<&str>,
    ) -> Result<IdentityContext, DomainError> {
        let header = authorization.ok_or(AuthError::MissingAuthorization)?;
        let token = extract_bearer_token(header).ok_or(AuthError::InvalidAuthorizationHeader)?;

        let claims = self.manager.verify(token, TokenType::Access).await?;

        if let Some(device_id) = device_id {
            if claims.device_id.as_deref() != Some(device_id) {
                warn!(user_id = %claims.user_id, "Device ID mismatch on request");
                return Err(TokenError::DeviceMismatch.into());
            }
        }

        debug!(user_id = %claims.user_id, jti = %claims.jti, "Request authenticated");
        Ok(IdentityContext::from_claims(claims))
    }

    /// Authenticates and checks one permission in a single step
    pub async fn authorize(
        &self,
        authorization: Option<&str>,
        device_id: Option<&str>,
        permission: &str,
    ) -> Result<IdentityContext, DomainError> {
        let context = self.authenticate(authorization, device_id).await?;
        context.require_permission(permission)?;
        Ok(context)
    }
}

/// Extracts the token from a `Bearer <token>` header value.
///
/// The scheme is matched case-insensitively.
pub fn extract_bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() || token.contains(' ') {
        return None;
    }
    Some(token)
}
