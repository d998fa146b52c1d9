//! Main token session manager implementation

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, info, warn};

use crate::domain::entities::token::{Claims, SessionIdentity, TokenPair, TokenType};
use crate::errors::{DomainError, TokenError};
use crate::repositories::{NoOpSessionStore, SessionStore};

use super::config::TokenServiceConfig;
use super::registry::TokenRegistry;

/// Issues, verifies, refreshes and revokes signed session tokens
pub struct TokenSessionManager<S: SessionStore = NoOpSessionStore> {
    registry: TokenRegistry<S>,
    config: TokenServiceConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenSessionManager<NoOpSessionStore> {
    /// Creates a manager with no backing store.
    ///
    /// Tokens can be issued and verified, but revocation and registry
    /// lookups are unavailable.
    pub fn without_store(config: TokenServiceConfig) -> Result<Self, DomainError> {
        Self::with_optional_store(config, None)
    }
}

impl<S: SessionStore> TokenSessionManager<S> {
    /// Creates a new token session manager
    ///
    /// # Arguments
    ///
    /// * `config` - Signing and lifetime configuration
    /// * `store` - Store backing the registry and blacklist, owned by the caller
    ///
    /// # Returns
    ///
    /// A new `TokenSessionManager` or a configuration error
    pub fn new(config: TokenServiceConfig, store: Arc<S>) -> Result<Self, DomainError> {
        Self::with_optional_store(config, Some(store))
    }

    /// Creates a manager that may or may not have a backing store
    pub fn with_optional_store(
        config: TokenServiceConfig,
        store: Option<Arc<S>>,
    ) -> Result<Self, DomainError> {
        config.validate()?;

        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        // Expiry is checked by hand so that a token is dead from its `exp`
        // second onwards, with no leeway.
        let mut validation = Validation::new(config.algorithm);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss"]);

        if store.is_none() {
            warn!("Token session manager running without a session store; revocation disabled");
        }

        Ok(Self {
            registry: TokenRegistry::new(store),
            config,
            encoding_key,
            decoding_key,
            validation,
        })
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    /// Whether revocation is backed by a store
    pub fn has_store(&self) -> bool {
        self.registry.has_store()
    }

    /// Issues an access token
    ///
    /// # Arguments
    ///
    /// * `identity` - Identity fields to embed
    /// * `device_id` - Device to bind the token to
    /// * `ttl_override` - Lifetime to use instead of the configured default
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The signed token
    /// * `Err(DomainError)` - Signing failed
    pub async fn issue_access_token(
        &self,
        identity: &SessionIdentity,
        device_id: Option<&str>,
        ttl_override: Option<Duration>,
    ) -> Result<String, DomainError> {
        let lifetime = ttl_override.unwrap_or(self.config.access_token_ttl);
        self.issue(identity, TokenType::Access, device_id, lifetime).await
    }

    /// Issues a refresh token with the configured refresh lifetime
    pub async fn issue_refresh_token(
        &self,
        identity: &SessionIdentity,
        device_id: Option<&str>,
    ) -> Result<String, DomainError> {
        self.issue(identity, TokenType::Refresh, device_id, self.config.refresh_token_ttl)
            .await
    }

    /// Issues an access and a refresh token for the same identity and device
    pub async fn issue_token_pair(
        &self,
        identity: &SessionIdentity,
        device_id: Option<&str>,
    ) -> Result<TokenPair, DomainError> {
        let access_token = self.issue_access_token(identity, device_id, None).await?;
        let refresh_token = self.issue_refresh_token(identity, device_id).await?;

        Ok(TokenPair::new(
            access_token,
            refresh_token,
            self.config.access_token_ttl.num_seconds(),
            self.config.refresh_token_ttl.num_seconds(),
        ))
    }

    async fn issue(
        &self,
        identity: &SessionIdentity,
        token_type: TokenType,
        device_id: Option<&str>,
        lifetime: Duration,
    ) -> Result<String, DomainError> {
        let now = Utc::now();
        let claims = Claims::new(
            identity,
            token_type,
            device_id.map(str::to_string),
            &self.config.issuer,
            now,
            lifetime,
        )?;
        let token = self.encode_jwt(&claims)?;

        self.registry
            .register(token_type, &claims.jti, &token, claims.remaining_lifetime(now))
            .await;

        info!(
            user_id = %claims.user_id,
            token_type = %token_type,
            jti = %claims.jti,
            "Created {} token", token_type
        );
        Ok(token)
    }

    /// Encodes claims into a JWT
    pub(crate) fn encode_jwt(&self, claims: &Claims) -> Result<String, DomainError> {
        let header = Header::new(self.config.algorithm);
        encode(&header, claims, &self.encoding_key)
            .map_err(|_| DomainError::Token(TokenError::TokenGenerationFailed))
    }

    /// Checks signature and structure only; expiry, type and revocation
    /// are left to the caller
    pub(crate) fn decode_claims(&self, token: &str) -> Result<Claims, DomainError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Rejected undecodable token");
                DomainError::Token(TokenError::MalformedToken)
            })
    }

    /// Verifies a token and returns its claims
    ///
    /// # Arguments
    ///
    /// * `token` - The compact JWT
    /// * `expected_type` - The token type the calling operation accepts
    ///
    /// # Returns
    ///
    /// * `Ok(Claims)` - The token is usable
    /// * `Err(TokenError::MalformedToken)` - Bad signature or structure
    /// * `Err(TokenError::TokenExpired)` - `exp` has been reached
    /// * `Err(TokenError::TokenTypeMismatch)` - Wrong token type
    /// * `Err(TokenError::TokenRevoked)` - The token id is blacklisted
    pub async fn verify(&self, token: &str, expected_type: TokenType) -> Result<Claims, DomainError> {
        let claims = self.decode_claims(token)?;

        if claims.is_expired_at(Utc::now()) {
            debug!(jti = %claims.jti, "Token has expired");
            return Err(DomainError::Token(TokenError::TokenExpired));
        }

        if claims.token_type != expected_type {
            return Err(DomainError::Token(TokenError::TokenTypeMismatch {
                expected: expected_type,
                actual: claims.token_type,
            }));
        }

        if self.registry.is_blacklisted(&claims.jti).await {
            debug!(jti = %claims.jti, "Token has been revoked");
            return Err(DomainError::Token(TokenError::TokenRevoked));
        }

        Ok(claims)
    }

    /// Exchanges a refresh token for a new access token
    ///
    /// # Arguments
    ///
    /// * `refresh_token` - The refresh token
    /// * `device_id` - Device presenting the token; must match the bound device when given
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - New access token with the same identity and device
    /// * `Err(DomainError)` - Verification or device check failed
    pub async fn refresh(
        &self,
        refresh_token: &str,
        device_id: Option<&str>,
    ) -> Result<String, DomainError> {
        let claims = self.verify(refresh_token, TokenType::Refresh).await?;

        if let Some(device_id) = device_id {
            if claims.device_id.as_deref() != Some(device_id) {
                warn!(user_id = %claims.user_id, "Device ID mismatch on refresh");
                return Err(DomainError::Token(TokenError::DeviceMismatch));
            }
        }

        let access_token = self
            .issue_access_token(&claims.identity(), claims.device_id.as_deref(), None)
            .await?;

        info!(user_id = %claims.user_id, "Refreshed access token");
        Ok(access_token)
    }

    /// Revokes a token by its unique id
    ///
    /// Blacklists the id and drops its registry entries. Revoking twice only
    /// resets the blacklist TTL.
    ///
    /// # Returns
    ///
    /// `true` if the blacklist entry was recorded, `false` if the store was
    /// unavailable (logged, never raised)
    pub async fn revoke(&self, jti: &str) -> bool {
        let recorded = self.registry.blacklist(jti, self.config.blacklist_ttl()).await;
        self.registry.unregister(jti).await;

        if recorded {
            info!(jti = %jti, "Revoked token");
        }
        recorded
    }

    /// Revokes the token itself rather than an id (logout)
    pub async fn revoke_token(&self, token: &str) -> Result<bool, DomainError> {
        let claims = self.decode_claims(token)?;
        Ok(self.revoke(&claims.jti).await)
    }

    /// Revokes every registered access and refresh token of a user
    ///
    /// Decodes every registry entry, so the cost grows with the number of
    /// live tokens. Tokens issued while the sweep runs may be missed.
    ///
    /// # Returns
    ///
    /// The number of tokens revoked
    pub async fn revoke_all_for_user(&self, user_id: &str) -> usize {
        let mut revoked = 0;

        for token_type in [TokenType::Access, TokenType::Refresh] {
            for jti in self.registered_ids_for_user(token_type, user_id).await {
                self.revoke(&jti).await;
                revoked += 1;
            }
        }

        info!(user_id = %user_id, revoked, "Revoked all tokens for user");
        revoked
    }

    /// Counts the registered access tokens of a user
    pub async fn count_active(&self, user_id: &str) -> usize {
        self.registered_ids_for_user(TokenType::Access, user_id)
            .await
            .len()
    }

    async fn registered_ids_for_user(&self, token_type: TokenType, user_id: &str) -> Vec<String> {
        let now = Utc::now();
        self.registry
            .registered_tokens(token_type)
            .await
            .iter()
            .filter_map(|token| match self.decode_claims(token) {
                Ok(claims) => Some(claims),
                Err(_) => {
                    debug!("Skipping undecodable registry entry");
                    None
                }
            })
            .filter(|claims| claims.user_id == user_id && !claims.is_expired_at(now))
            .map(|claims| claims.jti)
            .collect()
    }
}
