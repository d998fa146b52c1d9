//! Configuration for the token session manager

use chrono::Duration;
use jsonwebtoken::Algorithm;
use sg_shared::config::JwtConfig;
use tracing::warn;

use crate::errors::DomainError;

/// Configuration for the token session manager
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// JWT signing secret
    pub jwt_secret: String,
    /// JWT signing algorithm (HMAC family only)
    pub algorithm: Algorithm,
    /// Issuer written into and required from every token
    pub issuer: String,
    /// Default access token lifetime
    pub access_token_ttl: Duration,
    /// Refresh token lifetime
    pub refresh_token_ttl: Duration,
    /// Minimum time a revoked token id stays blacklisted
    pub blacklist_retention: Duration,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            jwt_secret: JwtConfig::default().secret,
            algorithm: Algorithm::HS256,
            issuer: "sessiongate".to_string(),
            access_token_ttl: Duration::minutes(30),
            refresh_token_ttl: Duration::days(7),
            blacklist_retention: Duration::days(7),
        }
    }
}

impl TokenServiceConfig {
    /// Build from the shared JWT configuration
    pub fn from_jwt_config(jwt: &JwtConfig) -> Result<Self, DomainError> {
        if jwt.is_using_default_secret() {
            warn!("JWT secret is the built-in default; set JWT_SECRET before deploying");
        }

        let config = Self {
            jwt_secret: jwt.secret.clone(),
            algorithm: parse_algorithm(&jwt.algorithm)?,
            issuer: jwt.issuer.clone(),
            access_token_ttl: lifetime("access_token_expiry", jwt.access_token_expiry)?,
            refresh_token_ttl: lifetime("refresh_token_expiry", jwt.refresh_token_expiry)?,
            blacklist_retention: lifetime("blacklist_retention", jwt.blacklist_retention)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check invariants the manager relies on
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.jwt_secret.is_empty() {
            return Err(DomainError::Configuration {
                message: "JWT secret must not be empty".to_string(),
            });
        }
        if !matches!(
            self.algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(DomainError::Configuration {
                message: format!("Unsupported signing algorithm: {:?}", self.algorithm),
            });
        }
        if self.access_token_ttl <= Duration::zero() || self.refresh_token_ttl <= Duration::zero() {
            return Err(DomainError::Configuration {
                message: "Token lifetimes must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// TTL for blacklist entries.
    ///
    /// Never shorter than the longest token lifetime, so a revoked token
    /// cannot become valid again while it is still unexpired.
    pub fn blacklist_ttl(&self) -> Duration {
        self.blacklist_retention
            .max(self.refresh_token_ttl)
            .max(self.access_token_ttl)
    }
}

fn lifetime(name: &str, seconds: i64) -> Result<Duration, DomainError> {
    Duration::try_seconds(seconds).ok_or_else(|| DomainError::Configuration {
        message: format!("{} of {}s is out of range", name, seconds),
    })
}

/// Parse an HMAC algorithm name
pub fn parse_algorithm(name: &str) -> Result<Algorithm, DomainError> {
    match name.to_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(DomainError::Configuration {
            message: format!("Unsupported signing algorithm: {}", other),
        }),
    }
}
