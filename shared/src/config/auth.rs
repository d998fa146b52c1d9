//! Token signing and lifetime configuration

use serde::{Deserialize, Serialize};

const DEFAULT_SECRET: &str = "your-secret-key-change-in-production";

/// JWT session configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// JWT secret key for signing tokens
    pub secret: String,

    /// Access token expiry time in seconds
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry: i64,

    /// How long a revoked token id stays blacklisted, in seconds
    #[serde(default = "default_blacklist_retention")]
    pub blacklist_retention: i64,

    /// JWT issuer claim
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// Algorithm for JWT signing (HS256, HS384 or HS512)
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from(DEFAULT_SECRET),
            access_token_expiry: default_access_token_expiry(),
            refresh_token_expiry: default_refresh_token_expiry(),
            blacklist_retention: default_blacklist_retention(),
            issuer: default_issuer(),
            algorithm: default_algorithm(),
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            secret: std::env::var("JWT_SECRET").unwrap_or(defaults.secret),
            access_token_expiry: env_i64("JWT_ACCESS_TOKEN_EXPIRY", defaults.access_token_expiry),
            refresh_token_expiry: env_i64("JWT_REFRESH_TOKEN_EXPIRY", defaults.refresh_token_expiry),
            blacklist_retention: env_i64("JWT_BLACKLIST_RETENTION", defaults.blacklist_retention),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            algorithm: std::env::var("JWT_ALGORITHM").unwrap_or(defaults.algorithm),
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    /// Set blacklist retention in days
    pub fn with_blacklist_retention_days(mut self, days: i64) -> Self {
        self.blacklist_retention = days * 86400;
        self
    }

    /// Set the signing algorithm name
    pub fn with_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = algorithm.into();
        self
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEFAULT_SECRET
    }
}

fn env_i64(name: &str, fallback: i64) -> i64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(fallback)
}

fn default_access_token_expiry() -> i64 {
    1800 // 30 minutes
}

fn default_refresh_token_expiry() -> i64 {
    604800 // 7 days
}

fn default_blacklist_retention() -> i64 {
    604800 // 7 days
}

fn default_issuer() -> String {
    String::from("sessiongate")
}

fn default_algorithm() -> String {
    String::from("HS256")
}
