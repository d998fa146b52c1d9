//! Configuration module with concern-specific sub-modules
//!
//! - `auth` - token signing, lifetimes and blacklist retention
//! - `cache` - Redis connection backing the token registry
//! - `environment` - environment detection and logging configuration

pub mod auth;
pub mod cache;
pub mod environment;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use auth::JwtConfig;
pub use cache::CacheConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Token configuration
    #[serde(default)]
    pub jwt: JwtConfig,

    /// Backing store configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            jwt: JwtConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            environment,
            jwt: JwtConfig::from_env(),
            cache: CacheConfig::from_env(),
            logging: LoggingConfig::for_environment(environment).with_env_override(),
        }
    }

    /// Load configuration from an optional TOML file layered under
    /// `SESSIONGATE__`-prefixed environment variables
    /// (e.g. `SESSIONGATE__JWT__SECRET`).
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = match path {
            Some(path) => builder.add_source(config::File::from(path).required(true)),
            None => {
                let default_file = Environment::from_env().config_file().to_string();
                builder.add_source(config::File::with_name(&default_file).required(false))
            }
        };

        let settings = builder
            .add_source(
                config::Environment::with_prefix("SESSIONGATE")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let mut loaded: AppConfig = settings.try_deserialize()?;
        loaded.logging = loaded.logging.with_env_override();
        Ok(loaded)
    }
}
