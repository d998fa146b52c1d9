//! Deployment stage and the log output it implies
//!
//! The stage picks which `sessiongate.<stage>.toml` file `AppConfig::load`
//! looks for and how `sessionctl` formats its logs.

use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Stage SessionGate is deployed in, read from `SESSIONGATE_ENV`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    /// `SESSIONGATE_ENV`, then `ENVIRONMENT`. Unknown or missing values
    /// mean development.
    pub fn from_env() -> Self {
        ["SESSIONGATE_ENV", "ENVIRONMENT"]
            .iter()
            .find_map(|name| env::var(name).ok())
            .and_then(|stage| stage.parse().ok())
            .unwrap_or_default()
    }

    /// Optional per-stage settings file, relative to the working directory
    pub fn config_file(&self) -> String {
        format!("sessiongate.{}.toml", self.as_str())
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" | "test" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("Unknown deployment stage: {}", other)),
        }
    }
}

/// How token lifecycle events are written to stderr
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `sg_core=debug,info`
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: LogFormat,

    /// ANSI colours for the pretty and compact formats
    #[serde(default = "default_colored")]
    pub colored: bool,

    /// Emit file and line of each event
    #[serde(default)]
    pub source_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: default_log_format(),
            colored: default_colored(),
            source_location: false,
        }
    }
}

impl LoggingConfig {
    /// Readable debug output while developing, JSON at `info` or `warn`
    /// once deployed
    pub fn for_environment(env: Environment) -> Self {
        let (level, format) = match env {
            Environment::Development => ("debug", LogFormat::Pretty),
            Environment::Staging => ("info", LogFormat::Json),
            Environment::Production => ("warn", LogFormat::Json),
        };
        let local = env == Environment::Development;

        Self {
            level: level.to_string(),
            format,
            colored: local,
            source_location: local,
        }
    }

    /// Lets `RUST_LOG` replace the configured directive
    pub fn with_env_override(mut self) -> Self {
        if let Some(directive) = env::var("RUST_LOG").ok().filter(|d| !d.trim().is_empty()) {
            self.level = directive;
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event, for log shippers
    Json,
    Pretty,
    Compact,
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

fn default_colored() -> bool {
    true
}
