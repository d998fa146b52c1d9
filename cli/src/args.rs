//! Command line definition for `sessionctl`

use std::path::PathBuf;

use chrono::Duration;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

use sg_core::domain::entities::token::{SessionIdentity, TokenType};

#[derive(Parser, Debug)]
#[command(
    name = "sessionctl",
    version,
    about = "Issue, inspect and revoke SessionGate tokens"
)]
pub struct Args {
    /// TOML configuration file (environment variables are used when omitted)
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Run without Redis; revocation and registry commands become no-ops
    #[arg(long, global = true)]
    pub no_store: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Issue an access token, or an access and refresh pair
    Issue {
        #[command(flatten)]
        identity: IdentityArgs,

        /// Bind the token to a device
        #[arg(long)]
        device: Option<String>,

        /// Access token lifetime in seconds instead of the configured one
        #[arg(long, conflicts_with = "pair", value_parser = parse_ttl)]
        ttl: Option<Duration>,

        /// Issue a refresh token as well and print both as JSON
        #[arg(long)]
        pair: bool,
    },

    /// Verify a token and print its claims
    Verify {
        token: String,

        #[arg(long = "type", value_enum, default_value_t = KindArg::Access)]
        kind: KindArg,
    },

    /// Exchange a refresh token for a new access token
    Refresh {
        token: String,

        /// Device presenting the token
        #[arg(long)]
        device: Option<String>,
    },

    /// Revoke a token id, or a whole token with --token
    Revoke {
        /// Token id (jti), or the token itself with --token
        target: String,

        #[arg(long)]
        token: bool,
    },

    /// Revoke every registered token of a user
    RevokeAll { user_id: String },

    /// Count a user's registered access tokens
    Count { user_id: String },
}

#[derive(ClapArgs, Debug)]
pub struct IdentityArgs {
    #[arg(long)]
    pub user_id: String,

    #[arg(long)]
    pub username: String,

    /// Role to grant; repeat for several
    #[arg(long = "role")]
    pub roles: Vec<String>,

    /// Permission to grant; repeat for several, `*` grants all
    #[arg(long = "permission")]
    pub permissions: Vec<String>,
}

impl IdentityArgs {
    pub fn to_identity(&self) -> SessionIdentity {
        SessionIdentity::new(&self.user_id, &self.username)
            .with_roles(self.roles.iter().cloned())
            .with_permissions(self.permissions.iter().cloned())
    }
}

/// Seconds to a token lifetime, rejecting values chrono cannot represent
fn parse_ttl(value: &str) -> Result<Duration, String> {
    let seconds: i64 = value
        .parse()
        .map_err(|e| format!("invalid number of seconds: {}", e))?;
    Duration::try_seconds(seconds).ok_or_else(|| format!("{} seconds is out of range", seconds))
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum KindArg {
    Access,
    Refresh,
}

impl From<KindArg> for TokenType {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Access => TokenType::Access,
            KindArg::Refresh => TokenType::Refresh,
        }
    }
}
