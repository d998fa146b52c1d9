//! `sessionctl`: operator tool for SessionGate tokens
//!
//! Usage: sessionctl [--config FILE] [--no-store] <COMMAND>
//!
//! Reads `.env` and the `JWT_*` / `REDIS_*` variables. When Redis cannot be
//! reached the tool keeps working without revocation.

mod args;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use sg_core::domain::entities::token::TokenType;
use sg_core::services::token::{TokenServiceConfig, TokenSessionManager};
use sg_infra::cache::RedisSessionStore;
use sg_infra::telemetry;
use sg_shared::config::AppConfig;

use crate::args::{Args, Command};

type Manager = TokenSessionManager<RedisSessionStore>;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AppConfig::load(Some(path))
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => AppConfig::from_env(),
    };
    telemetry::init_tracing(&config.logging)?;

    let manager = build_manager(&config, args.no_store).await?;
    run(&manager, args.command).await
}

async fn build_manager(config: &AppConfig, no_store: bool) -> Result<Manager> {
    let token_config =
        TokenServiceConfig::from_jwt_config(&config.jwt).context("Invalid JWT configuration")?;

    let store = if no_store || !config.cache.enabled {
        None
    } else {
        match RedisSessionStore::connect(config.cache.clone()).await {
            Ok(store) => Some(Arc::new(store)),
            Err(e) => {
                warn!(error = %e, "Redis unavailable, continuing without revocation");
                None
            }
        }
    };

    Ok(TokenSessionManager::with_optional_store(token_config, store)?)
}

async fn run(manager: &Manager, command: Command) -> Result<()> {
    match command {
        Command::Issue {
            identity,
            device,
            ttl,
            pair,
        } => {
            let identity = identity.to_identity();
            if pair {
                let tokens = manager.issue_token_pair(&identity, device.as_deref()).await?;
                println!("{}", serde_json::to_string_pretty(&tokens)?);
            } else {
                let token = manager
                    .issue_access_token(&identity, device.as_deref(), ttl)
                    .await?;
                println!("{}", token);
            }
        }
        Command::Verify { token, kind } => {
            let claims = manager.verify(&token, TokenType::from(kind)).await?;
            println!("{}", serde_json::to_string_pretty(&claims)?);
        }
        Command::Refresh { token, device } => {
            let access = manager.refresh(&token, device.as_deref()).await?;
            println!("{}", access);
        }
        Command::Revoke { target, token } => {
            let recorded = if token {
                manager.revoke_token(&target).await?
            } else {
                manager.revoke(&target).await
            };
            if !recorded {
                anyhow::bail!("Revocation was not recorded; is the session store reachable?");
            }
            info!("Revoked");
            println!("revoked");
        }
        Command::RevokeAll { user_id } => {
            let revoked = manager.revoke_all_for_user(&user_id).await;
            println!("{}", revoked);
        }
        Command::Count { user_id } => {
            println!("{}", manager.count_active(&user_id).await);
        }
    }
    Ok(())
}
