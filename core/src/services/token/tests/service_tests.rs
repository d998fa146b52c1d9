//! Unit tests for the token session manager

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use jsonwebtoken::Algorithm;

use crate::domain::entities::token::{Claims, SessionIdentity, TokenType};
use crate::errors::{DomainError, TokenError};
use crate::repositories::{MockSessionStore, SessionStore};
use crate::services::token::{TokenServiceConfig, TokenSessionManager};

fn test_config() -> TokenServiceConfig {
    TokenServiceConfig {
        jwt_secret: "test-secret".to_string(),
        ..TokenServiceConfig::default()
    }
}

fn create_test_manager() -> (TokenSessionManager<MockSessionStore>, MockSessionStore) {
    let store = MockSessionStore::new();
    let manager = TokenSessionManager::new(test_config(), Arc::new(store.clone()))
        .expect("Failed to create token session manager");
    (manager, store)
}

fn alice() -> SessionIdentity {
    SessionIdentity::new("u1", "alice")
        .with_roles(["admin", "editor"])
        .with_permissions(["reports:read", "reports:write"])
}

fn token_error(result: Result<Claims, DomainError>) -> TokenError {
    match result {
        Err(DomainError::Token(e)) => e,
        other => panic!("expected token error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_issue_and_verify_access_token() {
    let (manager, _) = create_test_manager();

    let token = manager.issue_access_token(&alice(), None, None).await.unwrap();
    let claims = manager.verify(&token, TokenType::Access).await.unwrap();

    assert_eq!(claims.token_type, TokenType::Access);
    assert_eq!(claims.identity(), alice());
    assert_eq!(claims.device_id, None);
    assert_eq!(claims.exp - claims.iat, 30 * 60);
    assert_eq!(claims.iss, "sessiongate");
}

#[tokio::test]
async fn test_token_is_compact_jws() {
    let (manager, _) = create_test_manager();

    let token = manager.issue_access_token(&alice(), None, None).await.unwrap();
    let segments: Vec<&str> = token.split('.').collect();

    assert_eq!(segments.len(), 3);
    assert!(segments.iter().all(|s| !s.is_empty() && !s.contains('=')));
}

#[tokio::test]
async fn test_ttl_override_sets_expiry() {
    let (manager, _) = create_test_manager();

    let token = manager
        .issue_access_token(&alice(), Some("phone"), Some(Duration::minutes(5)))
        .await
        .unwrap();
    let claims = manager.verify(&token, TokenType::Access).await.unwrap();

    assert_eq!(claims.exp - claims.iat, 300);
    assert_eq!(claims.device_id.as_deref(), Some("phone"));
}

#[tokio::test]
async fn test_verify_at_expiry_fails() {
    let (manager, _) = create_test_manager();

    let token = manager
        .issue_access_token(&alice(), None, Some(Duration::zero()))
        .await
        .unwrap();

    let err = token_error(manager.verify(&token, TokenType::Access).await);
    assert_eq!(err, TokenError::TokenExpired);
}

#[tokio::test]
async fn test_out_of_range_ttl_override_is_an_error() {
    let (manager, store) = create_test_manager();

    let result = manager
        .issue_access_token(&alice(), None, Some(Duration::days(100_000_000)))
        .await;

    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::TokenGenerationFailed))
    ));
    assert_eq!(store.len().await, 0);
}

#[tokio::test]
async fn test_short_lived_token_expires() {
    let (manager, _) = create_test_manager();

    let token = manager
        .issue_access_token(&alice(), None, Some(Duration::seconds(1)))
        .await
        .unwrap();

    tokio::time::sleep(std::time::Duration::from_secs(2)).await;

    let err = token_error(manager.verify(&token, TokenType::Access).await);
    assert_eq!(err, TokenError::TokenExpired);
}

#[tokio::test]
async fn test_type_mismatch_both_ways() {
    let (manager, _) = create_test_manager();

    let access = manager.issue_access_token(&alice(), None, None).await.unwrap();
    let refresh = manager.issue_refresh_token(&alice(), None).await.unwrap();

    assert_eq!(
        token_error(manager.verify(&access, TokenType::Refresh).await),
        TokenError::TokenTypeMismatch {
            expected: TokenType::Refresh,
            actual: TokenType::Access,
        }
    );
    assert_eq!(
        token_error(manager.verify(&refresh, TokenType::Access).await),
        TokenError::TokenTypeMismatch {
            expected: TokenType::Access,
            actual: TokenType::Refresh,
        }
    );
}

#[tokio::test]
async fn test_malformed_tokens_rejected() {
    let (manager, _) = create_test_manager();
    let token = manager.issue_access_token(&alice(), None, None).await.unwrap();

    assert_eq!(
        token_error(manager.verify("invalid_token", TokenType::Access).await),
        TokenError::MalformedToken
    );

    // Bob's signature on Alice's header and payload
    let other = manager
        .issue_access_token(&SessionIdentity::new("u2", "bob"), None, None)
        .await
        .unwrap();
    let (signed_part, _) = token.rsplit_once('.').unwrap();
    let (_, foreign_signature) = other.rsplit_once('.').unwrap();
    let tampered = format!("{}.{}", signed_part, foreign_signature);
    assert_eq!(
        token_error(manager.verify(&tampered, TokenType::Access).await),
        TokenError::MalformedToken
    );
}

#[tokio::test]
async fn test_token_signed_with_other_secret_rejected() {
    let (manager, _) = create_test_manager();
    let other = TokenSessionManager::without_store(TokenServiceConfig {
        jwt_secret: "another-secret".to_string(),
        ..TokenServiceConfig::default()
    })
    .unwrap();

    let foreign = other.issue_access_token(&alice(), None, None).await.unwrap();
    assert_eq!(
        token_error(manager.verify(&foreign, TokenType::Access).await),
        TokenError::MalformedToken
    );
}

#[tokio::test]
async fn test_token_from_other_issuer_rejected() {
    let (manager, _) = create_test_manager();
    let other = TokenSessionManager::without_store(TokenServiceConfig {
        issuer: "someone-else".to_string(),
        ..test_config()
    })
    .unwrap();

    let foreign = other.issue_access_token(&alice(), None, None).await.unwrap();
    assert_eq!(
        token_error(manager.verify(&foreign, TokenType::Access).await),
        TokenError::MalformedToken
    );
}

#[tokio::test]
async fn test_hs512_round_trip() {
    let manager = TokenSessionManager::without_store(TokenServiceConfig {
        algorithm: Algorithm::HS512,
        ..test_config()
    })
    .unwrap();

    let token = manager.issue_access_token(&alice(), None, None).await.unwrap();
    assert!(manager.verify(&token, TokenType::Access).await.is_ok());
}

#[tokio::test]
async fn test_revoke_then_verify_fails() {
    let (manager, _) = create_test_manager();

    let token = manager.issue_access_token(&alice(), None, None).await.unwrap();
    let claims = manager.verify(&token, TokenType::Access).await.unwrap();

    assert!(manager.revoke(&claims.jti).await);
    assert_eq!(
        token_error(manager.verify(&token, TokenType::Access).await),
        TokenError::TokenRevoked
    );

    // Revoking again is harmless
    assert!(manager.revoke(&claims.jti).await);
    assert_eq!(
        token_error(manager.verify(&token, TokenType::Access).await),
        TokenError::TokenRevoked
    );
}

#[tokio::test]
async fn test_revoke_token_by_value() {
    let (manager, _) = create_test_manager();

    let refresh = manager.issue_refresh_token(&alice(), None).await.unwrap();
    assert!(manager.revoke_token(&refresh).await.unwrap());

    assert_eq!(
        token_error(manager.verify(&refresh, TokenType::Refresh).await),
        TokenError::TokenRevoked
    );
    assert!(manager.revoke_token("garbage").await.is_err());
}

#[tokio::test]
async fn test_refresh_preserves_identity_with_new_id() {
    let (manager, _) = create_test_manager();

    let refresh = manager.issue_refresh_token(&alice(), Some("laptop")).await.unwrap();
    let refresh_claims = manager.verify(&refresh, TokenType::Refresh).await.unwrap();

    let access = manager.refresh(&refresh, None).await.unwrap();
    let access_claims = manager.verify(&access, TokenType::Access).await.unwrap();

    assert_eq!(access_claims.identity(), refresh_claims.identity());
    assert_eq!(access_claims.device_id.as_deref(), Some("laptop"));
    assert_ne!(access_claims.jti, refresh_claims.jti);
}

#[tokio::test]
async fn test_refresh_with_matching_device() {
    let (manager, _) = create_test_manager();

    let refresh = manager.issue_refresh_token(&alice(), Some("X")).await.unwrap();
    assert!(manager.refresh(&refresh, Some("X")).await.is_ok());
}

#[tokio::test]
async fn test_refresh_device_mismatch() {
    let (manager, _) = create_test_manager();

    let refresh = manager.issue_refresh_token(&alice(), Some("Y")).await.unwrap();
    let result = manager.refresh(&refresh, Some("X")).await;

    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::DeviceMismatch))
    ));

    // A token without a bound device never matches a presented one
    let unbound = manager.issue_refresh_token(&alice(), None).await.unwrap();
    assert!(matches!(
        manager.refresh(&unbound, Some("X")).await,
        Err(DomainError::Token(TokenError::DeviceMismatch))
    ));
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let (manager, _) = create_test_manager();

    let access = manager.issue_access_token(&alice(), None, None).await.unwrap();
    assert!(matches!(
        manager.refresh(&access, None).await,
        Err(DomainError::Token(TokenError::TokenTypeMismatch { .. }))
    ));
}

#[tokio::test]
async fn test_refresh_with_revoked_token_fails() {
    let (manager, _) = create_test_manager();

    let refresh = manager.issue_refresh_token(&alice(), None).await.unwrap();
    manager.revoke_token(&refresh).await.unwrap();

    assert!(matches!(
        manager.refresh(&refresh, None).await,
        Err(DomainError::Token(TokenError::TokenRevoked))
    ));
}

#[tokio::test]
async fn test_revoke_all_for_user() {
    let (manager, _) = create_test_manager();
    let bob = SessionIdentity::new("u2", "bob");

    let first = manager.issue_access_token(&alice(), None, None).await.unwrap();
    let second = manager.issue_access_token(&alice(), Some("phone"), None).await.unwrap();
    let refresh = manager.issue_refresh_token(&alice(), None).await.unwrap();
    let other = manager.issue_access_token(&bob, None, None).await.unwrap();

    assert_eq!(manager.count_active("u1").await, 2);
    assert_eq!(manager.count_active("u2").await, 1);

    let revoked = manager.revoke_all_for_user("u1").await;
    assert_eq!(revoked, 3);

    for token in [&first, &second] {
        assert_eq!(
            token_error(manager.verify(token, TokenType::Access).await),
            TokenError::TokenRevoked
        );
    }
    assert_eq!(
        token_error(manager.verify(&refresh, TokenType::Refresh).await),
        TokenError::TokenRevoked
    );
    assert_eq!(manager.count_active("u1").await, 0);

    assert!(manager.verify(&other, TokenType::Access).await.is_ok());
    assert_eq!(manager.count_active("u2").await, 1);
}

#[tokio::test]
async fn test_revoke_all_for_unknown_user() {
    let (manager, _) = create_test_manager();
    manager.issue_access_token(&alice(), None, None).await.unwrap();

    assert_eq!(manager.revoke_all_for_user("nobody").await, 0);
    assert_eq!(manager.count_active("u1").await, 1);
}

#[tokio::test]
async fn test_issue_token_pair() {
    let (manager, _) = create_test_manager();

    let pair = manager.issue_token_pair(&alice(), Some("tablet")).await.unwrap();

    assert_eq!(pair.token_type, "Bearer");
    assert_eq!(pair.access_expires_in, 30 * 60);
    assert_eq!(pair.refresh_expires_in, 7 * 24 * 60 * 60);

    let access = manager.verify(&pair.access_token, TokenType::Access).await.unwrap();
    let refresh = manager.verify(&pair.refresh_token, TokenType::Refresh).await.unwrap();
    assert_eq!(access.device_id, refresh.device_id);
    assert_ne!(access.jti, refresh.jti);
}

#[tokio::test]
async fn test_claims_use_current_time() {
    let (manager, _) = create_test_manager();
    let before = Utc::now().timestamp();

    let token = manager.issue_access_token(&alice(), None, None).await.unwrap();
    let claims = manager.verify(&token, TokenType::Access).await.unwrap();

    assert!(claims.iat >= before);
    assert!(claims.iat <= Utc::now().timestamp());
}

#[tokio::test]
async fn test_issue_registers_token_with_lifetime() {
    let (manager, store) = create_test_manager();

    let token = manager.issue_access_token(&alice(), None, None).await.unwrap();
    let claims = manager.verify(&token, TokenType::Access).await.unwrap();

    let key = format!("jwt:active:{}", claims.jti);
    assert_eq!(store.get(&key).await.unwrap().as_deref(), Some(token.as_str()));
    let ttl = store.ttl_of(&key).await.unwrap();
    assert!(ttl <= StdDuration::from_secs(1800));
    assert!(ttl >= StdDuration::from_secs(1798));
}

#[tokio::test]
async fn test_expired_override_is_not_registered() {
    let (manager, store) = create_test_manager();

    manager
        .issue_access_token(&alice(), None, Some(Duration::zero()))
        .await
        .unwrap();

    assert_eq!(store.len().await, 0);
    assert_eq!(manager.count_active("u1").await, 0);
}

#[tokio::test]
async fn test_revoke_writes_blacklist_with_retention_ttl() {
    let (manager, store) = create_test_manager();

    let token = manager.issue_access_token(&alice(), None, None).await.unwrap();
    let claims = manager.verify(&token, TokenType::Access).await.unwrap();
    manager.revoke(&claims.jti).await;

    let key = format!("jwt:blacklist:{}", claims.jti);
    assert_eq!(store.get(&key).await.unwrap().as_deref(), Some("revoked"));
    assert_eq!(
        store.ttl_of(&key).await,
        Some(StdDuration::from_secs(7 * 24 * 60 * 60))
    );
    assert!(!store.exists(&format!("jwt:active:{}", claims.jti)).await.unwrap());
}

#[tokio::test]
async fn test_revoke_unknown_id_still_blacklists() {
    let (manager, store) = create_test_manager();

    assert!(manager.revoke("never-issued").await);
    assert!(store.exists("jwt:blacklist:never-issued").await.unwrap());
}

#[tokio::test]
async fn test_unavailable_store_fails_open() {
    let store = MockSessionStore::unavailable();
    let manager = TokenSessionManager::new(test_config(), Arc::new(store.clone())).unwrap();

    let token = manager.issue_access_token(&alice(), None, None).await.unwrap();
    let claims = manager.verify(&token, TokenType::Access).await.unwrap();

    assert!(!manager.revoke(&claims.jti).await);
    assert!(manager.verify(&token, TokenType::Access).await.is_ok());
    assert_eq!(manager.count_active("u1").await, 0);
    assert_eq!(manager.revoke_all_for_user("u1").await, 0);

    let refresh = manager.issue_refresh_token(&alice(), None).await.unwrap();
    assert!(manager.refresh(&refresh, None).await.is_ok());
}

#[tokio::test]
async fn test_store_outage_after_revoke_hides_blacklist() {
    let (manager, store) = create_test_manager();

    let token = manager.issue_access_token(&alice(), None, None).await.unwrap();
    manager.revoke_token(&token).await.unwrap();

    store.set_available(false);
    assert!(manager.verify(&token, TokenType::Access).await.is_ok());

    store.set_available(true);
    assert_eq!(
        token_error(manager.verify(&token, TokenType::Access).await),
        TokenError::TokenRevoked
    );
}

#[tokio::test]
async fn test_manager_without_store() {
    let manager = TokenSessionManager::without_store(test_config()).unwrap();
    assert!(!manager.has_store());

    let token = manager.issue_access_token(&alice(), None, None).await.unwrap();
    let claims = manager.verify(&token, TokenType::Access).await.unwrap();

    assert!(!manager.revoke(&claims.jti).await);
    assert!(manager.verify(&token, TokenType::Access).await.is_ok());
    assert_eq!(manager.count_active("u1").await, 0);
    assert_eq!(manager.revoke_all_for_user("u1").await, 0);
}

#[test]
fn test_invalid_config_rejected() {
    let result = TokenSessionManager::without_store(TokenServiceConfig {
        jwt_secret: String::new(),
        ..TokenServiceConfig::default()
    });
    assert!(matches!(result, Err(DomainError::Configuration { .. })));

    let result = TokenSessionManager::without_store(TokenServiceConfig {
        algorithm: Algorithm::RS256,
        ..test_config()
    });
    assert!(matches!(result, Err(DomainError::Configuration { .. })));
}
