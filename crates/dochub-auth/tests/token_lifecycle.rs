use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;

use dochub_auth::jwt::{RevocationStore, TokenAuthority, fingerprint};
use dochub_cache::CacheManager;
use dochub_cache::keys;
use dochub_core::clock::ManualClock;
use dochub_core::config::AuthConfig;
use dochub_core::error::{AppError, ErrorKind};
use dochub_core::result::AppResult;
use dochub_core::traits::CacheProvider;
use dochub_core::types::UserId;

const TTL_HOURS: u64 = 2;

struct Harness {
    authority: TokenAuthority,
    clock: Arc<ManualClock>,
    cache: CacheManager,
}

fn harness() -> Harness {
    let clock = Arc::new(ManualClock::new(
        DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp"),
    ));
    let cache = CacheManager::in_memory();
    let config = AuthConfig {
        jwt_secret: "integration-secret".to_string(),
        token_ttl_hours: TTL_HOURS,
        admin_token: "admin".to_string(),
    };
    let authority = TokenAuthority::new(
        &config,
        RevocationStore::new(cache.clone()),
        clock.clone(),
    )
    .expect("authority");
    Harness {
        authority,
        clock,
        cache,
    }
}

fn ttl() -> chrono::Duration {
    chrono::Duration::hours(TTL_HOURS as i64)
}

#[tokio::test]
async fn test_issued_token_verifies_until_expiry() {
    let h = harness();
    let token = h
        .authority
        .issue("alice_owner", "127.0.0.1:1", UserId(5))
        .expect("issue");

    assert_eq!(h.authority.verify(&token).await.expect("fresh"), UserId(5));

    h.clock.advance(ttl() - chrono::Duration::seconds(1));
    assert_eq!(h.authority.verify(&token).await.expect("just before expiry"), UserId(5));

    h.clock.advance(chrono::Duration::seconds(1));
    let err = h.authority.verify(&token).await.expect_err("at expiry");
    assert_eq!(err.kind, ErrorKind::TokenExpired);
}

#[tokio::test]
async fn test_revoked_token_fails_before_natural_expiry() {
    let h = harness();
    let token = h.authority.issue("alice_owner", "", UserId(5)).expect("issue");

    h.authority.revoke(&token).await.expect("revoke");
    let err = h.authority.verify(&token).await.expect_err("revoked");
    assert_eq!(err.kind, ErrorKind::TokenRevoked);

    // Other tokens are unaffected.
    h.clock.advance(chrono::Duration::seconds(1));
    let other = h.authority.issue("alice_owner", "", UserId(5)).expect("issue");
    assert_eq!(h.authority.verify(&other).await.expect("other"), UserId(5));
}

#[tokio::test]
async fn test_revoked_token_reports_expired_after_lifetime() {
    let h = harness();
    let token = h.authority.issue("alice_owner", "", UserId(5)).expect("issue");
    h.authority.revoke(&token).await.expect("revoke");

    h.clock.advance(ttl());
    let err = h.authority.verify(&token).await.expect_err("expired");
    assert_eq!(err.kind, ErrorKind::TokenExpired);
}

#[tokio::test]
async fn test_revoking_expired_token_writes_nothing() {
    let h = harness();
    let token = h.authority.issue("alice_owner", "", UserId(5)).expect("issue");
    h.clock.advance(ttl() + chrono::Duration::minutes(1));

    let err = h.authority.revoke(&token).await.expect_err("already expired");
    assert_eq!(err.kind, ErrorKind::AlreadyExpired);
    let record = keys::revoked_token(&fingerprint(&token));
    assert_eq!(h.cache.get(&record).await.expect("get"), None);
}

#[tokio::test]
async fn test_revocation_record_ttl_matches_remaining_validity() {
    let h = harness();
    let token = h.authority.issue("alice_owner", "", UserId(5)).expect("issue");
    let record = keys::revoked_token(&fingerprint(&token));

    h.clock.advance(ttl() - chrono::Duration::seconds(1));
    h.authority.revoke(&token).await.expect("revoke");
    assert!(h.cache.exists(&record).await.expect("exists"));

    // One second of validity was left, so the record lapses on its own.
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(!h.cache.exists(&record).await.expect("exists"));
}

#[tokio::test]
async fn test_revoking_garbage_is_invalid() {
    let h = harness();
    let err = h.authority.revoke("garbage").await.expect_err("garbage");
    assert_eq!(err.kind, ErrorKind::TokenInvalid);
}

#[tokio::test]
async fn test_concurrent_verifies_all_see_revocation() {
    let h = harness();
    let token = h.authority.issue("alice_owner", "", UserId(5)).expect("issue");
    h.authority.revoke(&token).await.expect("revoke");

    let checks = (0..32).map(|_| {
        let authority = h.authority.clone();
        let token = token.clone();
        tokio::spawn(async move { authority.verify(&token).await })
    });
    for result in futures::future::join_all(checks).await {
        let err = result.expect("join").expect_err("revoked");
        assert_eq!(err.kind, ErrorKind::TokenRevoked);
    }
}

/// Shared store that cannot be reached.
#[derive(Debug)]
struct Unreachable;

#[async_trait]
impl CacheProvider for Unreachable {
    async fn get(&self, _key: &str) -> AppResult<Option<String>> {
        Err(AppError::cache_unavailable("connection refused"))
    }
    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<()> {
        Err(AppError::cache_unavailable("connection refused"))
    }
    async fn delete(&self, _key: &str) -> AppResult<()> {
        Err(AppError::cache_unavailable("connection refused"))
    }
    async fn scan_prefix(&self, _prefix: &str) -> AppResult<Vec<String>> {
        Err(AppError::cache_unavailable("connection refused"))
    }
    async fn health_check(&self) -> AppResult<bool> {
        Ok(false)
    }
}

#[tokio::test]
async fn test_unreachable_revocation_store_fails_closed() {
    let config = AuthConfig {
        jwt_secret: "integration-secret".to_string(),
        token_ttl_hours: 1,
        admin_token: "admin".to_string(),
    };
    let authority = TokenAuthority::new(
        &config,
        RevocationStore::new(CacheManager::from_provider(Arc::new(Unreachable))),
        Arc::new(ManualClock::starting_now()),
    )
    .expect("authority");
    let token = authority.issue("alice_owner", "", UserId(5)).expect("issue");

    let err = authority.verify(&token).await.expect_err("no revocation answer");
    assert_eq!(err.kind, ErrorKind::ServiceUnavailable);
    let err = authority.revoke(&token).await.expect_err("cannot record");
    assert_eq!(err.kind, ErrorKind::ServiceUnavailable);
}

#[tokio::test]
async fn test_revocations_hold_when_file_entries_fill_the_cache() {
    use dochub_cache::memory::MemoryCacheProvider;
    use dochub_core::config::cache::MemoryCacheConfig;

    let clock = Arc::new(ManualClock::new(
        DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp"),
    ));
    let cache = CacheManager::from_provider(Arc::new(MemoryCacheProvider::new(
        &MemoryCacheConfig { max_capacity: 100 },
    )));
    let config = AuthConfig {
        jwt_secret: "integration-secret".to_string(),
        token_ttl_hours: TTL_HOURS,
        admin_token: "admin".to_string(),
    };
    let authority = TokenAuthority::new(&config, RevocationStore::new(cache.clone()), clock)
        .expect("authority");
    let ttl = Duration::from_secs(60);

    for i in 0..100 {
        let key = format!("file:meta:{i}");
        cache.set(&key, "{}", ttl).await.expect("fill");
        cache.get(&key).await.expect("touch");
    }

    let mut revoked = Vec::new();
    for round in 0..50 {
        let token = authority
            .issue("alice_owner", "127.0.0.1:1", UserId(round + 1))
            .expect("issue");
        authority.revoke(&token).await.expect("revoke");
        for fill in 0..5 {
            let key = format!("files:list:{round}:{fill}");
            cache.set(&key, "[]", ttl).await.expect("listing fill");
        }
        revoked.push(token);
    }

    for token in &revoked {
        let err = authority.verify(token).await.expect_err("still revoked");
        assert_eq!(err.kind, ErrorKind::TokenRevoked);
    }
}
