use std::sync::Arc;

use dochub_auth::jwt::{RevocationStore, TokenAuthority};
use dochub_cache::CacheManager;
use dochub_core::clock::ManualClock;
use dochub_core::config::AuthConfig;
use dochub_core::error::ErrorKind;
use dochub_database::memory::MemoryStore;
use dochub_service::AuthService;

const ADMIN: &str = "let-me-register";
const PASSWORD: &str = "Corr3ct!horse";

fn service() -> AuthService {
    let config = AuthConfig {
        jwt_secret: "service-test-secret".to_string(),
        token_ttl_hours: 1,
        admin_token: ADMIN.to_string(),
    };
    let tokens = TokenAuthority::new(
        &config,
        RevocationStore::new(CacheManager::in_memory()),
        Arc::new(ManualClock::starting_now()),
    )
    .expect("authority");
    AuthService::new(Arc::new(MemoryStore::new()), tokens, config.admin_token)
}

#[tokio::test]
async fn test_register_login_logout() {
    let auth = service();
    let user = auth
        .register(ADMIN, "alice_owner", PASSWORD)
        .await
        .expect("register");

    let token = auth
        .login("alice_owner", PASSWORD, "10.0.0.7:5123")
        .await
        .expect("login");
    let claims = auth.tokens().verify_claims(&token).await.expect("verify");
    assert_eq!(claims.user_id, user.id);
    assert_eq!(claims.client_ip, "10.0.0.7:5123");

    auth.logout(&token).await.expect("logout");
    let err = auth.tokens().verify(&token).await.expect_err("revoked");
    assert_eq!(err.kind, ErrorKind::TokenRevoked);

    let err = auth.logout(&token).await.expect_err("second logout");
    assert_eq!(err.kind, ErrorKind::TokenRevoked);
}

#[tokio::test]
async fn test_register_requires_admin_token() {
    let auth = service();
    let err = auth
        .register("guess", "alice_owner", PASSWORD)
        .await
        .expect_err("wrong admin token");
    assert_eq!(err.kind, ErrorKind::Forbidden);
}

#[tokio::test]
async fn test_register_validates_login() {
    let auth = service();
    let err = auth.register(ADMIN, "bad login", PASSWORD).await.expect_err("login");
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_duplicate_login_conflicts() {
    let auth = service();
    auth.register(ADMIN, "alice_owner", PASSWORD).await.expect("register");
    let err = auth
        .register(ADMIN, "alice_owner", PASSWORD)
        .await
        .expect_err("duplicate");
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_bad_credentials_look_the_same() {
    let auth = service();
    auth.register(ADMIN, "alice_owner", PASSWORD).await.expect("register");

    let wrong_password = auth
        .login("alice_owner", "Wr0ng!horse", "")
        .await
        .expect_err("wrong password");
    let unknown_user = auth
        .login("nobody_at_all", PASSWORD, "")
        .await
        .expect_err("unknown user");
    assert_eq!(wrong_password.kind, ErrorKind::InvalidCredentials);
    assert_eq!(unknown_user.kind, wrong_password.kind);
    assert_eq!(unknown_user.message, wrong_password.message);
}
