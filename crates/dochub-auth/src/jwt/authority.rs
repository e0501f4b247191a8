//! Token issuance, verification, and revocation.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::{debug, info};

use dochub_core::clock::Clock;
use dochub_core::config::AuthConfig;
use dochub_core::error::AppError;
use dochub_core::result::AppResult;
use dochub_core::types::UserId;

use super::claims::Claims;
use super::fingerprint::fingerprint;
use super::revocation::RevocationStore;

/// Longest accepted token lifetime, roughly a century.
const MAX_TTL_HOURS: u64 = 24 * 366 * 100;

/// Issues and checks HS512-signed bearer tokens.
///
/// Tokens are self-contained: validity needs only the signature and the
/// clock. The one piece of server-side state is the revocation record,
/// which lives in the shared store so every instance sees it.
///
/// Lifecycle: `Issued -> Valid -> Revoked | Expired`, both terminal.
#[derive(Clone)]
pub struct TokenAuthority {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: i64,
    clock: Arc<dyn Clock>,
    revocations: RevocationStore,
}

impl std::fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("ttl_seconds", &self.ttl_seconds)
            .field("clock", &self.clock)
            .finish()
    }
}

impl TokenAuthority {
    /// Creates a token authority from auth configuration.
    ///
    /// An empty secret, a zero TTL, or a TTL above a century is a
    /// configuration error.
    pub fn new(
        config: &AuthConfig,
        revocations: RevocationStore,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        if config.jwt_secret.is_empty() {
            return Err(AppError::configuration("auth.jwt_secret must not be empty"));
        }
        if config.token_ttl_hours == 0 {
            return Err(AppError::configuration("auth.token_ttl_hours must be positive"));
        }
        if config.token_ttl_hours > MAX_TTL_HOURS {
            return Err(AppError::configuration(format!(
                "auth.token_ttl_hours must not exceed {MAX_TTL_HOURS}"
            )));
        }
        let ttl_seconds = i64::try_from(config.token_ttl_hours * 3600)
            .map_err(|_| AppError::configuration("auth.token_ttl_hours is too large"))?;

        // Expiry is checked against the injected clock, not the system time.
        let mut validation = Validation::new(Algorithm::HS512);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            ttl_seconds,
            clock,
            revocations,
        })
    }

    /// Token lifetime.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds.unsigned_abs())
    }

    /// Issues a token for `user_id` valid for the configured TTL.
    pub fn issue(&self, login: &str, client_addr: &str, user_id: UserId) -> AppResult<String> {
        let now = self.clock.now().timestamp();
        let exp = now
            .checked_add(self.ttl_seconds)
            .ok_or_else(|| AppError::internal("Token expiry overflows the clock range"))?;
        let claims = Claims {
            user_login: login.to_string(),
            client_ip: client_addr.to_string(),
            user_id,
            iat: now,
            exp,
        };

        let token = encode(&Header::new(Algorithm::HS512), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))?;

        info!(user_id = %user_id, login, "Issued access token");
        Ok(token)
    }

    /// Verifies a token and returns its user id.
    pub async fn verify(&self, token: &str) -> AppResult<UserId> {
        self.verify_claims(token).await.map(|claims| claims.user_id)
    }

    /// Verifies a token and returns its decoded claims.
    ///
    /// The revocation lookup runs first and fails closed. Expiry is reported
    /// ahead of revocation, so a revoked token reads as expired once its
    /// natural lifetime is over.
    pub async fn verify_claims(&self, token: &str) -> AppResult<Claims> {
        let revoked = self.revocations.is_revoked(&fingerprint(token)).await?;

        let claims = match self.decode(token) {
            Ok(claims) => claims,
            Err(_) if revoked => return Err(AppError::token_revoked("Token has been revoked")),
            Err(e) => return Err(e),
        };

        if claims.is_expired_at(self.clock.now()) {
            return Err(AppError::token_expired("Token has expired"));
        }
        if revoked {
            return Err(AppError::token_revoked("Token has been revoked"));
        }
        Ok(claims)
    }

    /// Revokes a token for the rest of its natural lifetime.
    ///
    /// Revoking an already-expired token writes nothing and fails with
    /// `AlreadyExpired`.
    pub async fn revoke(&self, token: &str) -> AppResult<()> {
        let claims = self.decode(token)?;
        let remaining = claims
            .remaining_seconds_at(self.clock.now())
            .ok_or_else(|| AppError::already_expired("Token has already expired"))?;

        self.revocations
            .revoke(&fingerprint(token), Duration::from_secs(remaining))
            .await?;

        debug!(user_id = %claims.user_id, remaining_seconds = remaining, "Revoked access token");
        Ok(())
    }

    /// Checks signature and claims shape only.
    fn decode(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::token_invalid("Invalid token signature")
                }
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    AppError::token_invalid("Invalid token format")
                }
                _ => AppError::token_invalid(format!("Token validation failed: {e}")),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use dochub_cache::CacheManager;
    use dochub_core::clock::ManualClock;
    use dochub_core::error::ErrorKind;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "unit-test-secret".to_string(),
            token_ttl_hours: 1,
            admin_token: "admin".to_string(),
        }
    }

    fn authority() -> TokenAuthority {
        let clock = Arc::new(ManualClock::new(
            DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp"),
        ));
        TokenAuthority::new(
            &config(),
            RevocationStore::new(CacheManager::in_memory()),
            clock,
        )
        .expect("authority")
    }

    #[test]
    fn test_empty_secret_rejected() {
        let mut cfg = config();
        cfg.jwt_secret.clear();
        let err = TokenAuthority::new(
            &cfg,
            RevocationStore::new(CacheManager::in_memory()),
            Arc::new(ManualClock::starting_now()),
        )
        .expect_err("empty secret");
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_oversized_ttl_rejected() {
        for hours in [MAX_TTL_HOURS + 1, u64::MAX / 3600, u64::MAX] {
            let mut cfg = config();
            cfg.token_ttl_hours = hours;
            let err = TokenAuthority::new(
                &cfg,
                RevocationStore::new(CacheManager::in_memory()),
                Arc::new(ManualClock::starting_now()),
            )
            .expect_err("ttl too large");
            assert_eq!(err.kind, ErrorKind::Configuration);
        }
    }

    #[test]
    fn test_longest_ttl_still_issues() {
        let mut cfg = config();
        cfg.token_ttl_hours = MAX_TTL_HOURS;
        let authority = TokenAuthority::new(
            &cfg,
            RevocationStore::new(CacheManager::in_memory()),
            Arc::new(ManualClock::starting_now()),
        )
        .expect("century ttl");
        authority
            .issue("alice_owner", "127.0.0.1:1", UserId(1))
            .expect("issue");
    }

    #[test]
    fn test_token_uses_hs512_and_wire_claims() {
        let authority = authority();
        let token = authority
            .issue("alice_owner", "10.0.0.1:4000", UserId(9))
            .expect("issue");
        let header = jsonwebtoken::decode_header(&token).expect("header");
        assert_eq!(header.alg, Algorithm::HS512);

        let claims = authority.decode(&token).expect("decode");
        assert_eq!(claims.user_login, "alice_owner");
        assert_eq!(claims.client_ip, "10.0.0.1:4000");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[tokio::test]
    async fn test_garbage_token_is_invalid() {
        let err = authority().verify("not-a-jwt").await.expect_err("garbage");
        assert_eq!(err.kind, ErrorKind::TokenInvalid);
    }

    #[tokio::test]
    async fn test_foreign_signature_is_invalid() {
        let mut other_cfg = config();
        other_cfg.jwt_secret = "someone-else".to_string();
        let other = TokenAuthority::new(
            &other_cfg,
            RevocationStore::new(CacheManager::in_memory()),
            Arc::new(ManualClock::starting_now()),
        )
        .expect("authority");
        let token = other.issue("mallory_x", "", UserId(1)).expect("issue");

        let err = authority().verify(&token).await.expect_err("foreign key");
        assert_eq!(err.kind, ErrorKind::TokenInvalid);
    }
}
