//! Account registration and token-based sessions.

use std::sync::Arc;

use tracing::{info, warn};

use dochub_auth::jwt::TokenAuthority;
use dochub_auth::password::PasswordHasher;
use dochub_core::error::AppError;
use dochub_core::result::AppResult;
use dochub_database::source::UserSource;
use dochub_entity::user::{CreateUser, User};

const LOGIN_MIN_LEN: usize = 8;
const LOGIN_MAX_LEN: usize = 20;

/// Registers users and hands out or revokes their bearer tokens.
#[derive(Clone)]
pub struct AuthService {
    /// User records.
    users: Arc<dyn UserSource>,
    /// Token issuance and revocation.
    tokens: TokenAuthority,
    /// Password hashing.
    hasher: PasswordHasher,
    /// Shared secret that gates registration.
    admin_token: String,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("tokens", &self.tokens)
            .finish()
    }
}

impl AuthService {
    /// Creates a new auth service.
    pub fn new(users: Arc<dyn UserSource>, tokens: TokenAuthority, admin_token: String) -> Self {
        Self {
            users,
            tokens,
            hasher: PasswordHasher::new(),
            admin_token,
        }
    }

    /// The token authority, for request authentication at the boundary.
    pub fn tokens(&self) -> &TokenAuthority {
        &self.tokens
    }

    /// Creates a user. Only callers holding the admin token may register.
    pub async fn register(&self, admin_token: &str, login: &str, password: &str) -> AppResult<User> {
        if admin_token != self.admin_token {
            warn!(login, "Registration attempted with a wrong admin token");
            return Err(AppError::forbidden("Invalid admin token"));
        }
        validate_login(login)?;

        let hasher = self.hasher;
        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))??;

        let user = self
            .users
            .create_user(&CreateUser {
                login: login.to_string(),
                password_hash,
            })
            .await?;

        info!(user_id = %user.id, login = %user.login, "User registered");
        Ok(user)
    }

    /// Checks credentials and issues a token bound to `client_addr`.
    ///
    /// An unknown login and a wrong password fail the same way.
    pub async fn login(&self, login: &str, password: &str, client_addr: &str) -> AppResult<String> {
        let user = self
            .users
            .find_by_login(login)
            .await?
            .ok_or_else(|| AppError::invalid_credentials("Invalid login or password"))?;

        let hasher = self.hasher;
        let password = password.to_string();
        let stored = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || hasher.verify_password(&password, &stored))
            .await
            .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))??;

        if !matches {
            warn!(login, "Failed login attempt");
            return Err(AppError::invalid_credentials("Invalid login or password"));
        }

        self.tokens.issue(&user.login, client_addr, user.id)
    }

    /// Ends a session by revoking its token.
    ///
    /// The token must still verify, so a revoked or expired token cannot
    /// be logged out twice.
    pub async fn logout(&self, token: &str) -> AppResult<()> {
        let user_id = self.tokens.verify(token).await?;
        self.tokens.revoke(token).await?;
        info!(user_id = %user_id, "User logged out");
        Ok(())
    }
}

/// Login must be 8 to 20 ASCII letters, digits, or underscores.
fn validate_login(login: &str) -> AppResult<()> {
    let well_formed = (LOGIN_MIN_LEN..=LOGIN_MAX_LEN).contains(&login.len())
        && login
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if well_formed {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "Login must be {LOGIN_MIN_LEN}-{LOGIN_MAX_LEN} characters of letters, digits, or '_'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_format() {
        assert!(validate_login("alice_owner").is_ok());
        assert!(validate_login("ABCdef12").is_ok());
        assert!(validate_login("short").is_err());
        assert!(validate_login("has space here").is_err());
        assert!(validate_login("dash-is-not-allowed").is_err());
        assert!(validate_login("a_login_that_is_far_too_long").is_err());
    }
}
