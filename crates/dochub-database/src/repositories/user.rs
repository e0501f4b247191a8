//! User repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use dochub_core::error::{AppError, ErrorKind};
use dochub_core::result::AppResult;
use dochub_entity::user::{CreateUser, User};

use super::source_error;
use crate::source::UserSource;

/// Repository for user persistence.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserSource for UserRepository {
    async fn find_by_login(&self, login: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "SELECT id, login, password_hash, registered_at FROM users WHERE login = $1",
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await
        .map_err(source_error("Failed to find user by login"))
    }

    async fn create_user(&self, user: &CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (login, password_hash) VALUES ($1, $2) \
             RETURNING id, login, password_hash, registered_at",
        )
        .bind(&user.login)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let unique = e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation());
            if unique {
                AppError::with_source(
                    ErrorKind::Conflict,
                    format!("Login '{}' is already taken", user.login),
                    e,
                )
            } else {
                AppError::with_source(
                    ErrorKind::SourceUnavailable,
                    format!("Failed to create user: {e}"),
                    e,
                )
            }
        })
    }
}
