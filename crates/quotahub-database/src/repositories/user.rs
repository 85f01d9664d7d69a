//! User repository implementation.
//!
//! The users table belongs to the panel; quota operations only need to
//! know whether a user exists.

use sqlx::PgPool;
use uuid::Uuid;

use quotahub_core::error::{AppError, ErrorKind};
use quotahub_core::result::AppResult;

/// Repository for user existence checks.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Check whether a user exists.
    pub async fn exists(&self, user_id: Uuid) -> AppResult<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to check user existence", e)
            })
    }
}
