//! Panel settings repository implementation.
//!
//! Namespaced key-value rows with JSON-shaped string values. The resource
//! defaults and maximums live here under the `quotahub` namespace.

use sqlx::PgPool;

use quotahub_core::error::{AppError, ErrorKind};
use quotahub_core::result::AppResult;

/// Repository for namespaced settings blobs.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    /// Create a new settings repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Read a setting value.
    pub async fn get(&self, namespace: &str, key: &str) -> AppResult<Option<String>> {
        sqlx::query_scalar("SELECT value FROM panel_settings WHERE namespace = $1 AND key = $2")
            .bind(namespace)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read setting", e))
    }

    /// Upsert a setting value.
    pub async fn set(&self, namespace: &str, key: &str, value: &str) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO panel_settings (namespace, key, value) VALUES ($1, $2, $3) \
             ON CONFLICT (namespace, key) DO UPDATE SET \
                value = EXCLUDED.value, \
                updated_at = NOW()",
        )
        .bind(namespace)
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to write setting", e))?;
        Ok(())
    }
}
