//! Quota record repository implementation.
//!
//! Owns the one-row-per-user `user_resource_limits` table and the two
//! write primitives that must stay race-safe: the bulk field update and
//! the signed delta adjustment. Both run inside a transaction holding a
//! `FOR UPDATE` row lock for the whole read-validate-write cycle, so
//! concurrent writers to the same user serialize and a failed validation
//! rolls back without a partial write.

use sqlx::PgPool;
use uuid::Uuid;

use quotahub_core::error::{AppError, ErrorKind, Violation};
use quotahub_core::result::AppResult;
use quotahub_entity::quota::QuotaRecord;
use quotahub_entity::resources::{ResourcePatch, ResourceSet, ResourceType, exceeds_limit};

/// Repository for per-user quota record CRUD and atomic adjustments.
#[derive(Debug, Clone)]
pub struct QuotaRepository {
    pool: PgPool,
}

const INSERT_RECORD: &str = "INSERT INTO user_resource_limits \
     (user_id, memory_limit, cpu_limit, disk_limit, server_limit, database_limit, backup_limit, allocation_limit) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *";

const INSERT_RECORD_IF_ABSENT: &str = "INSERT INTO user_resource_limits \
     (user_id, memory_limit, cpu_limit, disk_limit, server_limit, database_limit, backup_limit, allocation_limit) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
     ON CONFLICT (user_id) DO NOTHING RETURNING *";

const UPDATE_RECORD: &str = "UPDATE user_resource_limits SET \
     memory_limit = $2, cpu_limit = $3, disk_limit = $4, server_limit = $5, \
     database_limit = $6, backup_limit = $7, allocation_limit = $8, updated_at = NOW() \
     WHERE user_id = $1 RETURNING *";

impl QuotaRepository {
    /// Create a new quota repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user's quota record.
    pub async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<QuotaRecord>> {
        sqlx::query_as::<_, QuotaRecord>("SELECT * FROM user_resource_limits WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find quota record", e)
            })
    }

    /// Return the user's quota record, creating one seeded from `defaults`
    /// if none exists yet.
    ///
    /// Two callers may race on first creation; the unique constraint on
    /// `user_id` makes the loser's insert a no-op and it reads the
    /// winner's row instead of erroring.
    pub async fn ensure_for_user(
        &self,
        user_id: Uuid,
        defaults: &ResourceSet,
    ) -> AppResult<QuotaRecord> {
        if let Some(record) = self.find_by_user(user_id).await? {
            return Ok(record);
        }

        let inserted = bind_limits(
            sqlx::query_as::<_, QuotaRecord>(INSERT_RECORD_IF_ABSENT).bind(user_id),
            defaults,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_insert_error(user_id, e))?;

        match inserted {
            Some(record) => Ok(record),
            // Lost the creation race; the winner's row is there now.
            None => self.find_by_user(user_id).await?.ok_or_else(|| {
                AppError::internal(format!("Quota record for user {user_id} vanished"))
            }),
        }
    }

    /// Explicitly create a quota record with the given limits.
    ///
    /// Fails with `Conflict` when a record already exists (checked here,
    /// and enforced again by the unique constraint) and with `NotFound`
    /// when the user does not exist.
    pub async fn create(&self, user_id: Uuid, limits: &ResourceSet) -> AppResult<QuotaRecord> {
        if self.find_by_user(user_id).await?.is_some() {
            return Err(AppError::conflict(format!(
                "Quota record already exists for user {user_id}"
            )));
        }

        bind_limits(
            sqlx::query_as::<_, QuotaRecord>(INSERT_RECORD).bind(user_id),
            limits,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(user_id, e))
    }

    /// Bulk-set any subset of the seven resource fields for a user.
    ///
    /// Rejects an empty patch and any field whose new value would exceed
    /// `max` (0 in `max` = unlimited). Runs in a transaction: the existing
    /// row is locked for update, or a new row seeded from `defaults`
    /// merged with the patch is inserted when none exists.
    pub async fn update_for_user(
        &self,
        user_id: Uuid,
        patch: &ResourcePatch,
        defaults: &ResourceSet,
        max: &ResourceSet,
    ) -> AppResult<QuotaRecord> {
        if patch.is_empty() {
            return Err(AppError::validation("No resource fields provided"));
        }

        let violations: Vec<Violation> = patch
            .entries()
            .into_iter()
            .filter(|&(resource, value)| exceeds_limit(max.get(resource), value))
            .map(|(resource, value)| {
                Violation::new(
                    resource.as_str(),
                    format!("{value} exceeds the maximum of {}", max.get(resource)),
                )
            })
            .collect();
        if !violations.is_empty() {
            return Err(AppError::rejected(violations));
        }

        let mut tx = self.pool.begin().await.map_err(begin_error)?;

        let existing = sqlx::query_as::<_, QuotaRecord>(
            "SELECT * FROM user_resource_limits WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock quota record", e))?;

        let record = match existing {
            Some(record) => {
                let merged = patch.apply_to(&record.limits());
                bind_limits(
                    sqlx::query_as::<_, QuotaRecord>(UPDATE_RECORD).bind(user_id),
                    &merged,
                )
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to update quota record", e)
                })?
            }
            None => {
                let merged = patch.apply_to(defaults);
                bind_limits(
                    sqlx::query_as::<_, QuotaRecord>(INSERT_RECORD).bind(user_id),
                    &merged,
                )
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| map_insert_error(user_id, e))?
            }
        };

        tx.commit().await.map_err(commit_error)?;
        Ok(record)
    }

    /// Raw administrative override by record id: same field whitelist,
    /// no maximum check, single-statement update.
    pub async fn update_by_id(&self, id: Uuid, patch: &ResourcePatch) -> AppResult<QuotaRecord> {
        if patch.is_empty() {
            return Err(AppError::validation("No resource fields provided"));
        }

        sqlx::query_as::<_, QuotaRecord>(
            "UPDATE user_resource_limits SET \
                 memory_limit = COALESCE($2, memory_limit), \
                 cpu_limit = COALESCE($3, cpu_limit), \
                 disk_limit = COALESCE($4, disk_limit), \
                 server_limit = COALESCE($5, server_limit), \
                 database_limit = COALESCE($6, database_limit), \
                 backup_limit = COALESCE($7, backup_limit), \
                 allocation_limit = COALESCE($8, allocation_limit), \
                 updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(patch.memory_limit)
        .bind(patch.cpu_limit)
        .bind(patch.disk_limit)
        .bind(patch.server_limit)
        .bind(patch.database_limit)
        .bind(patch.backup_limit)
        .bind(patch.allocation_limit)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update quota record", e))?
        .ok_or_else(|| AppError::not_found(format!("Quota record {id} not found")))
    }

    /// Apply a signed delta to one resource field atomically.
    ///
    /// The row is locked for the whole read-modify-write; absence of a row
    /// means the current value is the configured default for that field
    /// and a fresh default-seeded row is inserted with the field
    /// overridden. Fails without writing when the delta would drive the
    /// value negative or past `max`.
    pub async fn adjust(
        &self,
        user_id: Uuid,
        resource: ResourceType,
        delta: i64,
        defaults: &ResourceSet,
        max: &ResourceSet,
    ) -> AppResult<QuotaRecord> {
        let mut tx = self.pool.begin().await.map_err(begin_error)?;

        let existing = sqlx::query_as::<_, QuotaRecord>(
            "SELECT * FROM user_resource_limits WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock quota record", e))?;

        let current = existing
            .as_ref()
            .map(|record| record.limits().get(resource))
            .unwrap_or_else(|| defaults.get(resource));
        let new_value = current + delta;

        if new_value < 0 {
            tx.rollback().await.map_err(rollback_error)?;
            return Err(AppError::validation(format!(
                "Insufficient {resource}: cannot adjust {current} by {delta}"
            )));
        }
        if exceeds_limit(max.get(resource), new_value) {
            tx.rollback().await.map_err(rollback_error)?;
            return Err(AppError::validation(format!(
                "{resource} of {new_value} exceeds the maximum of {}",
                max.get(resource)
            )));
        }

        let record = match existing {
            Some(record) => {
                let mut merged = record.limits();
                merged.set(resource, new_value);
                bind_limits(
                    sqlx::query_as::<_, QuotaRecord>(UPDATE_RECORD).bind(user_id),
                    &merged,
                )
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to adjust quota record", e)
                })?
            }
            None => {
                let mut merged = *defaults;
                merged.set(resource, new_value);
                bind_limits(
                    sqlx::query_as::<_, QuotaRecord>(INSERT_RECORD).bind(user_id),
                    &merged,
                )
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| map_insert_error(user_id, e))?
            }
        };

        tx.commit().await.map_err(commit_error)?;
        Ok(record)
    }

    /// Read one resource field, falling back to the configured default
    /// without creating a row.
    pub async fn get_resource(
        &self,
        user_id: Uuid,
        resource: ResourceType,
        defaults: &ResourceSet,
    ) -> AppResult<i64> {
        let record = self.find_by_user(user_id).await?;
        Ok(record
            .map(|r| r.limits().get(resource))
            .unwrap_or_else(|| defaults.get(resource)))
    }

    /// Delete a user's quota record.
    pub async fn delete_for_user(&self, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM user_resource_limits WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete quota record", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}

/// Bind the seven limit columns in declaration order ($2..$8).
fn bind_limits<'q>(
    query: sqlx::query::QueryAs<'q, sqlx::Postgres, QuotaRecord, sqlx::postgres::PgArguments>,
    limits: &ResourceSet,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, QuotaRecord, sqlx::postgres::PgArguments> {
    query
        .bind(limits.memory_limit)
        .bind(limits.cpu_limit)
        .bind(limits.disk_limit)
        .bind(limits.server_limit)
        .bind(limits.database_limit)
        .bind(limits.backup_limit)
        .bind(limits.allocation_limit)
}

fn map_insert_error(user_id: Uuid, e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db_err)
            if db_err.constraint() == Some("user_resource_limits_user_id_fkey") =>
        {
            AppError::not_found(format!("User {user_id} not found"))
        }
        sqlx::Error::Database(db_err)
            if db_err.constraint() == Some("user_resource_limits_user_id_key") =>
        {
            AppError::conflict(format!("Quota record already exists for user {user_id}"))
        }
        _ => AppError::with_source(ErrorKind::Database, "Failed to insert quota record", e),
    }
}

fn begin_error(e: sqlx::Error) -> AppError {
    AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
}

fn commit_error(e: sqlx::Error) -> AppError {
    AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
}

fn rollback_error(e: sqlx::Error) -> AppError {
    AppError::with_source(ErrorKind::Database, "Failed to roll back transaction", e)
}
