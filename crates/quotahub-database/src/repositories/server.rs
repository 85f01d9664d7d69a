//! Server repository implementation.
//!
//! The servers table belongs to the panel; this repository reads the
//! resource columns the engine sums and performs the single atomic
//! partial update the validated edit path commits.

use sqlx::PgPool;
use uuid::Uuid;

use quotahub_core::error::{AppError, ErrorKind};
use quotahub_core::result::AppResult;
use quotahub_entity::server::{ChildCounts, ServerResourcePatch, ServerResources};

/// Repository for server resource reads and updates.
#[derive(Debug, Clone)]
pub struct ServerRepository {
    pool: PgPool,
}

impl ServerRepository {
    /// Create a new server repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a server by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ServerResources>> {
        sqlx::query_as::<_, ServerResources>("SELECT * FROM servers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find server", e))
    }

    /// List all servers owned by a user.
    pub async fn find_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<ServerResources>> {
        sqlx::query_as::<_, ServerResources>(
            "SELECT * FROM servers WHERE owner_id = $1 ORDER BY created_at ASC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list servers", e))
    }

    /// Update any subset of a server's resource fields in one statement.
    pub async fn update_resources(
        &self,
        id: Uuid,
        patch: &ServerResourcePatch,
    ) -> AppResult<ServerResources> {
        sqlx::query_as::<_, ServerResources>(
            "UPDATE servers SET \
                 memory = COALESCE($2, memory), \
                 cpu = COALESCE($3, cpu), \
                 disk = COALESCE($4, disk), \
                 database_limit = COALESCE($5, database_limit), \
                 backup_limit = COALESCE($6, backup_limit), \
                 allocation_limit = COALESCE($7, allocation_limit), \
                 updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(patch.memory)
        .bind(patch.cpu)
        .bind(patch.disk)
        .bind(patch.database_limit)
        .bind(patch.backup_limit)
        .bind(patch.allocation_limit)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update server", e))?
        .ok_or_else(|| AppError::not_found(format!("Server {id} not found")))
    }

    /// Count the databases currently existing on a server.
    pub async fn database_count(&self, server_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM server_databases WHERE server_id = $1")
            .bind(server_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count databases", e))
    }

    /// Count the backups currently existing on a server.
    pub async fn backup_count(&self, server_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM server_backups WHERE server_id = $1")
            .bind(server_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count backups", e))
    }

    /// Count the allocations currently assigned to a server.
    pub async fn allocation_count(&self, server_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM server_allocations WHERE server_id = $1")
            .bind(server_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count allocations", e)
            })
    }

    /// Fetch all three child-entity counts for a server.
    pub async fn child_counts(&self, server_id: Uuid) -> AppResult<ChildCounts> {
        Ok(ChildCounts {
            databases: self.database_count(server_id).await?,
            backups: self.backup_count(server_id).await?,
            allocations: self.allocation_count(server_id).await?,
        })
    }
}
