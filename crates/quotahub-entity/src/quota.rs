//! Per-user quota record entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::resources::ResourceSet;

/// One row of the `user_resource_limits` table.
///
/// Holds the seven resource ceilings for a single user. At most one row
/// exists per user; the row is created lazily on first quota read or
/// write and cascade-deleted with the owning user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuotaRecord {
    /// Surrogate key.
    pub id: Uuid,
    /// The user these limits belong to.
    pub user_id: Uuid,
    /// Memory limit in MB.
    pub memory_limit: i64,
    /// CPU limit in percent (100 = one core).
    pub cpu_limit: i64,
    /// Disk limit in MB.
    pub disk_limit: i64,
    /// Maximum number of servers.
    pub server_limit: i64,
    /// Maximum number of databases.
    pub database_limit: i64,
    /// Maximum number of backups.
    pub backup_limit: i64,
    /// Maximum number of allocations.
    pub allocation_limit: i64,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl QuotaRecord {
    /// The record's limits as a resource vector.
    pub fn limits(&self) -> ResourceSet {
        ResourceSet {
            memory_limit: self.memory_limit,
            cpu_limit: self.cpu_limit,
            disk_limit: self.disk_limit,
            server_limit: self.server_limit,
            database_limit: self.database_limit,
            backup_limit: self.backup_limit,
            allocation_limit: self.allocation_limit,
        }
    }
}
