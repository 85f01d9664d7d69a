//! Provisioned server resource snapshot.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::resources::ResourceType;

/// The resource columns of one provisioned server.
///
/// These are the server's *assigned* limits; summing them across a user's
/// servers yields the user's usage. There is no per-server `server_limit`
/// field — a server has no server count.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ServerResources {
    /// Unique server identifier.
    pub id: Uuid,
    /// The owning user.
    pub owner_id: Uuid,
    /// Human-readable name.
    pub name: String,
    /// Assigned memory in MB.
    pub memory: i64,
    /// Assigned CPU in percent.
    pub cpu: i64,
    /// Assigned disk in MB.
    pub disk: i64,
    /// Maximum databases this server may have.
    pub database_limit: i64,
    /// Maximum backups this server may have.
    pub backup_limit: i64,
    /// Maximum allocations this server may have.
    pub allocation_limit: i64,
}

impl ServerResources {
    /// Read one of the six per-server fields; `None` for `Servers`.
    pub fn resource(&self, resource: ResourceType) -> Option<i64> {
        match resource {
            ResourceType::Memory => Some(self.memory),
            ResourceType::Cpu => Some(self.cpu),
            ResourceType::Disk => Some(self.disk),
            ResourceType::Databases => Some(self.database_limit),
            ResourceType::Backups => Some(self.backup_limit),
            ResourceType::Allocations => Some(self.allocation_limit),
            ResourceType::Servers => None,
        }
    }
}

/// Partial update of a server's six resource fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerResourcePatch {
    /// Assigned memory in MB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<i64>,
    /// Assigned CPU in percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<i64>,
    /// Assigned disk in MB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk: Option<i64>,
    /// Maximum databases.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_limit: Option<i64>,
    /// Maximum backups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_limit: Option<i64>,
    /// Maximum allocations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocation_limit: Option<i64>,
}

impl ServerResourcePatch {
    /// Read one field by resource type; `Servers` is not a server field.
    pub fn get(&self, resource: ResourceType) -> Option<i64> {
        match resource {
            ResourceType::Memory => self.memory,
            ResourceType::Cpu => self.cpu,
            ResourceType::Disk => self.disk,
            ResourceType::Databases => self.database_limit,
            ResourceType::Backups => self.backup_limit,
            ResourceType::Allocations => self.allocation_limit,
            ResourceType::Servers => None,
        }
    }

    /// The set fields as `(resource, value)` pairs.
    pub fn entries(&self) -> Vec<(ResourceType, i64)> {
        ResourceType::PER_SERVER
            .iter()
            .filter_map(|&resource| self.get(resource).map(|value| (resource, value)))
            .collect()
    }

    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

/// Live counts of a server's child entities.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ChildCounts {
    /// Databases currently existing on the server.
    pub databases: i64,
    /// Backups currently existing on the server.
    pub backups: i64,
    /// Allocations currently assigned to the server.
    pub allocations: i64,
}

impl ChildCounts {
    /// The current count backing a resource field, if that field counts
    /// child entities.
    pub fn for_resource(&self, resource: ResourceType) -> Option<i64> {
        match resource {
            ResourceType::Databases => Some(self.databases),
            ResourceType::Backups => Some(self.backups),
            ResourceType::Allocations => Some(self.allocations),
            _ => None,
        }
    }
}
