//! Resource type vocabulary and limit vectors.
//!
//! Every quota figure in the system — stored limits, configured defaults
//! and maximums, derived usage — is a vector over the same seven resource
//! fields, so the vector is a fixed-field struct rather than a map.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The seven resource fields tracked per user.
///
/// String forms match the stored column names and the JSON keys of the
/// external contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    /// Memory in MB.
    #[serde(rename = "memory_limit")]
    Memory,
    /// CPU in percent (100 = one core).
    #[serde(rename = "cpu_limit")]
    Cpu,
    /// Disk in MB.
    #[serde(rename = "disk_limit")]
    Disk,
    /// Number of servers.
    #[serde(rename = "server_limit")]
    Servers,
    /// Number of databases.
    #[serde(rename = "database_limit")]
    Databases,
    /// Number of backups.
    #[serde(rename = "backup_limit")]
    Backups,
    /// Number of network allocations.
    #[serde(rename = "allocation_limit")]
    Allocations,
}

impl ResourceType {
    /// All seven resource types.
    pub const ALL: [ResourceType; 7] = [
        Self::Memory,
        Self::Cpu,
        Self::Disk,
        Self::Servers,
        Self::Databases,
        Self::Backups,
        Self::Allocations,
    ];

    /// The six types a single server carries itself.
    ///
    /// `Servers` is a count of servers, not a per-server field.
    pub const PER_SERVER: [ResourceType; 6] = [
        Self::Memory,
        Self::Cpu,
        Self::Disk,
        Self::Databases,
        Self::Backups,
        Self::Allocations,
    ];

    /// The stored column / JSON key name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory_limit",
            Self::Cpu => "cpu_limit",
            Self::Disk => "disk_limit",
            Self::Servers => "server_limit",
            Self::Databases => "database_limit",
            Self::Backups => "backup_limit",
            Self::Allocations => "allocation_limit",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = UnknownResourceType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "memory_limit" => Ok(Self::Memory),
            "cpu_limit" => Ok(Self::Cpu),
            "disk_limit" => Ok(Self::Disk),
            "server_limit" => Ok(Self::Servers),
            "database_limit" => Ok(Self::Databases),
            "backup_limit" => Ok(Self::Backups),
            "allocation_limit" => Ok(Self::Allocations),
            _ => Err(UnknownResourceType(s.to_string())),
        }
    }
}

/// Error returned when parsing an unrecognized resource type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownResourceType(pub String);

impl fmt::Display for UnknownResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown resource type '{}'", self.0)
    }
}

impl std::error::Error for UnknownResourceType {}

/// Check whether `value` exceeds a ceiling, honoring the unlimited
/// convention: a ceiling of 0 means unlimited and is never exceeded.
pub fn exceeds_limit(limit: i64, value: i64) -> bool {
    limit > 0 && value > limit
}

/// A complete vector over the seven resource fields.
///
/// Used for stored limits, configured defaults/maximums, and derived
/// usage/availability figures alike.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSet {
    /// Memory limit in MB.
    pub memory_limit: i64,
    /// CPU limit in percent.
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
}

impl ResourceSet {
    /// The structural defaults assigned to new users when no
    /// `default_resources` setting is stored.
    pub fn structural_defaults() -> Self {
        Self {
            memory_limit: 2048,
            cpu_limit: 100,
            disk_limit: 4096,
            server_limit: 1,
            database_limit: 3,
            backup_limit: 5,
            allocation_limit: 5,
        }
    }

    /// The structural per-field ceilings used when no `max_resources`
    /// setting is stored. A value of 0 would mean unlimited.
    pub fn structural_maximums() -> Self {
        Self {
            memory_limit: 65536,
            cpu_limit: 1000,
            disk_limit: 131072,
            server_limit: 50,
            database_limit: 100,
            backup_limit: 200,
            allocation_limit: 200,
        }
    }

    /// Read one field by resource type.
    pub fn get(&self, resource: ResourceType) -> i64 {
        match resource {
            ResourceType::Memory => self.memory_limit,
            ResourceType::Cpu => self.cpu_limit,
            ResourceType::Disk => self.disk_limit,
            ResourceType::Servers => self.server_limit,
            ResourceType::Databases => self.database_limit,
            ResourceType::Backups => self.backup_limit,
            ResourceType::Allocations => self.allocation_limit,
        }
    }

    /// Write one field by resource type.
    pub fn set(&mut self, resource: ResourceType, value: i64) {
        match resource {
            ResourceType::Memory => self.memory_limit = value,
            ResourceType::Cpu => self.cpu_limit = value,
            ResourceType::Disk => self.disk_limit = value,
            ResourceType::Servers => self.server_limit = value,
            ResourceType::Databases => self.database_limit = value,
            ResourceType::Backups => self.backup_limit = value,
            ResourceType::Allocations => self.allocation_limit = value,
        }
    }

    /// Add to one field by resource type.
    pub fn add(&mut self, resource: ResourceType, delta: i64) {
        let current = self.get(resource);
        self.set(resource, current + delta);
    }

    /// Field-wise `max(0, self - used)`.
    pub fn available(&self, used: &ResourceSet) -> ResourceSet {
        let mut out = ResourceSet::default();
        for resource in ResourceType::ALL {
            out.set(resource, (self.get(resource) - used.get(resource)).max(0));
        }
        out
    }
}

/// A partial vector over the seven resource fields.
///
/// Deserialized from client payloads and stored settings JSON; unknown
/// keys are rejected at this boundary so the engine only ever sees the
/// seven named fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourcePatch {
    /// Memory limit in MB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_limit: Option<i64>,
    /// CPU limit in percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_limit: Option<i64>,
    /// Disk limit in MB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_limit: Option<i64>,
    /// Maximum number of servers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_limit: Option<i64>,
    /// Maximum number of databases.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_limit: Option<i64>,
    /// Maximum number of backups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_limit: Option<i64>,
    /// Maximum number of allocations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocation_limit: Option<i64>,
}

impl ResourcePatch {
    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Read one field by resource type.
    pub fn get(&self, resource: ResourceType) -> Option<i64> {
        match resource {
            ResourceType::Memory => self.memory_limit,
            ResourceType::Cpu => self.cpu_limit,
            ResourceType::Disk => self.disk_limit,
            ResourceType::Servers => self.server_limit,
            ResourceType::Databases => self.database_limit,
            ResourceType::Backups => self.backup_limit,
            ResourceType::Allocations => self.allocation_limit,
        }
    }

    /// The set fields as `(resource, value)` pairs.
    pub fn entries(&self) -> Vec<(ResourceType, i64)> {
        ResourceType::ALL
            .iter()
            .filter_map(|&resource| self.get(resource).map(|value| (resource, value)))
            .collect()
    }

    /// Merge this patch over a complete base vector. Set fields win,
    /// missing fields are backfilled from the base.
    pub fn apply_to(&self, base: &ResourceSet) -> ResourceSet {
        let mut out = *base;
        for (resource, value) in self.entries() {
            out.set(resource, value);
        }
        out
    }
}
