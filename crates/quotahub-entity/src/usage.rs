//! Derived usage and overflow reports.
//!
//! Everything in this module is recomputed on every read and never
//! persisted.

use serde::{Deserialize, Serialize};

use crate::resources::{ResourceSet, ResourceType, exceeds_limit};
use crate::server::ServerResources;

/// One resource field whose usage exceeds its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overflow {
    /// The offending resource field.
    pub resource: ResourceType,
    /// The derived usage figure.
    pub used: i64,
    /// The limit it exceeds.
    pub limit: i64,
}

/// The set of resource fields in overflow for a user or a server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverflowReport {
    /// Offending fields with their used/limit pair.
    pub entries: Vec<Overflow>,
}

impl OverflowReport {
    /// Aggregate overflow across all seven resource types, including the
    /// server count.
    pub fn aggregate(limits: &ResourceSet, used: &ResourceSet) -> Self {
        let entries = ResourceType::ALL
            .iter()
            .filter_map(|&resource| {
                let limit = limits.get(resource);
                let used = used.get(resource);
                exceeds_limit(limit, used).then_some(Overflow {
                    resource,
                    used,
                    limit,
                })
            })
            .collect();
        Self { entries }
    }

    /// One server's own six resource fields against the user's total
    /// limits. Catches a single over-provisioned server even before the
    /// aggregate overflows. The server count has no per-server field and
    /// never appears here.
    pub fn for_server(limits: &ResourceSet, server: &ServerResources) -> Self {
        let entries = ResourceType::PER_SERVER
            .iter()
            .filter_map(|&resource| {
                let limit = limits.get(resource);
                let used = server.resource(resource)?;
                exceeds_limit(limit, used).then_some(Overflow {
                    resource,
                    used,
                    limit,
                })
            })
            .collect();
        Self { entries }
    }

    /// Whether any field is in overflow.
    pub fn is_overflowing(&self) -> bool {
        !self.entries.is_empty()
    }
}

/// The composite server-resource read: everything a caller needs to
/// render or validate one server's allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerResourceView {
    /// The server's own assigned resources.
    pub server: ServerResources,
    /// The owning user's total limits.
    pub limits: ResourceSet,
    /// Usage summed over all of the user's servers.
    pub used: ResourceSet,
    /// Usage summed over the user's other servers.
    pub used_excluding_self: ResourceSet,
    /// Headroom for display: `max(0, limits - used)`.
    pub available: ResourceSet,
    /// Headroom for editing this server: `max(0, limits - used_excluding_self)`.
    pub available_for_editing: ResourceSet,
    /// This server's own fields against the user's limits.
    pub server_overflow: OverflowReport,
    /// Aggregate overflow across all the user's servers.
    pub overflow: OverflowReport,
}
