//! Server-resource views and validated edits.
//!
//! Editing one server's allocation is the only path that can grow a
//! user's usage, so it carries the full validation sequence: floors,
//! child-entity minima, per-value and aggregate ceiling checks, and the
//! overflow gate. Violations are aggregated per field and the edit is
//! committed only when every requested field passes.

use std::sync::Arc;

use uuid::Uuid;

use quotahub_core::error::{AppError, Violation};
use quotahub_core::result::AppResult;
use quotahub_database::repositories::server::ServerRepository;
use quotahub_entity::resources::{ResourceSet, ResourceType, exceeds_limit};
use quotahub_entity::server::{ChildCounts, ServerResourcePatch, ServerResources};
use quotahub_entity::usage::{OverflowReport, ServerResourceView};

use crate::accounting::AccountingService;

/// Reads and validates per-server resource allocations.
#[derive(Debug, Clone)]
pub struct ServerResourceService {
    /// Server repository.
    server_repo: Arc<ServerRepository>,
    /// Accounting engine.
    accounting: Arc<AccountingService>,
}

impl ServerResourceService {
    /// Creates a new server resource service.
    pub fn new(server_repo: Arc<ServerRepository>, accounting: Arc<AccountingService>) -> Self {
        Self {
            server_repo,
            accounting,
        }
    }

    /// The composite read for one server: its own limits, the owner's
    /// totals, usage with and without this server, both availability
    /// vectors, and both overflow reports.
    pub async fn view(&self, server_id: Uuid) -> AppResult<ServerResourceView> {
        let server = self.find_server(server_id).await?;
        let limits = self.accounting.limits_or_default(server.owner_id).await?;
        let used = self.accounting.used(server.owner_id, &[]).await?;
        let used_excluding_self = self.accounting.used(server.owner_id, &[server_id]).await?;

        Ok(ServerResourceView {
            limits,
            available: limits.available(&used),
            available_for_editing: limits.available(&used_excluding_self),
            server_overflow: OverflowReport::for_server(&limits, &server),
            overflow: OverflowReport::aggregate(&limits, &used),
            used,
            used_excluding_self,
            server,
        })
    }

    /// Validate and commit an edit to a server's resource fields.
    ///
    /// Usage and availability are recomputed excluding the server under
    /// edit; all field violations are aggregated into one rejection, and
    /// a fully valid patch is applied in a single atomic update.
    pub async fn update(
        &self,
        server_id: Uuid,
        patch: &ServerResourcePatch,
    ) -> AppResult<ServerResources> {
        let server = self.find_server(server_id).await?;

        if patch.is_empty() {
            return Err(AppError::validation("No resource fields provided"));
        }

        let limits = self.accounting.limits_or_default(server.owner_id).await?;
        let used = self.accounting.used(server.owner_id, &[]).await?;
        let used_by_others = self.accounting.used(server.owner_id, &[server_id]).await?;
        let counts = self.server_repo.child_counts(server_id).await?;
        let overflow = OverflowReport::aggregate(&limits, &used);

        let violations = validate_server_patch(patch, &limits, &used_by_others, &counts, &overflow);
        if !violations.is_empty() {
            tracing::debug!(%server_id, count = violations.len(), "Rejected server resource edit");
            return Err(AppError::rejected(violations));
        }

        self.server_repo.update_resources(server_id, patch).await
    }

    async fn find_server(&self, server_id: Uuid) -> AppResult<ServerResources> {
        self.server_repo
            .find_by_id(server_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Server {server_id} not found")))
    }
}

/// The per-server edit validation sequence.
///
/// A user already in aggregate overflow may not edit any server until the
/// overflow is resolved; otherwise each requested field is checked against
/// its floor, the server's existing child-entity count, the user's total
/// limit, and the headroom left by the user's other servers. One
/// violation is reported per offending field.
pub fn validate_server_patch(
    patch: &ServerResourcePatch,
    limits: &ResourceSet,
    used_by_others: &ResourceSet,
    counts: &ChildCounts,
    overflow: &OverflowReport,
) -> Vec<Violation> {
    if overflow.is_overflowing() {
        return overflow
            .entries
            .iter()
            .map(|entry| {
                Violation::new(
                    entry.resource.as_str(),
                    format!(
                        "account is over its {} limit ({} used of {}); reduce usage before editing servers",
                        entry.resource, entry.used, entry.limit
                    ),
                )
            })
            .collect();
    }

    let mut violations = Vec::new();
    for (resource, value) in patch.entries() {
        let field = server_field_name(resource);
        let floor = match resource {
            ResourceType::Memory
            | ResourceType::Cpu
            | ResourceType::Disk
            | ResourceType::Allocations => 1,
            _ => 0,
        };
        if value < floor {
            violations.push(Violation::new(field, format!("must be at least {floor}")));
            continue;
        }

        if let Some(count) = counts.for_resource(resource) {
            if value < count {
                violations.push(Violation::new(
                    field,
                    format!(
                        "cannot be less than current {} ({count})",
                        child_noun(resource)
                    ),
                ));
                continue;
            }
        }

        let limit = limits.get(resource);
        if exceeds_limit(limit, value) {
            violations.push(Violation::new(
                field,
                format!("{value} exceeds the total limit of {limit}"),
            ));
            continue;
        }

        let others = used_by_others.get(resource);
        if limit > 0 && others + value > limit {
            violations.push(Violation::new(
                field,
                format!(
                    "only {} available ({others} of {limit} in use by other servers)",
                    limit - others
                ),
            ));
        }
    }
    violations
}

/// The server column a per-server resource maps to. The capacity fields
/// drop the `_limit` suffix on the server row.
fn server_field_name(resource: ResourceType) -> &'static str {
    match resource {
        ResourceType::Memory => "memory",
        ResourceType::Cpu => "cpu",
        ResourceType::Disk => "disk",
        other => other.as_str(),
    }
}

fn child_noun(resource: ResourceType) -> &'static str {
    match resource {
        ResourceType::Databases => "databases",
        ResourceType::Backups => "backups",
        ResourceType::Allocations => "allocations",
        _ => "entities",
    }
}
