//! The quota accounting engine.
//!
//! Usage is *allocated capacity*: the sum of the limits assigned to a
//! user's provisioned servers, never live consumption. Everything here is
//! a derivation over the quota record, the server list, and the settings
//! vectors; the engine itself never mutates state.

use std::sync::Arc;

use uuid::Uuid;

use quotahub_core::result::AppResult;
use quotahub_database::repositories::quota::QuotaRepository;
use quotahub_database::repositories::server::ServerRepository;
use quotahub_entity::resources::{ResourceSet, ResourceType};
use quotahub_entity::server::ServerResources;
use quotahub_entity::usage::OverflowReport;

use crate::settings::SettingsService;

/// Derives used/available/overflow figures for a user.
#[derive(Debug, Clone)]
pub struct AccountingService {
    /// Quota record repository.
    quota_repo: Arc<QuotaRepository>,
    /// Server repository.
    server_repo: Arc<ServerRepository>,
    /// Resource settings resolver.
    settings: Arc<SettingsService>,
}

impl AccountingService {
    /// Creates a new accounting service.
    pub fn new(
        quota_repo: Arc<QuotaRepository>,
        server_repo: Arc<ServerRepository>,
        settings: Arc<SettingsService>,
    ) -> Self {
        Self {
            quota_repo,
            server_repo,
            settings,
        }
    }

    /// The user's limits, falling back to the configured defaults when no
    /// record exists. Never creates a row.
    pub async fn limits_or_default(&self, user_id: Uuid) -> AppResult<ResourceSet> {
        match self.quota_repo.find_by_user(user_id).await? {
            Some(record) => Ok(record.limits()),
            None => self.settings.default_resources().await,
        }
    }

    /// Usage summed over the user's servers, skipping any in `exclude`.
    pub async fn used(&self, user_id: Uuid, exclude: &[Uuid]) -> AppResult<ResourceSet> {
        let servers = self.server_repo.find_by_owner(user_id).await?;
        Ok(sum_server_usage(&servers, exclude))
    }

    /// Headroom per field: `max(0, limit - used)` with the same exclusion
    /// set as [`used`](Self::used).
    pub async fn available(&self, user_id: Uuid, exclude: &[Uuid]) -> AppResult<ResourceSet> {
        let limits = self.limits_or_default(user_id).await?;
        let used = self.used(user_id, exclude).await?;
        Ok(limits.available(&used))
    }

    /// Aggregate overflow across all seven resource types.
    pub async fn overflow(&self, user_id: Uuid) -> AppResult<OverflowReport> {
        let limits = self.limits_or_default(user_id).await?;
        let used = self.used(user_id, &[]).await?;
        Ok(OverflowReport::aggregate(&limits, &used))
    }
}

/// Sum the six per-server resource fields over every server not in
/// `exclude`; the `server_limit` usage is the number of servers counted.
pub fn sum_server_usage(servers: &[ServerResources], exclude: &[Uuid]) -> ResourceSet {
    let mut used = ResourceSet::default();
    for server in servers {
        if exclude.contains(&server.id) {
            continue;
        }
        used.server_limit += 1;
        for resource in ResourceType::PER_SERVER {
            if let Some(value) = server.resource(resource) {
                used.add(resource, value);
            }
        }
    }
    used
}
