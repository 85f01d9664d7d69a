//! Per-user quota management.
//!
//! The exposed quota contract: ensure-read, validated partial update
//! under the configured maximums, atomic delta adjustment, removal.
//! Every operation is guarded by a user existence check.

use std::sync::Arc;

use uuid::Uuid;

use quotahub_core::error::{AppError, Violation};
use quotahub_core::result::AppResult;
use quotahub_database::repositories::quota::QuotaRepository;
use quotahub_database::repositories::user::UserRepository;
use quotahub_entity::quota::QuotaRecord;
use quotahub_entity::resources::{ResourcePatch, ResourceType};

use crate::settings::SettingsService;

/// Manages per-user quota records.
#[derive(Debug, Clone)]
pub struct QuotaService {
    /// Quota record repository.
    quota_repo: Arc<QuotaRepository>,
    /// User repository.
    user_repo: Arc<UserRepository>,
    /// Resource settings resolver.
    settings: Arc<SettingsService>,
}

impl QuotaService {
    /// Creates a new quota service.
    pub fn new(
        quota_repo: Arc<QuotaRepository>,
        user_repo: Arc<UserRepository>,
        settings: Arc<SettingsService>,
    ) -> Self {
        Self {
            quota_repo,
            user_repo,
            settings,
        }
    }

    /// The user's quota record, created from the configured defaults if
    /// absent.
    pub async fn limits(&self, user_id: Uuid) -> AppResult<QuotaRecord> {
        self.guard_user(user_id).await?;
        let defaults = self.settings.default_resources().await?;
        self.quota_repo.ensure_for_user(user_id, &defaults).await
    }

    /// Update any subset of the user's limits.
    ///
    /// Every requested field is validated (non-negative, within the
    /// configured maximums) and all violations are reported together.
    pub async fn update(&self, user_id: Uuid, patch: &ResourcePatch) -> AppResult<QuotaRecord> {
        self.guard_user(user_id).await?;

        if patch.is_empty() {
            return Err(AppError::validation("No resource fields provided"));
        }
        let violations = validate_non_negative(patch);
        if !violations.is_empty() {
            return Err(AppError::rejected(violations));
        }

        let defaults = self.settings.default_resources().await?;
        let max = self.settings.max_resources().await?;
        self.quota_repo
            .update_for_user(user_id, patch, &defaults, &max)
            .await
    }

    /// Apply a signed delta to one of the user's resource fields.
    pub async fn adjust(
        &self,
        user_id: Uuid,
        resource: ResourceType,
        delta: i64,
    ) -> AppResult<QuotaRecord> {
        self.guard_user(user_id).await?;
        let defaults = self.settings.default_resources().await?;
        let max = self.settings.max_resources().await?;
        let record = self
            .quota_repo
            .adjust(user_id, resource, delta, &defaults, &max)
            .await?;
        tracing::debug!(%user_id, %resource, delta, "Adjusted quota");
        Ok(record)
    }

    /// Remove the user's quota record.
    pub async fn remove(&self, user_id: Uuid) -> AppResult<bool> {
        self.guard_user(user_id).await?;
        self.quota_repo.delete_for_user(user_id).await
    }

    async fn guard_user(&self, user_id: Uuid) -> AppResult<()> {
        if self.user_repo.exists(user_id).await? {
            Ok(())
        } else {
            Err(AppError::not_found(format!("User {user_id} not found")))
        }
    }
}

/// Collect a violation for every negative field in the patch.
pub fn validate_non_negative(patch: &ResourcePatch) -> Vec<Violation> {
    patch
        .entries()
        .into_iter()
        .filter(|&(_, value)| value < 0)
        .map(|(resource, _)| Violation::new(resource.as_str(), "must not be negative"))
        .collect()
}
