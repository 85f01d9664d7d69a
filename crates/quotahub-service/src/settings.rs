//! Resource settings resolution.
//!
//! Two named vectors live in the panel settings store: the defaults
//! assigned to new users and the per-field maximums. Both must always
//! resolve to a complete vector — stored JSON is merged over the
//! structural defaults on every read, so missing keys are backfilled and
//! explicit zeros survive.

use std::sync::Arc;

use quotahub_core::result::AppResult;
use quotahub_database::repositories::settings::SettingsRepository;
use quotahub_entity::resources::{ResourcePatch, ResourceSet};

/// The settings namespace owned by this addon.
const NAMESPACE: &str = "quotahub";
/// Key of the default resource vector assigned to new users.
const DEFAULT_RESOURCES_KEY: &str = "default_resources";
/// Key of the per-field maximum vector (0 = unlimited).
const MAX_RESOURCES_KEY: &str = "max_resources";

/// Resolves and persists the configured resource vectors.
#[derive(Debug, Clone)]
pub struct SettingsService {
    /// Settings repository.
    settings_repo: Arc<SettingsRepository>,
}

impl SettingsService {
    /// Creates a new settings service.
    pub fn new(settings_repo: Arc<SettingsRepository>) -> Self {
        Self { settings_repo }
    }

    /// The resource vector assigned to users without a quota record.
    pub async fn default_resources(&self) -> AppResult<ResourceSet> {
        let stored = self.settings_repo.get(NAMESPACE, DEFAULT_RESOURCES_KEY).await?;
        Ok(resolve_stored(
            stored.as_deref(),
            &ResourceSet::structural_defaults(),
        ))
    }

    /// The per-field ceilings quota updates may not exceed (0 = unlimited).
    pub async fn max_resources(&self) -> AppResult<ResourceSet> {
        let stored = self.settings_repo.get(NAMESPACE, MAX_RESOURCES_KEY).await?;
        Ok(resolve_stored(
            stored.as_deref(),
            &ResourceSet::structural_maximums(),
        ))
    }

    /// Store the default resource vector; unset fields are backfilled
    /// from the structural defaults before writing.
    pub async fn set_default_resources(&self, patch: &ResourcePatch) -> AppResult<ResourceSet> {
        self.store(
            DEFAULT_RESOURCES_KEY,
            patch,
            &ResourceSet::structural_defaults(),
        )
        .await
    }

    /// Store the maximum resource vector; unset fields are backfilled
    /// from the structural maximums before writing.
    pub async fn set_max_resources(&self, patch: &ResourcePatch) -> AppResult<ResourceSet> {
        self.store(
            MAX_RESOURCES_KEY,
            patch,
            &ResourceSet::structural_maximums(),
        )
        .await
    }

    async fn store(
        &self,
        key: &str,
        patch: &ResourcePatch,
        base: &ResourceSet,
    ) -> AppResult<ResourceSet> {
        let merged = patch.apply_to(base);
        let json = serde_json::to_string(&merged)?;
        self.settings_repo.set(NAMESPACE, key, &json).await?;
        tracing::info!(key, "Stored resource settings");
        Ok(merged)
    }
}

/// Resolve a stored settings blob over a complete structural base.
///
/// The panel historically stores settings HTML-entity-encoded, so entities
/// are decoded before parsing. A missing key or a blob that fails to parse
/// yields the structural base, never an error.
pub fn resolve_stored(stored: Option<&str>, base: &ResourceSet) -> ResourceSet {
    let Some(raw) = stored else {
        return *base;
    };
    let decoded = decode_html_entities(raw);
    match serde_json::from_str::<ResourcePatch>(&decoded) {
        Ok(patch) => patch.apply_to(base),
        Err(e) => {
            tracing::warn!(error = %e, "Stored resource settings are not valid JSON, using structural defaults");
            *base
        }
    }
}

/// Decode the HTML entities panel storage produces around JSON values.
fn decode_html_entities(raw: &str) -> String {
    raw.replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
