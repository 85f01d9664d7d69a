//! Application state shared across all handlers.

use std::sync::Arc;

use sqlx::PgPool;

use quotahub_core::config::AppConfig;
use quotahub_service::quota::QuotaService;
use quotahub_service::server_resources::ServerResourceService;
use quotahub_service::settings::SettingsService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool.
    pub db_pool: PgPool,
    /// Per-user quota management.
    pub quota_service: Arc<QuotaService>,
    /// Server-resource views and validated edits.
    pub server_resource_service: Arc<ServerResourceService>,
    /// Resource settings resolution.
    pub settings_service: Arc<SettingsService>,
}
