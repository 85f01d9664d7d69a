//! QuotaHub Server — resource-quota accounting for a hosting panel.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use quotahub_api::state::AppState;
use quotahub_core::config::AppConfig;
use quotahub_core::error::AppError;
use quotahub_database::connection::DatabasePool;
use quotahub_database::repositories::quota::QuotaRepository;
use quotahub_database::repositories::server::ServerRepository;
use quotahub_database::repositories::settings::SettingsRepository;
use quotahub_database::repositories::user::UserRepository;
use quotahub_service::accounting::AccountingService;
use quotahub_service::quota::QuotaService;
use quotahub_service::server_resources::ServerResourceService;
use quotahub_service::settings::SettingsService;

#[tokio::main]
async fn main() {
    let env = std::env::var("QUOTAHUB_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting QuotaHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Database connection + migrations ─────────────────────────
    let db = DatabasePool::connect(&config.database).await?;
    quotahub_database::migration::run_migrations(db.pool()).await?;
    let pool = db.into_pool();

    // ── Repositories ─────────────────────────────────────────────
    let quota_repo = Arc::new(QuotaRepository::new(pool.clone()));
    let server_repo = Arc::new(ServerRepository::new(pool.clone()));
    let user_repo = Arc::new(UserRepository::new(pool.clone()));
    let settings_repo = Arc::new(SettingsRepository::new(pool.clone()));

    // ── Services ─────────────────────────────────────────────────
    let settings_service = Arc::new(SettingsService::new(Arc::clone(&settings_repo)));
    let accounting = Arc::new(AccountingService::new(
        Arc::clone(&quota_repo),
        Arc::clone(&server_repo),
        Arc::clone(&settings_service),
    ));
    let quota_service = Arc::new(QuotaService::new(
        Arc::clone(&quota_repo),
        Arc::clone(&user_repo),
        Arc::clone(&settings_service),
    ));
    let server_resource_service = Arc::new(ServerResourceService::new(
        Arc::clone(&server_repo),
        Arc::clone(&accounting),
    ));

    // ── HTTP server ──────────────────────────────────────────────
    let state = AppState {
        config: Arc::new(config.clone()),
        db_pool: pool,
        quota_service,
        server_resource_service,
        settings_service,
    };

    let app = quotahub_api::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("QuotaHub server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    tracing::info!("QuotaHub server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
