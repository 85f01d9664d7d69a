//! Shared test helpers for integration tests.
//!
//! Every test creates its own users and servers with unique names, so
//! tests stay independent under the default parallel test runner.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

use quotahub_api::state::AppState;
use quotahub_core::config::{AppConfig, DatabaseConfig, LoggingConfig, ServerConfig};
use quotahub_database::repositories::quota::QuotaRepository;
use quotahub_database::repositories::server::ServerRepository;
use quotahub_database::repositories::settings::SettingsRepository;
use quotahub_database::repositories::user::UserRepository;
use quotahub_service::accounting::AccountingService;
use quotahub_service::quota::QuotaService;
use quotahub_service::server_resources::ServerResourceService;
use quotahub_service::settings::SettingsService;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Database pool for direct queries
    pub db_pool: PgPool,
    /// Quota repository for direct store-level tests
    pub quota_repo: Arc<QuotaRepository>,
    /// Server repository
    pub server_repo: Arc<ServerRepository>,
}

impl TestApp {
    /// Create a new test application, or `None` when no test database is
    /// configured.
    pub async fn new() -> Option<Self> {
        let Ok(url) = std::env::var("QUOTAHUB_TEST_DATABASE_URL") else {
            eprintln!("QUOTAHUB_TEST_DATABASE_URL not set, skipping integration test");
            return None;
        };

        let db_pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&url)
            .await
            .expect("Failed to connect to test database");

        quotahub_database::migration::run_migrations(&db_pool)
            .await
            .expect("Failed to run migrations");

        let config = AppConfig {
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url,
                max_connections: 10,
                min_connections: 1,
                connect_timeout_seconds: 5,
                idle_timeout_seconds: 60,
            },
            logging: LoggingConfig::default(),
        };

        let quota_repo = Arc::new(QuotaRepository::new(db_pool.clone()));
        let server_repo = Arc::new(ServerRepository::new(db_pool.clone()));
        let user_repo = Arc::new(UserRepository::new(db_pool.clone()));
        let settings_repo = Arc::new(SettingsRepository::new(db_pool.clone()));

        let settings_service = Arc::new(SettingsService::new(settings_repo));
        let accounting = Arc::new(AccountingService::new(
            Arc::clone(&quota_repo),
            Arc::clone(&server_repo),
            Arc::clone(&settings_service),
        ));
        let quota_service = Arc::new(QuotaService::new(
            Arc::clone(&quota_repo),
            user_repo,
            Arc::clone(&settings_service),
        ));
        let server_resource_service = Arc::new(ServerResourceService::new(
            Arc::clone(&server_repo),
            accounting,
        ));

        let state = AppState {
            config: Arc::new(config),
            db_pool: db_pool.clone(),
            quota_service,
            server_resource_service,
            settings_service,
        };

        let router = quotahub_api::build_router(state);

        Some(Self {
            router,
            db_pool,
            quota_repo,
            server_repo,
        })
    }

    /// Create a test user with a unique name and return their ID.
    pub async fn create_user(&self) -> Uuid {
        let id = Uuid::new_v4();
        let name = format!("user-{id}");

        sqlx::query("INSERT INTO users (id, username, email) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(&name)
            .bind(format!("{name}@test.com"))
            .execute(&self.db_pool)
            .await
            .expect("Failed to create test user");

        id
    }

    /// Create a server with the given resource fields and return its ID.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_server(
        &self,
        owner_id: Uuid,
        memory: i64,
        cpu: i64,
        disk: i64,
        database_limit: i64,
        backup_limit: i64,
        allocation_limit: i64,
    ) -> Uuid {
        let id = Uuid::new_v4();

        sqlx::query(
            "INSERT INTO servers \
             (id, owner_id, name, memory, cpu, disk, database_limit, backup_limit, allocation_limit) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(id)
        .bind(owner_id)
        .bind(format!("server-{id}"))
        .bind(memory)
        .bind(cpu)
        .bind(disk)
        .bind(database_limit)
        .bind(backup_limit)
        .bind(allocation_limit)
        .execute(&self.db_pool)
        .await
        .expect("Failed to create test server");

        id
    }

    /// Add a database to a server.
    pub async fn add_database(&self, server_id: Uuid) {
        sqlx::query("INSERT INTO server_databases (server_id, name) VALUES ($1, $2)")
            .bind(server_id)
            .bind(format!("db-{}", Uuid::new_v4()))
            .execute(&self.db_pool)
            .await
            .expect("Failed to create test database row");
    }

    /// Add a backup to a server.
    pub async fn add_backup(&self, server_id: Uuid) {
        sqlx::query("INSERT INTO server_backups (server_id, name) VALUES ($1, $2)")
            .bind(server_id)
            .bind(format!("backup-{}", Uuid::new_v4()))
            .execute(&self.db_pool)
            .await
            .expect("Failed to create test backup row");
    }

    /// Count quota records for a user.
    pub async fn quota_row_count(&self, user_id: Uuid) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM user_resource_limits WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.db_pool)
            .await
            .expect("Failed to count quota rows")
    }

    /// Make an HTTP request to the test app.
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}
