//! Route definitions for the QuotaHub HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via
//! Axum's `State` extractor.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(quota_routes())
        .merge(server_routes())
        .merge(settings_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Per-user quota limits: read, partial update, adjust, remove
fn quota_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users/{user_id}/limits",
            get(handlers::quota::get_limits)
                .patch(handlers::quota::update_limits)
                .delete(handlers::quota::remove_limits),
        )
        .route(
            "/users/{user_id}/limits/adjust",
            post(handlers::quota::adjust_limits),
        )
}

/// Server resource view and validated edit
fn server_routes() -> Router<AppState> {
    Router::new().route(
        "/servers/{server_id}/resources",
        get(handlers::server::get_resources).patch(handlers::server::update_resources),
    )
}

/// Default and maximum resource settings
fn settings_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/settings/default-resources",
            get(handlers::settings::get_default_resources)
                .put(handlers::settings::put_default_resources),
        )
        .route(
            "/settings/max-resources",
            get(handlers::settings::get_max_resources).put(handlers::settings::put_max_resources),
        )
}

/// Service health
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
