//! Server resource handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use quotahub_entity::server::ServerResourcePatch;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/servers/{server_id}/resources
pub async fn get_resources(
    State(state): State<AppState>,
    Path(server_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let view = state.server_resource_service.view(server_id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": view })))
}

/// PATCH /api/servers/{server_id}/resources
pub async fn update_resources(
    State(state): State<AppState>,
    Path(server_id): Path<Uuid>,
    Json(patch): Json<ServerResourcePatch>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let server = state
        .server_resource_service
        .update(server_id, &patch)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": server })))
}
