//! Per-user quota limit handlers.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use uuid::Uuid;

use quotahub_entity::resources::{ResourcePatch, ResourceType};

use crate::error::ApiError;
use crate::state::AppState;

/// Body of an atomic quota adjustment request.
#[derive(Debug, Clone, Deserialize)]
pub struct AdjustRequest {
    /// The resource field to adjust.
    pub resource: ResourceType,
    /// Signed delta to apply.
    pub delta: i64,
}

/// GET /api/users/{user_id}/limits
pub async fn get_limits(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let record = state.quota_service.limits(user_id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": record })))
}

/// PATCH /api/users/{user_id}/limits
pub async fn update_limits(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(patch): Json<ResourcePatch>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let record = state.quota_service.update(user_id, &patch).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": record })))
}

/// POST /api/users/{user_id}/limits/adjust
pub async fn adjust_limits(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<AdjustRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let record = state
        .quota_service
        .adjust(user_id, req.resource, req.delta)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": record })))
}

/// DELETE /api/users/{user_id}/limits
pub async fn remove_limits(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let removed = state.quota_service.remove(user_id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": { "removed": removed } }),
    ))
}
