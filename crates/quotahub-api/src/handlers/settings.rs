//! Resource settings handlers.

use axum::Json;
use axum::extract::State;

use quotahub_entity::resources::ResourcePatch;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/settings/default-resources
pub async fn get_default_resources(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let resources = state.settings_service.default_resources().await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": resources }),
    ))
}

/// PUT /api/settings/default-resources
pub async fn put_default_resources(
    State(state): State<AppState>,
    Json(patch): Json<ResourcePatch>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let resources = state.settings_service.set_default_resources(&patch).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": resources }),
    ))
}

/// GET /api/settings/max-resources
pub async fn get_max_resources(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let resources = state.settings_service.max_resources().await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": resources }),
    ))
}

/// PUT /api/settings/max-resources
pub async fn put_max_resources(
    State(state): State<AppState>,
    Json(patch): Json<ResourcePatch>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let resources = state.settings_service.set_max_resources(&patch).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": resources }),
    ))
}
