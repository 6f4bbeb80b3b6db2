use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};

use super::AppState;
use crate::{
    auth::{authorize, Identity},
    error::AppResult,
    models::{AddPreferencesRequest, AddPreferencesResponse, PreferenceView},
    services::preferences,
};

/// GET /api/usuarios/:user_id/preferencias
pub async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<Vec<PreferenceView>>> {
    let views =
        preferences::list_preferences(state.preferences.as_ref(), state.catalog.as_ref(), user_id)
            .await?;
    Ok(Json(views))
}

/// POST /api/usuarios/:user_id/preferencias
pub async fn add(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(user_id): Path<i64>,
    Json(body): Json<AddPreferencesRequest>,
) -> AppResult<(StatusCode, Json<AddPreferencesResponse>)> {
    authorize(&identity, user_id)?;

    let response = preferences::add_preferences(
        state.preferences.as_ref(),
        state.catalog.as_ref(),
        user_id,
        body.genre_ids,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// DELETE /api/usuarios/:user_id/preferencias/:genre_id
pub async fn remove(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((user_id, genre_id)): Path<(i64, i64)>,
) -> AppResult<Json<Value>> {
    authorize(&identity, user_id)?;

    preferences::remove_preference(state.preferences.as_ref(), user_id, genre_id).await?;

    Ok(Json(json!({ "message": "Preference removed" })))
}

/// DELETE /api/usuarios/:user_id/preferencias
pub async fn clear(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<Value>> {
    authorize(&identity, user_id)?;

    let removed = preferences::clear_preferences(state.preferences.as_ref(), user_id).await?;

    Ok(Json(json!({
        "message": "All preferences removed",
        "removed": removed,
    })))
}
