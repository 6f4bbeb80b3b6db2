use axum::{
    extract::{Query, State},
    Extension, Json,
};

use super::AppState;
use crate::{
    auth::Identity,
    error::AppResult,
    models::RecommendationResult,
    services::{recommendations, RecommendationParams},
};

/// GET /api/usuarios/recomendaciones
pub async fn for_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<RecommendationParams>,
) -> AppResult<Json<RecommendationResult>> {
    let result = recommendations::recommend_for_user(
        state.preferences.as_ref(),
        state.catalog.as_ref(),
        &identity,
        &params,
    )
    .await?;

    Ok(Json(result))
}

/// GET /api/artistas/recomendaciones
pub async fn for_artist(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<RecommendationParams>,
) -> AppResult<Json<RecommendationResult>> {
    let result = recommendations::recommend_for_artist(
        state.preferences.as_ref(),
        state.catalog.as_ref(),
        &identity,
        &params,
    )
    .await?;

    Ok(Json(result))
}
