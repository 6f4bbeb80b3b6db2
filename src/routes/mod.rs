use axum::{
    http::StatusCode,
    middleware,
    routing::{delete, get},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::{
    auth::authenticate,
    middleware::{propagate_request_id, request_span},
};

pub mod preferences;
pub mod recommendations;
pub mod state;

pub use state::AppState;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes(state))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(propagate_request_id))
                .layer(TraceLayer::new_for_http().make_span_with(request_span)),
        )
}

/// API routes under /api, all behind the authentication chain
fn api_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/usuarios/:user_id/preferencias",
            get(preferences::list)
                .post(preferences::add)
                .delete(preferences::clear),
        )
        .route(
            "/usuarios/:user_id/preferencias/:genre_id",
            delete(preferences::remove),
        )
        .route("/usuarios/recomendaciones", get(recommendations::for_user))
        .route("/artistas/recomendaciones", get(recommendations::for_artist))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            authenticate,
        ))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
