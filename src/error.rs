use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::auth::AuthError;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(#[from] AuthError),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid genre: {0}")]
    InvalidGenre(String),

    #[error("Preference not found: {0}")]
    PreferenceNotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Status and stable error code reported to the caller
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Authentication(e) => (e.status(), e.code()),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AppError::InvalidParameter(_) => (StatusCode::BAD_REQUEST, "INVALID_PARAMETER"),
            AppError::InvalidData(_) => (StatusCode::BAD_REQUEST, "INVALID_DATA"),
            AppError::InvalidGenre(_) => (StatusCode::BAD_REQUEST, "INVALID_GENRE"),
            AppError::PreferenceNotFound(_) => (StatusCode::NOT_FOUND, "PREFERENCE_NOT_FOUND"),
            AppError::ExternalApi(_) | AppError::HttpClient(_) => {
                (StatusCode::BAD_GATEWAY, "CATALOG_UNAVAILABLE")
            }
            AppError::Database(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            AppError::Authentication(e) => e.to_string(),
            AppError::Forbidden(msg)
            | AppError::InvalidParameter(msg)
            | AppError::InvalidData(msg)
            | AppError::InvalidGenre(msg)
            | AppError::PreferenceNotFound(msg)
            | AppError::ExternalApi(msg) => msg.clone(),
            AppError::HttpClient(_) => "Catalog service unavailable".to_string(),
            AppError::Database(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "Unhandled internal error");
                "Internal server error".to_string()
            }
        };

        let body = Json(json!({
            "error": code,
            "message": message,
            "statusCode": status.as_u16(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
