use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::AuthChain;
use crate::error::AppError;

/// Resolves the caller identity once and stores it in the request extensions.
///
/// Authentication failures end the request here with a 401 (or 500) response;
/// handlers behind this layer always find an `Identity` extension.
pub async fn authenticate(
    State(chain): State<Arc<AuthChain>>,
    mut request: Request,
    next: Next,
) -> Response {
    match chain.resolve(request.headers()) {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                code = e.code(),
                "Request rejected during authentication"
            );
            AppError::from(e).into_response()
        }
    }
}
