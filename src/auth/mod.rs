//! Caller authentication and authorization
//!
//! Every `/api` request passes through [`AuthChain`] exactly once. The chain tries
//! the shared service token first and the user bearer token second; whichever
//! strategy produces an answer ends the chain. The resolved [`Identity`] is an
//! immutable value that handlers pass explicitly to the services and to the
//! ownership guard.

use axum::http::StatusCode;

pub mod chain;
pub mod guard;
pub mod middleware;
pub mod token;

pub use chain::{AuthChain, AuthStrategy, BearerTokenStrategy, ServiceTokenStrategy};
pub use guard::{authorize, require_artist_scope};
pub use middleware::authenticate;
pub use token::{TokenVerifier, VerifiedToken};

/// Resolved caller classification for a single request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// Trusted inter-service call
    Service,
    /// End user, artist-scoped when the token carries an artist id
    User { user_id: i64, artist_id: Option<i64> },
    /// No credentials were presented
    Unauthenticated,
}

impl Identity {
    pub fn is_service(&self) -> bool {
        matches!(self, Identity::Service)
    }

    pub fn user_id(&self) -> Option<i64> {
        match self {
            Identity::User { user_id, .. } => Some(*user_id),
            _ => None,
        }
    }

    pub fn artist_id(&self) -> Option<i64> {
        match self {
            Identity::User { artist_id, .. } => *artist_id,
            _ => None,
        }
    }
}

/// Credential failures, each reported with its own error code
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Token has expired")]
    TokenExpired,

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is malformed")]
    MalformedToken,

    #[error("Token is not supported")]
    UnsupportedToken,

    #[error("Token is invalid: {0}")]
    InvalidToken(String),

    #[error("Service token is invalid")]
    InvalidServiceToken,

    /// Unexpected verification failure; the detail is logged, not returned
    #[error("Error processing token")]
    Internal(String),
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::InvalidSignature => "INVALID_SIGNATURE",
            AuthError::MalformedToken => "MALFORMED_TOKEN",
            AuthError::UnsupportedToken => "UNSUPPORTED_TOKEN",
            AuthError::InvalidToken(_) => "INVALID_TOKEN",
            AuthError::InvalidServiceToken => "INVALID_SERVICE_TOKEN",
            AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}
