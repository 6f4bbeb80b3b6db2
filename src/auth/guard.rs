use super::Identity;
use crate::error::{AppError, AppResult};

/// Allows service callers and the user owning the resource
pub fn authorize(identity: &Identity, owner_user_id: i64) -> AppResult<()> {
    match identity {
        Identity::Service => {
            tracing::debug!(owner_user_id, "Service-to-service access");
            Ok(())
        }
        Identity::User { user_id, .. } if *user_id == owner_user_id => Ok(()),
        Identity::User { user_id, .. } => {
            tracing::warn!(
                user_id,
                owner_user_id,
                "User attempted to access another user's resources"
            );
            Err(AppError::Forbidden(
                "You are not allowed to access another user's resources".to_string(),
            ))
        }
        Identity::Unauthenticated => {
            tracing::warn!(owner_user_id, "Unauthenticated access attempt");
            Err(AppError::Forbidden(
                "Missing or invalid credentials".to_string(),
            ))
        }
    }
}

/// Allows service callers and artist-scoped users
pub fn require_artist_scope(identity: &Identity) -> AppResult<()> {
    match identity {
        Identity::Service => Ok(()),
        Identity::User {
            artist_id: Some(_), ..
        } => Ok(()),
        _ => {
            tracing::warn!(identity = ?identity, "Artist endpoint accessed without artist scope");
            Err(AppError::Forbidden(
                "This endpoint is only available to artist accounts".to_string(),
            ))
        }
    }
}
