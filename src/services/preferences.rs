use std::collections::HashSet;

use crate::{
    db::PreferenceStore,
    error::{AppError, AppResult},
    models::{AddPreferencesResponse, PreferenceView},
    services::catalog::CatalogClient,
};

/// Stored preferences of a user, oldest first, with catalog genre names
pub async fn list_preferences(
    store: &dyn PreferenceStore,
    catalog: &dyn CatalogClient,
    user_id: i64,
) -> AppResult<Vec<PreferenceView>> {
    let genre_ids = store.genre_ids(user_id).await?;

    let mut views = Vec::with_capacity(genre_ids.len());
    for genre_id in genre_ids {
        views.push(PreferenceView {
            genre_id,
            genre_name: genre_display_name(catalog, genre_id).await,
        });
    }

    Ok(views)
}

/// Adds genre preferences for a user
///
/// Every genre is validated against the catalog before anything is written, so
/// a request naming one unknown genre stores nothing, and the store writes the
/// batch atomically. Genres the user already prefers are counted as duplicates
/// instead of failing the request.
pub async fn add_preferences(
    store: &dyn PreferenceStore,
    catalog: &dyn CatalogClient,
    user_id: i64,
    genre_ids: Vec<i64>,
) -> AppResult<AddPreferencesResponse> {
    if genre_ids.is_empty() {
        return Err(AppError::InvalidData(
            "genreIds must contain at least one genre".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    let genre_ids: Vec<i64> = genre_ids
        .into_iter()
        .filter(|id| seen.insert(*id))
        .collect();

    for &genre_id in &genre_ids {
        if !catalog.genre_exists(genre_id).await? {
            return Err(AppError::InvalidGenre(format!(
                "Genre {} does not exist",
                genre_id
            )));
        }
    }

    let (added, duplicates) = store.insert_many(user_id, &genre_ids).await?;

    tracing::info!(user_id, added, duplicates, "Genre preferences updated");

    let message = if duplicates == 0 {
        format!("{} preference(s) added", added)
    } else {
        format!(
            "{} preference(s) added, {} already present",
            added, duplicates
        )
    };

    Ok(AddPreferencesResponse {
        message,
        added,
        duplicates,
        preferences: list_preferences(store, catalog, user_id).await?,
    })
}

/// Removes one genre from a user's preferences
pub async fn remove_preference(
    store: &dyn PreferenceStore,
    user_id: i64,
    genre_id: i64,
) -> AppResult<()> {
    if !store.delete(user_id, genre_id).await? {
        return Err(AppError::PreferenceNotFound(format!(
            "User {} has no preference for genre {}",
            user_id, genre_id
        )));
    }

    tracing::info!(user_id, genre_id, "Genre preference removed");
    Ok(())
}

/// Removes every preference of a user; returns how many were removed
pub async fn clear_preferences(store: &dyn PreferenceStore, user_id: i64) -> AppResult<u64> {
    let removed = store.delete_all(user_id).await?;
    tracing::info!(user_id, removed, "Genre preferences cleared");
    Ok(removed)
}

async fn genre_display_name(catalog: &dyn CatalogClient, genre_id: i64) -> String {
    match catalog.genre_name(genre_id).await {
        Ok(Some(name)) if !name.trim().is_empty() => name,
        Ok(_) => format!("Genre {}", genre_id),
        Err(e) => {
            tracing::warn!(error = %e, genre_id, "Could not load genre name");
            format!("Genre {}", genre_id)
        }
    }
}
