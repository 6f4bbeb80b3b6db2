use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored (user, genre) affinity pair
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct GenrePreference {
    pub id: i64,
    pub user_id: i64,
    pub genre_id: i64,
    pub added_at: DateTime<Utc>,
}

/// A preference as returned to clients, enriched with the catalog genre name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceView {
    pub genre_id: i64,
    pub genre_name: String,
}

/// Body of `POST /usuarios/{id}/preferencias`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPreferencesRequest {
    #[serde(default)]
    pub genre_ids: Vec<i64>,
}

/// Outcome of adding preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPreferencesResponse {
    pub message: String,
    /// Genres newly stored by this call
    pub added: usize,
    /// Genres the user already had
    pub duplicates: usize,
    /// Full preference list after the update
    pub preferences: Vec<PreferenceView>,
}
