use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use tokio::sync::RwLock;

use super::PreferenceStore;
use crate::{error::AppResult, models::GenrePreference};

/// Process-local preference store
///
/// Used by the test suite and for running the service without a database.
#[derive(Default)]
pub struct InMemoryPreferenceStore {
    rows: RwLock<Vec<GenrePreference>>,
    next_id: AtomicI64,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `(user_id, genre_id)` pairs, in order
    pub async fn with_preferences(pairs: &[(i64, i64)]) -> Self {
        let store = Self::new();
        for (user_id, genre_id) in pairs {
            // duplicates in the seed are ignored like any other insert
            let _ = store.insert(*user_id, *genre_id).await;
        }
        store
    }
}

#[async_trait::async_trait]
impl PreferenceStore for InMemoryPreferenceStore {
    async fn list(&self, user_id: i64) -> AppResult<Vec<GenrePreference>> {
        let rows = self.rows.read().await;
        Ok(rows.iter().filter(|p| p.user_id == user_id).cloned().collect())
    }

    async fn insert(&self, user_id: i64, genre_id: i64) -> AppResult<bool> {
        let mut rows = self.rows.write().await;
        if rows
            .iter()
            .any(|p| p.user_id == user_id && p.genre_id == genre_id)
        {
            return Ok(false);
        }

        rows.push(GenrePreference {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            user_id,
            genre_id,
            added_at: Utc::now(),
        });
        Ok(true)
    }

    async fn insert_many(&self, user_id: i64, genre_ids: &[i64]) -> AppResult<(usize, usize)> {
        let mut rows = self.rows.write().await;

        let mut added = 0;
        for &genre_id in genre_ids {
            if rows
                .iter()
                .any(|p| p.user_id == user_id && p.genre_id == genre_id)
            {
                continue;
            }

            rows.push(GenrePreference {
                id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
                user_id,
                genre_id,
                added_at: Utc::now(),
            });
            added += 1;
        }

        Ok((added, genre_ids.len() - added))
    }

    async fn delete(&self, user_id: i64, genre_id: i64) -> AppResult<bool> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|p| !(p.user_id == user_id && p.genre_id == genre_id));
        Ok(rows.len() < before)
    }

    async fn delete_all(&self, user_id: i64) -> AppResult<u64> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|p| p.user_id != user_id);
        Ok((before - rows.len()) as u64)
    }
}
