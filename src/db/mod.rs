pub mod memory;
pub mod postgres;

pub use memory::InMemoryPreferenceStore;
pub use postgres::{create_pool, run_migrations, PgPreferenceStore};

use crate::{error::AppResult, models::GenrePreference};

/// Keyed storage of (user, genre) preference pairs
///
/// Pairs are unique per user and genre. Listing returns them in the order they
/// were added, which is the order recommendations walk the genres in.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PreferenceStore: Send + Sync {
    /// All preferences of a user, oldest first
    async fn list(&self, user_id: i64) -> AppResult<Vec<GenrePreference>>;

    /// Genre ids of a user's preferences, oldest first
    async fn genre_ids(&self, user_id: i64) -> AppResult<Vec<i64>> {
        Ok(self
            .list(user_id)
            .await?
            .into_iter()
            .map(|p| p.genre_id)
            .collect())
    }

    /// Stores the pair; returns `false` when it already existed
    async fn insert(&self, user_id: i64, genre_id: i64) -> AppResult<bool>;

    /// Stores every pair in one all-or-nothing write
    ///
    /// Returns `(added, duplicates)`; on error nothing from this call is kept.
    async fn insert_many(&self, user_id: i64, genre_ids: &[i64]) -> AppResult<(usize, usize)>;

    /// Removes the pair; returns `false` when there was nothing to remove
    async fn delete(&self, user_id: i64, genre_id: i64) -> AppResult<bool>;

    /// Removes every preference of a user, returning how many were removed
    async fn delete_all(&self, user_id: i64) -> AppResult<u64>;
}
