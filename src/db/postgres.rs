use sqlx::{postgres::PgPoolOptions, PgPool};

use super::PreferenceStore;
use crate::{error::AppResult, models::GenrePreference};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Preference store backed by the `genre_preferences` table
#[derive(Clone)]
pub struct PgPreferenceStore {
    pool: PgPool,
}

impl PgPreferenceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PreferenceStore for PgPreferenceStore {
    async fn list(&self, user_id: i64) -> AppResult<Vec<GenrePreference>> {
        let rows = sqlx::query_as::<_, GenrePreference>(
            r#"
            SELECT id, user_id, genre_id, added_at
            FROM genre_preferences
            WHERE user_id = $1
            ORDER BY added_at, id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn genre_ids(&self, user_id: i64) -> AppResult<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT genre_id
            FROM genre_preferences
            WHERE user_id = $1
            ORDER BY added_at, id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn insert(&self, user_id: i64, genre_id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO genre_preferences (user_id, genre_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, genre_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(genre_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn insert_many(&self, user_id: i64, genre_ids: &[i64]) -> AppResult<(usize, usize)> {
        let mut tx = self.pool.begin().await?;

        let mut added = 0;
        for &genre_id in genre_ids {
            let result = sqlx::query(
                r#"
                INSERT INTO genre_preferences (user_id, genre_id)
                VALUES ($1, $2)
                ON CONFLICT (user_id, genre_id) DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind(genre_id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 1 {
                added += 1;
            }
        }

        // an early return above drops `tx`, which rolls it back
        tx.commit().await?;

        Ok((added, genre_ids.len() - added))
    }

    async fn delete(&self, user_id: i64, genre_id: i64) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM genre_preferences WHERE user_id = $1 AND genre_id = $2")
                .bind(user_id)
                .bind(genre_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self, user_id: i64) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM genre_preferences WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
