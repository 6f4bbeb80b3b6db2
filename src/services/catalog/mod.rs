//! Content catalog access
//!
//! The catalog is the external system of record for genres, songs, albums,
//! purchases and favorites. Recommendation code only talks to it through the
//! [`CatalogClient`] trait so the HTTP implementation can be swapped for a fake in
//! tests.

use crate::{
    error::AppResult,
    models::{CandidateItem, ContentKind},
};

pub mod http;
pub mod wire;

pub use http::HttpCatalogClient;

/// Read-only catalog operations used by preferences and recommendations
///
/// Every call reports failures as errors. Whether a failure is fatal is decided
/// by the caller: write-path validation propagates it, read paths degrade to an
/// empty result.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogClient: Send + Sync {
    /// Whether the genre id is known to the catalog
    async fn genre_exists(&self, genre_id: i64) -> AppResult<bool>;

    /// Display name of a genre, `None` when the catalog has none
    async fn genre_name(&self, genre_id: i64) -> AppResult<Option<String>>;

    /// Up to `limit` songs tagged with the genre
    async fn songs_by_genre(&self, genre_id: i64, limit: usize) -> AppResult<Vec<CandidateItem>>;

    /// Up to `limit` albums tagged with the genre
    async fn albums_by_genre(&self, genre_id: i64, limit: usize)
        -> AppResult<Vec<CandidateItem>>;

    /// All songs authored by the artist
    async fn songs_by_artist(&self, artist_id: i64) -> AppResult<Vec<CandidateItem>>;

    /// All albums authored by the artist
    async fn albums_by_artist(&self, artist_id: i64) -> AppResult<Vec<CandidateItem>>;

    /// Ids of content of the given kind the user has purchased
    async fn purchased_ids(&self, user_id: i64, kind: ContentKind) -> AppResult<Vec<i64>>;

    /// Ids of content of the given kind the user has marked as favorite
    async fn favorited_ids(&self, user_id: i64, kind: ContentKind) -> AppResult<Vec<i64>>;
}

/// Genre page for either content kind
pub async fn by_genre(
    catalog: &dyn CatalogClient,
    kind: ContentKind,
    genre_id: i64,
    limit: usize,
) -> AppResult<Vec<CandidateItem>> {
    match kind {
        ContentKind::Song => catalog.songs_by_genre(genre_id, limit).await,
        ContentKind::Album => catalog.albums_by_genre(genre_id, limit).await,
    }
}

/// Everything an artist authored, for either content kind
pub async fn by_artist(
    catalog: &dyn CatalogClient,
    kind: ContentKind,
    artist_id: i64,
) -> AppResult<Vec<CandidateItem>> {
    match kind {
        ContentKind::Song => catalog.songs_by_artist(artist_id).await,
        ContentKind::Album => catalog.albums_by_artist(artist_id).await,
    }
}
