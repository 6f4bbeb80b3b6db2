use std::collections::HashSet;

use crate::{
    models::{CandidateItem, ContentKind, ContentType, RecommendationQuery, RecommendationResult},
    services::{
        catalog::{self, CatalogClient},
        exclusions::ExclusionSets,
    },
};

/// Extra items requested per genre to make up for excluded ones
const OVERFETCH_BUFFER: usize = 2;

/// Items to request from each genre
///
/// The budget is split evenly across genres (at least one each) and padded with
/// a small buffer because exclusion filtering drops some of what comes back.
pub fn items_per_genre(limit: usize, genre_count: usize) -> usize {
    std::cmp::max(1, limit / genre_count.max(1)) + OVERFETCH_BUFFER
}

/// Maximum number of items a kind may contribute before rebalancing
///
/// Albums only get half the budget when both kinds were requested; songs are
/// always generated against the full limit.
pub fn cap_for(kind: ContentKind, content_type: ContentType, limit: usize) -> usize {
    match (kind, content_type) {
        (ContentKind::Album, ContentType::Both) => limit / 2,
        _ => limit,
    }
}

/// Trims a combined result back under `limit`
///
/// Songs keep `floor(limit / 2)`, albums the remainder. Tails are dropped and
/// nothing is re-queried, so a kind that came up short is not topped up by the
/// other one.
pub fn rebalance(songs: &mut Vec<CandidateItem>, albums: &mut Vec<CandidateItem>, limit: usize) {
    if songs.len() + albums.len() <= limit {
        return;
    }

    let songs_cap = limit / 2;
    let albums_cap = limit - songs_cap;
    songs.truncate(songs_cap);
    albums.truncate(albums_cap);
}

/// Distributes a bounded item budget across a user's preferred genres
pub struct RecommendationAllocator<'a> {
    catalog: &'a dyn CatalogClient,
}

impl<'a> RecommendationAllocator<'a> {
    pub fn new(catalog: &'a dyn CatalogClient) -> Self {
        Self { catalog }
    }

    /// Builds the capped, exclusion-filtered result for one request.
    ///
    /// Genres are walked in the given order. An empty genre list returns an
    /// empty result without touching the catalog.
    pub async fn allocate(
        &self,
        subject_user_id: i64,
        genres: &[i64],
        query: RecommendationQuery,
        exclusions: &ExclusionSets,
    ) -> RecommendationResult {
        if genres.is_empty() {
            return RecommendationResult::empty(subject_user_id);
        }

        let limit = query.limit;
        let per_genre = items_per_genre(limit, genres.len());

        let mut songs = Vec::new();
        let mut albums = Vec::new();

        for kind in query.content_type.kinds() {
            let cap = cap_for(kind, query.content_type, limit);
            let items = self
                .generate(kind, genres, exclusions.for_kind(kind), per_genre, cap)
                .await;

            match kind {
                ContentKind::Song => songs = items,
                ContentKind::Album => albums = items,
            }
        }

        if query.content_type == ContentType::Both {
            rebalance(&mut songs, &mut albums, limit);
        }

        RecommendationResult::new(subject_user_id, songs, albums)
    }

    async fn generate(
        &self,
        kind: ContentKind,
        genres: &[i64],
        excluded: &HashSet<i64>,
        per_genre: usize,
        cap: usize,
    ) -> Vec<CandidateItem> {
        let mut accumulated: Vec<CandidateItem> = Vec::new();
        let mut seen: HashSet<i64> = HashSet::new();

        for &genre_id in genres {
            if accumulated.len() >= cap {
                break;
            }

            let page = catalog::by_genre(self.catalog, kind, genre_id, per_genre)
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, genre_id, kind = %kind, "Genre lookup failed, skipping genre");
                    Vec::new()
                });

            let fetched = page.len();
            accumulated.extend(
                page.into_iter()
                    .filter(|item| !excluded.contains(&item.id))
                    .filter(|item| seen.insert(item.id)),
            );

            tracing::debug!(
                genre_id,
                kind = %kind,
                fetched,
                accumulated = accumulated.len(),
                cap,
                "Genre processed"
            );
        }

        accumulated.truncate(cap);
        accumulated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult};
    use crate::services::catalog::MockCatalogClient;
    use mockall::predicate::eq;

    fn items(ids: &[i64], genre_id: i64) -> Vec<CandidateItem> {
        ids.iter()
            .map(|&id| CandidateItem {
                id,
                title: Some(format!("title {}", id)),
                genre_id: Some(genre_id),
                genre_name: None,
            })
            .collect()
    }

    fn ids(items: &[CandidateItem]) -> Vec<i64> {
        items.iter().map(|i| i.id).collect()
    }

    fn query(content_type: ContentType, limit: usize) -> RecommendationQuery {
        RecommendationQuery {
            content_type,
            limit,
        }
    }

    #[test]
    fn test_items_per_genre() {
        assert_eq!(items_per_genre(2, 1), 4);
        assert_eq!(items_per_genre(20, 3), 8);
        assert_eq!(items_per_genre(5, 10), 3);
        assert_eq!(items_per_genre(50, 1), 52);
    }

    #[test]
    fn test_caps() {
        assert_eq!(cap_for(ContentKind::Song, ContentType::Both, 9), 9);
        assert_eq!(cap_for(ContentKind::Album, ContentType::Both, 9), 4);
        assert_eq!(cap_for(ContentKind::Album, ContentType::Album, 9), 9);
    }

    #[test]
    fn test_rebalance_truncates_tails() {
        let mut songs = items(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10], 1);
        let mut albums = items(&[11, 12, 13, 14, 15], 1);
        rebalance(&mut songs, &mut albums, 10);
        assert_eq!(ids(&songs), vec![1, 2, 3, 4, 5]);
        assert_eq!(ids(&albums), vec![11, 12, 13, 14, 15]);
    }

    #[test]
    fn test_rebalance_does_not_backfill() {
        let mut songs = items(&[1, 2, 3, 4, 5, 6, 7, 8, 9], 1);
        let mut albums = items(&[11, 12], 1);
        rebalance(&mut songs, &mut albums, 10);
        assert_eq!(songs.len(), 5);
        assert_eq!(albums.len(), 2);
    }

    #[test]
    fn test_rebalance_noop_under_limit() {
        let mut songs = items(&[1, 2, 3], 1);
        let mut albums = items(&[4], 1);
        rebalance(&mut songs, &mut albums, 10);
        assert_eq!(songs.len(), 3);
        assert_eq!(albums.len(), 1);
    }

    #[tokio::test]
    async fn test_single_genre_songs() {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_songs_by_genre()
            .with(eq(5), eq(4))
            .times(1)
            .returning(|genre, _| Ok(items(&[101, 102, 103], genre)));

        let result = RecommendationAllocator::new(&catalog)
            .allocate(1, &[5], query(ContentType::Song, 2), &ExclusionSets::default())
            .await;

        assert_eq!(ids(&result.songs), vec![101, 102]);
        assert!(result.albums.is_empty());
        assert_eq!(result.total_count, 2);
        assert_eq!(result.subject_user_id, 1);
    }

    #[tokio::test]
    async fn test_artist_albums_skip_own_work() {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_albums_by_genre()
            .with(eq(1), eq(4))
            .times(1)
            .returning(|genre, _| Ok(items(&[201, 202, 203, 204], genre)));
        catalog
            .expect_albums_by_genre()
            .with(eq(2), eq(4))
            .times(1)
            .returning(|genre, _| Ok(items(&[205, 206], genre)));

        let exclusions = ExclusionSets {
            albums: HashSet::from([201, 202]),
            ..Default::default()
        };

        let result = RecommendationAllocator::new(&catalog)
            .allocate(7, &[1, 2], query(ContentType::Album, 5), &exclusions)
            .await;

        assert_eq!(ids(&result.albums), vec![203, 204, 205, 206]);
        assert!(result.songs.is_empty());
    }

    #[tokio::test]
    async fn test_stops_once_cap_reached() {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_songs_by_genre()
            .with(eq(1), eq(4))
            .times(1)
            .returning(|genre, _| Ok(items(&[1, 2, 3, 4], genre)));
        catalog.expect_songs_by_genre().with(eq(2), eq(4)).never();

        let result = RecommendationAllocator::new(&catalog)
            .allocate(1, &[1, 2], query(ContentType::Song, 4), &ExclusionSets::default())
            .await;

        assert_eq!(ids(&result.songs), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_short_genre_moves_on_to_next() {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_songs_by_genre()
            .with(eq(1), eq(4))
            .times(1)
            .returning(|genre, _| Ok(items(&[1, 2, 3, 4], genre)));
        catalog
            .expect_songs_by_genre()
            .with(eq(2), eq(4))
            .times(1)
            .returning(|genre, _| Ok(items(&[5, 6], genre)));

        let result = RecommendationAllocator::new(&catalog)
            .allocate(1, &[1, 2], query(ContentType::Song, 5), &ExclusionSets::default())
            .await;

        assert_eq!(ids(&result.songs), vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_empty_genres_make_no_calls() {
        let catalog = MockCatalogClient::new();

        for content_type in [ContentType::Song, ContentType::Album, ContentType::Both] {
            let result = RecommendationAllocator::new(&catalog)
                .allocate(3, &[], query(content_type, 10), &ExclusionSets::default())
                .await;
            assert_eq!(result, RecommendationResult::empty(3));
        }
    }

    #[tokio::test]
    async fn test_failed_genre_is_skipped() {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_songs_by_genre()
            .with(eq(1), eq(4))
            .returning(|_, _| Err(AppError::ExternalApi("down".into())));
        catalog
            .expect_songs_by_genre()
            .with(eq(2), eq(4))
            .returning(|genre, _| Ok(items(&[20, 21], genre)));

        let result = RecommendationAllocator::new(&catalog)
            .allocate(1, &[1, 2], query(ContentType::Song, 4), &ExclusionSets::default())
            .await;

        assert_eq!(ids(&result.songs), vec![20, 21]);
    }

    #[tokio::test]
    async fn test_duplicate_ids_across_genres_appear_once() {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_songs_by_genre()
            .with(eq(1), eq(7))
            .returning(|genre, _| Ok(items(&[1, 2], genre)));
        catalog
            .expect_songs_by_genre()
            .with(eq(2), eq(7))
            .returning(|genre, _| Ok(items(&[2, 3], genre)));

        let result = RecommendationAllocator::new(&catalog)
            .allocate(1, &[1, 2], query(ContentType::Song, 10), &ExclusionSets::default())
            .await;

        assert_eq!(ids(&result.songs), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_both_with_limit_one_skips_albums() {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_songs_by_genre()
            .returning(|genre, _| Ok(items(&[1, 2, 3], genre)));
        catalog.expect_albums_by_genre().never();

        let result = RecommendationAllocator::new(&catalog)
            .allocate(1, &[9], query(ContentType::Both, 1), &ExclusionSets::default())
            .await;

        assert_eq!(result.total_count, 1);
        assert_eq!(ids(&result.songs), vec![1]);
    }

    /// Deterministic catalog: each genre holds `depth` songs and albums
    struct GridCatalog {
        depth: i64,
    }

    impl GridCatalog {
        fn page(&self, base: i64, genre_id: i64, limit: usize) -> Vec<CandidateItem> {
            let count = std::cmp::min(self.depth, limit as i64);
            let ids: Vec<i64> = (0..count).map(|i| base + genre_id * 100 + i).collect();
            items(&ids, genre_id)
        }
    }

    #[async_trait::async_trait]
    impl CatalogClient for GridCatalog {
        async fn genre_exists(&self, _genre_id: i64) -> AppResult<bool> {
            Ok(true)
        }
        async fn genre_name(&self, _genre_id: i64) -> AppResult<Option<String>> {
            Ok(None)
        }
        async fn songs_by_genre(&self, genre_id: i64, limit: usize) -> AppResult<Vec<CandidateItem>> {
            Ok(self.page(10_000, genre_id, limit))
        }
        async fn albums_by_genre(&self, genre_id: i64, limit: usize) -> AppResult<Vec<CandidateItem>> {
            Ok(self.page(20_000, genre_id, limit))
        }
        async fn songs_by_artist(&self, _artist_id: i64) -> AppResult<Vec<CandidateItem>> {
            Ok(Vec::new())
        }
        async fn albums_by_artist(&self, _artist_id: i64) -> AppResult<Vec<CandidateItem>> {
            Ok(Vec::new())
        }
        async fn purchased_ids(&self, _user_id: i64, _kind: ContentKind) -> AppResult<Vec<i64>> {
            Ok(Vec::new())
        }
        async fn favorited_ids(&self, _user_id: i64, _kind: ContentKind) -> AppResult<Vec<i64>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_bounds_hold_for_every_limit() {
        // every third id of the first genre is excluded for both kinds
        let exclusions = ExclusionSets {
            songs: (0..30).step_by(3).map(|i| 10_000 + 100 + i).collect(),
            albums: (0..30).step_by(3).map(|i| 20_000 + 100 + i).collect(),
        };

        for depth in [1, 4, 30] {
            let catalog = GridCatalog { depth };
            let allocator = RecommendationAllocator::new(&catalog);

            for genre_count in 1..=4 {
                let genres: Vec<i64> = (1..=genre_count).collect();

                for limit in 1..=50 {
                    for content_type in [ContentType::Song, ContentType::Album, ContentType::Both] {
                        let result = allocator
                            .allocate(1, &genres, query(content_type, limit), &exclusions)
                            .await;

                        assert!(result.total_count <= limit);
                        assert_eq!(result.total_count, result.songs.len() + result.albums.len());
                        assert!(result.songs.iter().all(|s| !exclusions.songs.contains(&s.id)));
                        assert!(result.albums.iter().all(|a| !exclusions.albums.contains(&a.id)));

                        match content_type {
                            ContentType::Song => assert!(result.albums.is_empty()),
                            ContentType::Album => assert!(result.songs.is_empty()),
                            ContentType::Both => {
                                let per_genre = items_per_genre(limit, genres.len());
                                let songs = allocator
                                    .generate(ContentKind::Song, &genres, &exclusions.songs, per_genre, limit)
                                    .await;
                                let albums = allocator
                                    .generate(ContentKind::Album, &genres, &exclusions.albums, per_genre, limit / 2)
                                    .await;

                                assert!(result.albums.len() <= limit / 2);
                                if songs.len() + albums.len() > limit {
                                    assert!(result.songs.len() <= limit / 2);
                                    assert!(result.albums.len() <= limit - limit / 2);
                                } else {
                                    assert_eq!(result.songs, songs);
                                    assert_eq!(result.albums, albums);
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
