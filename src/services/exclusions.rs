use std::collections::HashSet;

use crate::{
    models::{CandidateItem, ContentKind},
    services::catalog::{self, CatalogClient},
};

/// Whose point of view a recommendation is computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subject {
    /// User whose genre preferences seed the recommendation
    pub user_id: i64,
    /// Set in artist mode: the artist's own catalog is suppressed
    pub artist_id: Option<i64>,
}

impl Subject {
    pub fn end_user(user_id: i64) -> Self {
        Self {
            user_id,
            artist_id: None,
        }
    }

    pub fn artist(user_id: i64, artist_id: i64) -> Self {
        Self {
            user_id,
            artist_id: Some(artist_id),
        }
    }
}

/// Content ids that must not be recommended, per kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSets {
    pub songs: HashSet<i64>,
    pub albums: HashSet<i64>,
}

impl ExclusionSets {
    pub fn for_kind(&self, kind: ContentKind) -> &HashSet<i64> {
        match kind {
            ContentKind::Song => &self.songs,
            ContentKind::Album => &self.albums,
        }
    }

    fn for_kind_mut(&mut self, kind: ContentKind) -> &mut HashSet<i64> {
        match kind {
            ContentKind::Song => &mut self.songs,
            ContentKind::Album => &mut self.albums,
        }
    }
}

/// Builds exclusion sets from live catalog data
///
/// Catalog failures never fail the request: the affected sub-set is logged and
/// treated as empty.
pub struct ExclusionResolver<'a> {
    catalog: &'a dyn CatalogClient,
}

impl<'a> ExclusionResolver<'a> {
    pub fn new(catalog: &'a dyn CatalogClient) -> Self {
        Self { catalog }
    }

    /// Exclusion sets for every requested kind; other kinds stay empty
    pub async fn resolve_all(&self, subject: &Subject, kinds: &[ContentKind]) -> ExclusionSets {
        let mut sets = ExclusionSets::default();
        for kind in kinds {
            *sets.for_kind_mut(*kind) = self.resolve(subject, *kind).await;
        }
        sets
    }

    /// Artist mode: everything the artist authored. End-user mode: purchases
    /// plus favorites.
    pub async fn resolve(&self, subject: &Subject, kind: ContentKind) -> HashSet<i64> {
        match subject.artist_id {
            Some(artist_id) => self.authored_by(artist_id, kind).await,
            None => self.owned_by(subject.user_id, kind).await,
        }
    }

    async fn authored_by(&self, artist_id: i64, kind: ContentKind) -> HashSet<i64> {
        let items: Vec<CandidateItem> = catalog::by_artist(self.catalog, kind, artist_id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, artist_id, kind = %kind, "Could not load artist catalog, excluding nothing");
                Vec::new()
            });

        let excluded: HashSet<i64> = items.into_iter().map(|item| item.id).collect();
        tracing::debug!(artist_id, kind = %kind, excluded = excluded.len(), "Artist content excluded");
        excluded
    }

    async fn owned_by(&self, user_id: i64, kind: ContentKind) -> HashSet<i64> {
        let purchased = self
            .catalog
            .purchased_ids(user_id, kind)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, user_id, kind = %kind, "Could not load purchases");
                Vec::new()
            });

        let favorited = self
            .catalog
            .favorited_ids(user_id, kind)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, user_id, kind = %kind, "Could not load favorites");
                Vec::new()
            });

        let (purchased_count, favorited_count) = (purchased.len(), favorited.len());
        let excluded: HashSet<i64> = purchased.into_iter().chain(favorited).collect();

        tracing::debug!(
            user_id,
            kind = %kind,
            purchased = purchased_count,
            favorited = favorited_count,
            unique = excluded.len(),
            "User content excluded"
        );

        excluded
    }
}
