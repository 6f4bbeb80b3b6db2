use serde::Deserialize;

use crate::{
    auth::{authorize, require_artist_scope, Identity},
    db::PreferenceStore,
    error::{AppError, AppResult},
    models::{RecommendationQuery, RecommendationResult},
    services::{
        allocator::RecommendationAllocator,
        catalog::CatalogClient,
        exclusions::{ExclusionResolver, Subject},
    },
};

/// Raw recommendation query string
///
/// Values are kept as strings and parsed on demand: bad input maps to
/// `INVALID_PARAMETER`, and nothing is parsed before the caller is known to be
/// allowed in. Service callers have no identity of their own and must name the
/// subject with `usuario` (and `artista`); users may repeat their own ids.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommendationParams {
    pub tipo: Option<String>,
    pub limite: Option<String>,
    pub usuario: Option<String>,
    pub artista: Option<String>,
}

impl RecommendationParams {
    pub fn query(&self) -> AppResult<RecommendationQuery> {
        RecommendationQuery::parse(self.tipo.as_deref(), self.limite.as_deref())
    }

    pub fn user_id(&self) -> AppResult<Option<i64>> {
        parse_id("usuario", self.usuario.as_deref())
    }

    pub fn artist_id(&self) -> AppResult<Option<i64>> {
        parse_id("artista", self.artista.as_deref())
    }
}

fn parse_id(name: &str, raw: Option<&str>) -> AppResult<Option<i64>> {
    raw.map(|value| {
        value
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::InvalidParameter(format!("{} must be an integer id", name)))
    })
    .transpose()
}

/// Subject of the end-user endpoint
pub fn end_user_subject(identity: &Identity, params: &RecommendationParams) -> AppResult<Subject> {
    match identity {
        Identity::Service => params.user_id()?.map(Subject::end_user).ok_or_else(|| {
            AppError::InvalidParameter("usuario is required for service calls".to_string())
        }),
        Identity::User { user_id, .. } => {
            let owner = params.user_id()?.unwrap_or(*user_id);
            authorize(identity, owner)?;
            Ok(Subject::end_user(owner))
        }
        Identity::Unauthenticated => Err(AppError::Forbidden(
            "Missing or invalid credentials".to_string(),
        )),
    }
}

/// Subject of the artist endpoint
pub fn artist_subject(identity: &Identity, params: &RecommendationParams) -> AppResult<Subject> {
    require_artist_scope(identity)?;

    match identity {
        Identity::Service => match (params.user_id()?, params.artist_id()?) {
            (Some(user_id), Some(artist_id)) => Ok(Subject::artist(user_id, artist_id)),
            _ => Err(AppError::InvalidParameter(
                "usuario and artista are required for service calls".to_string(),
            )),
        },
        Identity::User {
            user_id,
            artist_id: Some(artist_id),
        } => {
            let requested_user = params.user_id()?;
            let requested_artist = params.artist_id()?;
            let foreign_user = requested_user.is_some_and(|id| id != *user_id);
            let foreign_artist = requested_artist.is_some_and(|id| id != *artist_id);
            if foreign_user || foreign_artist {
                tracing::warn!(
                    user_id,
                    artist_id,
                    ?requested_user,
                    ?requested_artist,
                    "Artist asked for another subject"
                );
                return Err(AppError::Forbidden(
                    "Artists can only request their own recommendations".to_string(),
                ));
            }
            Ok(Subject::artist(*user_id, *artist_id))
        }
        _ => Err(AppError::Forbidden(
            "This endpoint is only available to artist accounts".to_string(),
        )),
    }
}

/// Recommendations for an end user, excluding what they purchased or favorited
///
/// The caller is authorized before `tipo`/`limite` are validated, and both
/// happen before the store or catalog is touched.
pub async fn recommend_for_user(
    store: &dyn PreferenceStore,
    catalog: &dyn CatalogClient,
    identity: &Identity,
    params: &RecommendationParams,
) -> AppResult<RecommendationResult> {
    let subject = end_user_subject(identity, params)?;
    let query = params.query()?;
    recommend(store, catalog, subject, query).await
}

/// Recommendations for an artist, excluding the artist's own catalog
pub async fn recommend_for_artist(
    store: &dyn PreferenceStore,
    catalog: &dyn CatalogClient,
    identity: &Identity,
    params: &RecommendationParams,
) -> AppResult<RecommendationResult> {
    let subject = artist_subject(identity, params)?;
    let query = params.query()?;
    recommend(store, catalog, subject, query).await
}

async fn recommend(
    store: &dyn PreferenceStore,
    catalog: &dyn CatalogClient,
    subject: Subject,
    query: RecommendationQuery,
) -> AppResult<RecommendationResult> {
    let genres = store.genre_ids(subject.user_id).await?;

    if genres.is_empty() {
        tracing::info!(user_id = subject.user_id, "No genre preferences, nothing to recommend");
        return Ok(RecommendationResult::empty(subject.user_id));
    }

    let kinds = query.content_type.kinds();
    let exclusions = ExclusionResolver::new(catalog)
        .resolve_all(&subject, &kinds)
        .await;

    let result = RecommendationAllocator::new(catalog)
        .allocate(subject.user_id, &genres, query, &exclusions)
        .await;

    tracing::info!(
        user_id = subject.user_id,
        artist_id = ?subject.artist_id,
        genres = genres.len(),
        limit = query.limit,
        songs = result.songs.len(),
        albums = result.albums.len(),
        "Recommendations generated"
    );

    Ok(result)
}
