//! HTTP catalog client
//!
//! Talks to the content service over its REST API. Every outgoing request carries
//! the shared `X-Service-Token` so the catalog treats us as a trusted service.
//!
//! Endpoints used:
//! - `/generos/{id}/existe`, `/generos/{id}/nombre`
//! - `/canciones?genreId=&limit=`, `/albumes?genreId=&limit=`
//! - `/canciones/artist/{id}`, `/albumes/artist/{id}`
//! - `/compras?idUsuario=&tipo=&limit=`, `/favoritos?idUsuario=&tipo=&limit=`

use std::time::Duration;

use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client as HttpClient, StatusCode,
};
use serde_json::Value;

use crate::{
    auth::chain::SERVICE_TOKEN_HEADER,
    error::{AppError, AppResult},
    models::{CandidateItem, ContentKind},
    services::catalog::{
        wire::{self, AlbumEntry, SongEntry},
        CatalogClient,
    },
};

/// Page size used when listing a user's purchases or favorites
const OWNED_PAGE_LIMIT: usize = 1000;

#[derive(Clone)]
pub struct HttpCatalogClient {
    http_client: HttpClient,
    base_url: String,
}

impl HttpCatalogClient {
    /// Builds a client with bounded connect and request timeouts
    pub fn new(
        base_url: impl Into<String>,
        service_token: &str,
        connect_timeout: Duration,
        timeout: Duration,
    ) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        let token = HeaderValue::from_str(service_token)
            .map_err(|e| AppError::Internal(format!("Invalid service token header: {}", e)))?;
        headers.insert(SERVICE_TOKEN_HEADER, token);

        let http_client = HttpClient::builder()
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> AppResult<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "Catalog request");

        let response = self.http_client.get(&url).query(query).send().await?;
        tracing::debug!(url = %url, status = %response.status(), "Catalog response");

        Ok(response)
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> AppResult<Value> {
        let response = self.get(path, query).await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Catalog returned status {} for {}: {}",
                status, path, body
            )));
        }

        Ok(response.json().await?)
    }

    async fn fetch_items<T: wire::WireItem>(
        &self,
        path: &str,
        query: &[(&str, String)],
        key: Option<&str>,
        genre_id: Option<i64>,
    ) -> AppResult<Vec<CandidateItem>> {
        let body = self.get_json(path, query).await?;
        let decoded = wire::decode_items::<T>(wire::entries(body, key), genre_id);

        if decoded.skipped > 0 {
            tracing::warn!(
                path = %path,
                skipped = decoded.skipped,
                "Skipped malformed catalog entries"
            );
        }

        Ok(decoded.items)
    }

    async fn fetch_owned_ids(
        &self,
        collection: &str,
        user_id: i64,
        kind: ContentKind,
    ) -> AppResult<Vec<i64>> {
        let path = format!("/{}", collection);
        let query = [
            ("idUsuario", user_id.to_string()),
            ("tipo", kind_param(kind).to_string()),
            ("limit", OWNED_PAGE_LIMIT.to_string()),
        ];

        let body = self.get_json(&path, &query).await?;
        let decoded = wire::decode_owned_ids(wire::entries(body, Some(collection)), kind);

        if decoded.skipped > 0 {
            tracing::warn!(
                collection = %collection,
                user_id,
                skipped = decoded.skipped,
                "Skipped malformed catalog entries"
            );
        }

        tracing::debug!(
            collection = %collection,
            user_id,
            kind = %kind,
            count = decoded.items.len(),
            "Owned content ids fetched"
        );

        Ok(decoded.items)
    }
}

fn kind_param(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Song => "CANCION",
        ContentKind::Album => "ALBUM",
    }
}

#[async_trait::async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn genre_exists(&self, genre_id: i64) -> AppResult<bool> {
        let path = format!("/generos/{}/existe", genre_id);
        let response = self.get(&path, &[]).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "Catalog returned status {} while checking genre {}",
                response.status(),
                genre_id
            )));
        }

        let exists: Option<bool> = response.json().await?;
        Ok(exists.unwrap_or(false))
    }

    async fn genre_name(&self, genre_id: i64) -> AppResult<Option<String>> {
        let path = format!("/generos/{}/nombre", genre_id);
        let response = self.get(&path, &[]).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "Catalog returned status {} while naming genre {}",
                response.status(),
                genre_id
            )));
        }

        let text = response.text().await?;
        let name = serde_json::from_str::<String>(&text).unwrap_or(text);
        let name = name.trim();

        Ok((!name.is_empty()).then(|| name.to_string()))
    }

    async fn songs_by_genre(&self, genre_id: i64, limit: usize) -> AppResult<Vec<CandidateItem>> {
        let query = [("genreId", genre_id.to_string()), ("limit", limit.to_string())];
        self.fetch_items::<SongEntry>("/canciones", &query, Some("canciones"), Some(genre_id))
            .await
    }

    async fn albums_by_genre(&self, genre_id: i64, limit: usize) -> AppResult<Vec<CandidateItem>> {
        let query = [("genreId", genre_id.to_string()), ("limit", limit.to_string())];
        self.fetch_items::<AlbumEntry>("/albumes", &query, Some("albumes"), Some(genre_id))
            .await
    }

    async fn songs_by_artist(&self, artist_id: i64) -> AppResult<Vec<CandidateItem>> {
        let path = format!("/canciones/artist/{}", artist_id);
        self.fetch_items::<SongEntry>(&path, &[], None, None).await
    }

    async fn albums_by_artist(&self, artist_id: i64) -> AppResult<Vec<CandidateItem>> {
        let path = format!("/albumes/artist/{}", artist_id);
        self.fetch_items::<AlbumEntry>(&path, &[], None, None).await
    }

    async fn purchased_ids(&self, user_id: i64, kind: ContentKind) -> AppResult<Vec<i64>> {
        self.fetch_owned_ids("compras", user_id, kind).await
    }

    async fn favorited_ids(&self, user_id: i64, kind: ContentKind) -> AppResult<Vec<i64>> {
        self.fetch_owned_ids("favoritos", user_id, kind).await
    }
}
