#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

use genre_recommendations::{
    auth::AuthChain,
    db::{InMemoryPreferenceStore, PreferenceStore},
    error::{AppError, AppResult},
    models::{CandidateItem, ContentKind},
    routes::{create_router, AppState},
    services::CatalogClient,
};

pub const JWT_SECRET: &str = "integration-secret-key-long-enough-for-hs256";
pub const SERVICE_TOKEN: &str = "integration-service-token";

/// Catalog served from memory that counts every call it receives
#[derive(Default)]
pub struct FakeCatalog {
    pub genres: HashMap<i64, String>,
    pub songs: HashMap<i64, Vec<i64>>,
    pub albums: HashMap<i64, Vec<i64>>,
    pub artist_songs: HashMap<i64, Vec<i64>>,
    pub artist_albums: HashMap<i64, Vec<i64>>,
    pub purchased: HashMap<i64, Vec<i64>>,
    pub favorited: HashMap<i64, Vec<i64>>,
    pub unavailable: bool,
    pub calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn with_genres(genres: &[(i64, &str)]) -> Self {
        Self {
            genres: genres
                .iter()
                .map(|(id, name)| (*id, name.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) -> AppResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(AppError::ExternalApi("catalog returned 503".to_string()));
        }
        Ok(())
    }
}

fn page(ids: Option<&Vec<i64>>, genre_id: Option<i64>, limit: usize) -> Vec<CandidateItem> {
    ids.map(|ids| {
        ids.iter()
            .take(limit)
            .map(|&id| CandidateItem {
                id,
                title: Some(format!("title {}", id)),
                genre_id,
                genre_name: None,
            })
            .collect()
    })
    .unwrap_or_default()
}

#[async_trait::async_trait]
impl CatalogClient for FakeCatalog {
    async fn genre_exists(&self, genre_id: i64) -> AppResult<bool> {
        self.record()?;
        Ok(self.genres.contains_key(&genre_id))
    }

    async fn genre_name(&self, genre_id: i64) -> AppResult<Option<String>> {
        self.record()?;
        Ok(self.genres.get(&genre_id).cloned())
    }

    async fn songs_by_genre(&self, genre_id: i64, limit: usize) -> AppResult<Vec<CandidateItem>> {
        self.record()?;
        Ok(page(self.songs.get(&genre_id), Some(genre_id), limit))
    }

    async fn albums_by_genre(&self, genre_id: i64, limit: usize) -> AppResult<Vec<CandidateItem>> {
        self.record()?;
        Ok(page(self.albums.get(&genre_id), Some(genre_id), limit))
    }

    async fn songs_by_artist(&self, artist_id: i64) -> AppResult<Vec<CandidateItem>> {
        self.record()?;
        Ok(page(self.artist_songs.get(&artist_id), None, usize::MAX))
    }

    async fn albums_by_artist(&self, artist_id: i64) -> AppResult<Vec<CandidateItem>> {
        self.record()?;
        Ok(page(self.artist_albums.get(&artist_id), None, usize::MAX))
    }

    async fn purchased_ids(&self, user_id: i64, _kind: ContentKind) -> AppResult<Vec<i64>> {
        self.record()?;
        Ok(self.purchased.get(&user_id).cloned().unwrap_or_default())
    }

    async fn favorited_ids(&self, user_id: i64, _kind: ContentKind) -> AppResult<Vec<i64>> {
        self.record()?;
        Ok(self.favorited.get(&user_id).cloned().unwrap_or_default())
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<InMemoryPreferenceStore>,
    pub catalog: Arc<FakeCatalog>,
}

impl TestApp {
    pub async fn store_is_empty(&self, user_id: i64) -> bool {
        self.store.list(user_id).await.unwrap().is_empty()
    }
}

pub async fn spawn_app(catalog: FakeCatalog, preferences: &[(i64, i64)]) -> TestApp {
    let store = Arc::new(InMemoryPreferenceStore::with_preferences(preferences).await);
    let catalog = Arc::new(catalog);

    let state = AppState::new(
        store.clone(),
        catalog.clone(),
        AuthChain::new(SERVICE_TOKEN, JWT_SECRET),
    );

    TestApp {
        server: TestServer::new(create_router(state)).unwrap(),
        store,
        catalog,
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub fn sign(claims: Value) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn user_token(user_id: i64) -> String {
    sign(json!({ "userId": user_id, "tipoUsuario": "NORMAL", "exp": now() + 3600 }))
}

pub fn artist_token(user_id: i64, artist_id: i64) -> String {
    sign(json!({
        "userId": user_id,
        "artistId": artist_id,
        "tipoUsuario": "ARTISTA",
        "exp": now() + 3600,
    }))
}

pub fn expired_token(user_id: i64) -> String {
    sign(json!({ "userId": user_id, "exp": now() - 3600 }))
}

pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("authorization"),
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    )
}

pub fn service(token: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-service-token"),
        HeaderValue::from_str(token).unwrap(),
    )
}
