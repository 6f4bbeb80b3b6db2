//! Catalog response payloads
//!
//! Responses are decoded entry by entry: a malformed entry is skipped and
//! counted rather than failing the whole page.

use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;

use crate::models::{CandidateItem, ContentKind};

/// Ids arrive either as JSON numbers or as numeric strings
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(i64),
    Text(String),
}

impl RawId {
    pub fn value(&self) -> Option<i64> {
        match self {
            RawId::Number(n) => Some(*n),
            RawId::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SongEntry {
    #[serde(rename = "idCancion")]
    pub id: Option<RawId>,
    #[serde(rename = "tituloCancion", default)]
    pub title: Option<String>,
    #[serde(rename = "genero", default)]
    pub genre_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlbumEntry {
    #[serde(rename = "idAlbum")]
    pub id: Option<RawId>,
    #[serde(rename = "tituloAlbum", default)]
    pub title: Option<String>,
    #[serde(rename = "genero", default)]
    pub genre_name: Option<String>,
}

/// Purchase or favorite record wrapping either a song or an album
#[derive(Debug, Clone, Deserialize)]
pub struct OwnedEntry {
    #[serde(rename = "cancion", default)]
    pub song: Option<SongEntry>,
    #[serde(rename = "album", default)]
    pub album: Option<AlbumEntry>,
}

impl OwnedEntry {
    fn id_for(&self, kind: ContentKind) -> Option<i64> {
        match kind {
            ContentKind::Song => self.song.as_ref()?.id.as_ref()?.value(),
            ContentKind::Album => self.album.as_ref()?.id.as_ref()?.value(),
        }
    }
}

/// Catalog entry that can become a recommendation candidate
pub trait WireItem: DeserializeOwned {
    fn into_candidate(self, genre_id: Option<i64>) -> Option<CandidateItem>;
}

impl WireItem for SongEntry {
    fn into_candidate(self, genre_id: Option<i64>) -> Option<CandidateItem> {
        Some(CandidateItem {
            id: self.id?.value()?,
            title: self.title,
            genre_id,
            genre_name: self.genre_name,
        })
    }
}

impl WireItem for AlbumEntry {
    fn into_candidate(self, genre_id: Option<i64>) -> Option<CandidateItem> {
        Some(CandidateItem {
            id: self.id?.value()?,
            title: self.title,
            genre_id,
            genre_name: self.genre_name,
        })
    }
}

/// Decoded page plus the number of entries that had to be dropped
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub items: Vec<T>,
    pub skipped: usize,
}

/// Array stored under `key` in an object body, or the body itself when it is an array
pub fn entries(body: Value, key: Option<&str>) -> Vec<Value> {
    let value = match key {
        Some(key) => match body {
            Value::Object(mut map) => map.remove(key).unwrap_or(Value::Null),
            _ => Value::Null,
        },
        None => body,
    };

    match value {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}

/// Decodes candidate items, dropping entries without a usable id
pub fn decode_items<T: WireItem>(entries: Vec<Value>, genre_id: Option<i64>) -> Decoded<CandidateItem> {
    let total = entries.len();
    let items: Vec<CandidateItem> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<T>(entry).ok())
        .filter_map(|entry| entry.into_candidate(genre_id))
        .collect();

    Decoded {
        skipped: total - items.len(),
        items,
    }
}

/// Decodes content ids of one kind out of purchase/favorite records
pub fn decode_owned_ids(entries: Vec<Value>, kind: ContentKind) -> Decoded<i64> {
    let total = entries.len();
    let items: Vec<i64> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<OwnedEntry>(entry).ok())
        .filter_map(|entry| entry.id_for(kind))
        .collect();

    Decoded {
        skipped: total - items.len(),
        items,
    }
}
