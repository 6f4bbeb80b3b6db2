use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

use crate::error::AppError;

pub const MIN_LIMIT: usize = 1;
pub const MAX_LIMIT: usize = 50;

/// Kind of catalog content a lookup or exclusion set refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Song,
    Album,
}

impl Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentKind::Song => write!(f, "song"),
            ContentKind::Album => write!(f, "album"),
        }
    }
}

/// Content types a caller may ask recommendations for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    Song,
    Album,
    #[default]
    Both,
}

impl ContentType {
    pub fn includes(&self, kind: ContentKind) -> bool {
        matches!(
            (self, kind),
            (ContentType::Both, _)
                | (ContentType::Song, ContentKind::Song)
                | (ContentType::Album, ContentKind::Album)
        )
    }

    /// Kinds to generate, songs first
    pub fn kinds(&self) -> Vec<ContentKind> {
        [ContentKind::Song, ContentKind::Album]
            .into_iter()
            .filter(|kind| self.includes(*kind))
            .collect()
    }
}

impl FromStr for ContentType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "song" | "cancion" => Ok(ContentType::Song),
            "album" => Ok(ContentType::Album),
            "both" | "ambos" => Ok(ContentType::Both),
            _ => Err(AppError::InvalidParameter(
                "tipo must be 'song', 'album' or 'both'".to_string(),
            )),
        }
    }
}

/// Validated recommendation parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendationQuery {
    pub content_type: ContentType,
    pub limit: usize,
}

impl RecommendationQuery {
    pub const DEFAULT_LIMIT: usize = 20;

    /// Parses the raw `tipo`/`limite` query values, applying defaults when absent
    pub fn parse(tipo: Option<&str>, limite: Option<&str>) -> Result<Self, AppError> {
        let content_type = match tipo {
            Some(raw) => raw.trim().parse()?,
            None => ContentType::default(),
        };

        let limit = match limite {
            Some(raw) => raw.trim().parse::<i64>().map_err(|_| {
                AppError::InvalidParameter("limite must be an integer".to_string())
            })?,
            None => Self::DEFAULT_LIMIT as i64,
        };

        if limit < MIN_LIMIT as i64 || limit > MAX_LIMIT as i64 {
            return Err(AppError::InvalidParameter(format!(
                "limite must be between {} and {}",
                MIN_LIMIT, MAX_LIMIT
            )));
        }

        Ok(Self {
            content_type,
            limit: limit as usize,
        })
    }
}

/// A song or album offered as a recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateItem {
    pub id: i64,
    pub title: Option<String>,
    /// Set for genre-sourced candidates only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResult {
    pub subject_user_id: i64,
    pub total_count: usize,
    pub songs: Vec<CandidateItem>,
    pub albums: Vec<CandidateItem>,
}

impl RecommendationResult {
    pub fn empty(subject_user_id: i64) -> Self {
        Self::new(subject_user_id, Vec::new(), Vec::new())
    }

    pub fn new(subject_user_id: i64, songs: Vec<CandidateItem>, albums: Vec<CandidateItem>) -> Self {
        Self {
            subject_user_id,
            total_count: songs.len() + albums.len(),
            songs,
            albums,
        }
    }
}
