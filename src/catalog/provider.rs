//! Trait definition and types for the media catalog.
//!
//! This module defines the [`MediaCatalog`] trait the feed and the home rows
//! are written against, along with the data types returned by catalog
//! queries. The concrete TMDB backend lives in [`super::tmdb`].

use async_trait::async_trait;
use cinefeed_common::{MediaId, MediaKey, MediaKind, Result};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Listing results
// ---------------------------------------------------------------------------

/// A movie or series returned by a listing endpoint.
///
/// Immutable once fetched. `raw` keeps the provider payload untouched so
/// that snapshots (e.g. continue-watching entries) can carry it forward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Catalog identifier.
    pub id: MediaId,
    /// Movie or series.
    pub kind: MediaKind,
    /// Display title (`title` for movies, `name` for series).
    pub title: String,
    /// Backdrop image path fragment, e.g. `"/abc.jpg"`.
    pub backdrop_path: Option<String>,
    /// The provider's payload as received.
    pub raw: serde_json::Value,
}

impl MediaItem {
    /// Key used for all per-item state.
    pub fn key(&self) -> MediaKey {
        MediaKey::new(self.kind, self.id)
    }

    /// Build an item from a raw listing entry.
    ///
    /// `kind` is the kind of the endpoint that produced the entry; mixed
    /// endpoints pass `None` and the kind is inferred from the payload.
    /// Returns `None` for entries without a numeric `id`.
    pub fn from_raw(raw: serde_json::Value, kind: Option<MediaKind>) -> Option<Self> {
        let id = raw.get("id")?.as_u64()?;
        let kind = kind.unwrap_or_else(|| MediaKind::infer(&raw));
        let title = raw
            .get("title")
            .or_else(|| raw.get("name"))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let backdrop_path = raw
            .get("backdrop_path")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        Some(Self {
            id: MediaId::new(id),
            kind,
            title,
            backdrop_path,
            raw,
        })
    }
}

// ---------------------------------------------------------------------------
// Listing queries
// ---------------------------------------------------------------------------

/// Which listing endpoint a query hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListEndpoint {
    /// `/discover/{kind}`
    Discover,
    /// `/trending/{kind}/week`
    TrendingWeek,
    /// `/movie/upcoming` or `/tv/on_the_air`
    Upcoming,
}

/// A listing request: endpoint, kind, and extra query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    pub endpoint: ListEndpoint,
    pub kind: MediaKind,
    #[serde(default)]
    pub params: Vec<(String, String)>,
}

impl ListQuery {
    pub fn discover(kind: MediaKind) -> Self {
        Self::new(ListEndpoint::Discover, kind)
    }

    pub fn trending(kind: MediaKind) -> Self {
        Self::new(ListEndpoint::TrendingWeek, kind)
    }

    pub fn upcoming(kind: MediaKind) -> Self {
        Self::new(ListEndpoint::Upcoming, kind)
    }

    fn new(endpoint: ListEndpoint, kind: MediaKind) -> Self {
        Self {
            endpoint,
            kind,
            params: Vec::new(),
        }
    }

    /// Add an extra query parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// API path for this query.
    pub fn path(&self) -> String {
        match (self.endpoint, self.kind) {
            (ListEndpoint::Discover, kind) => format!("/discover/{kind}"),
            (ListEndpoint::TrendingWeek, kind) => format!("/trending/{kind}/week"),
            (ListEndpoint::Upcoming, MediaKind::Movie) => "/movie/upcoming".to_string(),
            (ListEndpoint::Upcoming, MediaKind::Series) => "/tv/on_the_air".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Images and videos
// ---------------------------------------------------------------------------

/// A logo image offered for an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogoCandidate {
    /// Path fragment, e.g. `"/logo.png"`.
    pub file_path: String,
    /// ISO-639-1 language of the logo text, if tagged.
    pub language: Option<String>,
    pub width: u32,
    pub height: u32,
    pub vote_average: f64,
}

/// A video attached to an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoEntry {
    /// Site-specific video key (a YouTube id for `site == "YouTube"`).
    pub key: String,
    pub site: String,
    /// Video category, e.g. `"Trailer"`, `"Teaser"`, `"Featurette"`.
    pub video_type: String,
    pub name: String,
}

/// First logo tagged with `language`, as a path fragment.
pub fn select_logo(candidates: &[LogoCandidate], language: &str) -> Option<String> {
    candidates
        .iter()
        .find(|logo| logo.language.as_deref() == Some(language))
        .map(|logo| logo.file_path.clone())
}

/// First video whose type is `video_type`.
pub fn select_trailer<'a>(videos: &'a [VideoEntry], video_type: &str) -> Option<&'a VideoEntry> {
    videos.iter().find(|video| video.video_type == video_type)
}

// ---------------------------------------------------------------------------
// Catalog trait
// ---------------------------------------------------------------------------

/// Async trait the feed and rows are written against.
///
/// Implementations wrap a single external API. They are shared across
/// tasks behind an `Arc`, so they must be `Send + Sync`.
#[async_trait]
pub trait MediaCatalog: Send + Sync {
    /// Short, lowercase identifier for this catalog (e.g. `"tmdb"`).
    fn name(&self) -> &'static str;

    /// Fetch one page of a listing endpoint, in provider order.
    async fn list(&self, query: &ListQuery) -> Result<Vec<MediaItem>>;

    /// Fetch the logo candidates for an item.
    async fn images(&self, key: MediaKey) -> Result<Vec<LogoCandidate>>;

    /// Fetch the videos attached to an item.
    async fn videos(&self, key: MediaKey) -> Result<Vec<VideoEntry>>;
}
