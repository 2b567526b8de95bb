//! The "continue watching" list.
//!
//! Entries are recorded when playback starts and removed from the card's
//! delete button. The list is persisted as a JSON array by
//! [`ContinueWatchingStore`].

mod store;

pub use store::ContinueWatchingStore;

use chrono::{DateTime, Utc};
use cinefeed_common::{MediaId, MediaKey, MediaKind};
use serde::{Deserialize, Serialize};

use crate::catalog::image_url;

/// One in-progress title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchEntry {
    pub id: MediaId,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
    /// Snapshot of the catalog payload at the time playback started.
    #[serde(default)]
    pub item: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl WatchEntry {
    pub fn movie(id: impl Into<MediaId>, item: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            kind: MediaKind::Movie,
            season: None,
            episode: None,
            item,
            saved_at: Some(Utc::now()),
        }
    }

    pub fn episode(
        id: impl Into<MediaId>,
        season: u32,
        episode: u32,
        item: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            kind: MediaKind::Series,
            season: Some(season),
            episode: Some(episode),
            item,
            saved_at: Some(Utc::now()),
        }
    }

    pub fn key(&self) -> MediaKey {
        MediaKey::new(self.kind, self.id)
    }

    /// `"Watching S{season} Episode-{episode}"` for series, empty for movies.
    pub fn progress_label(&self) -> String {
        match self.kind {
            MediaKind::Movie => String::new(),
            MediaKind::Series => format!(
                "Watching S{} Episode-{}",
                display_or_unknown(self.season),
                display_or_unknown(self.episode)
            ),
        }
    }

    /// Title from the snapshot: `title` for movies, `name` for series.
    pub fn display_title(&self) -> &str {
        let field = match self.kind {
            MediaKind::Movie => "title",
            MediaKind::Series => "name",
        };
        self.item
            .get(field)
            .or_else(|| self.item.get("title"))
            .or_else(|| self.item.get("name"))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
    }

    /// Card image (`w500`) when the snapshot has a backdrop.
    pub fn backdrop_url(&self, image_base_url: &str) -> Option<String> {
        self.item
            .get("backdrop_path")
            .and_then(|v| v.as_str())
            .map(|path| image_url(image_base_url, "w500", path))
    }

    pub fn info_link(&self) -> String {
        format!("/info/{}/{}", self.kind, self.id)
    }
}

fn display_or_unknown(value: Option<u32>) -> String {
    value.map_or_else(|| "?".to_string(), |v| v.to_string())
}
