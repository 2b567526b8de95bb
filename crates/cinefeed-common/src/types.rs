//! Core type definitions shared across the catalog, feed, and store.
//!
//! The catalog API names its two namespaces `movie` and `tv`; those are the
//! serialized forms used everywhere, including persisted watch entries.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of media item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MediaKind {
    /// A single movie.
    #[serde(rename = "movie")]
    Movie,
    /// A TV series (show).
    #[serde(rename = "tv")]
    Series,
}

impl MediaKind {
    /// Path segment used by the catalog API and by front-end routes.
    pub fn as_path(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Series => "tv",
        }
    }

    /// Guess the kind of a raw catalog payload.
    ///
    /// An explicit `media_type` field wins; otherwise movies carry a `title`
    /// while series carry a `name`.
    pub fn infer(raw: &serde_json::Value) -> Self {
        match raw.get("media_type").and_then(|v| v.as_str()) {
            Some("tv") => Self::Series,
            Some("movie") => Self::Movie,
            _ if raw.get("title").is_some_and(|t| !t.is_null()) => Self::Movie,
            _ => Self::Series,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path())
    }
}

impl std::str::FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "movie" | "movies" => Ok(Self::Movie),
            "tv" | "series" | "show" => Ok(Self::Series),
            _ => Err(format!("Invalid media kind: {}", s)),
        }
    }
}
