//! Presentation model for the hero carousel.
//!
//! [`render_slides`] combines a feed snapshot, the carousel position and the
//! viewport class into plain slide descriptions that any front-end can draw.

use cinefeed_common::MediaKey;
use serde::Serialize;

use super::carousel::Carousel;
use super::state::{EnrichmentPhase, HeroSnapshot};
use crate::catalog::{image_url, trailer_embed_url, MediaItem};

/// Image size used for backdrops and logos.
const ORIGINAL_SIZE: &str = "original";

/// Builds image URLs from catalog path fragments.
#[derive(Debug, Clone)]
pub struct ImageUrls {
    base: String,
}

impl ImageUrls {
    pub fn new(image_base_url: impl Into<String>) -> Self {
        Self {
            base: image_base_url.into(),
        }
    }

    pub fn original(&self, path: &str) -> String {
        image_url(&self.base, ORIGINAL_SIZE, path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlideHeading {
    /// Logo image of the title.
    Logo { url: String },
    /// Plain text fallback when no logo is known.
    Title { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlideBackground {
    /// Autoplaying trailer embed.
    Trailer {
        key: String,
        embed_url: String,
        muted: bool,
    },
    /// Static backdrop image; `None` when the item has no backdrop.
    Backdrop { url: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlideView {
    pub key: MediaKey,
    pub title: String,
    pub active: bool,
    pub phase: EnrichmentPhase,
    pub heading: SlideHeading,
    pub background: SlideBackground,
    pub watch_link: String,
    pub info_link: String,
}

impl SlideView {
    pub fn shows_trailer(&self) -> bool {
        matches!(self.background, SlideBackground::Trailer { .. })
    }
}

/// One slide per item of `snapshot`, in list order.
pub fn render_slides(
    snapshot: &HeroSnapshot,
    carousel: &Carousel,
    small_screen: bool,
    urls: &ImageUrls,
) -> Vec<SlideView> {
    snapshot
        .items
        .iter()
        .map(|item| render_slide(snapshot, item, carousel, small_screen, urls))
        .collect()
}

fn render_slide(
    snapshot: &HeroSnapshot,
    item: &MediaItem,
    carousel: &Carousel,
    small_screen: bool,
    urls: &ImageUrls,
) -> SlideView {
    let key = item.key();
    let active = carousel.is_active(&key);
    let enrichment = snapshot.enrichment(&key).cloned().unwrap_or_default();

    let heading = match &enrichment.logo_path {
        Some(path) => SlideHeading::Logo {
            url: urls.original(path),
        },
        None => SlideHeading::Title {
            text: item.title.clone(),
        },
    };

    let background = match &enrichment.trailer_key {
        Some(trailer) if active && !small_screen && enrichment.video_loaded => {
            let muted = carousel.is_muted(&key);
            SlideBackground::Trailer {
                key: trailer.clone(),
                embed_url: trailer_embed_url(trailer, muted),
                muted,
            }
        }
        _ => SlideBackground::Backdrop {
            url: item.backdrop_path.as_deref().map(|p| urls.original(p)),
        },
    };

    SlideView {
        key,
        title: item.title.clone(),
        active,
        phase: enrichment.phase(),
        heading,
        background,
        watch_link: format!("/watch/{}/{}", key.kind, key.id),
        info_link: format!("/info/{}/{}", key.kind, key.id),
    }
}
