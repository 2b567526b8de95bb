//! Media catalog access for the hero feed and the home rows.
//!
//! This module defines the [`MediaCatalog`] trait the rest of cinefeed is
//! written against, and its TMDB implementation.
//!
//! # Module layout
//!
//! - [`provider`] -- Trait definition, listing queries, and shared data types.
//! - [`tmdb`] -- TMDB v3 client with rate limiting and 429 retries.

pub mod provider;
pub mod tmdb;

pub use provider::{
    select_logo, select_trailer, ListEndpoint, ListQuery, LogoCandidate, MediaCatalog, MediaItem,
    VideoEntry,
};
pub use tmdb::{image_url, TmdbCatalog};

/// YouTube embed URL for a trailer key.
///
/// Playback starts automatically; `muted` controls the initial audio state.
pub fn trailer_embed_url(key: &str, muted: bool) -> String {
    format!(
        "https://www.youtube.com/embed/{key}?autoplay=1&mute={}&controls=0&loop=1&playlist={key}",
        u8::from(muted)
    )
}
