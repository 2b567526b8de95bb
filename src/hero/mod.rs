//! The hero carousel: data assembly, playback state, and presentation.
//!
//! # Module layout
//!
//! - [`state`] -- Snapshot, per-item enrichment, and the patch reducer.
//! - [`feed`] -- Supervisor that runs discovery and enrichment fetches.
//! - [`playback`] -- Mute flags and the derived autoplay configuration.
//! - [`carousel`] -- Slide navigation and the autoplay timer.
//! - [`viewport`] -- Small-screen detection.
//! - [`view`] -- Slide descriptions for a presentation layer.

pub mod carousel;
pub mod feed;
pub mod playback;
pub mod state;
pub mod view;
pub mod viewport;

pub use carousel::{run_autoplay, Carousel};
pub use feed::{FeedHandle, HeroFeed};
pub use playback::{AutoplayConfig, PlaybackController};
pub use state::{
    reduce, EnrichmentField, EnrichmentPatch, EnrichmentPhase, EnrichmentState, HeroSnapshot,
    HeroStatus,
};
pub use view::{render_slides, ImageUrls, SlideBackground, SlideHeading, SlideView};
pub use viewport::{SmallScreenQuery, ViewportSize, ViewportWatcher};
