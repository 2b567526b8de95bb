use cinefeed_common::MediaKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub hero: HeroConfig,

    #[serde(default)]
    pub viewport: ViewportConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// TMDB v3 API key (overridden by the `TMDB_API_KEY` environment variable)
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,

    /// Language tag sent with every request (e.g. "en-US")
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    /// Retries on HTTP 429 before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}
fn default_image_base_url() -> String {
    "https://image.tmdb.org/t/p".to_string()
}
fn default_language() -> String {
    "en-US".to_string()
}
fn default_timeout() -> u64 {
    30
}
fn default_requests_per_second() -> u32 {
    40
}
fn default_max_retries() -> u32 {
    3
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            image_base_url: default_image_base_url(),
            language: default_language(),
            timeout_secs: default_timeout(),
            requests_per_second: default_requests_per_second(),
            max_retries: default_max_retries(),
        }
    }
}

impl CatalogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HeroConfig {
    /// Listing sources queried by the discovery request, in order
    #[serde(default = "default_sources")]
    pub sources: Vec<MediaKind>,

    /// Shuffle the combined discovery results
    #[serde(default = "default_true")]
    pub shuffle: bool,

    /// Keep at most this many slides (unlimited when unset)
    #[serde(default)]
    pub max_items: Option<usize>,

    /// Autoplay delay while every slide is muted
    #[serde(default = "default_delay_ms")]
    pub default_delay_ms: u64,

    /// What autoplay does while a slide is unmuted
    #[serde(default)]
    pub unmuted_policy: AutoplayPolicy,

    /// Language tag a logo must carry to be picked
    #[serde(default = "default_logo_language")]
    pub logo_language: String,

    /// Video `type` that counts as a trailer
    #[serde(default = "default_trailer_type")]
    pub trailer_type: String,
}

fn default_sources() -> Vec<MediaKind> {
    vec![MediaKind::Movie, MediaKind::Series]
}
fn default_true() -> bool {
    true
}
fn default_delay_ms() -> u64 {
    15_000
}
fn default_logo_language() -> String {
    "en".to_string()
}
fn default_trailer_type() -> String {
    "Trailer".to_string()
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            shuffle: true,
            max_items: None,
            default_delay_ms: default_delay_ms(),
            unmuted_policy: AutoplayPolicy::default(),
            logo_language: default_logo_language(),
            trailer_type: default_trailer_type(),
        }
    }
}

impl HeroConfig {
    pub fn default_delay(&self) -> Duration {
        Duration::from_millis(self.default_delay_ms)
    }
}

/// Autoplay behaviour while any slide is playing with sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum AutoplayPolicy {
    /// Stop advancing slides entirely.
    Disable,
    /// Keep advancing, but wait `delay_ms` instead of the default.
    Lengthen { delay_ms: u64 },
}

impl Default for AutoplayPolicy {
    fn default() -> Self {
        AutoplayPolicy::Lengthen { delay_ms: 60_000 }
    }
}

/// Viewport thresholds below which trailer embeds are suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ViewportConfig {
    #[serde(default = "default_max_width")]
    pub max_width: u32,

    #[serde(default = "default_max_height")]
    pub max_height: u32,
}

fn default_max_width() -> u32 {
    1100
}
fn default_max_height() -> u32 {
    600
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            max_width: default_max_width(),
            max_height: default_max_height(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_continue_watching_path")]
    pub continue_watching_path: PathBuf,
}

fn default_continue_watching_path() -> PathBuf {
    PathBuf::from("~/.local/share/cinefeed/continue-watching.json")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            continue_watching_path: default_continue_watching_path(),
        }
    }
}

impl StorageConfig {
    /// Storage path with a leading `~` expanded.
    pub fn resolved_continue_watching_path(&self) -> PathBuf {
        let raw = self.continue_watching_path.to_string_lossy();
        PathBuf::from(shellexpand::tilde(raw.as_ref()).as_ref())
    }
}
