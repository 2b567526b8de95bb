//! TMDB (The Movie Database) catalog backend.
//!
//! Implements [`MediaCatalog`] by querying the TMDB v3 REST API.
//!
//! Features:
//! - Token-bucket rate limiting via [`governor`].
//! - Automatic retry on HTTP 429 with `Retry-After` header support.
//! - Per-request timeout.
//! - `include_adult=false` on every listing request.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use cinefeed_common::{Error, MediaKey, Result};
use governor::{Quota, RateLimiter};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use super::provider::{ListQuery, LogoCandidate, MediaCatalog, MediaItem, VideoEntry};
use crate::config::CatalogConfig;

/// Longest `Retry-After` wait honoured before retrying a 429.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// TMDB API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TmdbListResponse {
    results: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct TmdbImagesResponse {
    logos: Option<Vec<TmdbImage>>,
}

#[derive(Debug, Deserialize)]
struct TmdbImage {
    file_path: String,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    iso_639_1: Option<String>,
    #[serde(default)]
    vote_average: f64,
}

#[derive(Debug, Deserialize)]
struct TmdbVideosResponse {
    results: Vec<TmdbVideo>,
}

#[derive(Debug, Deserialize)]
struct TmdbVideo {
    key: String,
    #[serde(default)]
    site: String,
    #[serde(rename = "type", default)]
    video_type: String,
    #[serde(default)]
    name: String,
}

// ---------------------------------------------------------------------------
// Catalog implementation
// ---------------------------------------------------------------------------

type DirectLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// TMDB catalog client.
///
/// # Examples
///
/// ```no_run
/// use cinefeed::catalog::TmdbCatalog;
/// use cinefeed::config::CatalogConfig;
///
/// let config = CatalogConfig {
///     api_key: "your-api-key".into(),
///     ..CatalogConfig::default()
/// };
/// let catalog = TmdbCatalog::new(&config).unwrap();
/// ```
pub struct TmdbCatalog {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    language: String,
    image_languages: String,
    max_retries: u32,
    rate_limiter: DirectLimiter,
}

impl TmdbCatalog {
    /// Create a client from the catalog section of the configuration.
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::internal(format!("failed to build HTTP client: {e}")))?;

        let per_second = NonZeroU32::new(config.requests_per_second)
            .ok_or_else(|| Error::invalid_input("requests_per_second must be non-zero"))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
            image_languages: image_languages(&config.language),
            max_retries: config.max_retries,
            rate_limiter: RateLimiter::direct(Quota::per_second(per_second)),
        })
    }

    /// Returns `true` when an API key is configured.
    pub fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Query parameters sent with every request, followed by `extra`.
    fn params<'a>(&'a self, extra: &'a [(String, String)]) -> Vec<(&'a str, &'a str)> {
        let mut params = vec![
            ("api_key", self.api_key.as_str()),
            ("language", self.language.as_str()),
        ];
        params.extend(extra.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        params
    }

    /// Execute a GET request with rate limiting and 429-retry logic, then
    /// decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        extra: &[(String, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let params = self.params(extra);
        let mut retries = 0u32;

        loop {
            self.rate_limiter.until_ready().await;

            let resp = self
                .client
                .get(&url)
                .query(&params)
                .send()
                .await
                .map_err(|e| Error::transport(format!("TMDB request to {path} failed: {e}")))?;

            if resp.status() == StatusCode::TOO_MANY_REQUESTS && retries < self.max_retries {
                retries += 1;
                let requested = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok());
                let wait = retry_delay(requested);
                warn!(
                    path,
                    retry = retries,
                    wait_secs = wait.as_secs(),
                    "TMDB returned 429, backing off"
                );
                tokio::time::sleep(wait).await;
                continue;
            }

            if !resp.status().is_success() {
                return Err(Error::status(resp.status().as_u16(), path));
            }

            let body = resp
                .bytes()
                .await
                .map_err(|e| Error::transport(format!("TMDB body read for {path} failed: {e}")))?;

            return serde_json::from_slice(&body)
                .map_err(|e| Error::decode(format!("unexpected TMDB response from {path}: {e}")));
        }
    }
}

#[async_trait]
impl MediaCatalog for TmdbCatalog {
    fn name(&self) -> &'static str {
        "tmdb"
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<MediaItem>> {
        let path = query.path();
        let mut extra = vec![("include_adult".to_string(), "false".to_string())];
        extra.extend(query.params.iter().cloned());
        debug!(path = %path, params = ?query.params, "TMDB list");

        let body: TmdbListResponse = self.get_json(&path, &extra).await?;
        let total = body.results.len();

        let items: Vec<MediaItem> = body
            .results
            .into_iter()
            .filter_map(|raw| MediaItem::from_raw(raw, Some(query.kind)))
            .collect();

        if items.len() != total {
            debug!(
                path = %path,
                skipped = total - items.len(),
                "Skipped listing entries without a numeric id"
            );
        }

        Ok(items)
    }

    async fn images(&self, key: MediaKey) -> Result<Vec<LogoCandidate>> {
        let path = format!("/{}/{}/images", key.kind, key.id);
        debug!(%key, "TMDB get images");

        // Without this, TMDB only returns images in the request language.
        let extra = [(
            "include_image_language".to_string(),
            self.image_languages.clone(),
        )];
        let resp: TmdbImagesResponse = self.get_json(&path, &extra).await?;

        Ok(resp
            .logos
            .unwrap_or_default()
            .into_iter()
            .map(|img| LogoCandidate {
                file_path: img.file_path,
                language: img.iso_639_1,
                width: img.width,
                height: img.height,
                vote_average: img.vote_average,
            })
            .collect())
    }

    async fn videos(&self, key: MediaKey) -> Result<Vec<VideoEntry>> {
        let path = format!("/{}/{}/videos", key.kind, key.id);
        debug!(%key, "TMDB get videos");

        let resp: TmdbVideosResponse = self.get_json(&path, &[]).await?;

        Ok(resp
            .results
            .into_iter()
            .map(|v| VideoEntry {
                key: v.key,
                site: v.site,
                video_type: v.video_type,
                name: v.name,
            })
            .collect())
    }
}

/// Wait before retrying a 429, from its `Retry-After` header in seconds.
/// Missing or unparsable values wait one second; long ones are capped.
fn retry_delay(retry_after: Option<&str>) -> Duration {
    let requested = retry_after
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(1));
    if requested > MAX_RETRY_AFTER {
        warn!(
            requested_secs = requested.as_secs(),
            max_secs = MAX_RETRY_AFTER.as_secs(),
            "Capping TMDB Retry-After"
        );
        return MAX_RETRY_AFTER;
    }
    requested
}

/// `include_image_language` value for a request language such as `"en-US"`.
fn image_languages(language: &str) -> String {
    let primary = language.split('-').next().unwrap_or_default();
    if primary.is_empty() || primary == "en" {
        "en,null".to_string()
    } else {
        format!("{primary},en,null")
    }
}

/// Convert a TMDB image path fragment to a full URL at the given size
/// (`"original"`, `"w500"`, ...).
pub fn image_url(image_base_url: &str, size: &str, path: &str) -> String {
    let path = path.trim_start_matches('/');
    format!("{}/{size}/{path}", image_base_url.trim_end_matches('/'))
}
