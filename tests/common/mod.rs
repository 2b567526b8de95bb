//! Shared test harness for integration tests.
//!
//! Provides [`TmdbMock`], a wiremock server answering TMDB v3 routes, and
//! helpers for building catalog payloads.

#![allow(dead_code)]

use std::sync::Arc;

use cinefeed::catalog::TmdbCatalog;
use cinefeed::config::CatalogConfig;
use cinefeed_common::MediaKey;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "test-key";

/// A mock TMDB API.
pub struct TmdbMock {
    pub server: MockServer,
}

impl TmdbMock {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Catalog settings pointing at the mock server.
    pub fn config(&self) -> CatalogConfig {
        CatalogConfig {
            api_key: API_KEY.to_string(),
            base_url: self.server.uri(),
            timeout_secs: 5,
            ..CatalogConfig::default()
        }
    }

    pub fn catalog(&self) -> Arc<TmdbCatalog> {
        Arc::new(TmdbCatalog::new(&self.config()).unwrap())
    }

    /// Answer a listing route with `results`.
    pub async fn list(&self, route: &str, results: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path(route))
            .and(query_param("api_key", API_KEY))
            .and(query_param("include_adult", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "page": 1,
                "results": results,
                "total_pages": 1,
            })))
            .mount(&self.server)
            .await;
    }

    /// Answer a route with an error status.
    pub async fn fail(&self, route: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Answer a route with an error status, once.
    pub async fn fail_once(&self, route: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status))
            .up_to_n_times(1)
            .mount(&self.server)
            .await;
    }

    /// Answer `/{kind}/{id}/images` with the given `(file_path, language)` logos.
    pub async fn logos(&self, key: MediaKey, logos: &[(&str, Option<&str>)]) {
        let logos: Vec<Value> = logos
            .iter()
            .map(|(file_path, language)| {
                json!({
                    "file_path": file_path,
                    "iso_639_1": language,
                    "width": 500,
                    "height": 200,
                    "vote_average": 5.3,
                    "aspect_ratio": 2.5,
                })
            })
            .collect();
        Mock::given(method("GET"))
            .and(path(format!("/{}/{}/images", key.kind, key.id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": key.id.get(),
                "backdrops": [],
                "logos": logos,
                "posters": [],
            })))
            .mount(&self.server)
            .await;
    }

    /// Answer `/{kind}/{id}/videos` with the given `(key, type)` videos.
    pub async fn videos(&self, key: MediaKey, videos: &[(&str, &str)]) {
        let results: Vec<Value> = videos
            .iter()
            .map(|(video_key, video_type)| {
                json!({
                    "key": video_key,
                    "site": "YouTube",
                    "type": video_type,
                    "name": format!("{video_type} {video_key}"),
                    "official": true,
                })
            })
            .collect();
        Mock::given(method("GET"))
            .and(path(format!("/{}/{}/videos", key.kind, key.id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": key.id.get(),
                "results": results,
            })))
            .mount(&self.server)
            .await;
    }
}

pub fn movie_json(id: u64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "backdrop_path": format!("/backdrop-{id}.jpg"),
        "overview": "",
        "vote_average": 7.5,
    })
}

pub fn series_json(id: u64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "backdrop_path": format!("/backdrop-tv-{id}.jpg"),
        "overview": "",
        "vote_average": 8.1,
    })
}
