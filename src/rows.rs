//! Home page rows shown under the hero carousel.

use cinefeed_common::MediaKind;
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::{ListQuery, MediaCatalog, MediaItem};

/// TMDB genre ids used by the default rows.
pub mod genres {
    pub const FAMILY: u32 = 10751;
    pub const CRIME: u32 = 80;
    pub const HORROR: u32 = 27;
    pub const DOCUMENTARY: u32 = 99;
}

/// A row definition: heading plus the listing that fills it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSpec {
    pub title: String,
    pub query: ListQuery,
}

impl RowSpec {
    pub fn new(title: impl Into<String>, query: ListQuery) -> Self {
        Self {
            title: title.into(),
            query,
        }
    }
}

/// A loaded row. Empty when its listing failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub title: String,
    pub items: Vec<MediaItem>,
}

fn top_rated(kind: MediaKind) -> ListQuery {
    ListQuery::discover(kind).param("sort_by", "vote_count.desc")
}

fn genre(id: u32) -> ListQuery {
    ListQuery::discover(MediaKind::Movie).param("with_genres", id.to_string())
}

/// The rows of the home page, in display order.
pub fn default_rows() -> Vec<RowSpec> {
    vec![
        RowSpec::new("Trending Movies This Week", ListQuery::trending(MediaKind::Movie)),
        RowSpec::new("Trending Series This Week", ListQuery::trending(MediaKind::Series)),
        RowSpec::new("Top Rated Movies", top_rated(MediaKind::Movie)),
        RowSpec::new("Top Rated Series", top_rated(MediaKind::Series)),
        RowSpec::new("Upcoming Movies", ListQuery::upcoming(MediaKind::Movie)),
        RowSpec::new("Upcoming Series", ListQuery::upcoming(MediaKind::Series)),
        RowSpec::new("Family", genre(genres::FAMILY)),
        RowSpec::new("Crime", genre(genres::CRIME)),
        RowSpec::new("Horror", genre(genres::HORROR)),
        RowSpec::new("Documentary", genre(genres::DOCUMENTARY)),
    ]
}

/// Load every row concurrently. Row order is preserved; a failed row is
/// logged and comes back empty.
pub async fn load_rows(catalog: &dyn MediaCatalog, rows: &[RowSpec]) -> Vec<Row> {
    let results = join_all(rows.iter().map(|row| catalog.list(&row.query))).await;

    rows.iter()
        .zip(results)
        .map(|(row, result)| {
            let items = match result {
                Ok(items) => {
                    debug!(row = %row.title, items = items.len(), "Row loaded");
                    items
                }
                Err(e) => {
                    warn!(
                        row = %row.title,
                        path = %row.query.path(),
                        transient = e.is_transient(),
                        error = %e,
                        "Row failed to load"
                    );
                    Vec::new()
                }
            };
            Row {
                title: row.title.clone(),
                items,
            }
        })
        .collect()
}
