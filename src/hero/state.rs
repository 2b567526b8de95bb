//! Hero snapshot, per-item enrichment state, and the patch reducer.
//!
//! All state mutation in the feed goes through [`reduce`]: fetch tasks turn
//! their responses into immutable [`EnrichmentPatch`] values, and the
//! supervisor applies them one at a time to produce a new [`HeroSnapshot`].

use std::collections::HashMap;
use std::sync::Arc;

use cinefeed_common::MediaKey;
use serde::{Deserialize, Serialize};

use crate::catalog::{MediaItem, VideoEntry};

/// Where the discovery request stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum HeroStatus {
    Loading,
    Ready,
    Failed { message: String },
}

/// How far enrichment has progressed for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentPhase {
    /// Neither logo nor trailer present.
    Pending,
    /// Exactly one of logo and trailer present.
    PartiallyLoaded,
    /// Both present.
    Ready,
}

/// Which secondary fetch a patch refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentField {
    Logo,
    Trailer,
}

impl std::fmt::Display for EnrichmentField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logo => f.write_str("logo"),
            Self::Trailer => f.write_str("trailer"),
        }
    }
}

/// Enrichment for a single item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentState {
    /// Logo image path fragment in the configured language.
    pub logo_path: Option<String>,
    /// Trailer video key.
    pub trailer_key: Option<String>,
    /// Set once the view reports the backdrop/logo image has loaded.
    pub image_loaded: bool,
    /// True exactly when `trailer_key` is present.
    pub video_loaded: bool,
    /// The images fetch has resolved (with or without a logo, or failed).
    pub logo_resolved: bool,
    /// The videos fetch has resolved.
    pub trailer_resolved: bool,
}

impl EnrichmentState {
    pub fn phase(&self) -> EnrichmentPhase {
        match (self.logo_path.is_some(), self.trailer_key.is_some()) {
            (false, false) => EnrichmentPhase::Pending,
            (true, true) => EnrichmentPhase::Ready,
            _ => EnrichmentPhase::PartiallyLoaded,
        }
    }

    /// Both secondary fetches have resolved.
    pub fn is_resolved(&self) -> bool {
        self.logo_resolved && self.trailer_resolved
    }
}

/// Immutable render state published by the feed.
///
/// Replaced as a whole on every applied patch; readers hold an
/// `Arc<HeroSnapshot>` and never observe a partial update.
#[derive(Debug, Clone, PartialEq)]
pub struct HeroSnapshot {
    /// Pipeline generation this snapshot belongs to. Bumped on reload.
    pub generation: u64,
    pub status: HeroStatus,
    /// Discovered items in display order.
    pub items: Arc<[MediaItem]>,
    /// One entry per item in `items`.
    pub enrichment: HashMap<MediaKey, EnrichmentState>,
    /// Secondary fetches that have not resolved yet.
    pub outstanding: usize,
}

impl HeroSnapshot {
    /// Fresh snapshot for a generation whose discovery is in flight.
    pub fn loading(generation: u64) -> Self {
        Self {
            generation,
            status: HeroStatus::Loading,
            items: Arc::from(Vec::new()),
            enrichment: HashMap::new(),
            outstanding: 0,
        }
    }

    pub fn enrichment(&self, key: &MediaKey) -> Option<&EnrichmentState> {
        self.enrichment.get(key)
    }

    pub fn item(&self, key: &MediaKey) -> Option<&MediaItem> {
        self.items.iter().find(|item| item.key() == *key)
    }

    pub fn keys(&self) -> Vec<MediaKey> {
        self.items.iter().map(MediaItem::key).collect()
    }

    /// Discovery is finished and no secondary fetch is pending.
    pub fn is_settled(&self) -> bool {
        self.status != HeroStatus::Loading && self.outstanding == 0
    }
}

/// A single state change produced by a fetch task or by the view.
#[derive(Debug, Clone, PartialEq)]
pub enum EnrichmentPatch {
    /// The discovery request succeeded.
    Discovered { items: Vec<MediaItem> },
    /// The discovery request failed.
    DiscoveryFailed { message: String },
    /// The images fetch resolved; `path` is `None` when no logo matched.
    Logo { key: MediaKey, path: Option<String> },
    /// The videos fetch resolved; `video` is `None` when no trailer matched.
    Trailer {
        key: MediaKey,
        video: Option<VideoEntry>,
    },
    /// A secondary fetch failed; the field stays unset.
    FetchFailed {
        key: MediaKey,
        field: EnrichmentField,
        error: String,
    },
    /// The view finished loading the item's image.
    ImageLoaded { key: MediaKey },
}

/// Apply `patch` to `current`.
///
/// Returns the next snapshot, or `None` when the patch does not apply:
/// a discovery result when discovery already resolved, a patch for a key
/// absent from `items`, or a second resolution of the same field.
pub fn reduce(current: &HeroSnapshot, patch: EnrichmentPatch) -> Option<HeroSnapshot> {
    match patch {
        EnrichmentPatch::Discovered { items } => {
            if current.status != HeroStatus::Loading {
                return None;
            }
            let enrichment: HashMap<_, _> = items
                .iter()
                .map(|item| (item.key(), EnrichmentState::default()))
                .collect();
            Some(HeroSnapshot {
                generation: current.generation,
                status: HeroStatus::Ready,
                outstanding: enrichment.len() * 2,
                enrichment,
                items: Arc::from(items),
            })
        }
        EnrichmentPatch::DiscoveryFailed { message } => {
            if current.status != HeroStatus::Loading {
                return None;
            }
            Some(HeroSnapshot {
                status: HeroStatus::Failed { message },
                ..HeroSnapshot::loading(current.generation)
            })
        }
        EnrichmentPatch::Logo { key, path } => update(current, key, |state| {
            if state.logo_resolved {
                return false;
            }
            state.logo_resolved = true;
            state.logo_path = path;
            true
        }),
        EnrichmentPatch::Trailer { key, video } => update(current, key, |state| {
            if state.trailer_resolved {
                return false;
            }
            state.trailer_resolved = true;
            state.trailer_key = video.map(|v| v.key);
            state.video_loaded = state.trailer_key.is_some();
            true
        }),
        EnrichmentPatch::FetchFailed { key, field, .. } => update(current, key, |state| {
            let resolved = match field {
                EnrichmentField::Logo => &mut state.logo_resolved,
                EnrichmentField::Trailer => &mut state.trailer_resolved,
            };
            if *resolved {
                return false;
            }
            *resolved = true;
            true
        }),
        EnrichmentPatch::ImageLoaded { key } => update(current, key, |state| {
            if state.image_loaded {
                return false;
            }
            state.image_loaded = true;
            true
        }),
    }
}

/// Copy-on-write update of one entry. `f` returns whether it changed
/// anything; resolving a fetch also decrements `outstanding`.
fn update<F>(current: &HeroSnapshot, key: MediaKey, f: F) -> Option<HeroSnapshot>
where
    F: FnOnce(&mut EnrichmentState) -> bool,
{
    let before = current.enrichment.get(&key)?;
    let mut state = before.clone();
    if !f(&mut state) {
        return None;
    }

    let newly_resolved = usize::from(state.logo_resolved && !before.logo_resolved)
        + usize::from(state.trailer_resolved && !before.trailer_resolved);

    let mut next = current.clone();
    next.outstanding = next.outstanding.saturating_sub(newly_resolved);
    next.enrichment.insert(key, state);
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinefeed_common::MediaKind;
    use serde_json::json;

    fn item(id: u64) -> MediaItem {
        MediaItem::from_raw(
            json!({"id": id, "title": format!("Movie {id}")}),
            Some(MediaKind::Movie),
        )
        .unwrap()
    }

    fn trailer(key: &str) -> VideoEntry {
        VideoEntry {
            key: key.to_string(),
            site: "YouTube".to_string(),
            video_type: "Trailer".to_string(),
            name: "Official Trailer".to_string(),
        }
    }

    fn ready(ids: &[u64]) -> HeroSnapshot {
        let items = ids.iter().copied().map(item).collect();
        reduce(
            &HeroSnapshot::loading(0),
            EnrichmentPatch::Discovered { items },
        )
        .unwrap()
    }

    #[test]
    fn discovered_creates_one_entry_per_item() {
        let snap = ready(&[1, 2, 3]);
        assert_eq!(snap.status, HeroStatus::Ready);
        assert_eq!(snap.items.len(), 3);
        assert_eq!(snap.enrichment.len(), 3);
        assert_eq!(snap.outstanding, 6);
        assert!(snap
            .enrichment
            .values()
            .all(|e| e.phase() == EnrichmentPhase::Pending));
    }

    #[test]
    fn discovery_applies_only_while_loading() {
        let snap = ready(&[1]);
        assert!(reduce(&snap, EnrichmentPatch::Discovered { items: vec![item(9)] }).is_none());
        assert!(reduce(
            &snap,
            EnrichmentPatch::DiscoveryFailed {
                message: "late".into()
            }
        )
        .is_none());
    }

    #[test]
    fn discovery_failure_leaves_list_empty() {
        let snap = reduce(
            &HeroSnapshot::loading(4),
            EnrichmentPatch::DiscoveryFailed {
                message: "HTTP 500".into(),
            },
        )
        .unwrap();
        assert_eq!(
            snap.status,
            HeroStatus::Failed {
                message: "HTTP 500".into()
            }
        );
        assert_eq!(snap.generation, 4);
        assert!(snap.items.is_empty());
        assert!(snap.enrichment.is_empty());
        assert!(snap.is_settled());
    }

    #[test]
    fn phases_progress_forward() {
        let key = MediaKey::movie(1);
        let snap = ready(&[1]);

        let snap = reduce(
            &snap,
            EnrichmentPatch::Logo {
                key,
                path: Some("/l1.png".into()),
            },
        )
        .unwrap();
        assert_eq!(snap.enrichment(&key).unwrap().phase(), EnrichmentPhase::PartiallyLoaded);
        assert_eq!(snap.outstanding, 1);

        let snap = reduce(
            &snap,
            EnrichmentPatch::Trailer {
                key,
                video: Some(trailer("yt1")),
            },
        )
        .unwrap();
        let state = snap.enrichment(&key).unwrap();
        assert_eq!(state.phase(), EnrichmentPhase::Ready);
        assert!(state.video_loaded);
        assert_eq!(state.trailer_key.as_deref(), Some("yt1"));
        assert!(snap.is_settled());
    }

    #[test]
    fn missing_trailer_resolves_without_video() {
        let key = MediaKey::movie(1);
        let snap = reduce(&ready(&[1]), EnrichmentPatch::Trailer { key, video: None }).unwrap();
        let state = snap.enrichment(&key).unwrap();
        assert!(state.trailer_resolved);
        assert!(!state.video_loaded);
        assert_eq!(state.phase(), EnrichmentPhase::Pending);
    }

    #[test]
    fn failed_fetch_leaves_field_unset_and_resolves() {
        let key = MediaKey::movie(2);
        let snap = reduce(
            &ready(&[1, 2]),
            EnrichmentPatch::FetchFailed {
                key,
                field: EnrichmentField::Logo,
                error: "HTTP 500".into(),
            },
        )
        .unwrap();
        let state = snap.enrichment(&key).unwrap();
        assert!(state.logo_resolved);
        assert!(state.logo_path.is_none());
        assert_eq!(snap.outstanding, 3);
        assert_eq!(snap.items.len(), 2);
    }

    #[test]
    fn a_field_resolves_only_once() {
        let key = MediaKey::movie(1);
        let snap = reduce(
            &ready(&[1]),
            EnrichmentPatch::Logo {
                key,
                path: Some("/a.png".into()),
            },
        )
        .unwrap();
        assert!(reduce(
            &snap,
            EnrichmentPatch::Logo {
                key,
                path: Some("/b.png".into())
            }
        )
        .is_none());
        assert!(reduce(
            &snap,
            EnrichmentPatch::FetchFailed {
                key,
                field: EnrichmentField::Logo,
                error: "late".into()
            }
        )
        .is_none());
    }

    #[test]
    fn unknown_keys_are_discarded() {
        let snap = ready(&[1]);
        assert!(reduce(
            &snap,
            EnrichmentPatch::Logo {
                key: MediaKey::series(1),
                path: Some("/x.png".into())
            }
        )
        .is_none());
        assert!(reduce(&snap, EnrichmentPatch::ImageLoaded { key: MediaKey::movie(7) }).is_none());
    }

    #[test]
    fn image_loaded_does_not_touch_outstanding() {
        let key = MediaKey::movie(1);
        let snap = reduce(&ready(&[1]), EnrichmentPatch::ImageLoaded { key }).unwrap();
        assert!(snap.enrichment(&key).unwrap().image_loaded);
        assert_eq!(snap.outstanding, 2);
        assert!(reduce(&snap, EnrichmentPatch::ImageLoaded { key }).is_none());
    }

    #[test]
    fn previous_snapshot_is_untouched() {
        let key = MediaKey::movie(1);
        let before = ready(&[1]);
        let after = reduce(
            &before,
            EnrichmentPatch::Logo {
                key,
                path: Some("/l.png".into()),
            },
        )
        .unwrap();
        assert!(before.enrichment(&key).unwrap().logo_path.is_none());
        assert!(after.enrichment(&key).unwrap().logo_path.is_some());
        assert!(Arc::ptr_eq(&before.items, &after.items));
    }
}
