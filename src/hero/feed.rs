//! The hero feed supervisor.
//!
//! [`HeroFeed::activate`] spawns a supervisor task that owns the current
//! [`HeroSnapshot`]. Fetch tasks never touch state: they send
//! [`EnrichmentPatch`] values tagged with their pipeline generation, and the
//! supervisor applies them through [`reduce`] and publishes the result on a
//! watch channel.
//!
//! ```text
//!   discovery task ──┐
//!   images(key) ─────┼──► patch channel ──► reducer ──► watch<Arc<HeroSnapshot>>
//!   videos(key) ─────┘        ▲
//!   FeedHandle ── commands ───┘ (reload, image loaded)
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use cinefeed_common::MediaKey;
use futures::future::try_join_all;
use rand::seq::SliceRandom;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::state::{reduce, EnrichmentField, EnrichmentPatch, HeroSnapshot};
use crate::catalog::{select_logo, select_trailer, ListQuery, MediaCatalog, MediaItem};
use crate::config::HeroConfig;

/// Capacity of the patch channel between fetch tasks and the reducer.
const PATCH_BUFFER: usize = 64;

/// A patch tagged with the generation that produced it.
#[derive(Debug)]
struct Tagged {
    generation: u64,
    patch: EnrichmentPatch,
}

/// Requests from the handle to the supervisor.
#[derive(Debug)]
enum FeedCommand {
    Reload,
    ImageLoaded { generation: u64, key: MediaKey },
}

/// An inactive hero feed. Call [`activate`](Self::activate) to start it.
pub struct HeroFeed {
    catalog: Arc<dyn MediaCatalog>,
    config: HeroConfig,
}

impl HeroFeed {
    pub fn new(catalog: Arc<dyn MediaCatalog>, config: HeroConfig) -> Self {
        Self { catalog, config }
    }

    /// Start discovery and enrichment. Must be called inside a Tokio runtime.
    pub fn activate(self) -> FeedHandle {
        let cancel = CancellationToken::new();
        let (snapshot_tx, snapshots) = watch::channel(Arc::new(HeroSnapshot::loading(0)));
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        info!(
            catalog = self.catalog.name(),
            sources = ?self.config.sources,
            "Activating hero feed"
        );

        let supervisor = Supervisor {
            catalog: self.catalog,
            config: Arc::new(self.config),
            snapshot_tx,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(supervisor.run(command_rx));

        FeedHandle {
            snapshots,
            commands: command_tx,
            requested_generation: 0,
            cancel,
            task: Some(task),
        }
    }
}

/// Handle to a running feed.
///
/// Dropping the handle cancels every in-flight request; use
/// [`deactivate`](Self::deactivate) to also wait for the supervisor to exit.
pub struct FeedHandle {
    snapshots: watch::Receiver<Arc<HeroSnapshot>>,
    commands: mpsc::UnboundedSender<FeedCommand>,
    requested_generation: u64,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl FeedHandle {
    /// The latest published snapshot.
    pub fn snapshot(&self) -> Arc<HeroSnapshot> {
        self.snapshots.borrow().clone()
    }

    /// A receiver notified on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<HeroSnapshot>> {
        self.snapshots.clone()
    }

    /// Report that the view finished loading an item's image.
    ///
    /// `generation` is that of the snapshot the view rendered; the report is
    /// dropped if the feed has reloaded since.
    pub fn mark_image_loaded(&self, generation: u64, key: MediaKey) {
        let _ = self
            .commands
            .send(FeedCommand::ImageLoaded { generation, key });
    }

    /// Cancel the current pipeline and run discovery again.
    pub fn reload(&mut self) {
        if self.commands.send(FeedCommand::Reload).is_ok() {
            self.requested_generation += 1;
        }
    }

    /// Wait until the latest requested generation has finished discovery
    /// and every secondary fetch has resolved.
    ///
    /// Returns the last published snapshot if the feed stops first.
    pub async fn settled(&self) -> Arc<HeroSnapshot> {
        let generation = self.requested_generation;
        let mut rx = self.subscribe();
        let result = rx
            .wait_for(|snap| snap.generation == generation && snap.is_settled())
            .await
            .map(|snap| snap.clone());
        match result {
            Ok(snap) => snap,
            Err(_) => self.snapshot(),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Cancel the feed and wait for the supervisor to exit.
    ///
    /// No snapshot is published after this returns.
    pub async fn deactivate(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Hero feed supervisor ended abnormally");
            }
        }
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ---------------------------------------------------------------------------
// Supervisor
// ---------------------------------------------------------------------------

struct Supervisor {
    catalog: Arc<dyn MediaCatalog>,
    config: Arc<HeroConfig>,
    snapshot_tx: watch::Sender<Arc<HeroSnapshot>>,
    cancel: CancellationToken,
}

impl Supervisor {
    async fn run(self, mut commands: mpsc::UnboundedReceiver<FeedCommand>) {
        let (patch_tx, mut patches) = mpsc::channel::<Tagged>(PATCH_BUFFER);
        let mut tasks = JoinSet::new();
        let mut generation = 0u64;
        let mut generation_token = self.cancel.child_token();

        self.spawn_discovery(generation, &generation_token, &patch_tx, &mut tasks);

        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => break,

                Some(command) = commands.recv() => match command {
                    FeedCommand::Reload => {
                        generation_token.cancel();
                        generation += 1;
                        generation_token = self.cancel.child_token();
                        info!(generation, "Reloading hero feed");
                        self.snapshot_tx
                            .send_replace(Arc::new(HeroSnapshot::loading(generation)));
                        self.spawn_discovery(generation, &generation_token, &patch_tx, &mut tasks);
                    }
                    FeedCommand::ImageLoaded { generation: seen, key } => {
                        if seen == generation {
                            self.apply(EnrichmentPatch::ImageLoaded { key });
                        } else {
                            trace!(%key, seen, generation, "Discarding image report for a previous generation");
                        }
                    }
                },

                Some(tagged) = patches.recv() => {
                    if tagged.generation != generation {
                        trace!(
                            patch_generation = tagged.generation,
                            generation,
                            "Discarding patch from a previous generation"
                        );
                        continue;
                    }
                    let discovered: Vec<MediaKey> = match &tagged.patch {
                        EnrichmentPatch::Discovered { items } => {
                            items.iter().map(MediaItem::key).collect()
                        }
                        _ => Vec::new(),
                    };
                    if self.apply(tagged.patch) {
                        for key in discovered {
                            self.spawn_enrichment(key, generation, &generation_token, &patch_tx, &mut tasks);
                        }
                    }
                }

                Some(joined) = tasks.join_next() => {
                    if let Err(e) = joined {
                        if e.is_panic() {
                            warn!(error = %e, "Hero fetch task panicked");
                        }
                    }
                }
            }
        }

        generation_token.cancel();
        tasks.shutdown().await;
        debug!("Hero feed stopped");
    }

    /// Reduce `patch` into the current snapshot and publish the result.
    /// Returns whether anything changed.
    fn apply(&self, patch: EnrichmentPatch) -> bool {
        let current = self.snapshot_tx.borrow().clone();
        match reduce(&current, patch) {
            Some(next) => {
                self.snapshot_tx.send_replace(Arc::new(next));
                true
            }
            None => false,
        }
    }

    fn spawn_discovery(
        &self,
        generation: u64,
        token: &CancellationToken,
        tx: &mpsc::Sender<Tagged>,
        tasks: &mut JoinSet<()>,
    ) {
        let catalog = self.catalog.clone();
        let config = self.config.clone();
        let token = token.clone();
        let tx = tx.clone();

        tasks.spawn(async move {
            let patch = tokio::select! {
                _ = token.cancelled() => return,
                result = discover(catalog.as_ref(), &config) => match result {
                    Ok(items) => {
                        info!(generation, items = items.len(), "Hero discovery complete");
                        EnrichmentPatch::Discovered { items }
                    }
                    Err(e) => {
                        warn!(
                            generation,
                            transient = e.is_transient(),
                            error = %e,
                            "Hero discovery failed"
                        );
                        EnrichmentPatch::DiscoveryFailed {
                            message: e.to_string(),
                        }
                    }
                },
            };
            let _ = tx.send(Tagged { generation, patch }).await;
        });
    }

    /// Spawn the images and videos fetches for one item.
    fn spawn_enrichment(
        &self,
        key: MediaKey,
        generation: u64,
        token: &CancellationToken,
        tx: &mpsc::Sender<Tagged>,
        tasks: &mut JoinSet<()>,
    ) {
        let catalog = self.catalog.clone();
        let language = self.config.logo_language.clone();
        let token_logo = token.clone();
        let tx_logo = tx.clone();
        tasks.spawn(async move {
            let patch = tokio::select! {
                _ = token_logo.cancelled() => return,
                result = catalog.images(key) => match result {
                    Ok(logos) => EnrichmentPatch::Logo {
                        key,
                        path: select_logo(&logos, &language),
                    },
                    Err(e) => failed(key, EnrichmentField::Logo, e),
                },
            };
            let _ = tx_logo.send(Tagged { generation, patch }).await;
        });

        let catalog = self.catalog.clone();
        let trailer_type = self.config.trailer_type.clone();
        let token = token.clone();
        let tx = tx.clone();
        tasks.spawn(async move {
            let patch = tokio::select! {
                _ = token.cancelled() => return,
                result = catalog.videos(key) => match result {
                    Ok(videos) => EnrichmentPatch::Trailer {
                        key,
                        video: select_trailer(&videos, &trailer_type).cloned(),
                    },
                    Err(e) => failed(key, EnrichmentField::Trailer, e),
                },
            };
            let _ = tx.send(Tagged { generation, patch }).await;
        });
    }
}

fn failed(key: MediaKey, field: EnrichmentField, error: cinefeed_common::Error) -> EnrichmentPatch {
    warn!(
        %key,
        %field,
        transient = error.is_transient(),
        error = %error,
        "Hero enrichment fetch failed"
    );
    EnrichmentPatch::FetchFailed {
        key,
        field,
        error: error.to_string(),
    }
}

/// Run the discovery request: one listing per configured source, all of
/// which must succeed.
async fn discover(
    catalog: &dyn MediaCatalog,
    config: &HeroConfig,
) -> cinefeed_common::Result<Vec<MediaItem>> {
    let queries: Vec<ListQuery> = config
        .sources
        .iter()
        .map(|kind| ListQuery::discover(*kind))
        .collect();
    let pages = try_join_all(queries.iter().map(|query| catalog.list(query))).await?;

    let mut seen = HashSet::new();
    let mut items: Vec<MediaItem> = pages
        .into_iter()
        .flatten()
        .filter(|item| seen.insert(item.key()))
        .collect();

    if config.shuffle {
        items.shuffle(&mut rand::thread_rng());
    }
    if let Some(max) = config.max_items {
        items.truncate(max);
    }
    Ok(items)
}
