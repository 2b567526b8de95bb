//! Small-screen detection.
//!
//! The view suppresses trailer embeds on small screens and shows the static
//! backdrop instead. [`ViewportWatcher`] turns a stream of viewport sizes
//! into a boolean flag; it never touches enrichment state.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::ViewportConfig;

/// Viewport dimensions in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// `(max-width: W), (max-height: H)`: either bound matching is enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmallScreenQuery {
    pub max_width: u32,
    pub max_height: u32,
}

impl SmallScreenQuery {
    pub fn matches(&self, size: ViewportSize) -> bool {
        size.width <= self.max_width || size.height <= self.max_height
    }
}

impl Default for SmallScreenQuery {
    fn default() -> Self {
        ViewportConfig::default().into()
    }
}

impl From<ViewportConfig> for SmallScreenQuery {
    fn from(config: ViewportConfig) -> Self {
        Self {
            max_width: config.max_width,
            max_height: config.max_height,
        }
    }
}

/// Follows viewport size changes and publishes the small-screen flag.
///
/// Dropping the watcher (or calling [`release`](Self::release)) ends the
/// subscription.
pub struct ViewportWatcher {
    small_screen: watch::Receiver<bool>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ViewportWatcher {
    /// Evaluate `query` against the current size right away, then on every
    /// change of `sizes`.
    pub fn spawn(query: SmallScreenQuery, mut sizes: watch::Receiver<ViewportSize>) -> Self {
        let initial = query.matches(*sizes.borrow_and_update());
        let (tx, small_screen) = watch::channel(initial);
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    changed = sizes.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let size = *sizes.borrow_and_update();
                        let matches = query.matches(size);
                        let flipped = tx.send_if_modified(|current| {
                            if *current == matches {
                                return false;
                            }
                            *current = matches;
                            true
                        });
                        if flipped {
                            debug!(width = size.width, height = size.height, small_screen = matches, "Viewport class changed");
                        }
                    }
                }
            }
        });

        Self {
            small_screen,
            cancel,
            task: Some(task),
        }
    }

    pub fn is_small_screen(&self) -> bool {
        *self.small_screen.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.small_screen.clone()
    }

    /// Stop following size changes and wait for the watcher task to exit.
    pub async fn release(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for ViewportWatcher {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
