//! Slide navigation and the autoplay timer.

use std::time::Duration;

use cinefeed_common::MediaKey;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::playback::{AutoplayConfig, PlaybackController};
use crate::config::{AutoplayPolicy, HeroConfig};

/// Ordered slides with an active index.
///
/// Any change of the active slide resets playback: every slide is muted
/// again and autoplay returns to the default. The current
/// [`AutoplayConfig`] is published on a watch channel for [`run_autoplay`].
pub struct Carousel {
    slides: Vec<MediaKey>,
    active: usize,
    playback: PlaybackController,
    autoplay_tx: watch::Sender<AutoplayConfig>,
}

impl Carousel {
    pub fn new(default_delay: Duration, policy: AutoplayPolicy) -> Self {
        Self::with_playback(PlaybackController::new(default_delay, policy))
    }

    pub fn from_config(config: &HeroConfig) -> Self {
        Self::with_playback(PlaybackController::from_config(config))
    }

    fn with_playback(playback: PlaybackController) -> Self {
        let (autoplay_tx, _) = watch::channel(playback.autoplay());
        Self {
            slides: Vec::new(),
            active: 0,
            playback,
            autoplay_tx,
        }
    }

    /// Replace the slide list.
    ///
    /// The active slide is kept when it is still present, otherwise the
    /// carousel returns to the first slide. Playback is reset either way.
    pub fn set_slides(&mut self, slides: Vec<MediaKey>) {
        let current = self.active_key();
        self.active = current
            .and_then(|key| slides.iter().position(|k| *k == key))
            .unwrap_or(0);
        self.slides = slides;
        let config = self.playback.track(self.slides.iter().copied());
        self.publish(config);
    }

    pub fn slides(&self) -> &[MediaKey] {
        &self.slides
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Navigation wraps around only with more than one slide.
    pub fn is_looping(&self) -> bool {
        self.slides.len() > 1
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_key(&self) -> Option<MediaKey> {
        self.slides.get(self.active).copied()
    }

    pub fn is_active(&self, key: &MediaKey) -> bool {
        self.active_key().as_ref() == Some(key)
    }

    /// Advance one slide. Returns whether the active slide changed.
    pub fn next(&mut self) -> bool {
        let len = self.slides.len();
        if len == 0 {
            return false;
        }
        let target = if self.active + 1 < len {
            self.active + 1
        } else if self.is_looping() {
            0
        } else {
            return false;
        };
        self.activate(target)
    }

    /// Go back one slide. Returns whether the active slide changed.
    pub fn prev(&mut self) -> bool {
        let len = self.slides.len();
        if len == 0 {
            return false;
        }
        let target = if self.active > 0 {
            self.active - 1
        } else if self.is_looping() {
            len - 1
        } else {
            return false;
        };
        self.activate(target)
    }

    /// Jump to `index`. Out-of-range indices are ignored.
    pub fn go_to(&mut self, index: usize) -> bool {
        if index >= self.slides.len() {
            return false;
        }
        self.activate(index)
    }

    fn activate(&mut self, index: usize) -> bool {
        if index == self.active {
            return false;
        }
        self.active = index;
        trace!(index, "Active slide changed");
        let config = self.playback.reset();
        self.publish(config);
        true
    }

    /// Toggle sound on the active slide.
    ///
    /// Returns `None` (and changes nothing) for any other slide.
    pub fn toggle_mute(&mut self, key: MediaKey) -> Option<AutoplayConfig> {
        if !self.is_active(&key) {
            debug!(%key, "Ignoring mute toggle for inactive slide");
            return None;
        }
        let config = self.playback.toggle_mute(key);
        self.publish(config);
        Some(config)
    }

    pub fn is_muted(&self, key: &MediaKey) -> bool {
        self.playback.is_muted(key)
    }

    pub fn autoplay(&self) -> AutoplayConfig {
        self.playback.autoplay()
    }

    /// Receiver for autoplay changes, suitable for [`run_autoplay`].
    pub fn subscribe_autoplay(&self) -> watch::Receiver<AutoplayConfig> {
        self.autoplay_tx.subscribe()
    }

    fn publish(&self, config: AutoplayConfig) {
        self.autoplay_tx.send_replace(config);
    }
}

/// Drive the carousel clock.
///
/// Waits the configured delay, then sends a tick on `advance_tx`. Any
/// config change restarts the wait. While autoplay is disabled the loop
/// only waits for the next change. Returns on cancellation or when either
/// channel closes.
pub async fn run_autoplay(
    mut config_rx: watch::Receiver<AutoplayConfig>,
    advance_tx: mpsc::Sender<()>,
    cancel: CancellationToken,
) {
    loop {
        let config = *config_rx.borrow_and_update();

        if config.enabled {
            tokio::select! {
                _ = cancel.cancelled() => break,
                changed = config_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = tokio::time::sleep(config.delay) => {
                    if advance_tx.send(()).await.is_err() {
                        break;
                    }
                }
            }
        } else {
            tokio::select! {
                _ = cancel.cancelled() => break,
                changed = config_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
    }
    debug!("Autoplay timer stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: Duration = Duration::from_millis(15_000);

    fn carousel(n: u64, policy: AutoplayPolicy) -> Carousel {
        let mut carousel = Carousel::new(DEFAULT, policy);
        carousel.set_slides((1..=n).map(MediaKey::movie).collect());
        carousel
    }

    #[test]
    fn loops_with_more_than_one_slide() {
        let mut c = carousel(3, AutoplayPolicy::default());
        assert!(c.is_looping());
        assert!(c.prev());
        assert_eq!(c.active_index(), 2);
        assert!(c.next());
        assert_eq!(c.active_index(), 0);
    }

    #[test]
    fn single_slide_does_not_move() {
        let mut c = carousel(1, AutoplayPolicy::default());
        assert!(!c.is_looping());
        assert!(!c.next());
        assert!(!c.prev());
        assert_eq!(c.active_index(), 0);
    }

    #[test]
    fn empty_carousel_is_inert() {
        let mut c = carousel(0, AutoplayPolicy::default());
        assert!(c.is_empty());
        assert!(!c.next());
        assert!(!c.go_to(0));
        assert_eq!(c.active_key(), None);
    }

    #[test]
    fn slide_change_resets_mute_and_autoplay() {
        let mut c = carousel(2, AutoplayPolicy::Disable);
        let first = MediaKey::movie(1);
        assert_eq!(c.toggle_mute(first).map(|a| a.enabled), Some(false));
        assert!(!c.is_muted(&first));

        assert!(c.next());
        assert!(c.is_muted(&first));
        assert_eq!(c.autoplay(), AutoplayConfig::enabled(DEFAULT));
    }

    #[test]
    fn only_active_slide_can_be_unmuted() {
        let mut c = carousel(2, AutoplayPolicy::default());
        assert!(c.toggle_mute(MediaKey::movie(2)).is_none());
        assert!(c.is_muted(&MediaKey::movie(2)));
    }

    #[test]
    fn go_to_ignores_out_of_range_and_same_index() {
        let mut c = carousel(3, AutoplayPolicy::default());
        assert!(!c.go_to(3));
        assert!(!c.go_to(0));
        assert!(c.go_to(2));
        assert_eq!(c.active_key(), Some(MediaKey::movie(3)));
    }

    #[test]
    fn set_slides_keeps_active_when_present() {
        let mut c = carousel(3, AutoplayPolicy::default());
        c.go_to(1);
        c.set_slides(vec![MediaKey::movie(5), MediaKey::movie(2)]);
        assert_eq!(c.active_index(), 1);
        c.set_slides(vec![MediaKey::movie(9)]);
        assert_eq!(c.active_index(), 0);
    }

    #[test]
    fn autoplay_changes_are_published() {
        let mut c = carousel(2, AutoplayPolicy::Lengthen { delay_ms: 60_000 });
        let rx = c.subscribe_autoplay();
        c.toggle_mute(MediaKey::movie(1));
        assert_eq!(rx.borrow().delay, Duration::from_secs(60));
        c.next();
        assert_eq!(rx.borrow().delay, DEFAULT);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_ticks_after_delay() {
        let (config_tx, config_rx) = watch::channel(AutoplayConfig::enabled(Duration::from_secs(5)));
        let (advance_tx, mut advance_rx) = mpsc::channel(4);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_autoplay(config_rx, advance_tx, cancel.clone()));

        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert!(advance_rx.try_recv().is_err());
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(advance_rx.try_recv().is_ok());

        cancel.cancel();
        task.await.unwrap();
        drop(config_tx);
    }

    #[tokio::test(start_paused = true)]
    async fn config_change_restarts_wait() {
        let (config_tx, config_rx) = watch::channel(AutoplayConfig::enabled(Duration::from_secs(5)));
        let (advance_tx, mut advance_rx) = mpsc::channel(4);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_autoplay(config_rx, advance_tx, cancel.clone()));

        tokio::time::sleep(Duration::from_secs(4)).await;
        config_tx.send_replace(AutoplayConfig::enabled(Duration::from_secs(5)));
        tokio::time::sleep(Duration::from_secs(4)).await;
        assert!(advance_rx.try_recv().is_err());
        tokio::time::sleep(Duration::from_millis(1_100)).await;
        assert!(advance_rx.try_recv().is_ok());

        cancel.cancel();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_autoplay_waits_for_change() {
        let (config_tx, config_rx) = watch::channel(AutoplayConfig {
            delay: Duration::from_secs(1),
            enabled: false,
        });
        let (advance_tx, mut advance_rx) = mpsc::channel(4);
        let task = tokio::spawn(run_autoplay(config_rx, advance_tx, CancellationToken::new()));

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(advance_rx.try_recv().is_err());

        config_tx.send_replace(AutoplayConfig::enabled(Duration::from_secs(1)));
        tokio::time::sleep(Duration::from_millis(1_100)).await;
        assert!(advance_rx.try_recv().is_ok());

        // closing the config channel stops the timer
        drop(config_tx);
        task.await.unwrap();
    }
}
