//! Per-item mute state and the autoplay configuration derived from it.

use std::collections::HashMap;
use std::time::Duration;

use cinefeed_common::MediaKey;
use serde::Serialize;

use crate::config::{AutoplayPolicy, HeroConfig};

/// Effective autoplay settings for the carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AutoplayConfig {
    pub delay: Duration,
    pub enabled: bool,
}

impl AutoplayConfig {
    pub fn enabled(delay: Duration) -> Self {
        Self {
            delay,
            enabled: true,
        }
    }
}

/// Tracks which items are muted and recomputes [`AutoplayConfig`] from
/// the whole set on every change.
#[derive(Debug, Clone)]
pub struct PlaybackController {
    default_delay: Duration,
    policy: AutoplayPolicy,
    muted: HashMap<MediaKey, bool>,
    autoplay: AutoplayConfig,
}

impl PlaybackController {
    pub fn new(default_delay: Duration, policy: AutoplayPolicy) -> Self {
        Self {
            default_delay,
            policy,
            muted: HashMap::new(),
            autoplay: AutoplayConfig::enabled(default_delay),
        }
    }

    pub fn from_config(config: &HeroConfig) -> Self {
        Self::new(config.default_delay(), config.unmuted_policy)
    }

    /// Replace the tracked items. Every tracked item starts muted.
    pub fn track<I>(&mut self, keys: I) -> AutoplayConfig
    where
        I: IntoIterator<Item = MediaKey>,
    {
        self.muted = keys.into_iter().map(|key| (key, true)).collect();
        self.recompute()
    }

    /// Flip the mute flag of one item. Untracked keys are ignored.
    pub fn toggle_mute(&mut self, key: MediaKey) -> AutoplayConfig {
        match self.muted.get_mut(&key) {
            Some(muted) => {
                *muted = !*muted;
                tracing::debug!(%key, muted = *muted, "Toggled mute");
                self.recompute()
            }
            None => self.autoplay,
        }
    }

    /// Mute every item and restore the default autoplay.
    pub fn reset(&mut self) -> AutoplayConfig {
        self.muted.values_mut().for_each(|muted| *muted = true);
        self.recompute()
    }

    /// Untracked items count as muted.
    pub fn is_muted(&self, key: &MediaKey) -> bool {
        self.muted.get(key).copied().unwrap_or(true)
    }

    pub fn autoplay(&self) -> AutoplayConfig {
        self.autoplay
    }

    fn recompute(&mut self) -> AutoplayConfig {
        let any_unmuted = self.muted.values().any(|muted| !muted);
        self.autoplay = match (any_unmuted, self.policy) {
            (false, _) => AutoplayConfig::enabled(self.default_delay),
            (true, AutoplayPolicy::Disable) => AutoplayConfig {
                delay: self.default_delay,
                enabled: false,
            },
            (true, AutoplayPolicy::Lengthen { delay_ms }) => {
                AutoplayConfig::enabled(Duration::from_millis(delay_ms))
            }
        };
        self.autoplay
    }
}
