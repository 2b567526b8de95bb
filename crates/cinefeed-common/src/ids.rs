//! Typed ID wrappers for type safety across cinefeed.
//!
//! The catalog hands out plain integers, and movie and series ids live in
//! separate namespaces. [`MediaId`] keeps the integer from being mixed up with
//! counts or indexes; [`MediaKey`] is what per-item state is keyed by.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::MediaKind;

/// Catalog identifier of a movie or series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaId(u64);

impl MediaId {
    /// Wrap a raw catalog identifier.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw integer value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for MediaId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<MediaId> for u64 {
    fn from(id: MediaId) -> Self {
        id.0
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for MediaId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(Self)
    }
}

/// A media identifier qualified by its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MediaKey {
    /// Movie or series namespace.
    pub kind: MediaKind,
    /// Identifier within that namespace.
    pub id: MediaId,
}

impl MediaKey {
    /// Create a key from a kind and anything convertible to a [`MediaId`].
    #[must_use]
    pub fn new(kind: MediaKind, id: impl Into<MediaId>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    /// Shorthand for a movie key.
    #[must_use]
    pub fn movie(id: u64) -> Self {
        Self::new(MediaKind::Movie, id)
    }

    /// Shorthand for a series key.
    #[must_use]
    pub fn series(id: u64) -> Self {
        Self::new(MediaKind::Series, id)
    }
}

impl fmt::Display for MediaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}
