use std::path::{Path, PathBuf};

use cinefeed_common::{MediaKey, Result};
use parking_lot::Mutex;
use tracing::{debug, info};

use super::WatchEntry;

/// File-backed continue-watching list.
///
/// Every mutation reads the whole list, changes it, and writes it back via
/// a temporary file and a rename. A process-local lock serializes those
/// read-modify-write cycles; separate processes sharing the file can still
/// lose each other's updates.
pub struct ContinueWatchingStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ContinueWatchingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries, oldest first. A missing file is an empty list.
    pub fn load(&self) -> Result<Vec<WatchEntry>> {
        let _guard = self.lock.lock();
        self.read()
    }

    /// Record that playback of `entry` started.
    ///
    /// An existing entry for the same item is replaced and moves to the end.
    pub fn record(&self, entry: WatchEntry) -> Result<()> {
        let _guard = self.lock.lock();
        let mut entries = self.read()?;
        let key = entry.key();
        entries.retain(|e| e.key() != key);
        entries.push(entry);
        self.write(&entries)?;
        info!(%key, total = entries.len(), "Recorded continue-watching entry");
        Ok(())
    }

    /// Remove the entry for `key`. Returns whether one was present.
    pub fn remove(&self, key: MediaKey) -> Result<bool> {
        let _guard = self.lock.lock();
        let mut entries = self.read()?;
        let before = entries.len();
        entries.retain(|e| e.key() != key);
        if entries.len() == before {
            debug!(%key, "No continue-watching entry to remove");
            return Ok(false);
        }
        self.write(&entries)?;
        info!(%key, "Removed continue-watching entry");
        Ok(true)
    }

    pub fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock();
        self.write(&[])
    }

    fn read(&self) -> Result<Vec<WatchEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write(&self, entries: &[WatchEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
