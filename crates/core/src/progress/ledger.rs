//! Device-local progress ledger.
//!
//! An event sink plus persisted cache: unsolicited (already origin-checked)
//! player updates are merged in by shallow key overwrite and the merged map
//! is persisted. No network calls happen here.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use super::storage::{LedgerStorage, StorageError};
use super::types::MediaItem;

const LEDGER_KEY: &str = "watch_progress";

/// Keyed-by-media-id map of playback progress. Single writer; methods take
/// `&mut self` so exclusive ownership is enforced by the borrow checker.
pub struct ProgressLedger {
    storage: Arc<dyn LedgerStorage>,
    entries: HashMap<String, MediaItem>,
}

impl ProgressLedger {
    /// Load the persisted ledger, starting empty when nothing (or garbage)
    /// is stored.
    pub fn load(storage: Arc<dyn LedgerStorage>) -> Result<Self, StorageError> {
        let entries = match storage.read(LEDGER_KEY)? {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("discarding unreadable progress ledger: {e}");
                HashMap::new()
            }),
            None => HashMap::new(),
        };
        Ok(Self { storage, entries })
    }

    /// Merge a full or partial ledger update: incoming entries replace
    /// same-id entries wholesale, everything else is untouched. The merged
    /// result is persisted before returning.
    pub fn merge(&mut self, incoming: HashMap<String, MediaItem>) -> Result<(), StorageError> {
        if incoming.is_empty() {
            return Ok(());
        }
        self.entries.extend(incoming);
        self.persist()
    }

    pub fn get(&self, id: &str) -> Option<&MediaItem> {
        self.entries.get(id)
    }

    /// Drop one entry ("remove progress" action).
    pub fn remove(&mut self, id: &str) -> Result<Option<MediaItem>, StorageError> {
        let removed = self.entries.remove(id);
        if removed.is_some() {
            self.persist()?;
        }
        Ok(removed)
    }

    /// Full clear, persisted. Used after a successful bulk upload when the
    /// remote table becomes the source of truth.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.entries.clear();
        self.storage.remove(LEDGER_KEY)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Snapshot of all entries.
    pub fn snapshot(&self) -> Vec<MediaItem> {
        self.entries.values().cloned().collect()
    }

    fn persist(&self) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&self.entries)
            .unwrap_or_else(|_| "{}".to_string());
        self.storage.write(LEDGER_KEY, &raw)
    }
}
