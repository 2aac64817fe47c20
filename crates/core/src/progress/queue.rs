//! Durable failed-saves queue.
//!
//! Holds items whose remote save exhausted its retry attempts, persisted
//! through [`LedgerStorage`] so parked intent survives a restart. Replay
//! is caller-driven; the queue never schedules itself.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::storage::{LedgerStorage, StorageError};
use super::types::MediaItem;

const QUEUE_KEY: &str = "failed_saves";

/// One parked save: the pending item and how many attempts it burned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedSave {
    pub item: MediaItem,
    pub attempts: u32,
}

pub struct FailedSaveQueue {
    storage: Arc<dyn LedgerStorage>,
    entries: HashMap<String, FailedSave>,
}

impl FailedSaveQueue {
    pub fn load(storage: Arc<dyn LedgerStorage>) -> Result<Self, StorageError> {
        let entries = match storage.read(QUEUE_KEY)? {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("discarding unreadable failed-saves queue: {e}");
                HashMap::new()
            }),
            None => HashMap::new(),
        };
        Ok(Self { storage, entries })
    }

    /// Park an item, replacing any older parked copy for the same id.
    pub fn park(&mut self, item: MediaItem, attempts: u32) -> Result<(), StorageError> {
        self.entries
            .insert(item.id.clone(), FailedSave { item, attempts });
        self.persist()
    }

    /// Remove a parked item after a successful save.
    pub fn remove(&mut self, media_id: &str) -> Result<(), StorageError> {
        if self.entries.remove(media_id).is_some() {
            self.persist()?;
        }
        Ok(())
    }

    pub fn get(&self, media_id: &str) -> Option<&FailedSave> {
        self.entries.get(media_id)
    }

    pub fn entries(&self) -> Vec<FailedSave> {
        self.entries.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) -> Result<(), StorageError> {
        if self.entries.is_empty() {
            return self.storage.remove(QUEUE_KEY);
        }
        let raw = serde_json::to_string(&self.entries).unwrap_or_else(|_| "{}".to_string());
        self.storage.write(QUEUE_KEY, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaKind;
    use crate::progress::storage::MemoryStorage;
    use crate::progress::types::MediaProgress;

    fn item(id: &str) -> MediaItem {
        MediaItem {
            id: id.to_string(),
            kind: MediaKind::Movie,
            title: format!("Movie {id}"),
            poster_path: None,
            backdrop_path: None,
            progress: MediaProgress::new(60.0, 7200.0),
            last_season_watched: None,
            last_episode_watched: None,
            episodes: HashMap::new(),
            last_updated: 1,
        }
    }

    #[test]
    fn test_park_and_get() {
        let mut queue = FailedSaveQueue::load(Arc::new(MemoryStorage::new())).unwrap();
        queue.park(item("a"), 3).unwrap();

        let parked = queue.get("a").unwrap();
        assert_eq!(parked.attempts, 3);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_parked_items_survive_reload() {
        let storage = Arc::new(MemoryStorage::new());
        {
            let mut queue = FailedSaveQueue::load(storage.clone()).unwrap();
            queue.park(item("a"), 3).unwrap();
        }
        let reloaded = FailedSaveQueue::load(storage).unwrap();
        assert_eq!(reloaded.get("a").unwrap().attempts, 3);
    }

    #[test]
    fn test_remove_clears_persisted_state() {
        let storage = Arc::new(MemoryStorage::new());
        let mut queue = FailedSaveQueue::load(storage.clone()).unwrap();
        queue.park(item("a"), 3).unwrap();
        queue.remove("a").unwrap();

        assert!(queue.is_empty());
        assert!(FailedSaveQueue::load(storage).unwrap().is_empty());
    }

    #[test]
    fn test_park_same_id_replaces() {
        let mut queue = FailedSaveQueue::load(Arc::new(MemoryStorage::new())).unwrap();
        let mut older = item("a");
        older.progress.watched = 10.0;
        let mut newer = item("a");
        newer.progress.watched = 50.0;

        queue.park(older, 3).unwrap();
        queue.park(newer, 3).unwrap();

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.get("a").unwrap().item.progress.watched, 50.0);
    }
}
