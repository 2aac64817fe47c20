//! Reconciles the device-local ledger with the per-user remote table.
//!
//! Writes always land locally first, then push to the remote store with
//! bounded retry. Exhausted saves park in the durable queue; a later
//! successful save or an explicit replay drains them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::media::MediaKind;

use super::ledger::ProgressLedger;
use super::queue::FailedSaveQueue;
use super::storage::StorageError;
use super::store::{ProgressStore, ProgressStoreError};
use super::types::{MediaItem, ProgressRow};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Store(#[from] ProgressStoreError),
}

#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    /// Remote save attempts before an item parks in the failed queue.
    pub max_attempts: u32,
    /// First retry delay; doubles after every failed attempt.
    pub backoff_base: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_secs(1),
        }
    }
}

/// Result of a single remote save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved { attempts: u32 },
    Parked { attempts: u32 },
}

/// Result of draining the failed-saves queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayReport {
    pub saved: usize,
    pub remaining: usize,
}

/// Result of the login-time reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Completed {
        uploaded: usize,
        downloaded: usize,
        replay: ReplayReport,
    },
    /// Another reconciliation is running.
    Busy,
}

pub struct ProgressSync {
    store: Arc<dyn ProgressStore>,
    ledger: Mutex<ProgressLedger>,
    queue: Mutex<FailedSaveQueue>,
    in_flight: AtomicBool,
    options: SyncOptions,
}

impl ProgressSync {
    pub fn new(
        store: Arc<dyn ProgressStore>,
        ledger: ProgressLedger,
        queue: FailedSaveQueue,
        options: SyncOptions,
    ) -> Self {
        Self {
            store,
            ledger: Mutex::new(ledger),
            queue: Mutex::new(queue),
            in_flight: AtomicBool::new(false),
            options,
        }
    }

    /// Fold a player push event into the local ledger.
    pub fn merge_player_update(
        &self,
        items: HashMap<String, MediaItem>,
    ) -> Result<(), StorageError> {
        self.ledger.lock().unwrap().merge(items)
    }

    pub fn ledger_snapshot(&self) -> Vec<MediaItem> {
        self.ledger.lock().unwrap().snapshot()
    }

    pub fn queued_saves(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    /// Record locally, then push to the remote table with bounded retry.
    pub async fn save_with_retry(
        &self,
        user_id: &str,
        item: MediaItem,
    ) -> Result<SaveOutcome, SyncError> {
        {
            let mut ledger = self.ledger.lock().unwrap();
            ledger.merge(HashMap::from([(item.id.clone(), item.clone())]))?;
        }

        let row = item.to_row(user_id);
        match self.upsert_with_backoff(&row).await {
            Some(attempts) => {
                self.queue.lock().unwrap().remove(&item.id)?;
                debug!(media_id = %item.id, attempts, "progress saved");
                Ok(SaveOutcome::Saved { attempts })
            }
            None => {
                let attempts = self.options.max_attempts;
                self.queue.lock().unwrap().park(item, attempts)?;
                Ok(SaveOutcome::Parked { attempts })
            }
        }
    }

    /// One full retry cycle against the remote store. Returns the attempt
    /// that landed, or None after the schedule is exhausted. Sleeps after
    /// every failed attempt, the last included.
    async fn upsert_with_backoff(&self, row: &ProgressRow) -> Option<u32> {
        for attempt in 1..=self.options.max_attempts {
            match self.store.upsert(row).await {
                Ok(()) => return Some(attempt),
                Err(e) => {
                    warn!(media_id = %row.media_id, attempt, "progress save failed: {e}");
                    let delay = self.options.backoff_base * 2u32.pow(attempt - 1);
                    tokio::time::sleep(delay).await;
                }
            }
        }
        None
    }

    /// Push every ledger entry to the remote table in one batch. The
    /// ledger is cleared only when the batch lands; a failed batch leaves
    /// it untouched for the next attempt and never feeds the queue.
    pub async fn bulk_upload(&self, user_id: &str) -> Result<usize, SyncError> {
        let snapshot = self.ledger.lock().unwrap().snapshot();
        if snapshot.is_empty() {
            return Ok(0);
        }

        let rows: Vec<_> = snapshot.iter().map(|item| item.to_row(user_id)).collect();
        self.store.upsert_many(&rows).await?;
        self.ledger.lock().unwrap().clear()?;
        Ok(rows.len())
    }

    /// Pull the user's remote rows into the local ledger.
    pub async fn bulk_download(&self, user_id: &str) -> Result<usize, SyncError> {
        let rows = self.store.fetch_all(user_id).await?;
        let count = rows.len();
        let items: HashMap<String, MediaItem> = rows
            .into_iter()
            .map(|row| {
                let item = MediaItem::from(row);
                (item.id.clone(), item)
            })
            .collect();
        self.ledger.lock().unwrap().merge(items)?;
        Ok(count)
    }

    /// Give every parked save a fresh retry cycle. Successes leave the
    /// queue; entries that exhaust the schedule again stay parked. Never
    /// self-schedules; the caller decides when to replay.
    pub async fn replay_queue(&self, user_id: &str) -> Result<ReplayReport, SyncError> {
        let parked = self.queue.lock().unwrap().entries();
        let mut saved = 0;
        for entry in parked {
            let row = entry.item.to_row(user_id);
            if self.upsert_with_backoff(&row).await.is_some() {
                self.queue.lock().unwrap().remove(&entry.item.id)?;
                saved += 1;
            } else {
                warn!(media_id = %entry.item.id, "replay exhausted retries, staying parked");
            }
        }
        let remaining = self.queue.lock().unwrap().len();
        Ok(ReplayReport { saved, remaining })
    }

    /// Login-time reconciliation: upload the local ledger, pull the
    /// remote rows back down, then replay parked saves. Runs on every
    /// authenticated transition; the in-flight flag only collapses
    /// overlapping triggers, so entries merged between sign-ins get
    /// pushed on the next one. An empty ledger makes a repeat run a
    /// no-op upload.
    pub async fn on_authenticated(&self, user_id: &str) -> Result<SyncOutcome, SyncError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(SyncOutcome::Busy);
        }

        let result = self.reconcile(user_id).await;
        self.in_flight.store(false, Ordering::Release);
        result
    }

    async fn reconcile(&self, user_id: &str) -> Result<SyncOutcome, SyncError> {
        let uploaded = self.bulk_upload(user_id).await?;
        let downloaded = self.bulk_download(user_id).await?;
        let replay = self.replay_queue(user_id).await?;
        Ok(SyncOutcome::Completed {
            uploaded,
            downloaded,
            replay,
        })
    }

    /// Drop a title everywhere: ledger, parked queue and remote table.
    pub async fn remove_progress(
        &self,
        user_id: &str,
        media_id: &str,
        kind: MediaKind,
    ) -> Result<bool, SyncError> {
        let local = self.ledger.lock().unwrap().remove(media_id)?.is_some();
        self.queue.lock().unwrap().remove(media_id)?;
        let remote = self.store.delete(user_id, media_id, kind).await?;
        Ok(local || remote)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::progress::storage::MemoryStorage;
    use crate::progress::types::{MediaProgress, ProgressRow};
    use async_trait::async_trait;

    /// Store whose first `fail_first` upserts error, then everything
    /// succeeds. Records every row that lands.
    struct ScriptedStore {
        fail_first: usize,
        upsert_calls: AtomicUsize,
        attempt_times: Mutex<Vec<tokio::time::Instant>>,
        landed: Mutex<Vec<ProgressRow>>,
        remote_rows: Vec<ProgressRow>,
        fail_batches: bool,
    }

    impl ScriptedStore {
        fn new(fail_first: usize) -> Self {
            Self {
                fail_first,
                upsert_calls: AtomicUsize::new(0),
                attempt_times: Mutex::new(Vec::new()),
                landed: Mutex::new(Vec::new()),
                remote_rows: Vec::new(),
                fail_batches: false,
            }
        }

        fn with_remote_rows(mut self, rows: Vec<ProgressRow>) -> Self {
            self.remote_rows = rows;
            self
        }

        fn failing_batches(mut self) -> Self {
            self.fail_batches = true;
            self
        }

        fn calls(&self) -> usize {
            self.upsert_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ProgressStore for ScriptedStore {
        async fn upsert(&self, row: &ProgressRow) -> Result<(), ProgressStoreError> {
            self.attempt_times.lock().unwrap().push(tokio::time::Instant::now());
            let call = self.upsert_calls.fetch_add(1, Ordering::SeqCst);
            if call < self.fail_first {
                return Err(ProgressStoreError::Unavailable("scripted".to_string()));
            }
            self.landed.lock().unwrap().push(row.clone());
            Ok(())
        }

        async fn upsert_many(&self, rows: &[ProgressRow]) -> Result<(), ProgressStoreError> {
            if self.fail_batches {
                return Err(ProgressStoreError::Unavailable("scripted".to_string()));
            }
            self.landed.lock().unwrap().extend_from_slice(rows);
            Ok(())
        }

        async fn fetch_all(&self, user_id: &str) -> Result<Vec<ProgressRow>, ProgressStoreError> {
            Ok(self
                .remote_rows
                .iter()
                .filter(|r| r.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn delete(
            &self,
            _user_id: &str,
            media_id: &str,
            _kind: MediaKind,
        ) -> Result<bool, ProgressStoreError> {
            Ok(self
                .landed
                .lock()
                .unwrap()
                .iter()
                .any(|r| r.media_id == media_id))
        }
    }

    fn movie(id: &str, watched: f64) -> MediaItem {
        MediaItem {
            id: id.to_string(),
            kind: MediaKind::Movie,
            title: format!("Movie {id}"),
            poster_path: None,
            backdrop_path: None,
            progress: MediaProgress::new(watched, 7200.0),
            last_season_watched: None,
            last_episode_watched: None,
            episodes: HashMap::new(),
            last_updated: 1_700_000_000_000,
        }
    }

    fn sync_with(store: Arc<ScriptedStore>) -> ProgressSync {
        let storage = Arc::new(MemoryStorage::new());
        let ledger = ProgressLedger::load(storage.clone()).unwrap();
        let queue = FailedSaveQueue::load(storage).unwrap();
        let options = SyncOptions {
            max_attempts: 3,
            backoff_base: Duration::from_millis(1),
        };
        ProgressSync::new(store, ledger, queue, options)
    }

    #[tokio::test]
    async fn test_save_first_attempt() {
        let store = Arc::new(ScriptedStore::new(0));
        let sync = sync_with(store.clone());

        let outcome = sync.save_with_retry("u1", movie("1", 30.0)).await.unwrap();

        assert_eq!(outcome, SaveOutcome::Saved { attempts: 1 });
        assert_eq!(store.calls(), 1);
        assert_eq!(sync.queued_saves(), 0);
        assert_eq!(sync.ledger_snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_save_succeeds_on_third_attempt() {
        let store = Arc::new(ScriptedStore::new(2));
        let sync = sync_with(store.clone());

        let outcome = sync.save_with_retry("u1", movie("1", 30.0)).await.unwrap();

        assert_eq!(outcome, SaveOutcome::Saved { attempts: 3 });
        assert_eq!(store.calls(), 3);
        assert_eq!(sync.queued_saves(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_delays_double_between_attempts() {
        let store = Arc::new(ScriptedStore::new(10));
        let storage = Arc::new(MemoryStorage::new());
        let ledger = ProgressLedger::load(storage.clone()).unwrap();
        let queue = FailedSaveQueue::load(storage).unwrap();
        // Real 1s/2s/4s schedule under paused time
        let sync = ProgressSync::new(store.clone(), ledger, queue, SyncOptions::default());

        let start = tokio::time::Instant::now();
        let outcome = sync.save_with_retry("u1", movie("1", 30.0)).await.unwrap();

        assert_eq!(outcome, SaveOutcome::Parked { attempts: 3 });
        let times = store.attempt_times.lock().unwrap();
        assert_eq!(times.len(), 3);
        assert_eq!(times[1] - times[0], Duration::from_secs(1));
        assert_eq!(times[2] - times[1], Duration::from_secs(2));
        // The last attempt still waits its 4s before parking
        assert_eq!(start.elapsed(), Duration::from_secs(7));
    }

    #[tokio::test]
    async fn test_exhausted_save_parks_with_attempt_count() {
        let store = Arc::new(ScriptedStore::new(10));
        let sync = sync_with(store.clone());

        let outcome = sync.save_with_retry("u1", movie("1", 30.0)).await.unwrap();

        assert_eq!(outcome, SaveOutcome::Parked { attempts: 3 });
        assert_eq!(store.calls(), 3);
        assert_eq!(sync.queued_saves(), 1);
        // The parked item still lives in the ledger
        assert_eq!(sync.ledger_snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_later_success_unparks() {
        let store = Arc::new(ScriptedStore::new(3));
        let sync = sync_with(store.clone());

        let first = sync.save_with_retry("u1", movie("1", 30.0)).await.unwrap();
        assert_eq!(first, SaveOutcome::Parked { attempts: 3 });

        let second = sync.save_with_retry("u1", movie("1", 45.0)).await.unwrap();
        assert_eq!(second, SaveOutcome::Saved { attempts: 1 });
        assert_eq!(sync.queued_saves(), 0);
    }

    #[tokio::test]
    async fn test_bulk_upload_clears_ledger_on_success() {
        let store = Arc::new(ScriptedStore::new(0));
        let sync = sync_with(store.clone());
        sync.merge_player_update(HashMap::from([
            ("1".to_string(), movie("1", 30.0)),
            ("2".to_string(), movie("2", 60.0)),
        ]))
        .unwrap();

        let uploaded = sync.bulk_upload("u1").await.unwrap();

        assert_eq!(uploaded, 2);
        assert!(sync.ledger_snapshot().is_empty());
        assert_eq!(store.landed.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_bulk_upload_keeps_ledger_and_queue_empty() {
        let store = Arc::new(ScriptedStore::new(0).failing_batches());
        let sync = sync_with(store);
        sync.merge_player_update(HashMap::from([("1".to_string(), movie("1", 30.0))]))
            .unwrap();

        let result = sync.bulk_upload("u1").await;

        assert!(result.is_err());
        assert_eq!(sync.ledger_snapshot().len(), 1);
        assert_eq!(sync.queued_saves(), 0);
    }

    #[tokio::test]
    async fn test_bulk_download_merges_remote_rows() {
        let remote = vec![movie("9", 120.0).to_row("u1"), movie("8", 0.0).to_row("u2")];
        let store = Arc::new(ScriptedStore::new(0).with_remote_rows(remote));
        let sync = sync_with(store);

        let downloaded = sync.bulk_download("u1").await.unwrap();

        assert_eq!(downloaded, 1);
        let snapshot = sync.ledger_snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, "9");
    }

    #[tokio::test]
    async fn test_replay_drains_successes_only() {
        let store = Arc::new(ScriptedStore::new(6));
        let sync = sync_with(store.clone());
        // Two exhausted saves, six scripted failures total
        sync.save_with_retry("u1", movie("1", 30.0)).await.unwrap();
        sync.save_with_retry("u1", movie("2", 60.0)).await.unwrap();
        assert_eq!(sync.queued_saves(), 2);

        let report = sync.replay_queue("u1").await.unwrap();

        assert_eq!(report, ReplayReport { saved: 2, remaining: 0 });
    }

    #[tokio::test]
    async fn test_replay_exhaustion_stays_parked() {
        let store = Arc::new(ScriptedStore::new(6));
        let sync = sync_with(store.clone());
        // Save burns three failures and parks
        sync.save_with_retry("u1", movie("1", 30.0)).await.unwrap();

        // Replay burns three more and gives up again
        let first = sync.replay_queue("u1").await.unwrap();
        assert_eq!(first, ReplayReport { saved: 0, remaining: 1 });
        assert_eq!(store.calls(), 6);

        // The store has recovered by the next replay
        let second = sync.replay_queue("u1").await.unwrap();
        assert_eq!(second, ReplayReport { saved: 1, remaining: 0 });
    }

    #[tokio::test]
    async fn test_on_authenticated_uploads_ledger() {
        let store = Arc::new(ScriptedStore::new(0));
        let sync = sync_with(store.clone());
        sync.merge_player_update(HashMap::from([("1".to_string(), movie("1", 30.0))]))
            .unwrap();

        let outcome = sync.on_authenticated("u1").await.unwrap();

        assert!(matches!(
            outcome,
            SyncOutcome::Completed { uploaded: 1, .. }
        ));
        assert!(sync.ledger_snapshot().is_empty());
        assert_eq!(store.landed.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_second_transition_uploads_new_ledger_entries() {
        let store = Arc::new(ScriptedStore::new(0));
        let sync = sync_with(store.clone());
        sync.merge_player_update(HashMap::from([("1".to_string(), movie("1", 30.0))]))
            .unwrap();
        sync.on_authenticated("u1").await.unwrap();

        // Progress recorded between sign-ins lands on the next transition
        sync.merge_player_update(HashMap::from([("2".to_string(), movie("2", 60.0))]))
            .unwrap();
        let second = sync.on_authenticated("u1").await.unwrap();

        assert!(matches!(
            second,
            SyncOutcome::Completed { uploaded: 1, .. }
        ));
        assert!(sync.ledger_snapshot().is_empty());
        assert_eq!(store.landed.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_remove_progress_clears_everywhere() {
        let store = Arc::new(ScriptedStore::new(0));
        let sync = sync_with(store);
        sync.save_with_retry("u1", movie("1", 30.0)).await.unwrap();

        let existed = sync
            .remove_progress("u1", "1", MediaKind::Movie)
            .await
            .unwrap();

        assert!(existed);
        assert!(sync.ledger_snapshot().is_empty());
        assert_eq!(sync.queued_saves(), 0);
    }
}
