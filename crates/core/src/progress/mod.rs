//! Watch-progress tracking and sync.
//!
//! Playback progress originates from an embedded third-party player as
//! push events, lands in a device-local ledger, and is reconciled with a
//! per-user remote table once a session authenticates. Failed remote
//! writes park in a durable queue for later replay so transient outages
//! never lose progress.

mod ledger;
mod queue;
mod sqlite_store;
mod storage;
mod store;
mod sync;
mod types;

pub use ledger::ProgressLedger;
pub use queue::{FailedSave, FailedSaveQueue};
pub use sqlite_store::SqliteProgressStore;
pub use storage::{JsonFileStorage, LedgerStorage, MemoryStorage, StorageError};
pub use store::{ProgressStore, ProgressStoreError};
pub use sync::{ProgressSync, ReplayReport, SaveOutcome, SyncError, SyncOptions, SyncOutcome};
pub use types::{EpisodeProgress, MediaItem, MediaProgress, ProgressRow};
