//! Watchlist status store.
//!
//! Lets an authenticated user mark a media item with exactly one status,
//! or remove it. Rows carry denormalized display fields so list rendering
//! doesn't need a metadata lookup per item.

mod sqlite_store;
mod types;

pub use sqlite_store::SqliteWatchlistStore;
pub use types::*;

use thiserror::Error;

use crate::media::MediaKind;

#[derive(Debug, Error)]
pub enum WatchlistError {
    #[error("Database error: {0}")]
    Database(String),
}

/// CRUD over watchlist rows keyed by (user, media id, media kind).
pub trait WatchlistStore: Send + Sync {
    /// Status lookup; absence of a row means "no status".
    fn get(
        &self,
        user_id: &str,
        media_id: u64,
        kind: MediaKind,
    ) -> Result<Option<WatchlistEntry>, WatchlistError>;

    /// Insert-or-update on the (user, media id, media kind) conflict
    /// target; last write wins.
    fn upsert(
        &self,
        user_id: &str,
        media_id: u64,
        kind: MediaKind,
        update: WatchlistUpdate,
    ) -> Result<WatchlistEntry, WatchlistError>;

    /// Remove the row entirely. Distinct from setting status "dropped".
    /// Returns whether a row existed.
    fn delete(
        &self,
        user_id: &str,
        media_id: u64,
        kind: MediaKind,
    ) -> Result<bool, WatchlistError>;

    /// All rows for a user, most recently updated first.
    fn list(&self, user_id: &str) -> Result<Vec<WatchlistEntry>, WatchlistError>;
}
