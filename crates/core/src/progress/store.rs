//! Remote progress table interface.

use async_trait::async_trait;
use thiserror::Error;

use crate::media::MediaKind;

use super::types::ProgressRow;

#[derive(Debug, Error)]
pub enum ProgressStoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Server-side progress rows keyed by (user, media id, media kind).
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Upsert one row.
    async fn upsert(&self, row: &ProgressRow) -> Result<(), ProgressStoreError>;

    /// Upsert a batch in one operation. All-or-nothing: either every row
    /// lands or the call fails and nothing is recorded.
    async fn upsert_many(&self, rows: &[ProgressRow]) -> Result<(), ProgressStoreError>;

    /// All rows for a user, most recently updated first.
    async fn fetch_all(&self, user_id: &str) -> Result<Vec<ProgressRow>, ProgressStoreError>;

    /// Remove one row. Returns whether it existed.
    async fn delete(
        &self,
        user_id: &str,
        media_id: &str,
        kind: MediaKind,
    ) -> Result<bool, ProgressStoreError>;
}
