//! Torrent index lookups.
//!
//! Movie search against a REST torrent index by IMDb identifier, with the
//! title as a disambiguator when the index returns fuzzy matches.
//! Successful lookups are cached per identifier for hours; 404s (unknown
//! identifier) map to an empty result and are never cached.

mod client;

pub use client::TorrentIndexClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TorrentIndexError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TorrentResult {
    pub title: String,
    pub quality: Option<String>,
    pub size: Option<String>,
    pub seeds: u32,
    pub peers: u32,
    pub magnet: String,
}

/// Raw index lookups, uncached.
#[async_trait]
pub trait TorrentIndex: Send + Sync {
    /// Search movie torrents by IMDb id. `title` disambiguates when the
    /// index matches several entries for one identifier. An unknown
    /// identifier yields an empty list, not an error.
    async fn search_movie(
        &self,
        imdb_id: &str,
        title: Option<&str>,
    ) -> Result<Vec<TorrentResult>, TorrentIndexError>;
}

use std::sync::Arc;
use std::time::Duration;

use crate::cache::TtlCache;

/// Per-identifier caching wrapper. Empty results (404 upstream) bypass the
/// cache so a film that appears on the index later isn't shadowed for hours.
pub struct CachedTorrentIndex {
    index: Arc<dyn TorrentIndex>,
    cache: TtlCache<String, Vec<TorrentResult>>,
}

impl CachedTorrentIndex {
    pub fn new(index: Arc<dyn TorrentIndex>, ttl: Duration) -> Self {
        Self {
            index,
            cache: TtlCache::new(ttl),
        }
    }

    pub async fn search_movie(
        &self,
        imdb_id: &str,
        title: Option<&str>,
    ) -> Result<Vec<TorrentResult>, TorrentIndexError> {
        if let Some(cached) = self.cache.get(&imdb_id.to_string()) {
            return Ok(cached);
        }
        let results = self.index.search_movie(imdb_id, title).await?;
        if !results.is_empty() {
            self.cache.insert(imdb_id.to_string(), results.clone());
        }
        Ok(results)
    }
}
