//! Download-link aggregation.
//!
//! Wraps a slow external download-link provider behind a short-TTL response
//! cache so identical (kind, id, season, episode) lookups within an hour hit
//! the provider once. Cache keys: `movie:{id}` and `tv:{id}:{season}:{episode}`.

mod client;
mod resolver;

pub use client::DownloadClient;
pub use resolver::DownloadResolver;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

/// One resolved download option for a title or episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadLink {
    pub label: String,
    pub quality: Option<String>,
    pub size: Option<String>,
    pub url: String,
}

/// Raw provider lookups, uncached.
#[async_trait]
pub trait DownloadProvider: Send + Sync {
    async fn movie_links(&self, id: u64) -> Result<Vec<DownloadLink>, DownloadError>;

    async fn episode_links(
        &self,
        id: u64,
        season: u32,
        episode: u32,
    ) -> Result<Vec<DownloadLink>, DownloadError>;
}
