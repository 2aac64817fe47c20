//! Sports-stream directory aggregation.
//!
//! Proxies a third-party directory of live sports streams: sport list,
//! match listings (live / popular / by sport) and per-source stream links.
//! Listing responses are revalidated through TTL caches: 3600s for the
//! sport list, 60s for live matches and 300s for general match listings.

mod cached;
mod client;
mod types;

pub use cached::CachedSports;
pub use client::SportsClient;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SportsError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

/// Read-only operations against the sports-stream directory.
#[async_trait]
pub trait SportsProvider: Send + Sync {
    /// All sports the directory knows about.
    async fn sports(&self) -> Result<Vec<Sport>, SportsError>;

    /// Match listing for a scope, optionally narrowed to one sport.
    async fn matches(
        &self,
        scope: MatchScope,
        sport: Option<&str>,
    ) -> Result<Vec<SportsMatch>, SportsError>;

    /// Stream links for one match from one source.
    async fn streams(&self, source: &str, id: &str) -> Result<Vec<StreamLink>, SportsError>;
}
