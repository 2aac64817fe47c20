//! Metadata gateway: thin client over the external media-metadata API.
//!
//! Shapes upstream responses for browsing/search/detail pages. Consumed
//! read-only; the provider requires an API key passed as a query parameter.

mod tmdb;
mod types;

pub use tmdb::TmdbClient;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

use crate::media::MediaKind;

/// Errors from the metadata provider.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimited,

    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Client not configured (missing API key, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// Read-only metadata operations used by the browse/search/detail routes.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Trending titles across movies and TV for a time window.
    async fn trending(
        &self,
        window: TrendingWindow,
        page: u32,
    ) -> Result<Paginated<MediaSummary>, MetadataError>;

    /// Popular titles of one kind.
    async fn popular(
        &self,
        kind: MediaKind,
        page: u32,
    ) -> Result<Paginated<MediaSummary>, MetadataError>;

    /// Top-rated titles of one kind.
    async fn top_rated(
        &self,
        kind: MediaKind,
        page: u32,
    ) -> Result<Paginated<MediaSummary>, MetadataError>;

    /// Discovery with genre/year/sort filters.
    async fn discover(
        &self,
        kind: MediaKind,
        filter: DiscoverFilter,
    ) -> Result<Paginated<MediaSummary>, MetadataError>;

    /// Free-text search across movies and TV.
    async fn search(
        &self,
        query: &str,
        page: u32,
    ) -> Result<Paginated<MediaSummary>, MetadataError>;

    /// Movie detail by provider id.
    async fn movie(&self, id: u64) -> Result<MovieDetails, MetadataError>;

    /// TV series detail by provider id.
    async fn tv(&self, id: u64) -> Result<TvDetails, MetadataError>;

    /// Cast and crew for a title.
    async fn credits(&self, kind: MediaKind, id: u64) -> Result<Credits, MetadataError>;

    /// Trailers and other videos for a title.
    async fn videos(&self, kind: MediaKind, id: u64) -> Result<Vec<Video>, MetadataError>;

    /// One season of a series, with its episodes.
    async fn tv_season(&self, id: u64, season: u32) -> Result<Season, MetadataError>;

    /// Person detail (cast/crew member).
    async fn person(&self, id: u64) -> Result<Person, MetadataError>;

    /// Genre list for one kind.
    async fn genres(&self, kind: MediaKind) -> Result<Vec<Genre>, MetadataError>;
}
