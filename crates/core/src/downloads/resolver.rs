//! Short-TTL caching resolver for download links; this is what the routes
//! talk to.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::TtlCache;

use super::{DownloadError, DownloadLink, DownloadProvider};

/// Caching facade over a [`DownloadProvider`]. The cache is owned here and
/// injected into the app state; there is no ambient global.
pub struct DownloadResolver {
    provider: Arc<dyn DownloadProvider>,
    cache: TtlCache<String, Vec<DownloadLink>>,
}

impl DownloadResolver {
    pub fn new(provider: Arc<dyn DownloadProvider>, ttl: Duration) -> Self {
        Self {
            provider,
            cache: TtlCache::new(ttl),
        }
    }

    fn movie_key(id: u64) -> String {
        format!("movie:{id}")
    }

    fn episode_key(id: u64, season: u32, episode: u32) -> String {
        format!("tv:{id}:{season}:{episode}")
    }

    pub async fn movie_links(&self, id: u64) -> Result<Vec<DownloadLink>, DownloadError> {
        let key = Self::movie_key(id);
        if let Some(cached) = self.cache.get(&key) {
            debug!(key, "download links served from cache");
            return Ok(cached);
        }
        let fresh = self.provider.movie_links(id).await?;
        self.cache.insert(key, fresh.clone());
        Ok(fresh)
    }

    pub async fn episode_links(
        &self,
        id: u64,
        season: u32,
        episode: u32,
    ) -> Result<Vec<DownloadLink>, DownloadError> {
        let key = Self::episode_key(id, season, episode);
        if let Some(cached) = self.cache.get(&key) {
            debug!(key, "download links served from cache");
            return Ok(cached);
        }
        let fresh = self.provider.episode_links(id, season, episode).await?;
        self.cache.insert(key, fresh.clone());
        Ok(fresh)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
