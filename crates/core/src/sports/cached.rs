//! Revalidating cache wrapper over a [`SportsProvider`].

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::TtlCache;

use super::{MatchScope, Sport, SportsError, SportsMatch, SportsProvider, StreamLink};

const SPORTS_TTL: Duration = Duration::from_secs(3600);
const LIVE_TTL: Duration = Duration::from_secs(60);
const GENERAL_TTL: Duration = Duration::from_secs(300);

/// Caching facade for the sports directory. Live listings revalidate every
/// 60s, general listings every 300s and the sport list hourly. Stream-link
/// lookups always go upstream.
pub struct CachedSports {
    provider: Arc<dyn SportsProvider>,
    sports: TtlCache<(), Vec<Sport>>,
    live_matches: TtlCache<String, Vec<SportsMatch>>,
    general_matches: TtlCache<String, Vec<SportsMatch>>,
}

impl CachedSports {
    pub fn new(provider: Arc<dyn SportsProvider>) -> Self {
        Self {
            provider,
            sports: TtlCache::new(SPORTS_TTL),
            live_matches: TtlCache::new(LIVE_TTL),
            general_matches: TtlCache::new(GENERAL_TTL),
        }
    }

    pub async fn sports(&self) -> Result<Vec<Sport>, SportsError> {
        if let Some(cached) = self.sports.get(&()) {
            debug!("sport list served from cache");
            return Ok(cached);
        }
        let fresh = self.provider.sports().await?;
        self.sports.insert((), fresh.clone());
        Ok(fresh)
    }

    pub async fn matches(
        &self,
        scope: MatchScope,
        sport: Option<&str>,
    ) -> Result<Vec<SportsMatch>, SportsError> {
        let key = format!("{}:{}", scope.as_str(), sport.unwrap_or("all"));
        let cache = match scope {
            MatchScope::Live => &self.live_matches,
            MatchScope::Popular | MatchScope::All => &self.general_matches,
        };

        if let Some(cached) = cache.get(&key) {
            debug!(key, "match listing served from cache");
            return Ok(cached);
        }
        let fresh = self.provider.matches(scope, sport).await?;
        cache.insert(key, fresh.clone());
        Ok(fresh)
    }

    pub async fn streams(&self, source: &str, id: &str) -> Result<Vec<StreamLink>, SportsError> {
        self.provider.streams(source, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SportsProvider for CountingProvider {
        async fn sports(&self) -> Result<Vec<Sport>, SportsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Sport {
                id: "football".to_string(),
                name: "Football".to_string(),
            }])
        }

        async fn matches(
            &self,
            _scope: MatchScope,
            _sport: Option<&str>,
        ) -> Result<Vec<SportsMatch>, SportsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![])
        }

        async fn streams(
            &self,
            _source: &str,
            _id: &str,
        ) -> Result<Vec<StreamLink>, SportsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_sport_list_fetched_once_within_ttl() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let cached = CachedSports::new(provider.clone());

        cached.sports().await.unwrap();
        cached.sports().await.unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_match_scopes_use_distinct_keys() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let cached = CachedSports::new(provider.clone());

        cached.matches(MatchScope::Live, None).await.unwrap();
        cached.matches(MatchScope::Popular, None).await.unwrap();
        cached
            .matches(MatchScope::All, Some("football"))
            .await
            .unwrap();
        // Repeats hit the caches
        cached.matches(MatchScope::Live, None).await.unwrap();
        cached
            .matches(MatchScope::All, Some("football"))
            .await
            .unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_streams_never_cached() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let cached = CachedSports::new(provider.clone());

        cached.streams("alpha", "m1").await.unwrap();
        cached.streams("alpha", "m1").await.unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }
}
