use std::sync::Arc;

use reelgate_core::auth::SessionStore;
use reelgate_core::downloads::DownloadResolver;
use reelgate_core::metadata::MetadataProvider;
use reelgate_core::progress::ProgressStore;
use reelgate_core::sports::CachedSports;
use reelgate_core::torrents::CachedTorrentIndex;
use reelgate_core::vision::VisionProvider;
use reelgate_core::watchlist::WatchlistStore;
use reelgate_core::{Authenticator, Config, SanitizedConfig};

/// Shared application state. Providers are optional; a route whose
/// provider is absent answers 503.
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    sessions: Arc<dyn SessionStore>,
    watchlist: Arc<dyn WatchlistStore>,
    progress: Arc<dyn ProgressStore>,
    metadata: Option<Arc<dyn MetadataProvider>>,
    sports: Option<Arc<CachedSports>>,
    downloads: Option<Arc<DownloadResolver>>,
    torrents: Option<Arc<CachedTorrentIndex>>,
    vision: Option<Arc<dyn VisionProvider>>,
}

#[allow(clippy::too_many_arguments)]
impl AppState {
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        sessions: Arc<dyn SessionStore>,
        watchlist: Arc<dyn WatchlistStore>,
        progress: Arc<dyn ProgressStore>,
        metadata: Option<Arc<dyn MetadataProvider>>,
        sports: Option<Arc<CachedSports>>,
        downloads: Option<Arc<DownloadResolver>>,
        torrents: Option<Arc<CachedTorrentIndex>>,
        vision: Option<Arc<dyn VisionProvider>>,
    ) -> Self {
        Self {
            config,
            authenticator,
            sessions,
            watchlist,
            progress,
            metadata,
            sports,
            downloads,
            torrents,
            vision,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    pub fn watchlist(&self) -> &dyn WatchlistStore {
        self.watchlist.as_ref()
    }

    pub fn progress(&self) -> &dyn ProgressStore {
        self.progress.as_ref()
    }

    pub fn metadata(&self) -> Option<&dyn MetadataProvider> {
        self.metadata.as_deref()
    }

    pub fn sports(&self) -> Option<&CachedSports> {
        self.sports.as_deref()
    }

    pub fn downloads(&self) -> Option<&DownloadResolver> {
        self.downloads.as_deref()
    }

    pub fn torrents(&self) -> Option<&CachedTorrentIndex> {
        self.torrents.as_deref()
    }

    pub fn vision(&self) -> Option<&dyn VisionProvider> {
        self.vision.as_deref()
    }
}
