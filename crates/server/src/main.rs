use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelgate_core::auth::{SessionStore, SqliteSessionStore};
use reelgate_core::downloads::{DownloadClient, DownloadProvider, DownloadResolver};
use reelgate_core::metadata::{MetadataProvider, TmdbClient};
use reelgate_core::progress::{ProgressStore, SqliteProgressStore};
use reelgate_core::sports::{CachedSports, SportsClient, SportsProvider};
use reelgate_core::torrents::{CachedTorrentIndex, TorrentIndex, TorrentIndexClient};
use reelgate_core::vision::{VisionClient, VisionProvider};
use reelgate_core::watchlist::{SqliteWatchlistStore, WatchlistStore};
use reelgate_core::{create_authenticator, load_config, validate_config, Authenticator};

use reelgate_server::api::create_router;
use reelgate_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::var("REELGATE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    info!("Auth method: {:?}", config.auth.method);
    info!("Database path: {:?}", config.database.path);

    // Local stores share the sqlite file
    let sessions: Arc<dyn SessionStore> = Arc::new(
        SqliteSessionStore::new(&config.database.path)
            .context("Failed to create session store")?,
    );
    let watchlist: Arc<dyn WatchlistStore> = Arc::new(
        SqliteWatchlistStore::new(&config.database.path)
            .context("Failed to create watchlist store")?,
    );
    let progress: Arc<dyn ProgressStore> = Arc::new(
        SqliteProgressStore::new(&config.database.path)
            .context("Failed to create progress store")?,
    );

    let authenticator: Arc<dyn Authenticator> =
        Arc::from(create_authenticator(&config.auth, sessions.clone()));
    info!("Using authenticator: {}", authenticator.method_name());

    let metadata: Option<Arc<dyn MetadataProvider>> = match &config.metadata {
        Some(metadata_config) => match TmdbClient::new(metadata_config.clone()) {
            Ok(client) => {
                info!("Metadata provider initialized");
                Some(Arc::new(client))
            }
            Err(e) => {
                error!("Failed to initialize metadata provider: {e}");
                None
            }
        },
        None => {
            info!("No metadata provider configured");
            None
        }
    };

    let sports = match &config.sports {
        Some(sports_config) => match SportsClient::new(sports_config.clone()) {
            Ok(client) => {
                info!("Sports provider initialized at {}", sports_config.base_url);
                let provider: Arc<dyn SportsProvider> = Arc::new(client);
                Some(Arc::new(CachedSports::new(provider)))
            }
            Err(e) => {
                error!("Failed to initialize sports provider: {e}");
                None
            }
        },
        None => {
            info!("No sports provider configured");
            None
        }
    };

    let downloads = match &config.downloads {
        Some(downloads_config) => match DownloadClient::new(downloads_config) {
            Ok(client) => {
                info!(
                    "Download provider initialized (cache TTL {}s)",
                    downloads_config.cache_ttl_secs
                );
                let provider: Arc<dyn DownloadProvider> = Arc::new(client);
                Some(Arc::new(DownloadResolver::new(
                    provider,
                    Duration::from_secs(downloads_config.cache_ttl_secs),
                )))
            }
            Err(e) => {
                error!("Failed to initialize download provider: {e}");
                None
            }
        },
        None => {
            info!("No download provider configured");
            None
        }
    };

    let torrents = match &config.torrent_index {
        Some(torrent_config) => match TorrentIndexClient::new(torrent_config) {
            Ok(client) => {
                info!("Torrent index initialized at {}", torrent_config.base_url);
                let index: Arc<dyn TorrentIndex> = Arc::new(client);
                Some(Arc::new(CachedTorrentIndex::new(
                    index,
                    Duration::from_secs(torrent_config.cache_ttl_secs),
                )))
            }
            Err(e) => {
                error!("Failed to initialize torrent index: {e}");
                None
            }
        },
        None => {
            info!("No torrent index configured");
            None
        }
    };

    let vision: Option<Arc<dyn VisionProvider>> = match &config.vision {
        Some(vision_config) => match VisionClient::new(vision_config) {
            Ok(client) => {
                info!("Vision provider initialized (model {})", vision_config.model);
                Some(Arc::new(client))
            }
            Err(e) => {
                error!("Failed to initialize vision provider: {e}");
                None
            }
        },
        None => {
            info!("No vision provider configured");
            None
        }
    };

    let state = Arc::new(AppState::new(
        config.clone(),
        authenticator,
        sessions,
        watchlist,
        progress,
        metadata,
        sports,
        downloads,
        torrents,
        vision,
    ));

    let app = create_router(state);

    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
