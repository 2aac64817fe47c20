//! Common test utilities for E2E testing with mocks.
//!
//! Builds an in-process router with mock upstream providers and real
//! in-memory sqlite stores, so tests exercise the full HTTP stack
//! without external infrastructure.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use reelgate_core::auth::{SessionStore, SqliteSessionStore, SESSION_COOKIE};
use reelgate_core::config::{AuthConfig, AuthMethod, Config, DatabaseConfig, ServerConfig};
use reelgate_core::downloads::{DownloadProvider, DownloadResolver};
use reelgate_core::metadata::MetadataProvider;
use reelgate_core::progress::SqliteProgressStore;
use reelgate_core::sports::{CachedSports, SportsProvider};
use reelgate_core::testing::{MockDownloads, MockMetadata, MockSports, MockTorrents, MockVision};
use reelgate_core::torrents::{CachedTorrentIndex, TorrentIndex};
use reelgate_core::vision::VisionProvider;
use reelgate_core::watchlist::SqliteWatchlistStore;
use reelgate_core::{create_authenticator, Authenticator};

pub use reelgate_core::testing::fixtures;

/// In-process server with controllable mocks for every upstream
/// provider. Auth method is `session`; use [`TestFixture::login`] to get
/// a cookie for authed routes.
pub struct TestFixture {
    pub router: Router,
    pub metadata: Arc<MockMetadata>,
    pub sports: Arc<MockSports>,
    pub downloads: Arc<MockDownloads>,
    pub torrents: Arc<MockTorrents>,
    pub vision: Arc<MockVision>,
    pub sessions: Arc<SqliteSessionStore>,
}

/// Response from a test request.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

fn test_config() -> Config {
    Config {
        auth: AuthConfig {
            method: AuthMethod::Session,
            session_ttl_hours: 720,
        },
        server: ServerConfig::default(),
        database: DatabaseConfig::default(),
        metadata: None,
        sports: None,
        downloads: None,
        torrent_index: None,
        vision: None,
    }
}

impl TestFixture {
    /// Fixture with all providers mocked and wired.
    pub async fn new() -> Self {
        Self::build(true)
    }

    /// Fixture with no providers configured, for 503 behavior.
    pub async fn without_providers() -> Self {
        Self::build(false)
    }

    fn build(with_providers: bool) -> Self {
        let metadata = Arc::new(MockMetadata::new());
        let sports = Arc::new(MockSports::new());
        let downloads = Arc::new(MockDownloads::new());
        let torrents = Arc::new(MockTorrents::new());
        let vision = Arc::new(MockVision::new());

        let sessions = Arc::new(SqliteSessionStore::in_memory().unwrap());
        let sessions_dyn: Arc<dyn SessionStore> = sessions.clone();

        let config = test_config();
        let authenticator: Arc<dyn Authenticator> =
            Arc::from(create_authenticator(&config.auth, sessions_dyn.clone()));

        let providers = with_providers.then_some(());
        let state = Arc::new(reelgate_server::state::AppState::new(
            config,
            authenticator,
            sessions_dyn,
            Arc::new(SqliteWatchlistStore::in_memory().unwrap()),
            Arc::new(SqliteProgressStore::in_memory().unwrap()),
            providers.map(|_| metadata.clone() as Arc<dyn MetadataProvider>),
            providers.map(|_| {
                Arc::new(CachedSports::new(sports.clone() as Arc<dyn SportsProvider>))
            }),
            providers.map(|_| {
                Arc::new(DownloadResolver::new(
                    downloads.clone() as Arc<dyn DownloadProvider>,
                    std::time::Duration::from_secs(3600),
                ))
            }),
            providers.map(|_| {
                Arc::new(CachedTorrentIndex::new(
                    torrents.clone() as Arc<dyn TorrentIndex>,
                    std::time::Duration::from_secs(6 * 3600),
                ))
            }),
            providers.map(|_| vision.clone() as Arc<dyn VisionProvider>),
        ));

        let router = reelgate_server::api::create_router(state);

        Self {
            router,
            metadata,
            sports,
            downloads,
            torrents,
            vision,
            sessions,
        }
    }

    /// Issue a session for a user and return the cookie header value.
    pub fn login(&self, user_id: &str) -> String {
        let token = self
            .sessions
            .create_session(user_id, Duration::hours(1))
            .expect("Failed to create session");
        format!("{SESSION_COOKIE}={token}")
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None, None).await
    }

    pub async fn get_as(&self, path: &str, cookie: &str) -> TestResponse {
        self.request("GET", path, None, Some(cookie)).await
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body), None).await
    }

    pub async fn post_as(&self, path: &str, body: Value, cookie: &str) -> TestResponse {
        self.request("POST", path, Some(body), Some(cookie)).await
    }

    pub async fn put_as(&self, path: &str, body: Value, cookie: &str) -> TestResponse {
        self.request("PUT", path, Some(body), Some(cookie)).await
    }

    pub async fn delete_as(&self, path: &str, cookie: &str) -> TestResponse {
        self.request("DELETE", path, None, Some(cookie)).await
    }

    async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
