//! Authentication and metrics middleware for API routes.

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, Request, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use reelgate_core::{AuthError, AuthRequest, Identity};

use crate::metrics::{
    normalize_path, AUTH_FAILURES_TOTAL, HTTP_REQUESTS_IN_FLIGHT, HTTP_REQUESTS_TOTAL,
    HTTP_REQUEST_DURATION,
};
use crate::state::AppState;

use super::handlers::ErrorResponse;

/// Records request duration, count and in-flight gauge.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());

    HTTP_REQUESTS_IN_FLIGHT.inc();

    let response = next.run(request).await;

    HTTP_REQUESTS_IN_FLIGHT.dec();

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &path, &status])
        .observe(duration);
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    response
}

/// Validates the session cookie against the configured authenticator
/// and inserts the resolved [`Identity`] for downstream handlers.
/// Applied only to routes that require a signed-in user.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let authenticator = state.authenticator();

    // The none method still gets an identity so handlers have a user id
    if authenticator.method_name() == "none" {
        let mut request = request;
        request.extensions_mut().insert(Identity::anonymous());
        return Ok(next.run(request).await);
    }

    let headers: HashMap<String, String> = request
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_lowercase(), v.to_string()))
        })
        .collect();

    let source_ip = request
        .extensions()
        .get::<std::net::SocketAddr>()
        .map(|addr| addr.ip())
        .unwrap_or_else(|| std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST));

    let auth_request = AuthRequest { headers, source_ip };

    match authenticator.authenticate(&auth_request).await {
        Ok(identity) => {
            let mut request = request;
            request.extensions_mut().insert(identity);
            Ok(next.run(request).await)
        }
        Err(AuthError::NotAuthenticated) => {
            AUTH_FAILURES_TOTAL
                .with_label_values(&["not_authenticated"])
                .inc();
            Err(unauthorized())
        }
        Err(AuthError::InvalidCredentials(_)) => {
            AUTH_FAILURES_TOTAL
                .with_label_values(&["invalid_credentials"])
                .inc();
            Err(unauthorized())
        }
        Err(_) => {
            AUTH_FAILURES_TOTAL
                .with_label_values(&["internal_error"])
                .inc();
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Authentication service unavailable")),
            ))
        }
    }
}

fn unauthorized() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new("Unauthorized")),
    )
}

/// Extractor for the authenticated user id, taken from the [`Identity`]
/// the auth middleware stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let user_id = parts
            .extensions
            .get::<Identity>()
            .map(|id| id.user_id.clone())
            .unwrap_or_else(|| "anonymous".to_string());
        std::future::ready(Ok(AuthUser(user_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request},
        middleware,
        routing::get,
        Router,
    };
    use chrono::Duration;
    use std::sync::Arc;
    use tower::ServiceExt;

    use reelgate_core::auth::{SessionStore, SqliteSessionStore, SESSION_COOKIE};
    use reelgate_core::config::{AuthConfig, AuthMethod, Config, DatabaseConfig, ServerConfig};
    use reelgate_core::progress::SqliteProgressStore;
    use reelgate_core::watchlist::SqliteWatchlistStore;
    use reelgate_core::create_authenticator;

    async fn dummy_handler() -> &'static str {
        "OK"
    }

    fn test_state(method: AuthMethod) -> (Arc<AppState>, Arc<SqliteSessionStore>) {
        let config = Config {
            auth: AuthConfig {
                method,
                session_ttl_hours: 720,
            },
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            metadata: None,
            sports: None,
            downloads: None,
            torrent_index: None,
            vision: None,
        };

        let sessions = Arc::new(SqliteSessionStore::in_memory().unwrap());
        let sessions_dyn: Arc<dyn SessionStore> = sessions.clone();
        let authenticator: Arc<dyn reelgate_core::Authenticator> =
            Arc::from(create_authenticator(&config.auth, sessions_dyn.clone()));

        let state = Arc::new(AppState::new(
            config,
            authenticator,
            sessions_dyn,
            Arc::new(SqliteWatchlistStore::in_memory().unwrap()),
            Arc::new(SqliteProgressStore::in_memory().unwrap()),
            None,
            None,
            None,
            None,
            None,
        ));
        (state, sessions)
    }

    fn test_app(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/test", get(dummy_handler))
            .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
            .with_state(state)
    }

    #[tokio::test]
    async fn test_none_auth_allows_all() {
        let (state, _) = test_state(AuthMethod::None);
        let app = test_app(state);

        let request = Request::builder()
            .uri("/test")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_session_auth_missing_cookie() {
        let (state, _) = test_state(AuthMethod::Session);
        let app = test_app(state);

        let request = Request::builder()
            .uri("/test")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_session_auth_valid_cookie() {
        let (state, sessions) = test_state(AuthMethod::Session);
        let token = sessions.create_session("user-1", Duration::hours(1)).unwrap();
        let app = test_app(state);

        let request = Request::builder()
            .uri("/test")
            .header(header::COOKIE, format!("{SESSION_COOKIE}={token}"))
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_session_auth_bogus_token() {
        let (state, _) = test_state(AuthMethod::Session);
        let app = test_app(state);

        let request = Request::builder()
            .uri("/test")
            .header(header::COOKIE, format!("{SESSION_COOKIE}=not-a-session"))
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_auth_user_extractor_resolves_session_user() {
        use http_body_util::BodyExt;

        async fn user_handler(AuthUser(user_id): AuthUser) -> String {
            user_id
        }

        let (state, sessions) = test_state(AuthMethod::Session);
        let token = sessions.create_session("user-42", Duration::hours(1)).unwrap();

        let app = Router::new()
            .route("/test", get(user_handler))
            .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
            .with_state(state);

        let request = Request::builder()
            .uri("/test")
            .header(header::COOKIE, format!("{SESSION_COOKIE}={token}"))
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(String::from_utf8(body.to_vec()).unwrap(), "user-42");
    }
}
