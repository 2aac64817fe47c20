//! Watchlist API handlers. All routes require an authenticated user.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::error;

use reelgate_core::watchlist::{
    WatchlistEntry, WatchlistError, WatchlistStatus, WatchlistUpdate,
};
use reelgate_core::MediaKind;

use crate::state::AppState;

use super::handlers::ErrorResponse;
use super::middleware::AuthUser;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn map_err(e: WatchlistError) -> ApiError {
    error!("watchlist store error: {e}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(e.to_string())),
    )
}

fn parse_kind(raw: &str) -> Result<MediaKind, ApiError> {
    raw.parse().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(format!("invalid media kind: {raw}"))),
        )
    })
}

/// Status lookup response; `null` means "not on the list", so clients
/// can bind it straight to a tri-state selector.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: Option<WatchlistStatus>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// GET /api/v1/watchlist
pub async fn list(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<WatchlistEntry>>, ApiError> {
    let entries = state.watchlist().list(&user_id).map_err(map_err)?;
    Ok(Json(entries))
}

/// GET /api/v1/watchlist/{kind}/{id}
pub async fn get_status(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path((kind, id)): Path<(String, u64)>,
) -> Result<Json<StatusResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    let entry = state.watchlist().get(&user_id, id, kind).map_err(map_err)?;
    Ok(Json(StatusResponse {
        status: entry.map(|e| e.status),
    }))
}

/// POST /api/v1/watchlist/{kind}/{id}
pub async fn upsert(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path((kind, id)): Path<(String, u64)>,
    Json(update): Json<WatchlistUpdate>,
) -> Result<Json<WatchlistEntry>, ApiError> {
    let kind = parse_kind(&kind)?;
    let entry = state
        .watchlist()
        .upsert(&user_id, id, kind, update)
        .map_err(map_err)?;
    Ok(Json(entry))
}

/// DELETE /api/v1/watchlist/{kind}/{id}
pub async fn delete(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path((kind, id)): Path<(String, u64)>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    let deleted = state
        .watchlist()
        .delete(&user_id, id, kind)
        .map_err(map_err)?;
    Ok(Json(DeleteResponse { deleted }))
}
