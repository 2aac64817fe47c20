//! Watch-progress API handlers (the per-user remote table).
//!
//! Clients keep a device-local ledger and push rows here: single saves
//! as they watch, batch uploads when a session signs in. All routes
//! require an authenticated user.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::error;

use reelgate_core::progress::{MediaItem, ProgressRow, ProgressStoreError};
use reelgate_core::MediaKind;

use crate::state::AppState;

use super::handlers::ErrorResponse;
use super::middleware::AuthUser;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn map_err(e: ProgressStoreError) -> ApiError {
    let status = match &e {
        ProgressStoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => {
            error!("progress store error: {e}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(ErrorResponse::new(e.to_string())))
}

fn parse_kind(raw: &str) -> Result<MediaKind, ApiError> {
    raw.parse().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(format!("invalid media kind: {raw}"))),
        )
    })
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub saved: usize,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// GET /api/v1/progress
pub async fn list(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<ProgressRow>>, ApiError> {
    let rows = state.progress().fetch_all(&user_id).await.map_err(map_err)?;
    Ok(Json(rows))
}

/// PUT /api/v1/progress
///
/// Batch upsert of ledger items; all-or-nothing.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(items): Json<Vec<MediaItem>>,
) -> Result<Json<BatchResponse>, ApiError> {
    let rows: Vec<ProgressRow> = items.iter().map(|item| item.to_row(&user_id)).collect();
    state.progress().upsert_many(&rows).await.map_err(map_err)?;
    Ok(Json(BatchResponse { saved: rows.len() }))
}

/// POST /api/v1/progress/{kind}/{id}
///
/// Single upsert. The path wins over whatever id/kind the body carries.
pub async fn save(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path((kind, id)): Path<(String, String)>,
    Json(mut item): Json<MediaItem>,
) -> Result<Json<ProgressRow>, ApiError> {
    item.kind = parse_kind(&kind)?;
    item.id = id;
    let row = item.to_row(&user_id);
    state.progress().upsert(&row).await.map_err(map_err)?;
    Ok(Json(row))
}

/// DELETE /api/v1/progress/{kind}/{id}
pub async fn delete(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    let deleted = state
        .progress()
        .delete(&user_id, &id, kind)
        .await
        .map_err(map_err)?;
    Ok(Json(DeleteResponse { deleted }))
}
