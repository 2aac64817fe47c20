//! Torrent index API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::error;

use reelgate_core::torrents::{CachedTorrentIndex, TorrentIndexError, TorrentResult};

use crate::metrics::PROVIDER_ERRORS_TOTAL;
use crate::state::AppState;

use super::handlers::ErrorResponse;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn provider(state: &AppState) -> Result<&CachedTorrentIndex, ApiError> {
    state.torrents().ok_or((
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse::new("Torrent index not configured")),
    ))
}

fn map_err(e: TorrentIndexError) -> ApiError {
    PROVIDER_ERRORS_TOTAL
        .with_label_values(&["torrent_index"])
        .inc();
    error!("torrent index lookup failed: {e}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(e.to_string())),
    )
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub title: Option<String>,
}

/// GET /api/v1/torrents/movie/{imdb_id}
///
/// Unknown identifiers answer 200 with an empty list.
pub async fn search_movie(
    State(state): State<Arc<AppState>>,
    Path(imdb_id): Path<String>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<TorrentResult>>, ApiError> {
    if !imdb_id.starts_with("tt") {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(format!("invalid IMDb id: {imdb_id}"))),
        ));
    }
    let results = provider(&state)?
        .search_movie(&imdb_id, params.title.as_deref())
        .await
        .map_err(map_err)?;
    Ok(Json(results))
}
