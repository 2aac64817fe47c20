//! Download-link API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::error;

use reelgate_core::downloads::{DownloadError, DownloadLink, DownloadResolver};

use crate::metrics::PROVIDER_ERRORS_TOTAL;
use crate::state::AppState;

use super::handlers::ErrorResponse;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn provider(state: &AppState) -> Result<&DownloadResolver, ApiError> {
    state.downloads().ok_or((
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse::new("Download provider not configured")),
    ))
}

fn map_err(e: DownloadError) -> ApiError {
    PROVIDER_ERRORS_TOTAL
        .with_label_values(&["downloads"])
        .inc();
    let status = match &e {
        DownloadError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => {
            error!("download lookup failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(ErrorResponse::new(e.to_string())))
}

/// GET /api/v1/downloads/movie/{id}
pub async fn movie_links(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Vec<DownloadLink>>, ApiError> {
    let links = provider(&state)?.movie_links(id).await.map_err(map_err)?;
    Ok(Json(links))
}

/// GET /api/v1/downloads/tv/{id}/{season}/{episode}
pub async fn episode_links(
    State(state): State<Arc<AppState>>,
    Path((id, season, episode)): Path<(u64, u32, u32)>,
) -> Result<Json<Vec<DownloadLink>>, ApiError> {
    let links = provider(&state)?
        .episode_links(id, season, episode)
        .await
        .map_err(map_err)?;
    Ok(Json(links))
}
