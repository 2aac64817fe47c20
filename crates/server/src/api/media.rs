//! Media metadata API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::error;

use reelgate_core::metadata::{
    Credits, DiscoverFilter, Genre, MediaSummary, MetadataError, MetadataProvider, MovieDetails,
    Paginated, Person, Season, TrendingWindow, TvDetails, Video,
};
use reelgate_core::MediaKind;

use crate::metrics::PROVIDER_ERRORS_TOTAL;
use crate::state::AppState;

use super::handlers::ErrorResponse;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn provider(state: &AppState) -> Result<&dyn MetadataProvider, ApiError> {
    state.metadata().ok_or((
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse::new("Metadata provider not configured")),
    ))
}

fn map_err(e: MetadataError) -> ApiError {
    PROVIDER_ERRORS_TOTAL.with_label_values(&["metadata"]).inc();
    let status = match &e {
        MetadataError::NotFound(_) => StatusCode::NOT_FOUND,
        MetadataError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        MetadataError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => {
            error!("metadata request failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(ErrorResponse::new(e.to_string())))
}

fn bad_request(message: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message)))
}

fn parse_kind(raw: Option<&str>) -> Result<MediaKind, ApiError> {
    let raw = raw.unwrap_or("movie");
    raw.parse()
        .map_err(|_| bad_request(format!("invalid media kind: {raw}")))
}

#[derive(Debug, Deserialize)]
pub struct TrendingParams {
    #[serde(default)]
    pub window: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
}

#[derive(Debug, Deserialize)]
pub struct DiscoverParams {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub genre: Option<u32>,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_page() -> u32 {
    1
}

/// GET /api/v1/media/trending
pub async fn trending(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TrendingParams>,
) -> Result<Json<Paginated<MediaSummary>>, ApiError> {
    let window = match params.window.as_deref() {
        None | Some("day") => TrendingWindow::Day,
        Some("week") => TrendingWindow::Week,
        Some(other) => return Err(bad_request(format!("invalid trending window: {other}"))),
    };
    let page = provider(&state)?
        .trending(window, params.page)
        .await
        .map_err(map_err)?;
    Ok(Json(page))
}

/// GET /api/v1/media/popular
pub async fn popular(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Paginated<MediaSummary>>, ApiError> {
    let kind = parse_kind(params.kind.as_deref())?;
    let page = provider(&state)?
        .popular(kind, params.page)
        .await
        .map_err(map_err)?;
    Ok(Json(page))
}

/// GET /api/v1/media/top-rated
pub async fn top_rated(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Paginated<MediaSummary>>, ApiError> {
    let kind = parse_kind(params.kind.as_deref())?;
    let page = provider(&state)?
        .top_rated(kind, params.page)
        .await
        .map_err(map_err)?;
    Ok(Json(page))
}

/// GET /api/v1/media/discover
pub async fn discover(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DiscoverParams>,
) -> Result<Json<Paginated<MediaSummary>>, ApiError> {
    let kind = parse_kind(params.kind.as_deref())?;
    let filter = DiscoverFilter {
        genre: params.genre,
        year: params.year,
        sort_by: params.sort_by,
        page: params.page,
    };
    let page = provider(&state)?
        .discover(kind, filter)
        .await
        .map_err(map_err)?;
    Ok(Json(page))
}

/// GET /api/v1/media/search
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Paginated<MediaSummary>>, ApiError> {
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| bad_request("query parameter is required"))?;
    let page = provider(&state)?
        .search(query, params.page)
        .await
        .map_err(map_err)?;
    Ok(Json(page))
}

/// GET /api/v1/media/genres
pub async fn genres(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Genre>>, ApiError> {
    let kind = parse_kind(params.kind.as_deref())?;
    let genres = provider(&state)?.genres(kind).await.map_err(map_err)?;
    Ok(Json(genres))
}

/// GET /api/v1/media/movie/{id}
pub async fn movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<MovieDetails>, ApiError> {
    let details = provider(&state)?.movie(id).await.map_err(map_err)?;
    Ok(Json(details))
}

/// GET /api/v1/media/movie/{id}/credits
pub async fn movie_credits(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Credits>, ApiError> {
    let credits = provider(&state)?
        .credits(MediaKind::Movie, id)
        .await
        .map_err(map_err)?;
    Ok(Json(credits))
}

/// GET /api/v1/media/movie/{id}/videos
pub async fn movie_videos(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Vec<Video>>, ApiError> {
    let videos = provider(&state)?
        .videos(MediaKind::Movie, id)
        .await
        .map_err(map_err)?;
    Ok(Json(videos))
}

/// GET /api/v1/media/tv/{id}
pub async fn tv(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<TvDetails>, ApiError> {
    let details = provider(&state)?.tv(id).await.map_err(map_err)?;
    Ok(Json(details))
}

/// GET /api/v1/media/tv/{id}/season/{n}
pub async fn tv_season(
    State(state): State<Arc<AppState>>,
    Path((id, season)): Path<(u64, u32)>,
) -> Result<Json<Season>, ApiError> {
    let season = provider(&state)?
        .tv_season(id, season)
        .await
        .map_err(map_err)?;
    Ok(Json(season))
}

/// GET /api/v1/media/person/{id}
pub async fn person(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Person>, ApiError> {
    let person = provider(&state)?.person(id).await.map_err(map_err)?;
    Ok(Json(person))
}
