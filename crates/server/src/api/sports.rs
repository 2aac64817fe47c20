//! Sports-stream API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::error;

use reelgate_core::sports::{
    CachedSports, MatchScope, Sport, SportsError, SportsMatch, StreamLink,
};

use crate::metrics::PROVIDER_ERRORS_TOTAL;
use crate::state::AppState;

use super::handlers::ErrorResponse;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn provider(state: &AppState) -> Result<&CachedSports, ApiError> {
    state.sports().ok_or((
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse::new("Sports provider not configured")),
    ))
}

fn map_err(e: SportsError) -> ApiError {
    PROVIDER_ERRORS_TOTAL.with_label_values(&["sports"]).inc();
    let status = match &e {
        SportsError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => {
            error!("sports request failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(ErrorResponse::new(e.to_string())))
}

#[derive(Debug, Deserialize)]
pub struct MatchParams {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub sport: Option<String>,
}

/// GET /api/v1/sports
pub async fn list_sports(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Sport>>, ApiError> {
    let sports = provider(&state)?.sports().await.map_err(map_err)?;
    Ok(Json(sports))
}

/// GET /api/v1/sports/matches
pub async fn list_matches(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MatchParams>,
) -> Result<Json<Vec<SportsMatch>>, ApiError> {
    let scope = match params.mode.as_deref() {
        None | Some("all") => MatchScope::All,
        Some("live") => MatchScope::Live,
        Some("popular") => MatchScope::Popular,
        Some(other) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(format!("invalid match mode: {other}"))),
            ))
        }
    };
    let matches = provider(&state)?
        .matches(scope, params.sport.as_deref())
        .await
        .map_err(map_err)?;
    Ok(Json(matches))
}

/// GET /api/v1/sports/streams/{source}/{id}
pub async fn match_streams(
    State(state): State<Arc<AppState>>,
    Path((source, id)): Path<(String, String)>,
) -> Result<Json<Vec<StreamLink>>, ApiError> {
    let streams = provider(&state)?
        .streams(&source, &id)
        .await
        .map_err(map_err)?;
    Ok(Json(streams))
}
