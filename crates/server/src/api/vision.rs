//! AI vision API handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::error;

use reelgate_core::vision::{
    ImageUpload, MediaContext, MediaGuess, VisionError, VisionProvider,
};

use crate::metrics::PROVIDER_ERRORS_TOTAL;
use crate::state::AppState;

use super::handlers::ErrorResponse;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn provider(state: &AppState) -> Result<&dyn VisionProvider, ApiError> {
    state.vision().ok_or((
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse::new("Vision provider not configured")),
    ))
}

fn map_err(e: VisionError) -> ApiError {
    PROVIDER_ERRORS_TOTAL.with_label_values(&["vision"]).inc();
    let status = match &e {
        VisionError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        VisionError::Parse(_) => StatusCode::BAD_GATEWAY,
        VisionError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => {
            error!("vision request failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(ErrorResponse::new(e.to_string())))
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub image: ImageUpload,
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
    pub context: MediaContext,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
}

/// POST /api/v1/vision/analyze
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<MediaGuess>, ApiError> {
    if request.image.data.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("image data is required")),
        ));
    }
    let guess = provider(&state)?
        .analyze_image(&request.image)
        .await
        .map_err(map_err)?;
    Ok(Json(guess))
}

/// POST /api/v1/vision/ask
pub async fn ask(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("question is required")),
        ));
    }
    let answer = provider(&state)?
        .ask(question, &request.context)
        .await
        .map_err(map_err)?;
    Ok(Json(AskResponse { answer }))
}
