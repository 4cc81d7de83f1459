//! Axum route handlers for batch summaries and detail expansion.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::evaluation::board::{SummaryView, ToggleOutcome};
use crate::models::batch::SummaryMode;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoadSummaryRequest {
    #[serde(default)]
    pub recruiter_id: String,
    #[serde(default)]
    pub job_id: String,
    #[serde(default)]
    pub mode: SummaryMode,
}

#[derive(Debug, Deserialize)]
pub struct ToggleDetailsRequest {
    pub file_name: String,
}

/// POST /api/v1/summary
pub async fn handle_load_summary(
    State(state): State<AppState>,
    Json(request): Json<LoadSummaryRequest>,
) -> Result<Json<SummaryView>, AppError> {
    let view = state
        .board
        .load_summary(&request.recruiter_id, &request.job_id, request.mode)
        .await?;
    Ok(Json(view))
}

/// GET /api/v1/summary
pub async fn handle_get_summary(State(state): State<AppState>) -> Json<SummaryView> {
    Json(state.board.view().await)
}

/// POST /api/v1/summary/details
///
/// Expands or collapses one record. Only the first expansion per summary
/// reaches the evaluation service.
pub async fn handle_toggle_details(
    State(state): State<AppState>,
    Json(request): Json<ToggleDetailsRequest>,
) -> Result<Json<ToggleOutcome>, AppError> {
    let outcome = state.board.toggle_details(&request.file_name).await?;
    Ok(Json(outcome))
}
