//! Axum route handlers for the batch submission lifecycle.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::intake::handlers::FileListResponse;
use crate::models::batch::BatchDraft;
use crate::state::AppState;
use crate::submission::controller::SubmissionState;

#[derive(Debug, Serialize)]
pub struct BatchStatusResponse {
    pub submission: SubmissionState,
    pub collection: FileListResponse,
}

/// GET /api/v1/batch
pub async fn handle_batch_status(State(state): State<AppState>) -> Json<BatchStatusResponse> {
    let submission = state.submission.state().await;
    let files = state.files.lock().await;
    Json(BatchStatusResponse {
        submission,
        collection: FileListResponse::from(&*files),
    })
}

/// POST /api/v1/batch/submit
///
/// Sends the current file collection with the given job metadata. The
/// collection is snapshotted first, so later edits do not affect the batch.
pub async fn handle_submit_batch(
    State(state): State<AppState>,
    Json(draft): Json<BatchDraft>,
) -> Result<Json<SubmissionState>, AppError> {
    let snapshot = state.files.lock().await.snapshot();
    let submission = state.submission.submit(draft, snapshot).await?;
    Ok(Json(submission))
}

/// POST /api/v1/batch/reset
pub async fn handle_reset_batch(
    State(state): State<AppState>,
) -> Result<Json<BatchStatusResponse>, AppError> {
    let mut files = state.files.lock().await;
    state.submission.reset(&mut files).await?;
    Ok(Json(BatchStatusResponse {
        submission: SubmissionState::Idle,
        collection: FileListResponse::from(&*files),
    }))
}
