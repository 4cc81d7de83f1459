//! Axum route handlers for single-applicant ingest and evaluation.
//! Both are stateless pass-throughs; responses are returned as received.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::intake::collection::FileCollection;
use crate::intake::upload::read_upload;
use crate::models::resume::{ApplicantIds, ResumeIngestRequest};
use crate::state::AppState;

/// POST /api/v1/resume/ingest
///
/// Multipart fields: `recruiter_id`, `applicant_id`, `job_id`, `jd_text`
/// and exactly one résumé file.
pub async fn handle_ingest_resume(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let mut upload = read_upload(multipart).await?;
    if upload.files.len() > 1 {
        return Err(AppError::validation("Upload exactly one resume PDF."));
    }

    // Same type and size rules as the batch collection.
    let rules = FileCollection::from_config(&state.config);
    let file = std::mem::take(&mut upload.files)
        .pop()
        .map(|raw| rules.accept_one(raw))
        .transpose()
        .map_err(|rejected| {
            AppError::validation(format!("{}: {}", rejected.name, rejected.reason))
        })?;

    let request = ResumeIngestRequest::new(
        upload.field("recruiter_id"),
        upload.field("applicant_id"),
        upload.field("job_id"),
        upload.field("jd_text"),
        file,
    )?;

    info!(
        "Ingesting resume for applicant={} job={}",
        request.applicant_id, request.job_id
    );
    let response = state.backend.ingest_resume(&request).await?;
    Ok(Json(response))
}

/// POST /api/v1/resume/evaluate
pub async fn handle_evaluate_resume(
    State(state): State<AppState>,
    Json(ids): Json<ApplicantIds>,
) -> Result<Json<Value>, AppError> {
    let ids = ids.validated()?;
    info!(
        "Evaluating applicant={} for job={}",
        ids.applicant_id, ids.job_id
    );
    let response = state.backend.evaluate_resume(&ids).await?;
    Ok(Json(response))
}
