use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::intake::upload::read_upload;
use crate::models::assistant::{AskRequest, SessionDocumentRef, SessionQuery, SessionUpload};
use crate::state::AppState;

/// POST /api/v1/assistant/ask
pub async fn handle_ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<Value>, AppError> {
    let request = request.validated()?;
    info!("Hybrid question for session={}", request.session_id);
    let answer = state.backend.ask_hybrid(&request).await?;
    Ok(Json(answer))
}

/// GET /api/v1/assistant/documents?session_id=
pub async fn handle_list_documents(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<Value>, AppError> {
    let session_id = query.session_id()?;
    let documents = state.backend.list_documents(&session_id).await?;
    Ok(Json(documents))
}

/// POST /api/v1/assistant/documents
///
/// Multipart fields: `session_id` and one `file`.
pub async fn handle_upload_document(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let mut upload = read_upload(multipart).await?;
    if upload.files.len() > 1 {
        return Err(AppError::validation("Upload one document at a time."));
    }

    let file = std::mem::take(&mut upload.files).pop();
    let document = SessionUpload::new(
        upload.field("session_id"),
        file,
        state.config.max_file_bytes,
    )?;

    info!(
        "Uploading {} ({} bytes) to session={}",
        document.file.name, document.file.size_bytes, document.session_id
    );
    let response = state.backend.upload_document(&document).await?;
    Ok(Json(response))
}

/// DELETE /api/v1/assistant/documents
pub async fn handle_delete_document(
    State(state): State<AppState>,
    Json(document): Json<SessionDocumentRef>,
) -> Result<Json<Value>, AppError> {
    let document = document.validated()?;
    info!(
        "Deleting {} from session={}",
        document.file_name, document.session_id
    );
    let response = state.backend.delete_document(&document).await?;
    Ok(Json(response))
}
