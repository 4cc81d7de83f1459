//! Axum route handlers for the file collection.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::intake::collection::{FileCollection, RejectedFile};
use crate::intake::upload::read_upload;
use crate::models::files::InputFile;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct FileListResponse {
    pub files: Vec<InputFile>,
    pub total_bytes: u64,
    pub accepted_mime_type: String,
}

impl From<&FileCollection> for FileListResponse {
    fn from(collection: &FileCollection) -> Self {
        Self {
            files: collection.snapshot(),
            total_bytes: collection.total_bytes(),
            accepted_mime_type: collection.accepted_mime_type().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AddFilesResponse {
    pub accepted: Vec<InputFile>,
    pub rejected: Vec<RejectedFile>,
    pub collection: FileListResponse,
}

#[derive(Debug, Serialize)]
pub struct RemoveFileResponse {
    pub removed: Option<InputFile>,
    pub collection: FileListResponse,
}

/// GET /api/v1/files
pub async fn handle_list_files(State(state): State<AppState>) -> Json<FileListResponse> {
    let files = state.files.lock().await;
    Json(FileListResponse::from(&*files))
}

/// POST /api/v1/files
///
/// Accepts a multipart upload. Files of the wrong type are listed under
/// `rejected`; the call fails only when nothing was accepted.
pub async fn handle_add_files(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AddFilesResponse>, AppError> {
    let upload = read_upload(multipart).await?;
    if upload.files.is_empty() {
        return Err(AppError::validation("no acceptable files"));
    }

    let mut files = state.files.lock().await;
    let outcome = files.add_files(upload.files)?;
    info!(
        "Added {} file(s), rejected {}, collection now {}",
        outcome.accepted.len(),
        outcome.rejected.len(),
        files.len()
    );

    Ok(Json(AddFilesResponse {
        accepted: outcome.accepted,
        rejected: outcome.rejected,
        collection: FileListResponse::from(&*files),
    }))
}

/// DELETE /api/v1/files/:index
pub async fn handle_remove_file(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Json<RemoveFileResponse> {
    let mut files = state.files.lock().await;
    let removed = files.remove_file(index);
    Json(RemoveFileResponse {
        removed,
        collection: FileListResponse::from(&*files),
    })
}
