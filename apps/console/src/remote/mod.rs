//! Remote backend: the single point of entry for every call to the ingestion
//! and evaluation services.
//!
//! Workflow components hold an `Arc<dyn EvaluationBackend>` and never build
//! requests themselves; `HttpBackend` is the production implementation.
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::models::assistant::{AskRequest, SessionDocumentRef, SessionUpload};
use crate::models::batch::{BatchSubmissionRequest, DetailQuery, SummaryQuery};
use crate::models::resume::{ApplicantIds, ResumeIngestRequest};
use crate::models::summary::{SkillDetail, SummaryResponse};

pub mod http;
#[cfg(test)]
pub mod scripted;

pub use http::HttpBackend;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Request/response contracts of the external collaborators.
#[async_trait]
pub trait EvaluationBackend: Send + Sync {
    /// Sends a whole batch for ingestion. The response is opaque.
    async fn ingest_batch(&self, request: &BatchSubmissionRequest) -> Result<Value, RemoteError>;

    async fn evaluate_batch_summary(
        &self,
        query: &SummaryQuery,
    ) -> Result<SummaryResponse, RemoteError>;

    /// Expensive per-file evidence. An `error` field in the payload is not a
    /// transport failure and is returned as part of the detail.
    async fn resume_skill_details(&self, query: &DetailQuery) -> Result<SkillDetail, RemoteError>;

    async fn ingest_resume(&self, request: &ResumeIngestRequest) -> Result<Value, RemoteError>;

    async fn evaluate_resume(&self, ids: &ApplicantIds) -> Result<Value, RemoteError>;

    /// Hybrid retrieval answer over a session's documents.
    async fn ask_hybrid(&self, request: &AskRequest) -> Result<Value, RemoteError>;

    async fn upload_document(&self, upload: &SessionUpload) -> Result<Value, RemoteError>;

    async fn list_documents(&self, session_id: &str) -> Result<Value, RemoteError>;

    async fn delete_document(&self, document: &SessionDocumentRef) -> Result<Value, RemoteError>;
}
