//! Batch submission controller: a single-slot state machine.
//!
//! ```text
//! Idle ──submit──▶ Submitting ──ok──▶ Success
//!                      │
//!                      └──fail──▶ Error
//! Success | Error ──reset──▶ Idle
//! Success | Error ──submit──▶ Submitting   (user retry)
//! ```
//!
//! The slot lock is never held across the outbound request, so status reads
//! stay responsive while a batch is in flight. The request and the write-back
//! of its outcome run on a spawned task, so a dropped caller cannot leave the
//! slot in `Submitting`.

use std::sync::Arc;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::intake::collection::FileCollection;
use crate::models::batch::{BatchDraft, BatchSubmissionRequest};
use crate::models::files::InputFile;
use crate::remote::{EvaluationBackend, RemoteError};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionState {
    Idle,
    Submitting {
        file_count: usize,
        started_at: DateTime<Utc>,
    },
    Success {
        /// Ingestion result, kept exactly as received.
        response: Value,
        completed_at: DateTime<Utc>,
    },
    Error {
        http_status: Option<u16>,
        message: String,
        completed_at: DateTime<Utc>,
    },
}

impl SubmissionState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, SubmissionState::Submitting { .. })
    }
}

pub struct BatchSubmissionController {
    backend: Arc<dyn EvaluationBackend>,
    state: Arc<Mutex<SubmissionState>>,
}

impl BatchSubmissionController {
    pub fn new(backend: Arc<dyn EvaluationBackend>) -> Self {
        Self {
            backend,
            state: Arc::new(Mutex::new(SubmissionState::Idle)),
        }
    }

    pub async fn state(&self) -> SubmissionState {
        self.state.lock().await.clone()
    }

    /// Sends one batch. Validation failures and a batch already in flight
    /// leave the state exactly as it was.
    pub async fn submit(
        &self,
        draft: BatchDraft,
        files: Vec<InputFile>,
    ) -> Result<SubmissionState, AppError> {
        let request = {
            let mut state = self.state.lock().await;
            if state.is_submitting() {
                warn!("Submit ignored: a batch is already in flight");
                return Err(AppError::Conflict(
                    "A batch submission is already in progress".to_string(),
                ));
            }

            let request = BatchSubmissionRequest::new(draft, files)?;
            *state = SubmissionState::Submitting {
                file_count: request.files().len(),
                started_at: Utc::now(),
            };
            request
        };

        info!(
            "Submitting batch of {} file(s) for recruiter={} job={}",
            request.files().len(),
            request.recruiter_id(),
            request.job_id()
        );

        // The exchange owns the write-back, so the slot leaves `Submitting`
        // even when the caller stops waiting.
        let backend = self.backend.clone();
        let slot = self.state.clone();
        let exchange = tokio::spawn(async move {
            let result = backend.ingest_batch(&request).await;
            record_outcome(&slot, request.job_id(), result).await
        });

        match exchange.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Batch submission task failed: {e}");
                let mut state = self.state.lock().await;
                if state.is_submitting() {
                    *state = SubmissionState::Error {
                        http_status: None,
                        message: "Batch submission was interrupted".to_string(),
                        completed_at: Utc::now(),
                    };
                }
                Err(AppError::Internal(anyhow!("batch submission task failed: {e}")))
            }
        }
    }

    /// Returns to `Idle` and empties the file collection. Refused while a
    /// batch is in flight.
    pub async fn reset(&self, files: &mut FileCollection) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        if state.is_submitting() {
            return Err(AppError::Conflict(
                "Cannot reset while a batch submission is in progress".to_string(),
            ));
        }
        *state = SubmissionState::Idle;
        files.reset();
        info!("Batch workspace reset");
        Ok(())
    }
}

async fn record_outcome(
    slot: &Mutex<SubmissionState>,
    job_id: &str,
    result: Result<Value, RemoteError>,
) -> Result<SubmissionState, AppError> {
    let mut state = slot.lock().await;
    match result {
        Ok(response) => {
            info!("Batch ingestion succeeded for job={job_id}");
            *state = SubmissionState::Success {
                response,
                completed_at: Utc::now(),
            };
            Ok(state.clone())
        }
        Err(e) => {
            let err = AppError::from(e);
            warn!("Batch ingestion failed for job={job_id}: {err}");
            *state = SubmissionState::Error {
                http_status: err.remote_status(),
                message: err.to_string(),
                completed_at: Utc::now(),
            };
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::files::RawFile;
    use crate::remote::scripted::{api_error, ScriptedBackend};
    use bytes::Bytes;
    use serde_json::json;
    use std::time::Duration;

    fn draft(recruiter: &str) -> BatchDraft {
        BatchDraft {
            recruiter_id: recruiter.to_string(),
            job_id: "job1".to_string(),
            job_description_text: "desc".to_string(),
        }
    }

    fn collection_with(names: &[&str]) -> FileCollection {
        let mut files = FileCollection::new("application/pdf", 1024);
        files
            .add_files(
                names
                    .iter()
                    .map(|n| RawFile::new(*n, Some("application/pdf"), Bytes::from_static(b"%PDF")))
                    .collect(),
            )
            .unwrap();
        files
    }

    #[tokio::test]
    async fn test_validation_keeps_idle_and_sends_nothing() {
        let backend = Arc::new(ScriptedBackend::new());
        let controller = BatchSubmissionController::new(backend.clone());
        let files = collection_with(&["fileA.pdf"]);

        let err = controller.submit(draft(""), files.snapshot()).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(controller.state().await, SubmissionState::Idle);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_success_stores_response_verbatim() {
        let backend = Arc::new(ScriptedBackend::new());
        let body = json!({"ingested": 2, "batch": {"skipped": []}, "note": null});
        backend.push_ingest(Ok(body.clone()));
        let controller = BatchSubmissionController::new(backend.clone());
        let files = collection_with(&["a.pdf", "b.pdf"]);

        let state = controller.submit(draft("r1"), files.snapshot()).await.unwrap();

        match state {
            SubmissionState::Success { response, .. } => assert_eq!(response, body),
            other => panic!("expected Success, got {other:?}"),
        }
        assert_eq!(backend.calls(), vec!["ingest_batch:2".to_string()]);
    }

    #[tokio::test]
    async fn test_failure_keeps_files_and_reports_status() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_ingest(Err(api_error(500, "disk full")));
        let controller = BatchSubmissionController::new(backend.clone());
        let files = collection_with(&["a.pdf"]);

        let err = controller.submit(draft("r1"), files.snapshot()).await.unwrap_err();

        assert!(matches!(err, AppError::Transport { status: Some(500), .. }));
        match controller.state().await {
            SubmissionState::Error {
                http_status,
                message,
                ..
            } => {
                assert_eq!(http_status, Some(500));
                assert!(message.contains("disk full"));
            }
            other => panic!("expected Error, got {other:?}"),
        }
        assert_eq!(files.len(), 1);
    }

    #[tokio::test]
    async fn test_retry_after_error_is_allowed() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_ingest(Err(api_error(502, "bad gateway")));
        backend.push_ingest(Ok(json!({"ok": true})));
        let controller = BatchSubmissionController::new(backend.clone());
        let files = collection_with(&["a.pdf"]);

        assert!(controller.submit(draft("r1"), files.snapshot()).await.is_err());
        let state = controller.submit(draft("r1"), files.snapshot()).await.unwrap();

        assert!(matches!(state, SubmissionState::Success { .. }));
        assert_eq!(backend.call_count("ingest_batch"), 2);
    }

    #[tokio::test]
    async fn test_single_in_flight_submission() {
        let backend = Arc::new(ScriptedBackend::gated_on("ingest_batch"));
        let controller = Arc::new(BatchSubmissionController::new(backend.clone()));
        let files = collection_with(&["a.pdf"]);

        let first = {
            let controller = controller.clone();
            let snapshot = files.snapshot();
            tokio::spawn(async move { controller.submit(draft("r1"), snapshot).await })
        };
        while backend.call_count("ingest_batch") == 0 {
            tokio::task::yield_now().await;
        }
        assert!(controller.state().await.is_submitting());

        let second = controller.submit(draft("r1"), files.snapshot()).await;
        assert!(matches!(second, Err(AppError::Conflict(_))));

        let mut files_for_reset = files.clone();
        assert!(matches!(
            controller.reset(&mut files_for_reset).await,
            Err(AppError::Conflict(_))
        ));
        assert_eq!(files_for_reset.len(), 1);

        backend.release(1);
        let state = first.await.unwrap().unwrap();

        assert!(matches!(state, SubmissionState::Success { .. }));
        assert_eq!(backend.call_count("ingest_batch"), 1);
    }

    #[tokio::test]
    async fn test_reset_returns_to_idle_and_clears_files() {
        let backend = Arc::new(ScriptedBackend::new());
        let controller = BatchSubmissionController::new(backend);
        let mut files = collection_with(&["a.pdf", "b.pdf"]);

        controller.submit(draft("r1"), files.snapshot()).await.unwrap();
        controller.reset(&mut files).await.unwrap();

        assert_eq!(controller.state().await, SubmissionState::Idle);
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn test_dropped_caller_still_records_outcome() {
        let backend = Arc::new(ScriptedBackend::gated_on("ingest_batch"));
        backend.push_ingest(Ok(json!({"ingested": 1})));
        let controller = BatchSubmissionController::new(backend.clone());
        let mut files = collection_with(&["a.pdf"]);

        let abandoned = tokio::time::timeout(
            Duration::from_millis(50),
            controller.submit(draft("r1"), files.snapshot()),
        )
        .await;
        assert!(abandoned.is_err());
        assert!(controller.state().await.is_submitting());

        backend.release(1);
        tokio::time::timeout(Duration::from_secs(5), async {
            while controller.state().await.is_submitting() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        assert!(matches!(controller.state().await, SubmissionState::Success { .. }));
        controller.reset(&mut files).await.unwrap();
        assert_eq!(controller.state().await, SubmissionState::Idle);
    }
}
