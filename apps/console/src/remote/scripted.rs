//! In-memory backend for tests: replays queued responses and records calls.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Semaphore;

use super::{EvaluationBackend, RemoteError};
use crate::models::assistant::{AskRequest, SessionDocumentRef, SessionUpload};
use crate::models::batch::{BatchSubmissionRequest, DetailQuery, SummaryQuery};
use crate::models::resume::{ApplicantIds, ResumeIngestRequest};
use crate::models::summary::{EvaluationSummaryRecord, SkillDetail, SummaryResponse};

#[derive(Default)]
pub struct ScriptedBackend {
    ingest: Mutex<VecDeque<Result<Value, RemoteError>>>,
    summaries: Mutex<VecDeque<Result<SummaryResponse, RemoteError>>>,
    details: Mutex<HashMap<String, VecDeque<Result<SkillDetail, RemoteError>>>>,
    calls: Mutex<Vec<String>>,
    gate: Option<(String, Semaphore)>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls whose name starts with `prefix` block until
    /// [`ScriptedBackend::release`] hands out a permit.
    pub fn gated_on(prefix: &str) -> Self {
        Self {
            gate: Some((prefix.to_string(), Semaphore::new(0))),
            ..Self::default()
        }
    }

    pub fn release(&self, calls: usize) {
        if let Some((_, gate)) = &self.gate {
            gate.add_permits(calls);
        }
    }

    pub fn push_ingest(&self, result: Result<Value, RemoteError>) {
        self.ingest.lock().unwrap().push_back(result);
    }

    pub fn push_summary(&self, result: Result<SummaryResponse, RemoteError>) {
        self.summaries.lock().unwrap().push_back(result);
    }

    pub fn push_detail(&self, file_name: &str, result: Result<SkillDetail, RemoteError>) {
        self.details
            .lock()
            .unwrap()
            .entry(file_name.to_string())
            .or_default()
            .push_back(result);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    async fn enter(&self, call: String) {
        let gated = matches!(&self.gate, Some((prefix, _)) if call.starts_with(prefix.as_str()));
        self.calls.lock().unwrap().push(call);
        if let (true, Some((_, gate))) = (gated, &self.gate) {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
    }
}

pub fn api_error(status: u16, body: &str) -> RemoteError {
    RemoteError::Api {
        status,
        body: body.to_string(),
    }
}

pub fn record(file_name: &str, final_score: f64, embedding: f64, keyword: f64) -> EvaluationSummaryRecord {
    EvaluationSummaryRecord {
        file_name: file_name.to_string(),
        final_score,
        embedding_similarity: embedding,
        keyword_score: keyword,
        llm_score: None,
        matched_skills: None,
        missing_skills: None,
        assessment: None,
    }
}

pub fn summary(records: Vec<EvaluationSummaryRecord>) -> SummaryResponse {
    SummaryResponse {
        results: records,
        extra: Default::default(),
    }
}

pub fn detail(value: Value) -> SkillDetail {
    serde_json::from_value(value).unwrap()
}

#[async_trait]
impl EvaluationBackend for ScriptedBackend {
    async fn ingest_batch(&self, request: &BatchSubmissionRequest) -> Result<Value, RemoteError> {
        self.enter(format!("ingest_batch:{}", request.files().len()))
            .await;
        self.ingest
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(json!({"status": "ok"})))
    }

    async fn evaluate_batch_summary(
        &self,
        query: &SummaryQuery,
    ) -> Result<SummaryResponse, RemoteError> {
        self.enter(format!("summary:{}:{}", query.recruiter_id, query.job_id))
            .await;
        self.summaries
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(summary(vec![])))
    }

    async fn resume_skill_details(&self, query: &DetailQuery) -> Result<SkillDetail, RemoteError> {
        self.enter(format!("detail:{}", query.file_name)).await;
        self.details
            .lock()
            .unwrap()
            .get_mut(&query.file_name)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(api_error(404, "no scripted detail")))
    }

    async fn ingest_resume(&self, request: &ResumeIngestRequest) -> Result<Value, RemoteError> {
        self.enter(format!("ingest_resume:{}", request.applicant_id))
            .await;
        self.ingest
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(json!({"status": "ok"})))
    }

    async fn evaluate_resume(&self, ids: &ApplicantIds) -> Result<Value, RemoteError> {
        self.enter(format!("evaluate_resume:{}", ids.applicant_id))
            .await;
        Ok(json!({"applicant_id": ids.applicant_id, "final_score": 0.5}))
    }

    async fn ask_hybrid(&self, request: &AskRequest) -> Result<Value, RemoteError> {
        self.enter(format!("ask:{}", request.session_id)).await;
        Ok(json!({"answer": format!("answer to: {}", request.question)}))
    }

    async fn upload_document(&self, upload: &SessionUpload) -> Result<Value, RemoteError> {
        self.enter(format!("upload_document:{}:{}", upload.session_id, upload.file.name))
            .await;
        Ok(json!({"uploaded": upload.file.name}))
    }

    async fn list_documents(&self, session_id: &str) -> Result<Value, RemoteError> {
        self.enter(format!("list_documents:{session_id}")).await;
        Ok(json!({"session_id": session_id, "files": []}))
    }

    async fn delete_document(&self, document: &SessionDocumentRef) -> Result<Value, RemoteError> {
        self.enter(format!(
            "delete_document:{}:{}",
            document.session_id, document.file_name
        ))
        .await;
        Ok(json!({"deleted": document.file_name}))
    }
}
