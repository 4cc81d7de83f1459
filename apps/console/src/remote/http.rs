use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{EvaluationBackend, RemoteError};
use crate::config::Config;
use crate::models::assistant::{AskRequest, SessionDocumentRef, SessionUpload};
use crate::models::batch::{BatchSubmissionRequest, DetailQuery, SummaryQuery};
use crate::models::files::InputFile;
use crate::models::resume::{ApplicantIds, ResumeIngestRequest};
use crate::models::summary::{SkillDetail, SummaryResponse};

const BATCH_INGEST_PATH: &str = "batch_ingest";
const RESUME_INGEST_PATH: &str = "ingest_documents";
const EVALUATE_RESUME_PATH: &str = "evaluate_resume";
const BATCH_SUMMARY_PATH: &str = "evaluate_batch_summary";
const SKILL_DETAILS_PATH: &str = "get_resume_skill_details";
const ASK_HYBRID_PATH: &str = "ask-hybrid";
const UPLOAD_DOCUMENT_PATH: &str = "upload";
const LIST_DOCUMENTS_PATH: &str = "files";
const DELETE_DOCUMENT_PATH: &str = "file";

/// `reqwest` implementation of [`EvaluationBackend`].
/// Every request is bounded by the configured timeout; nothing is retried.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    ingest_base: String,
    evaluation_base: String,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            ingest_base: config.ingest_api_base.clone(),
            evaluation_base: config.evaluation_api_base.clone(),
        })
    }

    fn url(base: &str, path: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), path)
    }

    async fn post_json<B, T>(&self, url: String, body: &B) -> Result<T, RemoteError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        debug!("POST {url}");
        let response = self.client.post(&url).json(body).send().await?;
        read_json(&url, response).await
    }

    async fn post_form<T: DeserializeOwned>(&self, url: String, form: Form) -> Result<T, RemoteError> {
        debug!("POST {url} (multipart)");
        let response = self.client.post(&url).multipart(form).send().await?;
        read_json(&url, response).await
    }
}

async fn read_json<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, RemoteError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        warn!("{url} returned {status}: {body}");
        return Err(RemoteError::Api {
            status: status.as_u16(),
            body,
        });
    }

    Ok(serde_json::from_str(&body)?)
}

fn file_part(file: &InputFile) -> Result<Part, RemoteError> {
    Ok(Part::bytes(file.content.to_vec())
        .file_name(file.name.clone())
        .mime_str(&file.mime_type)?)
}

#[async_trait]
impl EvaluationBackend for HttpBackend {
    async fn ingest_batch(&self, request: &BatchSubmissionRequest) -> Result<Value, RemoteError> {
        let mut form = Form::new()
            .text("recruiter_id", request.recruiter_id().to_string())
            .text("job_id", request.job_id().to_string())
            .text("jd_text", request.job_description_text().to_string());

        for file in request.files() {
            form = form.part("resume_files", file_part(file)?);
        }

        self.post_form(Self::url(&self.ingest_base, BATCH_INGEST_PATH), form)
            .await
    }

    async fn evaluate_batch_summary(
        &self,
        query: &SummaryQuery,
    ) -> Result<SummaryResponse, RemoteError> {
        self.post_json(Self::url(&self.evaluation_base, BATCH_SUMMARY_PATH), query)
            .await
    }

    async fn resume_skill_details(&self, query: &DetailQuery) -> Result<SkillDetail, RemoteError> {
        self.post_json(Self::url(&self.evaluation_base, SKILL_DETAILS_PATH), query)
            .await
    }

    async fn ingest_resume(&self, request: &ResumeIngestRequest) -> Result<Value, RemoteError> {
        let form = Form::new()
            .text("recruiter_id", request.recruiter_id.clone())
            .text("applicant_id", request.applicant_id.clone())
            .text("job_id", request.job_id.clone())
            .part("resume_file", file_part(&request.file)?)
            .text("jd_text", request.job_description_text.clone());

        self.post_form(Self::url(&self.evaluation_base, RESUME_INGEST_PATH), form)
            .await
    }

    async fn evaluate_resume(&self, ids: &ApplicantIds) -> Result<Value, RemoteError> {
        self.post_json(Self::url(&self.ingest_base, EVALUATE_RESUME_PATH), ids)
            .await
    }

    async fn ask_hybrid(&self, request: &AskRequest) -> Result<Value, RemoteError> {
        self.post_json(Self::url(&self.evaluation_base, ASK_HYBRID_PATH), request)
            .await
    }

    async fn upload_document(&self, upload: &SessionUpload) -> Result<Value, RemoteError> {
        let form = Form::new()
            .part("file", file_part(&upload.file)?)
            .text("session_id", upload.session_id.clone());

        self.post_form(Self::url(&self.evaluation_base, UPLOAD_DOCUMENT_PATH), form)
            .await
    }

    async fn list_documents(&self, session_id: &str) -> Result<Value, RemoteError> {
        let url = Self::url(&self.evaluation_base, LIST_DOCUMENTS_PATH);
        debug!("GET {url}");
        let response = self
            .client
            .get(&url)
            .query(&[("session_id", session_id)])
            .send()
            .await?;
        read_json(&url, response).await
    }

    async fn delete_document(&self, document: &SessionDocumentRef) -> Result<Value, RemoteError> {
        let url = Self::url(&self.evaluation_base, DELETE_DOCUMENT_PATH);
        debug!("DELETE {url}");
        let response = self.client.delete(&url).json(document).send().await?;
        read_json(&url, response).await
    }
}
