use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::files::InputFile;

/// Job metadata typed by the recruiter for a batch submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchDraft {
    #[serde(default)]
    pub recruiter_id: String,
    #[serde(default)]
    pub job_id: String,
    #[serde(default, alias = "jd_text")]
    pub job_description_text: String,
}

/// One outbound batch. Built once per submit and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct BatchSubmissionRequest {
    recruiter_id: String,
    job_id: String,
    job_description_text: String,
    files: Vec<InputFile>,
}

impl BatchSubmissionRequest {
    /// Validates the draft and the file snapshot. Ids are sent trimmed; the
    /// job description is sent as typed.
    pub fn new(draft: BatchDraft, files: Vec<InputFile>) -> Result<Self, AppError> {
        let recruiter_id = draft.recruiter_id.trim();
        let job_id = draft.job_id.trim();

        if recruiter_id.is_empty() || job_id.is_empty() {
            return Err(AppError::validation("Recruiter ID and Job ID are required."));
        }
        if files.is_empty() {
            return Err(AppError::validation(
                "Please upload at least one resume PDF.",
            ));
        }
        if draft.job_description_text.trim().is_empty() {
            return Err(AppError::validation("Job Description is required."));
        }

        Ok(Self {
            recruiter_id: recruiter_id.to_string(),
            job_id: job_id.to_string(),
            job_description_text: draft.job_description_text,
            files,
        })
    }

    pub fn recruiter_id(&self) -> &str {
        &self.recruiter_id
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn job_description_text(&self) -> &str {
        &self.job_description_text
    }

    pub fn files(&self) -> &[InputFile] {
        &self.files
    }
}

/// How much work the evaluation service should do for a summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryMode {
    #[default]
    Auto,
    Fast,
    Full,
}

/// Identifies a summary result set: who asked, for which job, and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryQuery {
    pub recruiter_id: String,
    pub job_id: String,
    #[serde(default)]
    pub mode: SummaryMode,
}

impl SummaryQuery {
    pub fn new(recruiter_id: &str, job_id: &str, mode: SummaryMode) -> Result<Self, AppError> {
        let recruiter_id = recruiter_id.trim();
        let job_id = job_id.trim();
        if recruiter_id.is_empty() || job_id.is_empty() {
            return Err(AppError::validation("recruiter_id and job_id are required"));
        }
        Ok(Self {
            recruiter_id: recruiter_id.to_string(),
            job_id: job_id.to_string(),
            mode,
        })
    }
}

/// Key of one detail fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailQuery {
    pub recruiter_id: String,
    pub job_id: String,
    pub file_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn pdf(name: &str) -> InputFile {
        InputFile {
            name: name.to_string(),
            size_bytes: 4,
            mime_type: "application/pdf".to_string(),
            content: Bytes::from_static(b"%PDF"),
        }
    }

    fn draft(recruiter: &str, job: &str, jd: &str) -> BatchDraft {
        BatchDraft {
            recruiter_id: recruiter.to_string(),
            job_id: job.to_string(),
            job_description_text: jd.to_string(),
        }
    }

    #[test]
    fn test_blank_recruiter_rejected() {
        let err = BatchSubmissionRequest::new(draft("   ", "job1", "desc"), vec![pdf("a.pdf")])
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_no_files_rejected() {
        let err = BatchSubmissionRequest::new(draft("r1", "job1", "desc"), vec![]).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_blank_description_rejected() {
        let err = BatchSubmissionRequest::new(draft("r1", "job1", " \n"), vec![pdf("a.pdf")])
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_ids_are_trimmed() {
        let request =
            BatchSubmissionRequest::new(draft(" r1 ", "job1\t", "desc"), vec![pdf("a.pdf")])
                .unwrap();
        assert_eq!(request.recruiter_id(), "r1");
        assert_eq!(request.job_id(), "job1");
        assert_eq!(request.files().len(), 1);
    }

    #[test]
    fn test_summary_query_requires_ids() {
        assert!(SummaryQuery::new("", "job1", SummaryMode::Auto).is_err());
        let query = SummaryQuery::new(" r1", "job1 ", SummaryMode::Full).unwrap();
        assert_eq!(query.recruiter_id, "r1");
        assert_eq!(query.job_id, "job1");
    }

    #[test]
    fn test_mode_wire_format() {
        let mode: SummaryMode = serde_json::from_str("\"fast\"").unwrap();
        assert_eq!(mode, SummaryMode::Fast);
        assert_eq!(serde_json::to_string(&SummaryMode::Full).unwrap(), "\"full\"");
    }
}
