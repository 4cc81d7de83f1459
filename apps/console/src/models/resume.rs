use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::files::InputFile;

/// Single-applicant ingest: one résumé plus the job description it is read against.
#[derive(Debug, Clone)]
pub struct ResumeIngestRequest {
    pub recruiter_id: String,
    pub applicant_id: String,
    pub job_id: String,
    pub job_description_text: String,
    pub file: InputFile,
}

impl ResumeIngestRequest {
    pub fn new(
        recruiter_id: &str,
        applicant_id: &str,
        job_id: &str,
        job_description_text: &str,
        file: Option<InputFile>,
    ) -> Result<Self, AppError> {
        let ids = ApplicantIds::new(recruiter_id, applicant_id, job_id)?;
        let file = file.ok_or_else(|| AppError::validation("Resume PDF is required."))?;
        let job_description_text = job_description_text.trim();
        if job_description_text.is_empty() {
            return Err(AppError::validation("Job Description is required."));
        }

        Ok(Self {
            recruiter_id: ids.recruiter_id,
            applicant_id: ids.applicant_id,
            job_id: ids.job_id,
            job_description_text: job_description_text.to_string(),
            file,
        })
    }
}

/// Single-applicant evaluation query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantIds {
    #[serde(default)]
    pub recruiter_id: String,
    #[serde(default)]
    pub applicant_id: String,
    #[serde(default)]
    pub job_id: String,
}

impl ApplicantIds {
    pub fn new(recruiter_id: &str, applicant_id: &str, job_id: &str) -> Result<Self, AppError> {
        let (recruiter_id, applicant_id, job_id) =
            (recruiter_id.trim(), applicant_id.trim(), job_id.trim());
        if recruiter_id.is_empty() || applicant_id.is_empty() || job_id.is_empty() {
            return Err(AppError::validation(
                "recruiter_id, applicant_id and job_id are required",
            ));
        }
        Ok(Self {
            recruiter_id: recruiter_id.to_string(),
            applicant_id: applicant_id.to_string(),
            job_id: job_id.to_string(),
        })
    }

    /// Re-validates ids that arrived through deserialization.
    pub fn validated(self) -> Result<Self, AppError> {
        Self::new(&self.recruiter_id, &self.applicant_id, &self.job_id)
    }
}
