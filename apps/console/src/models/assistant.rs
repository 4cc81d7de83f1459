use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::files::{InputFile, RawFile};

fn required(value: &str, message: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::validation(message));
    }
    Ok(value.to_string())
}

/// A question answered over the documents uploaded to one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub question: String,
}

impl AskRequest {
    pub fn validated(self) -> Result<Self, AppError> {
        Ok(Self {
            session_id: required(&self.session_id, "session_id is required")?,
            question: required(&self.question, "Question is required.")?,
        })
    }
}

/// Names one document of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDocumentRef {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub file_name: String,
}

impl SessionDocumentRef {
    pub fn validated(self) -> Result<Self, AppError> {
        Ok(Self {
            session_id: required(&self.session_id, "session_id is required")?,
            file_name: required(&self.file_name, "file_name is required")?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionQuery {
    #[serde(default)]
    pub session_id: String,
}

impl SessionQuery {
    pub fn session_id(&self) -> Result<String, AppError> {
        required(&self.session_id, "session_id is required")
    }
}

/// One document added to a session's knowledge base. Any file type is
/// accepted; the session service decides what it can index.
#[derive(Debug, Clone)]
pub struct SessionUpload {
    pub session_id: String,
    pub file: InputFile,
}

impl SessionUpload {
    pub fn new(
        session_id: &str,
        file: Option<RawFile>,
        max_file_bytes: u64,
    ) -> Result<Self, AppError> {
        let session_id = required(session_id, "session_id is required")?;
        let raw = file.ok_or_else(|| AppError::validation("A document file is required."))?;
        if raw.name.trim().is_empty() {
            return Err(AppError::validation("file name is missing"));
        }
        if raw.content.is_empty() {
            return Err(AppError::validation(format!("{}: file is empty", raw.name)));
        }
        if raw.content.len() as u64 > max_file_bytes {
            return Err(AppError::validation(format!(
                "{}: file exceeds the {max_file_bytes} byte limit",
                raw.name
            )));
        }

        let mime_type = raw.effective_mime_type();
        Ok(Self {
            session_id,
            file: InputFile::accept(raw, mime_type),
        })
    }
}
