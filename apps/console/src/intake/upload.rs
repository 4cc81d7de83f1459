use std::collections::HashMap;

use axum::extract::Multipart;

use crate::errors::AppError;
use crate::models::files::RawFile;

/// Field names that carry résumé files in console uploads.
const FILE_FIELDS: [&str; 4] = ["files", "file", "resume_files", "resume_file"];

/// Parsed multipart upload: file parts plus plain text fields.
#[derive(Debug, Default)]
pub struct Upload {
    pub files: Vec<RawFile>,
    pub fields: HashMap<String, String>,
}

impl Upload {
    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }
}

pub async fn read_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    let mut upload = Upload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Malformed upload: {e}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        if FILE_FIELDS.contains(&field_name.as_str()) || field.file_name().is_some() {
            let file_name = field.file_name().unwrap_or("").to_string();
            let content_type = field.content_type().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::validation(format!("Could not read {file_name}: {e}")))?;
            upload
                .files
                .push(RawFile::new(file_name, content_type.as_deref(), data));
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::validation(format!("Could not read {field_name}: {e}")))?;
            upload.fields.insert(field_name, text);
        }
    }

    Ok(upload)
}
