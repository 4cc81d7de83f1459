use std::path::Path;

use bytes::Bytes;
use serde::Serialize;

const OCTET_STREAM: &str = "application/octet-stream";

/// A candidate file handle as it arrives from an upload, before type filtering.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub name: String,
    pub declared_mime_type: Option<String>,
    pub content: Bytes,
}

impl RawFile {
    pub fn new(name: impl Into<String>, declared_mime_type: Option<&str>, content: Bytes) -> Self {
        Self {
            name: name.into(),
            declared_mime_type: declared_mime_type.map(str::to_string),
            content,
        }
    }

    /// Declared mime type, falling back to the extension when the uploader
    /// sent nothing useful (missing or `application/octet-stream`).
    pub fn effective_mime_type(&self) -> String {
        match self.declared_mime_type.as_deref().map(str::trim) {
            Some(declared) if !declared.is_empty() && !declared.eq_ignore_ascii_case(OCTET_STREAM) => {
                // Drop parameters such as "; charset=binary"
                declared
                    .split(';')
                    .next()
                    .unwrap_or(declared)
                    .trim()
                    .to_ascii_lowercase()
            }
            _ => mime_from_extension(&self.name).to_string(),
        }
    }
}

fn mime_from_extension(name: &str) -> &'static str {
    let extension = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match extension.as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "txt" => "text/plain",
        _ => OCTET_STREAM,
    }
}

/// An accepted résumé file. Only ever constructed by the file collection.
#[derive(Debug, Clone, Serialize)]
pub struct InputFile {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
    #[serde(skip)]
    pub content: Bytes,
}

impl InputFile {
    pub(crate) fn accept(raw: RawFile, mime_type: String) -> Self {
        Self {
            size_bytes: raw.content.len() as u64,
            name: raw.name,
            mime_type,
            content: raw.content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_type_wins() {
        let raw = RawFile::new("cv.bin", Some("application/PDF"), Bytes::from_static(b"%PDF"));
        assert_eq!(raw.effective_mime_type(), "application/pdf");
    }

    #[test]
    fn test_parameters_are_stripped() {
        let raw = RawFile::new("cv.pdf", Some("application/pdf; charset=binary"), Bytes::new());
        assert_eq!(raw.effective_mime_type(), "application/pdf");
    }

    #[test]
    fn test_octet_stream_falls_back_to_extension() {
        let raw = RawFile::new("Jane Doe.PDF", Some("application/octet-stream"), Bytes::new());
        assert_eq!(raw.effective_mime_type(), "application/pdf");

        let raw = RawFile::new("notes.txt", None, Bytes::new());
        assert_eq!(raw.effective_mime_type(), "text/plain");
    }

    #[test]
    fn test_accept_records_size() {
        let raw = RawFile::new("a.pdf", None, Bytes::from_static(b"12345"));
        let file = InputFile::accept(raw, "application/pdf".to_string());
        assert_eq!(file.size_bytes, 5);
        assert_eq!(file.name, "a.pdf");
    }
}
