//! File collection: the résumés gathered for the next batch.
//!
//! Only files of the accepted mime type ever enter the sequence, and a file
//! name appears at most once, so names stay usable as keys downstream.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::errors::AppError;
use crate::models::files::{InputFile, RawFile};

/// A candidate that was turned away, with the message shown next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedFile {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddFilesOutcome {
    pub accepted: Vec<InputFile>,
    pub rejected: Vec<RejectedFile>,
}

#[derive(Debug, Clone)]
pub struct FileCollection {
    accepted_mime_type: String,
    max_file_bytes: u64,
    files: Vec<InputFile>,
}

impl FileCollection {
    pub fn new(accepted_mime_type: impl Into<String>, max_file_bytes: u64) -> Self {
        Self {
            accepted_mime_type: accepted_mime_type.into().to_ascii_lowercase(),
            max_file_bytes,
            files: Vec::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.accepted_mime_type.clone(), config.max_file_bytes)
    }

    pub fn accepted_mime_type(&self) -> &str {
        &self.accepted_mime_type
    }

    /// Appends every acceptable candidate in order. Fails without touching
    /// the collection when none is acceptable.
    pub fn add_files(&mut self, candidates: Vec<RawFile>) -> Result<AddFilesOutcome, AppError> {
        let mut names: HashSet<String> = self.files.iter().map(|f| f.name.clone()).collect();
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();

        for candidate in candidates {
            match self.check(&candidate, &names) {
                Ok(mime_type) => {
                    names.insert(candidate.name.clone());
                    accepted.push(InputFile::accept(candidate, mime_type));
                }
                Err(reason) => {
                    debug!("Rejected {}: {}", candidate.name, reason);
                    rejected.push(RejectedFile {
                        name: candidate.name,
                        reason,
                    });
                }
            }
        }

        if accepted.is_empty() {
            warn!("No acceptable files among {} candidates", rejected.len());
            return Err(AppError::validation("no acceptable files"));
        }

        self.files.extend(accepted.iter().cloned());
        Ok(AddFilesOutcome { accepted, rejected })
    }

    /// Checks a single candidate against the collection's rules without
    /// storing it. The rejection carries the same reason `add_files` reports.
    pub fn accept_one(&self, candidate: RawFile) -> Result<InputFile, RejectedFile> {
        let names: HashSet<String> = self.files.iter().map(|f| f.name.clone()).collect();
        match self.check(&candidate, &names) {
            Ok(mime_type) => Ok(InputFile::accept(candidate, mime_type)),
            Err(reason) => Err(RejectedFile {
                name: candidate.name,
                reason,
            }),
        }
    }

    fn check(&self, candidate: &RawFile, names: &HashSet<String>) -> Result<String, String> {
        let mime_type = candidate.effective_mime_type();
        if mime_type != self.accepted_mime_type {
            return Err(format!(
                "unsupported type {mime_type}, only {} is accepted",
                self.accepted_mime_type
            ));
        }
        if candidate.name.trim().is_empty() {
            return Err("file name is missing".to_string());
        }
        if names.contains(&candidate.name) {
            return Err("duplicate file name".to_string());
        }
        if candidate.content.is_empty() {
            return Err("file is empty".to_string());
        }
        if candidate.content.len() as u64 > self.max_file_bytes {
            return Err(format!(
                "file exceeds the {} byte limit",
                self.max_file_bytes
            ));
        }
        Ok(mime_type)
    }

    /// Out-of-range indexes are ignored.
    pub fn remove_file(&mut self, index: usize) -> Option<InputFile> {
        if index < self.files.len() {
            Some(self.files.remove(index))
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.files.clear();
    }

    /// Copy handed to the submission controller. File contents are shared, not duplicated.
    pub fn snapshot(&self) -> Vec<InputFile> {
        self.files.clone()
    }

    pub fn files(&self) -> &[InputFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size_bytes).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn collection() -> FileCollection {
        FileCollection::new("application/pdf", 1024)
    }

    fn pdf(name: &str) -> RawFile {
        RawFile::new(name, Some("application/pdf"), Bytes::from_static(b"%PDF-1.7"))
    }

    fn txt(name: &str) -> RawFile {
        RawFile::new(name, Some("text/plain"), Bytes::from_static(b"hello"))
    }

    #[test]
    fn test_type_filtering_keeps_only_pdf() {
        let mut files = collection();
        let outcome = files.add_files(vec![pdf("a.pdf"), txt("b.txt")]).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].name, "b.txt");
        assert!(outcome.rejected[0].reason.contains("unsupported type"));
    }

    #[test]
    fn test_nothing_acceptable_leaves_collection_untouched() {
        let mut files = collection();
        files.add_files(vec![pdf("a.pdf")]).unwrap();

        let err = files.add_files(vec![txt("b.txt"), txt("c.txt")]).unwrap_err();

        assert!(matches!(err, AppError::Validation(ref m) if m == "no acceptable files"));
        assert_eq!(files.len(), 1);
        assert_eq!(files.files()[0].name, "a.pdf");
    }

    #[test]
    fn test_appends_in_order() {
        let mut files = collection();
        files.add_files(vec![pdf("a.pdf"), pdf("b.pdf")]).unwrap();
        files.add_files(vec![pdf("c.pdf")]).unwrap();

        let names: Vec<_> = files.files().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf", "c.pdf"]);
        assert_eq!(files.total_bytes(), 24);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut files = collection();
        files.add_files(vec![pdf("a.pdf")]).unwrap();

        let outcome = files
            .add_files(vec![pdf("a.pdf"), pdf("b.pdf"), pdf("b.pdf")])
            .unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(outcome.rejected.len(), 2);
        assert!(outcome
            .rejected
            .iter()
            .all(|r| r.reason == "duplicate file name"));
    }

    #[test]
    fn test_oversize_and_empty_files_rejected() {
        let mut files = FileCollection::new("application/pdf", 4);
        let empty = RawFile::new("empty.pdf", Some("application/pdf"), Bytes::new());

        let err = files.add_files(vec![pdf("big.pdf"), empty]).unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(files.is_empty());
    }

    #[test]
    fn test_remove_out_of_range_is_noop() {
        let mut files = collection();
        files.add_files(vec![pdf("a.pdf"), pdf("b.pdf")]).unwrap();

        assert!(files.remove_file(5).is_none());
        assert_eq!(files.len(), 2);

        let removed = files.remove_file(0).unwrap();
        assert_eq!(removed.name, "a.pdf");
        assert_eq!(files.files()[0].name, "b.pdf");
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut files = collection();
        files.add_files(vec![pdf("a.pdf")]).unwrap();
        files.reset();
        assert!(files.is_empty());
    }

    #[test]
    fn test_extension_used_when_type_missing() {
        let mut files = collection();
        let bare = RawFile::new("cv.pdf", None, Bytes::from_static(b"%PDF"));
        files.add_files(vec![bare]).unwrap();
        assert_eq!(files.files()[0].mime_type, "application/pdf");
    }

    #[test]
    fn test_accept_one_reports_reason_without_storing() {
        let files = collection();
        let rejected = files
            .accept_one(RawFile::new("notes.txt", Some("text/plain"), Bytes::from_static(b"hi")))
            .unwrap_err();
        assert_eq!(rejected.name, "notes.txt");
        assert!(rejected.reason.contains("unsupported type"));

        let accepted = files
            .accept_one(RawFile::new("cv.pdf", None, Bytes::from_static(b"%PDF")))
            .unwrap();
        assert_eq!(accepted.mime_type, "application/pdf");
        assert!(files.is_empty());
    }
}
