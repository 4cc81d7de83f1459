//! Single-applicant ingest and evaluation, outside the batch workflow.
pub mod handlers;
