pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::assistant::handlers as assistant;
use crate::evaluation::handlers as evaluation;
use crate::intake::handlers as intake;
use crate::resume::handlers as resume;
use crate::state::AppState;
use crate::submission::handlers as submission;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.upload_body_limit();

    Router::new()
        .route("/health", get(health::health_handler))
        // File collection
        .route(
            "/api/v1/files",
            get(intake::handle_list_files).post(intake::handle_add_files),
        )
        .route("/api/v1/files/:index", delete(intake::handle_remove_file))
        // Batch submission
        .route("/api/v1/batch", get(submission::handle_batch_status))
        .route("/api/v1/batch/submit", post(submission::handle_submit_batch))
        .route("/api/v1/batch/reset", post(submission::handle_reset_batch))
        // Summaries and detail expansion
        .route(
            "/api/v1/summary",
            get(evaluation::handle_get_summary).post(evaluation::handle_load_summary),
        )
        .route(
            "/api/v1/summary/details",
            post(evaluation::handle_toggle_details),
        )
        // Single applicant
        .route("/api/v1/resume/ingest", post(resume::handle_ingest_resume))
        .route(
            "/api/v1/resume/evaluate",
            post(resume::handle_evaluate_resume),
        )
        // Session document Q&A
        .route("/api/v1/assistant/ask", post(assistant::handle_ask))
        .route(
            "/api/v1/assistant/documents",
            get(assistant::handle_list_documents)
                .post(assistant::handle_upload_document)
                .delete(assistant::handle_delete_document),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
