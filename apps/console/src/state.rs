use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::evaluation::board::EvaluationBoard;
use crate::intake::collection::FileCollection;
use crate::remote::EvaluationBackend;
use crate::submission::controller::BatchSubmissionController;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Ingestion and evaluation services. `HttpBackend` in production.
    pub backend: Arc<dyn EvaluationBackend>,
    /// Files staged for the next batch.
    pub files: Arc<Mutex<FileCollection>>,
    pub submission: Arc<BatchSubmissionController>,
    pub board: Arc<EvaluationBoard>,
}

impl AppState {
    pub fn new(config: Config, backend: Arc<dyn EvaluationBackend>) -> Self {
        Self {
            files: Arc::new(Mutex::new(FileCollection::from_config(&config))),
            submission: Arc::new(BatchSubmissionController::new(backend.clone())),
            board: Arc::new(EvaluationBoard::new(backend.clone())),
            backend,
            config,
        }
    }
}
