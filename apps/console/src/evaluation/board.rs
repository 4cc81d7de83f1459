//! Evaluation board: runs summary loads and detail toggles against the
//! evaluation service.
//!
//! The store and the expansion cache live under one lock so a reload resets
//! both atomically. The lock is released for the duration of every remote
//! call; a key's `Loading` state is what keeps a second fetch for the same
//! file from starting. Fetches for different files proceed independently.
//! Every remote call and the state write-back after it run on a spawned
//! task, so a caller that goes away never strands `Loading` or `loading`.

use std::sync::Arc;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::detail_cache::{
    DetailCache, ExpansionEffect, ExpansionEvent, ExpansionState, TransitionError,
};
use crate::evaluation::summary_store::SummaryStore;
use crate::models::batch::{DetailQuery, SummaryMode, SummaryQuery};
use crate::models::summary::{EvaluationSummaryRecord, SkillDetail, SummaryResponse};
use crate::remote::{EvaluationBackend, RemoteError};

#[derive(Debug, Default)]
struct BoardState {
    store: Option<SummaryStore>,
    cache: DetailCache,
    summary_loads_in_flight: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordView {
    #[serde(flatten)]
    pub record: EvaluationSummaryRecord,
    pub expansion: ExpansionState,
}

/// Ordered, render-ready view of the current result set.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryView {
    pub generation: Option<Uuid>,
    pub query: Option<SummaryQuery>,
    pub loaded_at: Option<DateTime<Utc>>,
    pub loading: bool,
    pub results: Vec<RecordView>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToggleOutcome {
    pub file_name: String,
    pub expansion: ExpansionState,
    /// Whether this toggle went to the evaluation service.
    pub fetched: bool,
    pub record: EvaluationSummaryRecord,
}

impl BoardState {
    fn view(&self) -> SummaryView {
        let loading = self.summary_loads_in_flight > 0;
        match &self.store {
            Some(store) => SummaryView {
                generation: Some(store.generation()),
                query: Some(store.query().clone()),
                loaded_at: Some(store.loaded_at()),
                loading,
                results: store
                    .records()
                    .map(|record| RecordView {
                        expansion: self.cache.state_of(&record.file_name),
                        record: record.clone(),
                    })
                    .collect(),
                extra: store.extra().clone(),
            },
            None => SummaryView {
                generation: None,
                query: None,
                loaded_at: None,
                loading,
                results: Vec::new(),
                extra: Map::new(),
            },
        }
    }

    fn outcome(&self, file_name: &str, fetched: bool) -> Result<ToggleOutcome, AppError> {
        let record = self
            .store
            .as_ref()
            .and_then(|store| store.get(file_name))
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("No summary record for {file_name}")))?;

        Ok(ToggleOutcome {
            file_name: file_name.to_string(),
            expansion: self.cache.state_of(file_name),
            fetched,
            record,
        })
    }
}

fn transition_conflict(file_name: &str, err: TransitionError) -> AppError {
    AppError::Conflict(format!("{file_name}: {err}"))
}

pub struct EvaluationBoard {
    backend: Arc<dyn EvaluationBackend>,
    inner: Arc<Mutex<BoardState>>,
}

impl EvaluationBoard {
    pub fn new(backend: Arc<dyn EvaluationBackend>) -> Self {
        Self {
            backend,
            inner: Arc::new(Mutex::new(BoardState::default())),
        }
    }

    pub async fn view(&self) -> SummaryView {
        self.inner.lock().await.view()
    }

    pub async fn expansion_state(&self, file_name: &str) -> ExpansionState {
        self.inner.lock().await.cache.state_of(file_name)
    }

    /// Fetches a batch summary and, on success, replaces every record and
    /// forgets every expansion state. On failure the current set stays.
    pub async fn load_summary(
        &self,
        recruiter_id: &str,
        job_id: &str,
        mode: SummaryMode,
    ) -> Result<SummaryView, AppError> {
        let query = SummaryQuery::new(recruiter_id, job_id, mode)?;

        self.inner.lock().await.summary_loads_in_flight += 1;
        info!(
            "Loading batch summary for recruiter={} job={} mode={:?}",
            query.recruiter_id, query.job_id, query.mode
        );

        let backend = self.backend.clone();
        let board = self.inner.clone();
        let load = tokio::spawn(async move {
            let result = backend.evaluate_batch_summary(&query).await;
            store_summary(&board, query, result).await
        });

        match load.await {
            Ok(view) => view,
            Err(e) => {
                error!("Summary load task failed: {e}");
                let mut inner = self.inner.lock().await;
                inner.summary_loads_in_flight = inner.summary_loads_in_flight.saturating_sub(1);
                Err(AppError::Internal(anyhow!("summary load task failed: {e}")))
            }
        }
    }

    /// Expands or collapses one record. The first expansion fetches and
    /// merges the detail; later ones are served from the record.
    pub async fn toggle_details(&self, file_name: &str) -> Result<ToggleOutcome, AppError> {
        let (query, generation) = {
            let mut inner = self.inner.lock().await;
            let store = inner.store.as_ref().ok_or_else(|| {
                AppError::validation("Load a batch summary before expanding details")
            })?;
            if !store.contains(file_name) {
                return Err(AppError::NotFound(format!(
                    "No summary record for {file_name}"
                )));
            }
            let query = DetailQuery {
                recruiter_id: store.query().recruiter_id.clone(),
                job_id: store.query().job_id.clone(),
                file_name: file_name.to_string(),
            };
            let generation = store.generation();

            let effect = inner
                .cache
                .apply(file_name, ExpansionEvent::Toggle)
                .map_err(|e| transition_conflict(file_name, e))?;

            match effect {
                ExpansionEffect::None => {
                    debug!("{file_name} -> {:?} (no fetch)", inner.cache.state_of(file_name));
                    return inner.outcome(file_name, false);
                }
                ExpansionEffect::FetchDetail => (query, generation),
                ExpansionEffect::MergeDetail => {
                    return Err(AppError::Internal(anyhow!(
                        "toggle produced a merge for {file_name}"
                    )))
                }
            }
        };

        info!("Fetching skill details for {file_name}");
        // The key leaves `Loading` on the fetch task, not on this caller.
        let backend = self.backend.clone();
        let board = self.inner.clone();
        let fetch = tokio::spawn(async move {
            let fetched = backend
                .resume_skill_details(&query)
                .await
                .map_err(AppError::from)
                .and_then(SkillDetail::into_result);
            store_detail(&board, &query.file_name, generation, fetched).await
        });

        match fetch.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Detail fetch task for {file_name} failed: {e}");
                let mut inner = self.inner.lock().await;
                let same_set = inner.store.as_ref().map(SummaryStore::generation) == Some(generation);
                if same_set && inner.cache.state_of(file_name) == ExpansionState::Loading {
                    let _ = inner.cache.apply(file_name, ExpansionEvent::FetchFailed);
                }
                Err(AppError::Internal(anyhow!("detail fetch task failed: {e}")))
            }
        }
    }
}

async fn store_summary(
    board: &Mutex<BoardState>,
    query: SummaryQuery,
    result: Result<SummaryResponse, RemoteError>,
) -> Result<SummaryView, AppError> {
    let mut inner = board.lock().await;
    inner.summary_loads_in_flight = inner.summary_loads_in_flight.saturating_sub(1);

    let response = result.map_err(|e| {
        warn!("Batch summary failed for job={}: {e}", query.job_id);
        AppError::from(e)
    })?;
    let store = SummaryStore::from_response(query, response)?;

    info!(
        "Loaded {} summary record(s), generation {}",
        store.len(),
        store.generation()
    );
    inner.store = Some(store);
    inner.cache.clear();

    Ok(inner.view())
}

async fn store_detail(
    board: &Mutex<BoardState>,
    file_name: &str,
    generation: Uuid,
    fetched: Result<SkillDetail, AppError>,
) -> Result<ToggleOutcome, AppError> {
    let mut inner = board.lock().await;
    let current_generation = inner.store.as_ref().map(SummaryStore::generation);
    if current_generation != Some(generation) {
        warn!("Discarding details for {file_name}: summary was reloaded meanwhile");
        return Err(AppError::Conflict(format!(
            "The summary was reloaded while details for {file_name} were loading"
        )));
    }

    let BoardState { store, cache, .. } = &mut *inner;
    let store = store
        .as_mut()
        .ok_or_else(|| AppError::Internal(anyhow!("summary store vanished")))?;

    match fetched {
        Ok(detail) => {
            cache
                .peek(file_name, ExpansionEvent::FetchSucceeded)
                .map_err(|e| transition_conflict(file_name, e))?;
            // Merge before the state flips so Expanded always has its detail.
            if let Err(e) = store.merge_detail(file_name, &detail) {
                let _ = cache.apply(file_name, ExpansionEvent::FetchFailed);
                return Err(e);
            }
            cache
                .apply(file_name, ExpansionEvent::FetchSucceeded)
                .map_err(|e| transition_conflict(file_name, e))?;
            info!("Merged skill details for {file_name}");
            inner.outcome(file_name, true)
        }
        Err(e) => {
            warn!("Skill details for {file_name} failed: {e}");
            cache
                .apply(file_name, ExpansionEvent::FetchFailed)
                .map_err(|err| transition_conflict(file_name, err))?;
            Err(e)
        }
    }
}
