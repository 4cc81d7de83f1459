//! Evaluation summary store: one summary result set, indexed by file name.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::batch::SummaryQuery;
use crate::models::summary::{EvaluationSummaryRecord, SkillDetail, SummaryResponse};

/// Records of one summary call. Replaced wholesale by the next call, only
/// ever mutated through [`SummaryStore::merge_detail`].
#[derive(Debug, Clone)]
pub struct SummaryStore {
    generation: Uuid,
    query: SummaryQuery,
    loaded_at: DateTime<Utc>,
    order: Vec<String>,
    records: HashMap<String, EvaluationSummaryRecord>,
    extra: Map<String, Value>,
}

impl SummaryStore {
    /// Builds a store from a summary payload. A payload that repeats a file
    /// name is rejected as a whole.
    pub fn from_response(query: SummaryQuery, response: SummaryResponse) -> Result<Self, AppError> {
        let mut order = Vec::with_capacity(response.results.len());
        let mut records = HashMap::with_capacity(response.results.len());

        for record in response.results {
            let file_name = record.file_name.clone();
            if records.insert(file_name.clone(), record).is_some() {
                return Err(AppError::PartialData(format!(
                    "Summary lists {file_name} more than once"
                )));
            }
            order.push(file_name);
        }

        Ok(Self {
            generation: Uuid::new_v4(),
            query,
            loaded_at: Utc::now(),
            order,
            records,
            extra: response.extra,
        })
    }

    /// Identity of this result set; changes on every successful load.
    pub fn generation(&self) -> Uuid {
        self.generation
    }

    pub fn query(&self) -> &SummaryQuery {
        &self.query
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.records.contains_key(file_name)
    }

    pub fn get(&self, file_name: &str) -> Option<&EvaluationSummaryRecord> {
        self.records.get(file_name)
    }

    /// Records in the order the evaluation service returned them.
    pub fn records(&self) -> impl Iterator<Item = &EvaluationSummaryRecord> + '_ {
        self.order.iter().filter_map(|name| self.records.get(name))
    }

    /// Writes detail fields into exactly one record.
    pub fn merge_detail(
        &mut self,
        file_name: &str,
        detail: &SkillDetail,
    ) -> Result<&EvaluationSummaryRecord, AppError> {
        let record = self
            .records
            .get_mut(file_name)
            .ok_or_else(|| AppError::NotFound(format!("No summary record for {file_name}")))?;
        record.merge_detail(detail);
        Ok(&*record)
    }
}
