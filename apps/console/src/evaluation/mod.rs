// Batch evaluation: the summary store, the per-file detail expansion cache,
// and the board that drives both against the evaluation service.

pub mod board;
pub mod detail_cache;
pub mod handlers;
pub mod summary_store;
