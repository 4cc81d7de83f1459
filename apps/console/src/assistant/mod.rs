//! Session-scoped document Q&A: hybrid questions over uploaded documents and
//! the document list behind them. Stateless; the session service owns the data.
pub mod handlers;
