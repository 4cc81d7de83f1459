// Batch Submission Controller: one outbound ingestion request per submit,
// at most one in flight.

pub mod controller;
pub mod handlers;
