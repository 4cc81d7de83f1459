// File Collection Manager: résumés accumulated for the next batch.

pub mod collection;
pub mod handlers;
pub mod upload;
