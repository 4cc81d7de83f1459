pub mod assistant;
pub mod batch;
pub mod files;
pub mod resume;
pub mod summary;
