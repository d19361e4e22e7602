pub mod ingestion;
pub mod processing;

pub use ingestion::{IngestOptions, IngestionService};
pub use processing::{ProcessingService, RunSummary};
