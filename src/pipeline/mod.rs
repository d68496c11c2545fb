// Pipeline stages: ingestion/caching, processing, export

pub mod export;
pub mod ingestion;
pub mod processing;

// Re-export key types for convenience
pub use ingestion::{RawTable, SourceCache};
pub use processing::{DedupKey, KeyField, RecordFilter, SchemaRegistry};
