// Pipeline ingestion: raw table reading and the fetch-once source cache

pub mod cache;
pub mod raw_table;

pub use cache::SourceCache;
pub use raw_table::RawTable;
