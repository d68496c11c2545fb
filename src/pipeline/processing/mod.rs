// Pipeline processing: schema mapping, cleaning, dedup, filtering, aggregation

pub mod aggregate;
pub mod clean;
pub mod dedup;
pub mod filter;
pub mod schema;

// Re-export key types and functions
pub use aggregate::{
    daily_trend, monthly_trend, quadrant_counts, youth_by_county, CountySubmissions,
    CountyYouthRow, CoverageReport, DailyCount, MonthlyCount, QuadrantCount, YouthSummary,
};
pub use clean::clean_records;
pub use dedup::{dedup, DedupKey, KeyField};
pub use filter::RecordFilter;
pub use schema::{MappedRecord, SchemaMap, SchemaRegistry};
