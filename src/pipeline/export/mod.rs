// Report export: CSV tables and the plain-text summary document

pub mod summary;
pub mod tables;

pub use summary::SummaryDocument;
pub use tables::CsvExporter;
