// Application layer: ports and the report use case

pub mod ports;
pub mod report_use_case;

pub use report_use_case::{ReportBundle, ReportRequest, ReportUseCase, RowAccounting, SourceSpec};
