use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::app::ports::SourceFetcher;
use crate::domain::{CanonicalRecord, SourceLocation};
use crate::error::{PipelineError, Result};
use crate::pipeline::export::{CsvExporter, SummaryDocument};
use crate::pipeline::ingestion::SourceCache;
use crate::pipeline::processing::aggregate::{
    daily_trend, monthly_trend, quadrant_counts, youth_by_county, CountySubmissions,
    CountyYouthRow, CoverageReport, DailyCount, MonthlyCount, QuadrantCount, YouthSummary,
};
use crate::pipeline::processing::{clean_records, dedup, schema, RecordFilter, SchemaRegistry};
use crate::variants::{AggregateKind, VariantConfig};

/// One raw source to ingest, tagged with the form version describing its
/// columns.
#[derive(Debug, Clone)]
pub struct SourceSpec {
    pub location: SourceLocation,
    pub form_version: String,
}

/// A report request: the resolved variant, the sources to ingest, and any
/// caller-side filter (layered over the variant's defaults).
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub variant: VariantConfig,
    pub sources: Vec<SourceSpec>,
    pub filter: RecordFilter,
}

/// Row counts at each pipeline stage of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowAccounting {
    /// Raw rows across all sources, before any cleaning.
    pub total_rows: usize,
    /// Cleaned rows with both county and participant name present.
    pub identified_rows: usize,
    /// Cleaned rows with a parseable timestamp.
    pub dated_rows: usize,
    /// Identified rows remaining after deduplication.
    pub deduped_rows: usize,
    /// Rows remaining after the filter, the record set all views are built on.
    pub filtered_rows: usize,
}

/// Everything one report run produced: the final record set, the views the
/// variant asked for, and run metadata.
#[derive(Debug, Clone)]
pub struct ReportBundle {
    pub run_id: Uuid,
    pub variant_id: String,
    pub variant_description: String,
    pub generated_at: DateTime<Utc>,
    /// Source descriptions this run ingested, in request order.
    pub sources: Vec<String>,
    pub accounting: RowAccounting,
    pub records: Vec<CanonicalRecord>,
    pub county_submissions: Option<CountySubmissions>,
    pub coverage: Option<CoverageReport>,
    pub youth_by_county: Option<Vec<CountyYouthRow>>,
    pub youth_summary: Option<YouthSummary>,
    pub quadrants: Option<Vec<QuadrantCount>>,
    pub daily_trend: Option<Vec<DailyCount>>,
    pub monthly_trend: Option<Vec<MonthlyCount>>,
}

impl ReportBundle {
    /// The plain-text summary for this run. Coverage and youth numbers are
    /// computed on demand when the variant did not request those views.
    pub fn summary_document(&self) -> SummaryDocument {
        let coverage = self
            .coverage
            .clone()
            .unwrap_or_else(|| CoverageReport::from_records(&self.records));
        let youth = self
            .youth_summary
            .clone()
            .unwrap_or_else(|| YouthSummary::from_records(&self.records));
        SummaryDocument::compose(
            format!("KNCCI Mobilization Summary - {}", self.variant_description),
            self.accounting.total_rows,
            self.accounting.identified_rows,
            self.accounting.deduped_rows,
            &coverage,
            &youth,
        )
    }
}

/// Use case for generating one report: fetch sources through the cache, map
/// and clean them, dedup and filter per the variant, then build its views.
pub struct ReportUseCase {
    cache: Arc<SourceCache>,
    fetcher: Arc<dyn SourceFetcher>,
    schemas: Arc<SchemaRegistry>,
}

impl ReportUseCase {
    pub fn new(
        cache: Arc<SourceCache>,
        fetcher: Arc<dyn SourceFetcher>,
        schemas: Arc<SchemaRegistry>,
    ) -> Self {
        Self {
            cache,
            fetcher,
            schemas,
        }
    }

    pub async fn generate(&self, request: &ReportRequest) -> Result<ReportBundle> {
        let run_id = Uuid::new_v4();
        let variant = &request.variant;
        info!(
            run_id = %run_id,
            variant = %variant.variant_id,
            sources = request.sources.len(),
            "starting report run"
        );

        if request.sources.is_empty() {
            return Err(PipelineError::Config(
                "a report run needs at least one source".to_string(),
            ));
        }

        let mut batches = Vec::new();
        let mut total_rows = 0;
        for spec in &request.sources {
            let map = self.schemas.require(&spec.form_version)?;
            let table = self
                .cache
                .get_or_fetch(&spec.location, self.fetcher.as_ref())
                .await?;
            total_rows += table.row_count();
            debug!(
                source = %spec.location.describe(),
                form_version = %spec.form_version,
                rows = table.row_count(),
                "source loaded"
            );
            batches.push(map.map_table(&table));
        }

        if total_rows == 0 {
            warn!(run_id = %run_id, "sources contain no rows");
            return Err(PipelineError::NoData);
        }

        let cleaned = clean_records(schema::merge(batches));
        let dated_rows = cleaned.iter().filter(|r| r.timestamp.is_some()).count();
        let identified: Vec<CanonicalRecord> =
            cleaned.into_iter().filter(|r| r.is_identified()).collect();
        let identified_rows = identified.len();

        let deduped = dedup(identified, &variant.dedup_key());
        let deduped_rows = deduped.len();

        let filter = request.filter.clone().or_defaults(&variant.base_filter());
        let records = filter.apply(deduped);
        let filtered_rows = records.len();

        let accounting = RowAccounting {
            total_rows,
            identified_rows,
            dated_rows,
            deduped_rows,
            filtered_rows,
        };
        info!(
            run_id = %run_id,
            total_rows,
            identified_rows,
            deduped_rows,
            filtered_rows,
            "pipeline stages complete"
        );

        let bundle = ReportBundle {
            run_id,
            variant_id: variant.variant_id.clone(),
            variant_description: variant.description.clone(),
            generated_at: Utc::now(),
            sources: request
                .sources
                .iter()
                .map(|spec| spec.location.describe())
                .collect(),
            accounting,
            county_submissions: variant
                .wants(AggregateKind::CountySubmissions)
                .then(|| CountySubmissions::from_records(&records)),
            coverage: variant
                .wants(AggregateKind::Coverage)
                .then(|| CoverageReport::from_records(&records)),
            youth_by_county: variant
                .wants(AggregateKind::YouthByCounty)
                .then(|| youth_by_county(&records)),
            youth_summary: variant
                .wants(AggregateKind::YouthSummary)
                .then(|| YouthSummary::from_records(&records)),
            quadrants: variant
                .wants(AggregateKind::Quadrants)
                .then(|| quadrant_counts(&records)),
            daily_trend: variant
                .wants(AggregateKind::DailyTrend)
                .then(|| daily_trend(&records, variant.dense_trends)),
            monthly_trend: variant
                .wants(AggregateKind::MonthlyTrend)
                .then(|| monthly_trend(&records, variant.dense_trends)),
            records,
        };
        Ok(bundle)
    }

    /// Write every view the bundle carries, plus the cleaned records and the
    /// text summary, into `output_dir`. Returns the written paths.
    pub fn export_bundle(&self, bundle: &ReportBundle, output_dir: &Path) -> Result<Vec<PathBuf>> {
        let exporter = CsvExporter::new(output_dir);
        let mut written = vec![exporter.write_records(&bundle.records)?];
        if let Some(view) = &bundle.county_submissions {
            written.push(exporter.write_county_submissions(view)?);
        }
        if let Some(view) = &bundle.coverage {
            written.push(exporter.write_coverage(view)?);
        }
        if let Some(view) = &bundle.youth_by_county {
            written.push(exporter.write_youth_by_county(view)?);
        }
        if let Some(view) = &bundle.youth_summary {
            written.push(exporter.write_youth_summary(view)?);
        }
        if let Some(view) = &bundle.quadrants {
            written.push(exporter.write_quadrants(view)?);
        }
        if let Some(view) = &bundle.daily_trend {
            written.push(exporter.write_daily_trend(view)?);
        }
        if let Some(view) = &bundle.monthly_trend {
            written.push(exporter.write_monthly_trend(view)?);
        }
        written.push(bundle.summary_document().write_to(output_dir)?);
        info!(
            run_id = %bundle.run_id,
            files = written.len(),
            dir = %output_dir.display(),
            "report artifacts written"
        );
        Ok(written)
    }
}
