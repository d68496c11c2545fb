use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use mobilization_reports::app::{ReportRequest, ReportUseCase, SourceSpec};
use mobilization_reports::config::AppConfig;
use mobilization_reports::domain::SourceLocation;
use mobilization_reports::error::PipelineError;
use mobilization_reports::infra::{DefaultSourceFetcher, SystemClock};
use mobilization_reports::logging;
use mobilization_reports::pipeline::ingestion::SourceCache;
use mobilization_reports::pipeline::processing::{RecordFilter, SchemaRegistry};
use mobilization_reports::reference::REFERENCE_COUNTIES;
use mobilization_reports::variants::VariantRegistry;

#[derive(Parser)]
#[command(name = "mobilization_reports")]
#[command(about = "County mobilization record normalization and reporting pipeline")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a report from a CSV file or a sheet-export URL
    Report {
        /// Local CSV file to ingest
        #[arg(long)]
        file: Option<PathBuf>,
        /// Sheet CSV-export URL (defaults to the configured sheet)
        #[arg(long)]
        url: Option<String>,
        /// Report variant id (see `variants`)
        #[arg(long)]
        variant: Option<String>,
        /// Form version describing the source columns
        #[arg(long)]
        form: Option<String>,
        /// Inclusive start date, YYYY-MM-DD
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Inclusive end date, YYYY-MM-DD
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Counties to include (comma-separated)
        #[arg(long)]
        counties: Option<String>,
        /// Genders to include (comma-separated)
        #[arg(long)]
        genders: Option<String>,
        /// Output directory for report artifacts
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List the available report variants
    Variants,
    /// List the reference counties
    Counties,
}

fn build_schema_registry(config: &AppConfig) -> anyhow::Result<SchemaRegistry> {
    let mut schemas = SchemaRegistry::new();
    if let Some(dir) = &config.registry.schemas_dir {
        schemas.load_from_directory(Path::new(dir))?;
    }
    Ok(schemas)
}

fn build_variant_registry(config: &AppConfig) -> anyhow::Result<VariantRegistry> {
    let mut variants = VariantRegistry::new();
    if let Some(dir) = &config.registry.variants_dir {
        variants.load_from_directory(Path::new(dir))?;
    }
    Ok(variants)
}

fn build_filter(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    counties: Option<String>,
    genders: Option<String>,
) -> RecordFilter {
    let mut filter = RecordFilter::new();
    match (from, to) {
        (Some(start), Some(end)) => filter = filter.with_date_range(start, end),
        (Some(start), None) => filter = filter.with_date_range(start, NaiveDate::MAX),
        (None, Some(end)) => filter = filter.with_date_range(NaiveDate::MIN, end),
        (None, None) => {}
    }
    if let Some(counties) = counties {
        filter = filter.with_counties(counties.split(','));
    }
    if let Some(genders) = genders {
        filter = filter.with_genders(genders.split(','));
    }
    filter
}

async fn run_report(
    config: &AppConfig,
    file: Option<PathBuf>,
    url: Option<String>,
    variant: Option<String>,
    form: Option<String>,
    filter: RecordFilter,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let variants = build_variant_registry(config)?;
    let variant_id = variant.unwrap_or_else(|| config.output.default_variant.clone());
    let variant = variants.require(&variant_id)?.clone();

    let location = if let Some(path) = file {
        SourceLocation::File(path)
    } else if let Some(url) = url {
        SourceLocation::Url(url)
    } else if let Some(url) = config.sheet_url() {
        SourceLocation::Url(url)
    } else {
        return Err(PipelineError::Config(
            "no source given: pass --file or --url, or configure a sheet URL".to_string(),
        )
        .into());
    };
    let form_version = form.unwrap_or_else(|| config.source.form_version.clone());

    let cache = Arc::new(SourceCache::new(
        config.cache.ttl_minutes,
        Arc::new(SystemClock),
    ));
    let use_case = ReportUseCase::new(
        cache,
        Arc::new(DefaultSourceFetcher::new()),
        Arc::new(build_schema_registry(config)?),
    );

    let request = ReportRequest {
        variant,
        sources: vec![SourceSpec {
            location,
            form_version,
        }],
        filter,
    };

    println!("🔄 Generating {} report...", variant_id);
    let bundle = use_case.generate(&request).await?;

    let base = out.unwrap_or_else(|| PathBuf::from(&config.output.directory));
    let run_dir = base.join(format!(
        "{}_{}",
        bundle.variant_id,
        bundle.generated_at.format("%Y%m%d_%H%M%S")
    ));
    let written = use_case.export_bundle(&bundle, &run_dir)?;

    println!("\n📊 Report results for {}:", bundle.variant_id);
    println!("   Run id: {}", bundle.run_id);
    println!("   Source: {}", bundle.sources.join(", "));
    println!("   Total rows: {}", bundle.accounting.total_rows);
    println!(
        "   Rows with valid county & name: {}",
        bundle.accounting.identified_rows
    );
    println!("   After deduplication: {}", bundle.accounting.deduped_rows);
    println!("   In report: {}", bundle.accounting.filtered_rows);
    if let Some(coverage) = &bundle.coverage {
        println!(
            "   Counties covered: {} of {}",
            coverage.covered_count(),
            coverage.covered_count() + coverage.missing_count()
        );
    }
    if let Some(submissions) = &bundle.county_submissions {
        let busiest: Vec<String> = submissions
            .ranked()
            .into_iter()
            .filter(|entry| entry.count > 0)
            .take(5)
            .map(|entry| format!("{} ({})", entry.county, entry.count))
            .collect();
        if !busiest.is_empty() {
            println!("   Busiest counties: {}", busiest.join(", "));
        }
    }
    println!("   Artifacts in {}:", run_dir.display());
    for path in &written {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            println!("   - {}", name);
        }
    }
    println!("\n✅ Report generation completed");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load_or_default();

    match cli.command {
        Commands::Report {
            file,
            url,
            variant,
            form,
            from,
            to,
            counties,
            genders,
            out,
        } => {
            let filter = build_filter(from, to, counties, genders);
            run_report(&config, file, url, variant, form, filter, out).await?;
        }
        Commands::Variants => {
            let variants = build_variant_registry(&config)?;
            println!("📋 Available report variants:");
            for id in variants.list_ids() {
                if let Some(variant) = variants.get(id) {
                    println!("   {} - {}", id, variant.description);
                }
            }
        }
        Commands::Counties => {
            info!(count = REFERENCE_COUNTIES.len(), "listing reference counties");
            println!("🗺️  Reference counties:");
            for (index, county) in REFERENCE_COUNTIES.iter().enumerate() {
                println!("   {:>2}. {}", index + 1, county);
            }
        }
    }

    Ok(())
}
