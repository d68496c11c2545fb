use csv::Writer;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::CanonicalRecord;
use crate::error::Result;
use crate::pipeline::processing::aggregate::{
    CountySubmissions, CountyYouthRow, CoverageReport, DailyCount, MonthlyCount, QuadrantCount,
    YouthSummary,
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Writes the report views as UTF-8 CSV files (header row, one row per
/// record) into a single output directory. Null fields become empty cells.
pub struct CsvExporter {
    output_dir: PathBuf,
}

impl CsvExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn target(&self, filename: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        Ok(self.output_dir.join(filename))
    }

    /// One row per cleaned canonical record.
    pub fn write_records(&self, records: &[CanonicalRecord]) -> Result<PathBuf> {
        let path = self.target("cleaned_records.csv")?;
        let mut writer = Writer::from_path(&path)?;
        writer.write_record([
            "Timestamp",
            "County",
            "Name",
            "Gender",
            "Age",
            "Phone",
            "ID",
            "Form Version",
        ])?;
        for record in records {
            writer.write_record([
                record
                    .timestamp
                    .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
                    .unwrap_or_default(),
                record.county.clone().unwrap_or_default(),
                record.name.clone().unwrap_or_default(),
                record.gender.clone().unwrap_or_default(),
                record.age.map(|a| a.to_string()).unwrap_or_default(),
                record.phone.clone().unwrap_or_default(),
                record.id.clone().unwrap_or_default(),
                record.form_version.clone(),
            ])?;
        }
        writer.flush()?;
        Ok(path)
    }

    /// All 47 reference counties with zero-filled counts, then any
    /// out-of-reference values.
    pub fn write_county_submissions(&self, submissions: &CountySubmissions) -> Result<PathBuf> {
        let path = self.target("county_submissions.csv")?;
        let mut writer = Writer::from_path(&path)?;
        writer.write_record(["County", "Submissions"])?;
        for entry in submissions.counts.iter().chain(submissions.unmatched.iter()) {
            writer.write_record([entry.county.clone(), entry.count.to_string()])?;
        }
        writer.flush()?;
        Ok(path)
    }

    pub fn write_coverage(&self, coverage: &CoverageReport) -> Result<PathBuf> {
        let path = self.target("county_coverage.csv")?;
        let mut writer = Writer::from_path(&path)?;
        writer.write_record(["County", "Status"])?;
        for county in &coverage.covered {
            writer.write_record([county.as_str(), "Covered"])?;
        }
        for county in &coverage.missing {
            writer.write_record([county.as_str(), "No Submission"])?;
        }
        writer.flush()?;
        Ok(path)
    }

    pub fn write_youth_by_county(&self, rows: &[CountyYouthRow]) -> Result<PathBuf> {
        let path = self.target("youth_by_county.csv")?;
        let mut writer = Writer::from_path(&path)?;
        writer.write_record([
            "County",
            "Total",
            "Youth",
            "Female Youth",
            "% Youth",
            "% Female Youth",
        ])?;
        for row in rows {
            writer.write_record([
                row.county.clone(),
                row.total.to_string(),
                row.youth.to_string(),
                row.female_youth.to_string(),
                format!("{:.1}", row.youth_pct),
                format!("{:.1}", row.female_youth_pct),
            ])?;
        }
        writer.flush()?;
        Ok(path)
    }

    pub fn write_youth_summary(&self, summary: &YouthSummary) -> Result<PathBuf> {
        let path = self.target("youth_summary.csv")?;
        let mut writer = Writer::from_path(&path)?;
        writer.write_record(["Total", "Youth", "Female Youth", "% Youth", "% Female Youth"])?;
        writer.write_record([
            summary.total.to_string(),
            summary.youth.to_string(),
            summary.female_youth.to_string(),
            format!("{:.1}", summary.youth_pct),
            format!("{:.1}", summary.female_youth_pct),
        ])?;
        writer.flush()?;
        Ok(path)
    }

    pub fn write_quadrants(&self, counts: &[QuadrantCount]) -> Result<PathBuf> {
        let path = self.target("age_gender_quadrants.csv")?;
        let mut writer = Writer::from_path(&path)?;
        writer.write_record(["Bucket", "Count"])?;
        for entry in counts {
            writer.write_record([entry.bucket.label().to_string(), entry.count.to_string()])?;
        }
        writer.flush()?;
        Ok(path)
    }

    pub fn write_daily_trend(&self, series: &[DailyCount]) -> Result<PathBuf> {
        let path = self.target("daily_trend.csv")?;
        let mut writer = Writer::from_path(&path)?;
        writer.write_record(["Date", "Submissions"])?;
        for point in series {
            writer.write_record([point.date.format("%Y-%m-%d").to_string(), point.count.to_string()])?;
        }
        writer.flush()?;
        Ok(path)
    }

    pub fn write_monthly_trend(&self, series: &[MonthlyCount]) -> Result<PathBuf> {
        let path = self.target("monthly_trend.csv")?;
        let mut writer = Writer::from_path(&path)?;
        writer.write_record(["Month", "Submissions"])?;
        for point in series {
            writer.write_record([point.month.clone(), point.count.to_string()])?;
        }
        writer.flush()?;
        Ok(path)
    }
}
