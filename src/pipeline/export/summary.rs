use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::pipeline::processing::aggregate::{CoverageReport, YouthSummary};

/// Plain-text report document: a heading plus a summary paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryDocument {
    pub heading: String,
    pub paragraph: String,
}

impl SummaryDocument {
    /// Assemble the summary paragraph from the headline numbers of a report
    /// run. `total_rows` counts every raw row, `identified_rows` those with a
    /// county and participant name, `deduped_rows` what remains after
    /// deduplication.
    pub fn compose(
        heading: impl Into<String>,
        total_rows: usize,
        identified_rows: usize,
        deduped_rows: usize,
        coverage: &CoverageReport,
        youth: &YouthSummary,
    ) -> Self {
        let mut lines = Vec::new();
        lines.push(format!(
            "Total Rows in Dataset: {} | Rows with valid County & Name: {}",
            total_rows, identified_rows
        ));
        lines.push(format!(
            "Unique submissions after deduplication: {}",
            deduped_rows
        ));
        lines.push(format!(
            "Counties covered: {} of {}. No submissions from: {}.",
            coverage.covered_count(),
            coverage.covered_count() + coverage.missing_count(),
            if coverage.missing.is_empty() {
                "none".to_string()
            } else {
                coverage.missing.join(", ")
            }
        ));
        lines.push(format!(
            "Youth (18-35): {} of {} ({:.1}%). Female youth: {} ({:.1}%).",
            youth.youth, youth.total, youth.youth_pct, youth.female_youth, youth.female_youth_pct
        ));
        Self {
            heading: heading.into(),
            paragraph: lines.join("\n"),
        }
    }

    pub fn render(&self) -> String {
        format!("{}\n\n{}\n", self.heading, self.paragraph)
    }

    /// Write the rendered document as `summary.txt` in the output directory.
    pub fn write_to(&self, output_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(output_dir)?;
        let path = output_dir.join("summary.txt");
        fs::write(&path, self.render())?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CanonicalRecord;
    use crate::reference::{FORM_2025, REFERENCE_COUNTIES};
    use tempfile::tempdir;

    fn covered_except_lamu() -> CoverageReport {
        let records: Vec<CanonicalRecord> = REFERENCE_COUNTIES
            .iter()
            .filter(|name| **name != "Lamu")
            .map(|name| CanonicalRecord {
                timestamp: None,
                county: Some(name.to_string()),
                name: Some("Participant".to_string()),
                gender: Some("Female".to_string()),
                age: Some(20),
                phone: None,
                id: None,
                form_version: FORM_2025.to_string(),
            })
            .collect();
        CoverageReport::from_records(&records)
    }

    #[test]
    fn summary_carries_the_row_accounting_line() {
        let coverage = covered_except_lamu();
        let youth = YouthSummary {
            total: 10,
            youth: 6,
            female_youth: 6,
            youth_pct: 60.0,
            female_youth_pct: 60.0,
        };
        let document =
            SummaryDocument::compose("KNCCI Mobilization Summary", 120, 100, 90, &coverage, &youth);
        let rendered = document.render();
        assert!(rendered.starts_with("KNCCI Mobilization Summary\n\n"));
        assert!(rendered.contains("Total Rows in Dataset: 120 | Rows with valid County & Name: 100"));
        assert!(rendered.contains("Counties covered: 46 of 47. No submissions from: Lamu."));
        assert!(rendered.contains("Youth (18-35): 6 of 10 (60.0%). Female youth: 6 (60.0%)."));
    }

    #[test]
    fn summary_writes_a_text_file() {
        let coverage = covered_except_lamu();
        let youth = YouthSummary {
            total: 0,
            youth: 0,
            female_youth: 0,
            youth_pct: 0.0,
            female_youth_pct: 0.0,
        };
        let document = SummaryDocument::compose("Report", 0, 0, 0, &coverage, &youth);
        let dir = tempdir().unwrap();
        let path = document.write_to(dir.path()).unwrap();
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("summary.txt"));
        assert_eq!(fs::read_to_string(path).unwrap(), document.render());
    }
}
