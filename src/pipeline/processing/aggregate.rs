use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::{AgeGenderBucket, CanonicalRecord};
use crate::reference::{canonical_county, REFERENCE_COUNTIES};

/// Submission count for a single county.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountyCount {
    pub county: String,
    pub count: u64,
}

/// Per-county submission counts reindexed against the full reference list:
/// every reference county appears exactly once, zero when absent. County
/// values that match no reference name are tallied separately instead of
/// silently vanishing in the reindex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountySubmissions {
    pub counts: Vec<CountyCount>,
    pub unmatched: Vec<CountyCount>,
}

impl CountySubmissions {
    pub fn from_records(records: &[CanonicalRecord]) -> Self {
        let mut reference: BTreeMap<&'static str, u64> = BTreeMap::new();
        let mut unmatched: BTreeMap<String, u64> = BTreeMap::new();
        for record in records {
            let Some(county) = &record.county else { continue };
            match canonical_county(county) {
                Some(name) => *reference.entry(name).or_insert(0) += 1,
                None => *unmatched.entry(county.clone()).or_insert(0) += 1,
            }
        }
        let counts = REFERENCE_COUNTIES
            .iter()
            .map(|name| CountyCount {
                county: (*name).to_string(),
                count: reference.get(name).copied().unwrap_or(0),
            })
            .collect();
        let unmatched = unmatched
            .into_iter()
            .map(|(county, count)| CountyCount { county, count })
            .collect();
        Self { counts, unmatched }
    }

    /// Reference counties sorted for display: highest count first, ties in
    /// reference-list order.
    pub fn ranked(&self) -> Vec<CountyCount> {
        let mut ranked = self.counts.clone();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|c| c.count).sum::<u64>()
            + self.unmatched.iter().map(|c| c.count).sum::<u64>()
    }
}

/// Which reference counties have at least one submission, and which have
/// none. Both lists keep the reference-list order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageReport {
    pub covered: Vec<String>,
    pub missing: Vec<String>,
}

impl CoverageReport {
    pub fn from_records(records: &[CanonicalRecord]) -> Self {
        let submissions = CountySubmissions::from_records(records);
        let mut covered = Vec::new();
        let mut missing = Vec::new();
        for entry in &submissions.counts {
            if entry.count > 0 {
                covered.push(entry.county.clone());
            } else {
                missing.push(entry.county.clone());
            }
        }
        Self { covered, missing }
    }

    pub fn covered_count(&self) -> usize {
        self.covered.len()
    }

    pub fn missing_count(&self) -> usize {
        self.missing.len()
    }
}

/// Youth participation metrics over one record set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YouthSummary {
    pub total: u64,
    pub youth: u64,
    pub female_youth: u64,
    pub youth_pct: f64,
    pub female_youth_pct: f64,
}

impl YouthSummary {
    pub fn from_records(records: &[CanonicalRecord]) -> Self {
        let total = records.len() as u64;
        let youth = records.iter().filter(|r| r.is_youth()).count() as u64;
        let female_youth = records.iter().filter(|r| r.is_female_youth()).count() as u64;
        Self {
            total,
            youth,
            female_youth,
            youth_pct: percentage(youth, total),
            female_youth_pct: percentage(female_youth, total),
        }
    }
}

/// One row of the per-county youth table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountyYouthRow {
    pub county: String,
    pub total: u64,
    pub youth: u64,
    pub female_youth: u64,
    pub youth_pct: f64,
    pub female_youth_pct: f64,
}

/// Youth metrics grouped by county, for counties with at least one record.
/// Reference counties come first in reference-list order, anything else
/// follows alphabetically.
pub fn youth_by_county(records: &[CanonicalRecord]) -> Vec<CountyYouthRow> {
    let mut groups: BTreeMap<String, Vec<&CanonicalRecord>> = BTreeMap::new();
    for record in records {
        let Some(county) = &record.county else { continue };
        let name = canonical_county(county)
            .map(str::to_string)
            .unwrap_or_else(|| county.clone());
        groups.entry(name).or_default().push(record);
    }

    let mut rows = Vec::new();
    for name in REFERENCE_COUNTIES {
        if let Some(group) = groups.remove(name) {
            rows.push(youth_row(name.to_string(), &group));
        }
    }
    for (name, group) in groups {
        rows.push(youth_row(name, &group));
    }
    rows
}

fn youth_row(county: String, group: &[&CanonicalRecord]) -> CountyYouthRow {
    let total = group.len() as u64;
    let youth = group.iter().filter(|r| r.is_youth()).count() as u64;
    let female_youth = group.iter().filter(|r| r.is_female_youth()).count() as u64;
    CountyYouthRow {
        county,
        total,
        youth,
        female_youth,
        youth_pct: percentage(youth, total),
        female_youth_pct: percentage(female_youth, total),
    }
}

/// Count for one age-gender bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuadrantCount {
    pub bucket: AgeGenderBucket,
    pub count: u64,
}

/// Exhaustive age-gender partition: all five buckets, zero-filled, in the
/// fixed bucket order. Counts always sum to the record count.
pub fn quadrant_counts(records: &[CanonicalRecord]) -> Vec<QuadrantCount> {
    AgeGenderBucket::all()
        .iter()
        .map(|bucket| QuadrantCount {
            bucket: *bucket,
            count: records.iter().filter(|r| r.bucket() == *bucket).count() as u64,
        })
        .collect()
}

/// Daily submission count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u64,
}

/// Monthly submission count, keyed by `"YYYY-MM"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    pub month: String,
    pub count: u64,
}

/// Submissions per calendar day, ascending. Records without a timestamp are
/// excluded. With `dense` set, days between the first and last submission
/// that saw nothing appear with a zero count instead of being absent.
pub fn daily_trend(records: &[CanonicalRecord], dense: bool) -> Vec<DailyCount> {
    let mut per_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for record in records {
        if let Some(day) = record.day() {
            *per_day.entry(day).or_insert(0) += 1;
        }
    }
    if dense {
        let (first, last) = match (per_day.keys().next(), per_day.keys().next_back()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Vec::new(),
        };
        let mut series = Vec::new();
        let mut day = first;
        while day <= last {
            series.push(DailyCount {
                date: day,
                count: per_day.get(&day).copied().unwrap_or(0),
            });
            day += Duration::days(1);
        }
        series
    } else {
        per_day
            .into_iter()
            .map(|(date, count)| DailyCount { date, count })
            .collect()
    }
}

/// Submissions per calendar month, ascending by month key. Dense mode fills
/// skipped months with zero, including across year boundaries.
pub fn monthly_trend(records: &[CanonicalRecord], dense: bool) -> Vec<MonthlyCount> {
    let mut per_month: BTreeMap<(i32, u32), u64> = BTreeMap::new();
    for record in records {
        if let Some(day) = record.day() {
            *per_month.entry((day.year(), day.month())).or_insert(0) += 1;
        }
    }
    if dense {
        let (first, last) = match (per_month.keys().next(), per_month.keys().next_back()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Vec::new(),
        };
        let mut series = Vec::new();
        let mut current = first;
        loop {
            series.push(MonthlyCount {
                month: month_key(current),
                count: per_month.get(&current).copied().unwrap_or(0),
            });
            if current == last {
                break;
            }
            current = next_month(current);
        }
        series
    } else {
        per_month
            .into_iter()
            .map(|(key, count)| MonthlyCount {
                month: month_key(key),
                count,
            })
            .collect()
    }
}

fn month_key((year, month): (i32, u32)) -> String {
    format!("{:04}-{:02}", year, month)
}

fn next_month((year, month): (i32, u32)) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}
