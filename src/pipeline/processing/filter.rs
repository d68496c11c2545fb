use chrono::NaiveDate;
use std::collections::HashSet;

use crate::domain::CanonicalRecord;

/// Post-dedup record filter. Every dimension is optional: `None` leaves the
/// dimension unfiltered, while an explicitly empty set selects nothing.
/// Dimensions combine conjunctively.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    date_range: Option<(NaiveDate, NaiveDate)>,
    counties: Option<HashSet<String>>,
    genders: Option<HashSet<String>>,
    form_versions: Option<HashSet<String>>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep records whose submission date falls inside the range, both ends
    /// inclusive. Records without a parseable timestamp drop out of any
    /// date-filtered view.
    pub fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_range = Some((start, end));
        self
    }

    pub fn with_counties<I, S>(mut self, counties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.counties = Some(lowercase_set(counties));
        self
    }

    pub fn with_genders<I, S>(mut self, genders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.genders = Some(lowercase_set(genders));
        self
    }

    pub fn with_form_versions<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.form_versions = Some(lowercase_set(versions));
        self
    }

    /// Fill dimensions this filter leaves unset from a base filter, so
    /// caller selections layer over variant defaults.
    pub fn or_defaults(mut self, base: &RecordFilter) -> Self {
        if self.date_range.is_none() {
            self.date_range = base.date_range;
        }
        if self.counties.is_none() {
            self.counties = base.counties.clone();
        }
        if self.genders.is_none() {
            self.genders = base.genders.clone();
        }
        if self.form_versions.is_none() {
            self.form_versions = base.form_versions.clone();
        }
        self
    }

    pub fn is_unrestricted(&self) -> bool {
        self.date_range.is_none()
            && self.counties.is_none()
            && self.genders.is_none()
            && self.form_versions.is_none()
    }

    pub fn matches(&self, record: &CanonicalRecord) -> bool {
        if let Some((start, end)) = self.date_range {
            match record.day() {
                Some(day) if day >= start && day <= end => {}
                _ => return false,
            }
        }
        if let Some(counties) = &self.counties {
            match &record.county {
                Some(county) if counties.contains(&county.to_lowercase()) => {}
                _ => return false,
            }
        }
        if let Some(genders) = &self.genders {
            match &record.gender {
                Some(gender) if genders.contains(&gender.trim().to_lowercase()) => {}
                _ => return false,
            }
        }
        if let Some(versions) = &self.form_versions {
            if !versions.contains(&record.form_version.to_lowercase()) {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, records: Vec<CanonicalRecord>) -> Vec<CanonicalRecord> {
        if self.is_unrestricted() {
            return records;
        }
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

fn lowercase_set<I, S>(values: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|v| v.as_ref().trim().to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{FORM_2024, FORM_2025};

    fn record(county: &str, gender: &str, day: Option<(i32, u32, u32)>) -> CanonicalRecord {
        CanonicalRecord {
            timestamp: day.and_then(|(y, m, d)| {
                NaiveDate::from_ymd_opt(y, m, d).and_then(|date| date.and_hms_opt(10, 0, 0))
            }),
            county: Some(county.to_string()),
            name: Some("Test Participant".to_string()),
            gender: Some(gender.to_string()),
            age: Some(25),
            phone: None,
            id: None,
            form_version: FORM_2025.to_string(),
        }
    }

    #[test]
    fn unrestricted_filter_passes_everything() {
        let records = vec![
            record("Nairobi", "Female", Some((2025, 4, 1))),
            record("Kisumu", "Male", None),
        ];
        let filter = RecordFilter::new();
        assert!(filter.is_unrestricted());
        assert_eq!(filter.apply(records).len(), 2);
    }

    #[test]
    fn date_range_is_inclusive_on_both_ends() {
        let records = vec![
            record("Nairobi", "Female", Some((2025, 3, 31))),
            record("Nairobi", "Female", Some((2025, 4, 1))),
            record("Nairobi", "Female", Some((2025, 4, 15))),
            record("Nairobi", "Female", Some((2025, 4, 30))),
            record("Nairobi", "Female", Some((2025, 5, 1))),
        ];
        let filter = RecordFilter::new().with_date_range(
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 4, 30).unwrap(),
        );
        let kept = filter.apply(records);
        assert_eq!(kept.len(), 3);
    }

    #[test]
    fn date_filter_drops_records_without_a_timestamp() {
        let records = vec![
            record("Nairobi", "Female", Some((2025, 4, 10))),
            record("Nairobi", "Female", None),
        ];
        let filter = RecordFilter::new().with_date_range(
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 4, 30).unwrap(),
        );
        assert_eq!(filter.apply(records).len(), 1);
    }

    #[test]
    fn county_matching_ignores_case() {
        let records = vec![
            record("Nairobi", "Female", None),
            record("Kisumu", "Female", None),
        ];
        let filter = RecordFilter::new().with_counties(["NAIROBI"]);
        let kept = filter.apply(records);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].county.as_deref(), Some("Nairobi"));
    }

    #[test]
    fn explicitly_empty_selection_yields_nothing() {
        let records = vec![
            record("Nairobi", "Female", None),
            record("Kisumu", "Male", None),
        ];
        let filter = RecordFilter::new().with_counties(Vec::<String>::new());
        assert!(!filter.is_unrestricted());
        assert!(filter.apply(records).is_empty());
    }

    #[test]
    fn dimensions_combine_conjunctively() {
        let records = vec![
            record("Nairobi", "Female", Some((2025, 4, 10))),
            record("Nairobi", "Male", Some((2025, 4, 10))),
            record("Kisumu", "Female", Some((2025, 4, 10))),
            record("Nairobi", "Female", Some((2025, 6, 10))),
        ];
        let filter = RecordFilter::new()
            .with_counties(["nairobi"])
            .with_genders(["female"])
            .with_date_range(
                NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 4, 30).unwrap(),
            );
        assert_eq!(filter.apply(records).len(), 1);
    }

    #[test]
    fn form_version_filter_selects_by_tag() {
        let mut legacy = record("Nairobi", "Female", None);
        legacy.form_version = FORM_2024.to_string();
        let records = vec![record("Nairobi", "Female", None), legacy];
        let filter = RecordFilter::new().with_form_versions([FORM_2024]);
        let kept = filter.apply(records);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].form_version, FORM_2024);
    }

    #[test]
    fn caller_dimensions_layer_over_defaults() {
        let defaults = RecordFilter::new().with_genders(["female"]);
        let caller = RecordFilter::new().with_counties(["nairobi"]);
        let layered = caller.or_defaults(&defaults);

        let records = vec![
            record("Nairobi", "Female", None),
            record("Nairobi", "Male", None),
            record("Kisumu", "Female", None),
        ];
        assert_eq!(layered.apply(records).len(), 1);

        // An explicit caller selection wins over the default for that dimension.
        let override_gender = RecordFilter::new()
            .with_genders(["male"])
            .or_defaults(&RecordFilter::new().with_genders(["female"]));
        let records = vec![record("Nairobi", "Male", None)];
        assert_eq!(override_gender.apply(records).len(), 1);
    }

    #[test]
    fn filtering_is_idempotent() {
        let records = vec![
            record("Nairobi", "Female", Some((2025, 4, 10))),
            record("Kisumu", "Male", Some((2025, 5, 2))),
            record("Embu", "Female", None),
        ];
        let filter = RecordFilter::new()
            .with_counties(["nairobi", "embu"])
            .with_genders(["female"]);
        let once = filter.apply(records);
        let twice = filter.apply(once.clone());
        assert_eq!(once, twice);
    }
}
