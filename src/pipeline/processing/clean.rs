use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::{CanonicalRecord, AGE_PLAUSIBLE_MAX, AGE_PLAUSIBLE_MIN};
use crate::pipeline::processing::schema::MappedRecord;

// Lengths accepted for extracted identifier digit runs
const PHONE_MIN_DIGITS: usize = 9;
const PHONE_MAX_DIGITS: usize = 12;
const ID_MIN_DIGITS: usize = 5;

static DIGIT_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

// Formats seen across sheet exports, tried in order. Datetime variants first,
// date-only fallbacks after. The US-style month-first form is what the form
// backend emits, so it outranks day-first.
const DATETIME_FORMATS: [&str; 5] = [
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y"];

/// Normalize and type-coerce mapped records. Field-level failures degrade to
/// null; cleaning never errors and never drops a row.
pub fn clean_records(mapped: Vec<MappedRecord>) -> Vec<CanonicalRecord> {
    mapped.into_iter().map(clean_record).collect()
}

pub fn clean_record(mapped: MappedRecord) -> CanonicalRecord {
    CanonicalRecord {
        timestamp: mapped.timestamp.as_deref().and_then(parse_timestamp),
        county: mapped.county.as_deref().and_then(clean_title_text),
        name: mapped.name.as_deref().and_then(clean_plain_text),
        gender: mapped.gender.as_deref().and_then(clean_title_text),
        age: mapped.age.as_deref().and_then(parse_age),
        phone: mapped
            .phone
            .as_deref()
            .and_then(|text| extract_digit_run(text, PHONE_MIN_DIGITS, Some(PHONE_MAX_DIGITS))),
        id: mapped
            .id
            .as_deref()
            .and_then(|text| extract_digit_run(text, ID_MIN_DIGITS, None)),
        form_version: mapped.form_version,
    }
}

/// Parse a raw timestamp value, trying each known export format in order.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, format) {
            return parsed.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Parse an age value. Tolerates the `24.0` float spelling spreadsheet
/// exports produce; values outside the plausibility bounds become null.
pub fn parse_age(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let value: f64 = trimmed.parse().ok()?;
    if value.fract() != 0.0 {
        return None;
    }
    let age = value as i64;
    if age < AGE_PLAUSIBLE_MIN as i64 || age > AGE_PLAUSIBLE_MAX as i64 {
        return None;
    }
    Some(age as u32)
}

/// Extract the first maximal digit run whose length fits the given bounds.
/// A longer run is not truncated to fit: thirteen glued digits are not a
/// phone number.
pub fn extract_digit_run(text: &str, min_len: usize, max_len: Option<usize>) -> Option<String> {
    DIGIT_RUNS
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|run| run.len() >= min_len && max_len.map_or(true, |max| run.len() <= max))
        .map(|run| run.to_string())
}

fn clean_plain_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn clean_title_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(title_case(trimmed))
    }
}

/// First letter of each whitespace-separated word upper-cased, the rest
/// lower-cased; internal runs of whitespace collapse to one space.
fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::FORM_2025;
    use chrono::NaiveDate;

    fn mapped(field: &str, value: &str) -> MappedRecord {
        let mut record = MappedRecord {
            timestamp: None,
            county: None,
            name: None,
            gender: None,
            age: None,
            phone: None,
            id: None,
            form_version: FORM_2025.to_string(),
        };
        let value = Some(value.to_string());
        match field {
            "timestamp" => record.timestamp = value,
            "county" => record.county = value,
            "name" => record.name = value,
            "gender" => record.gender = value,
            "age" => record.age = value,
            "phone" => record.phone = value,
            "id" => record.id = value,
            other => panic!("unknown field {other}"),
        }
        record
    }

    #[test]
    fn parses_form_backend_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2025, 4, 25)
            .unwrap()
            .and_hms_opt(14, 53, 22)
            .unwrap();
        assert_eq!(parse_timestamp("4/25/2025 14:53:22"), Some(expected));
        assert_eq!(parse_timestamp("2025-04-25 14:53:22"), Some(expected));
        assert_eq!(parse_timestamp("2025-04-25T14:53:22"), Some(expected));
    }

    #[test]
    fn parses_date_only_values_at_midnight() {
        let expected = NaiveDate::from_ymd_opt(2025, 4, 25)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2025-04-25"), Some(expected));
        assert_eq!(parse_timestamp("4/25/2025"), Some(expected));
    }

    #[test]
    fn day_first_dates_fall_through_when_month_is_impossible() {
        // 25 cannot be a month, so the day-first fallback picks this up
        let expected = NaiveDate::from_ymd_opt(2025, 4, 25)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(parse_timestamp("25/4/2025"), Some(expected));
    }

    #[test]
    fn unparseable_timestamps_become_null() {
        assert_eq!(parse_timestamp("sometime in April"), None);
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("  "), None);
    }

    #[test]
    fn parses_ages_including_float_spellings() {
        assert_eq!(parse_age("24"), Some(24));
        assert_eq!(parse_age(" 24 "), Some(24));
        assert_eq!(parse_age("24.0"), Some(24));
        assert_eq!(parse_age("0"), Some(0));
        assert_eq!(parse_age("120"), Some(120));
    }

    #[test]
    fn implausible_or_invalid_ages_become_null() {
        assert_eq!(parse_age("-3"), None);
        assert_eq!(parse_age("150"), None);
        assert_eq!(parse_age("24.5"), None);
        assert_eq!(parse_age("twenty"), None);
        assert_eq!(parse_age(""), None);
    }

    #[test]
    fn county_and_gender_are_trimmed_and_title_cased() {
        let record = clean_record(mapped("county", "  tana  river "));
        assert_eq!(record.county.as_deref(), Some("Tana River"));

        let record = clean_record(mapped("gender", "FEMALE  "));
        assert_eq!(record.gender.as_deref(), Some("Female"));

        let record = clean_record(mapped("county", "murang'a"));
        assert_eq!(record.county.as_deref(), Some("Murang'a"));
    }

    #[test]
    fn blank_text_fields_become_null() {
        assert!(clean_record(mapped("county", "   ")).county.is_none());
        assert!(clean_record(mapped("name", "")).name.is_none());
    }

    #[test]
    fn name_keeps_its_original_casing() {
        let record = clean_record(mapped("name", "  Amina WANJIRU "));
        assert_eq!(record.name.as_deref(), Some("Amina WANJIRU"));
    }

    #[test]
    fn phone_extraction_requires_a_contiguous_run() {
        assert_eq!(
            clean_record(mapped("phone", "0712345678")).phone.as_deref(),
            Some("0712345678")
        );
        assert_eq!(
            clean_record(mapped("phone", "call 254712345678 today"))
                .phone
                .as_deref(),
            Some("254712345678")
        );
        // Runs too short to qualify are skipped, not concatenated
        assert_eq!(
            clean_record(mapped("phone", "ext 072 / 0712345678"))
                .phone
                .as_deref(),
            Some("0712345678")
        );
        // Spaces break contiguity; no 9-12 digit run exists here
        assert!(clean_record(mapped("phone", "0712 345 678")).phone.is_none());
        // Thirteen glued digits are not truncated into a phone number
        assert!(clean_record(mapped("phone", "0712345678901")).phone.is_none());
    }

    #[test]
    fn phone_length_bounds_are_inclusive() {
        assert_eq!(
            clean_record(mapped("phone", "712345678")).phone.as_deref(),
            Some("712345678")
        );
        assert_eq!(
            clean_record(mapped("phone", "254712345678")).phone.as_deref(),
            Some("254712345678")
        );
        assert!(clean_record(mapped("phone", "71234567")).phone.is_none());
    }

    #[test]
    fn id_extraction_takes_first_run_of_five_or_more() {
        assert_eq!(
            clean_record(mapped("id", "ID: 12345678")).id.as_deref(),
            Some("12345678")
        );
        assert_eq!(
            clean_record(mapped("id", "ref 123 then 98765"))
                .id
                .as_deref(),
            Some("98765")
        );
        assert!(clean_record(mapped("id", "1234")).id.is_none());
        assert!(clean_record(mapped("id", "no digits")).id.is_none());
    }

    #[test]
    fn extracted_identifiers_keep_leading_zeros() {
        let record = clean_record(mapped("phone", "0712345678"));
        assert_eq!(record.phone.as_deref(), Some("0712345678"));
        let record = clean_record(mapped("id", "01234"));
        assert_eq!(record.id.as_deref(), Some("01234"));
    }

    #[test]
    fn cleaning_an_all_null_record_yields_an_all_null_record() {
        let record = clean_record(MappedRecord {
            timestamp: None,
            county: None,
            name: None,
            gender: None,
            age: None,
            phone: None,
            id: None,
            form_version: FORM_2025.to_string(),
        });
        assert!(record.timestamp.is_none());
        assert!(record.county.is_none());
        assert!(record.name.is_none());
        assert!(record.gender.is_none());
        assert!(record.age.is_none());
        assert!(record.phone.is_none());
        assert!(record.id.is_none());
        assert_eq!(record.form_version, FORM_2025);
    }
}
