use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// Youth bracket bounds, inclusive on both ends
pub const YOUTH_MIN_AGE: u32 = 18;
pub const YOUTH_MAX_AGE: u32 = 35;

// Plausibility bounds applied when parsing ages; values outside become null
pub const AGE_PLAUSIBLE_MIN: u32 = 0;
pub const AGE_PLAUSIBLE_MAX: u32 = 120;

/// A cleaned, typed submission row. Field-level failures during cleaning
/// degrade to `None` instead of erroring, so every field except the form
/// version tag is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub timestamp: Option<NaiveDateTime>,
    pub county: Option<String>,
    pub name: Option<String>,
    pub gender: Option<String>,
    pub age: Option<u32>,
    pub phone: Option<String>,
    pub id: Option<String>,
    pub form_version: String,
}

impl CanonicalRecord {
    /// Records missing county or name are excluded from count-based
    /// aggregates; the raw row total still includes them.
    pub fn is_identified(&self) -> bool {
        self.county.is_some() && self.name.is_some()
    }

    pub fn gender_class(&self) -> Gender {
        Gender::classify(self.gender.as_deref())
    }

    pub fn is_youth(&self) -> bool {
        matches!(self.age, Some(age) if (YOUTH_MIN_AGE..=YOUTH_MAX_AGE).contains(&age))
    }

    pub fn is_female_youth(&self) -> bool {
        self.is_youth() && self.gender_class() == Gender::Female
    }

    pub fn bucket(&self) -> AgeGenderBucket {
        AgeGenderBucket::classify(self.age, self.gender_class())
    }

    /// Calendar day of the submission, when the timestamp parsed.
    pub fn day(&self) -> Option<NaiveDate> {
        self.timestamp.map(|ts| ts.date())
    }
}

/// Gender classification used by aggregates. Stored gender text keeps its
/// Title Case spelling; classification lower-cases before comparing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    pub fn classify(value: Option<&str>) -> Gender {
        match value.map(|v| v.trim().to_lowercase()) {
            Some(v) if v == "male" => Gender::Male,
            Some(v) if v == "female" => Gender::Female,
            _ => Gender::Unknown,
        }
    }
}

/// Exhaustive age-gender partition: every record lands in exactly one bucket.
/// `Unknown` catches unparseable ages and unrecognized gender values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeGenderBucket {
    YoungFemale,
    YoungMale,
    AboveFemale,
    AboveMale,
    Unknown,
}

impl AgeGenderBucket {
    pub fn classify(age: Option<u32>, gender: Gender) -> AgeGenderBucket {
        let age = match age {
            Some(age) => age,
            None => return AgeGenderBucket::Unknown,
        };
        let young = (YOUTH_MIN_AGE..=YOUTH_MAX_AGE).contains(&age);
        match gender {
            Gender::Female if young => AgeGenderBucket::YoungFemale,
            Gender::Female => AgeGenderBucket::AboveFemale,
            Gender::Male if young => AgeGenderBucket::YoungMale,
            Gender::Male => AgeGenderBucket::AboveMale,
            Gender::Unknown => AgeGenderBucket::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeGenderBucket::YoungFemale => "Young Female",
            AgeGenderBucket::YoungMale => "Young Male",
            AgeGenderBucket::AboveFemale => "Above-35 Female",
            AgeGenderBucket::AboveMale => "Above-35 Male",
            AgeGenderBucket::Unknown => "Unknown",
        }
    }

    pub fn all() -> [AgeGenderBucket; 5] {
        [
            AgeGenderBucket::YoungFemale,
            AgeGenderBucket::YoungMale,
            AgeGenderBucket::AboveFemale,
            AgeGenderBucket::AboveMale,
            AgeGenderBucket::Unknown,
        ]
    }
}

/// Where a raw table comes from: an uploaded/local file or a sheet export URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    File(PathBuf),
    Url(String),
}

impl SourceLocation {
    /// Cache key known before any fetch happens. File sources are keyed by
    /// content digest instead, which is only available after reading.
    pub fn url_key(&self) -> Option<&str> {
        match self {
            SourceLocation::Url(url) => Some(url.as_str()),
            SourceLocation::File(_) => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            SourceLocation::File(path) => format!("file:{}", path.display()),
            SourceLocation::Url(url) => url.clone(),
        }
    }
}
