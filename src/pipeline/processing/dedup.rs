use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::CanonicalRecord;

/// A canonical field usable in the composite dedup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyField {
    Id,
    Phone,
    County,
    Timestamp,
}

/// Composite deduplication key. Records sharing the combined value collapse
/// to the first occurrence in ingestion order; null fields compare equal to
/// null (the source's drop-duplicates semantics). An empty field list
/// disables deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupKey {
    pub fields: Vec<KeyField>,
}

impl DedupKey {
    pub fn new(fields: Vec<KeyField>) -> Self {
        Self { fields }
    }

    /// The participant-identity key most report variants use.
    pub fn id_phone() -> Self {
        Self::new(vec![KeyField::Id, KeyField::Phone])
    }

    /// The strict per-submission key used by trend variants.
    pub fn full() -> Self {
        Self::new(vec![
            KeyField::Id,
            KeyField::Phone,
            KeyField::County,
            KeyField::Timestamp,
        ])
    }

    fn key_of(&self, record: &CanonicalRecord) -> Vec<Option<String>> {
        self.fields
            .iter()
            .map(|field| match field {
                KeyField::Id => record.id.clone(),
                KeyField::Phone => record.phone.clone(),
                KeyField::County => record.county.as_ref().map(|c| c.to_lowercase()),
                KeyField::Timestamp => record
                    .timestamp
                    .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string()),
            })
            .collect()
    }
}

/// Keep only the first record per distinct key value, stable in the input
/// order. At-most-one-per-key: conflicting field values across duplicates are
/// not merged — the first record wins entirely.
pub fn dedup(records: Vec<CanonicalRecord>, key: &DedupKey) -> Vec<CanonicalRecord> {
    if key.fields.is_empty() {
        return records;
    }
    let mut seen: HashSet<Vec<Option<String>>> = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(key.key_of(record)))
        .collect()
}
