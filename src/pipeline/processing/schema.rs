use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::pipeline::ingestion::RawTable;
use crate::reference::{FORM_2024, FORM_2025};

/// Column-synonym table for one source-form version: per canonical field, the
/// source header names that may carry it, in match-priority order.
///
/// Mapping never fails. A field with no matching synonym in the raw header is
/// simply all-null for that source, and downstream stages tolerate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaMap {
    pub form_version: String,
    #[serde(default)]
    pub timestamp: Vec<String>,
    #[serde(default)]
    pub county: Vec<String>,
    #[serde(default)]
    pub name: Vec<String>,
    #[serde(default)]
    pub gender: Vec<String>,
    #[serde(default)]
    pub age: Vec<String>,
    #[serde(default)]
    pub phone: Vec<String>,
    #[serde(default)]
    pub id: Vec<String>,
}

/// One row after schema mapping: every canonical field present as raw text.
/// The fixed struct shape is the unified column order — concatenating rows
/// from different form versions cannot misalign fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedRecord {
    pub timestamp: Option<String>,
    pub county: Option<String>,
    pub name: Option<String>,
    pub gender: Option<String>,
    pub age: Option<String>,
    pub phone: Option<String>,
    pub id: Option<String>,
    pub form_version: String,
}

#[derive(Debug, Default)]
struct ColumnBindings {
    timestamp: Option<usize>,
    county: Option<usize>,
    name: Option<usize>,
    gender: Option<usize>,
    age: Option<usize>,
    phone: Option<usize>,
    id: Option<usize>,
}

impl SchemaMap {
    /// Map a raw table into canonical-field records. Pure transform; the raw
    /// table is untouched and row order is preserved.
    pub fn map_table(&self, table: &RawTable) -> Vec<MappedRecord> {
        let bindings = self.resolve(&table.columns);
        debug!(
            form_version = %self.form_version,
            columns = table.columns.len(),
            bound = bindings.bound_count(),
            rows = table.row_count(),
            "mapped raw header to canonical fields"
        );

        table
            .rows
            .iter()
            .map(|row| MappedRecord {
                timestamp: pick(row, bindings.timestamp),
                county: pick(row, bindings.county),
                name: pick(row, bindings.name),
                gender: pick(row, bindings.gender),
                age: pick(row, bindings.age),
                phone: pick(row, bindings.phone),
                id: pick(row, bindings.id),
                form_version: self.form_version.clone(),
            })
            .collect()
    }

    /// First synonym present in the header wins; matching trims surrounding
    /// whitespace on both sides and ignores case.
    fn resolve(&self, columns: &[String]) -> ColumnBindings {
        ColumnBindings {
            timestamp: find_column(columns, &self.timestamp),
            county: find_column(columns, &self.county),
            name: find_column(columns, &self.name),
            gender: find_column(columns, &self.gender),
            age: find_column(columns, &self.age),
            phone: find_column(columns, &self.phone),
            id: find_column(columns, &self.id),
        }
    }
}

impl ColumnBindings {
    fn bound_count(&self) -> usize {
        [
            self.timestamp,
            self.county,
            self.name,
            self.gender,
            self.age,
            self.phone,
            self.id,
        ]
        .iter()
        .filter(|b| b.is_some())
        .count()
    }
}

fn find_column(columns: &[String], synonyms: &[String]) -> Option<usize> {
    for synonym in synonyms {
        let wanted = synonym.trim().to_lowercase();
        if let Some(index) = columns
            .iter()
            .position(|column| column.trim().to_lowercase() == wanted)
        {
            return Some(index);
        }
    }
    None
}

fn pick(row: &[String], binding: Option<usize>) -> Option<String> {
    binding.and_then(|index| row.get(index)).cloned()
}

/// Concatenate mapped batches from several form versions, preserving each
/// batch's ingestion order. Fields a narrower schema never bound stay null.
pub fn merge(batches: Vec<Vec<MappedRecord>>) -> Vec<MappedRecord> {
    let mut merged = Vec::with_capacity(batches.iter().map(Vec::len).sum());
    for batch in batches {
        merged.extend(batch);
    }
    merged
}

/// The 2025 mobilization form. Header spellings are taken verbatim from the
/// export, including the double space in the age column and the missing space
/// before the parenthetical.
pub fn form_2025() -> SchemaMap {
    SchemaMap {
        form_version: FORM_2025.to_string(),
        timestamp: vec!["Timestamp".into()],
        county: vec!["County".into()],
        name: vec!["Name of the Participant".into(), "Name".into()],
        gender: vec!["Gender of the Participant".into(), "Gender".into()],
        age: vec![
            "Age  of the Participant".into(),
            "Age of the Participant".into(),
            "Age".into(),
        ],
        phone: vec![
            "Phone Number(verify before entry)".into(),
            "Phone Number".into(),
            "Phone".into(),
        ],
        id: vec![
            "Verified ID Number(Verify before entry)".into(),
            "ID Number".into(),
            "ID".into(),
        ],
    }
}

/// The legacy 2024 form used before the participant-detail headers were
/// reworded.
pub fn form_2024() -> SchemaMap {
    SchemaMap {
        form_version: FORM_2024.to_string(),
        timestamp: vec!["Timestamp".into(), "Date of Session".into(), "Date".into()],
        county: vec!["County".into(), "County of Residence".into()],
        name: vec!["Participant Name".into(), "Full Name".into(), "Name".into()],
        gender: vec!["Gender".into(), "Sex".into()],
        age: vec!["Age".into()],
        phone: vec!["Phone Number".into(), "Phone No".into(), "Mobile Number".into()],
        id: vec!["ID Number".into(), "National ID".into(), "ID No".into()],
    }
}

/// Registry of known schema maps, keyed by form version tag. Ships with the
/// built-in forms; extra maps load from JSON files in a registry directory.
pub struct SchemaRegistry {
    maps: HashMap<String, SchemaMap>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        let mut maps = HashMap::new();
        for map in [form_2024(), form_2025()] {
            maps.insert(map.form_version.clone(), map);
        }
        Self { maps }
    }

    pub fn register(&mut self, map: SchemaMap) {
        self.maps.insert(map.form_version.clone(), map);
    }

    pub fn get(&self, form_version: &str) -> Option<&SchemaMap> {
        self.maps.get(form_version)
    }

    pub fn require(&self, form_version: &str) -> Result<&SchemaMap> {
        self.maps
            .get(form_version)
            .ok_or_else(|| PipelineError::UnknownFormVersion(form_version.to_string()))
    }

    pub fn list_versions(&self) -> Vec<&str> {
        let mut versions: Vec<&str> = self.maps.keys().map(|k| k.as_str()).collect();
        versions.sort_unstable();
        versions
    }

    /// Load additional schema maps from `*.json` files in a directory.
    /// Returns how many maps were registered.
    pub fn load_from_directory<P: AsRef<Path>>(&mut self, dir: P) -> Result<usize> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Err(PipelineError::Config(format!(
                "schema registry directory does not exist: {}",
                dir.display()
            )));
        }

        let mut loaded = 0;
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                let content = fs::read_to_string(&path)?;
                let map: SchemaMap = serde_json::from_str(&content)?;
                debug!(form_version = %map.form_version, file = %path.display(), "registered schema map");
                self.register(map);
                loaded += 1;
            }
        }
        Ok(loaded)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}
