use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use crate::pipeline::processing::{DedupKey, KeyField, RecordFilter};
use crate::reference::{FORM_2024, FORM_2025};

/// A reporting view a variant can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateKind {
    CountySubmissions,
    Coverage,
    YouthByCounty,
    YouthSummary,
    Quadrants,
    DailyTrend,
    MonthlyTrend,
}

/// One report variant: a thin configuration over the shared pipeline.
/// Replaces what used to be a near-duplicate dashboard script per report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantConfig {
    pub variant_id: String,
    pub description: String,
    /// Form versions this variant accepts; the first is the default for
    /// sources that do not name one.
    pub form_versions: Vec<String>,
    pub dedup_key: Vec<KeyField>,
    pub aggregates: Vec<AggregateKind>,
    /// Gap-fill trend series with zero-count days/months.
    #[serde(default = "default_dense_trends")]
    pub dense_trends: bool,
    /// County filter applied when the caller does not supply one.
    #[serde(default)]
    pub default_counties: Option<Vec<String>>,
    /// Gender filter applied when the caller does not supply one.
    #[serde(default)]
    pub default_genders: Option<Vec<String>>,
}

fn default_dense_trends() -> bool {
    true
}

impl VariantConfig {
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey::new(self.dedup_key.clone())
    }

    pub fn wants(&self, aggregate: AggregateKind) -> bool {
        self.aggregates.contains(&aggregate)
    }

    pub fn default_form_version(&self) -> Option<&str> {
        self.form_versions.first().map(String::as_str)
    }

    /// Filter pre-populated with the variant's defaults; caller-supplied
    /// dimensions are layered on top by the use case.
    pub fn base_filter(&self) -> RecordFilter {
        let mut filter = RecordFilter::new();
        if let Some(counties) = &self.default_counties {
            filter = filter.with_counties(counties);
        }
        if let Some(genders) = &self.default_genders {
            filter = filter.with_genders(genders);
        }
        filter
    }
}

/// Registry of report variants: compiled-in defaults plus JSON definitions
/// loaded from a registry directory.
pub struct VariantRegistry {
    variants: HashMap<String, VariantConfig>,
}

impl VariantRegistry {
    /// Create a registry with the predefined report variants.
    pub fn new() -> Self {
        let mut variants = HashMap::new();
        for variant in builtin_variants() {
            variants.insert(variant.variant_id.clone(), variant);
        }
        Self { variants }
    }

    pub fn register(&mut self, variant: VariantConfig) {
        self.variants.insert(variant.variant_id.clone(), variant);
    }

    pub fn get(&self, variant_id: &str) -> Option<&VariantConfig> {
        self.variants.get(variant_id)
    }

    pub fn require(&self, variant_id: &str) -> Result<&VariantConfig> {
        self.variants
            .get(variant_id)
            .ok_or_else(|| PipelineError::UnknownVariant(variant_id.to_string()))
    }

    /// All registered variant ids, sorted.
    pub fn list_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.variants.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Load variant definitions from `*.json` files in a directory,
    /// overriding built-ins with the same id. Returns how many loaded.
    pub fn load_from_directory(&mut self, dir: &Path) -> Result<usize> {
        if !dir.is_dir() {
            return Err(PipelineError::Config(format!(
                "variant registry directory not found: {}",
                dir.display()
            )));
        }
        let mut loaded = 0;
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = fs::read_to_string(&path)?;
            let variant: VariantConfig = serde_json::from_str(&content)?;
            debug!(
                variant_id = %variant.variant_id,
                file = %path.display(),
                "loaded report variant"
            );
            self.register(variant);
            loaded += 1;
        }
        info!(count = loaded, dir = %dir.display(), "variant registry loaded");
        Ok(loaded)
    }
}

impl Default for VariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn builtin_variants() -> Vec<VariantConfig> {
    vec![
        VariantConfig {
            variant_id: "county_summary".to_string(),
            description: "Submissions by County with Youth Metrics".to_string(),
            form_versions: vec![FORM_2025.to_string(), FORM_2024.to_string()],
            dedup_key: vec![KeyField::Id, KeyField::Phone],
            aggregates: vec![
                AggregateKind::CountySubmissions,
                AggregateKind::Coverage,
                AggregateKind::YouthByCounty,
                AggregateKind::YouthSummary,
            ],
            dense_trends: true,
            default_counties: None,
            default_genders: None,
        },
        VariantConfig {
            variant_id: "trend_dashboard".to_string(),
            description: "Submission Trends by Day and Month".to_string(),
            form_versions: vec![FORM_2025.to_string(), FORM_2024.to_string()],
            dedup_key: vec![
                KeyField::Id,
                KeyField::Phone,
                KeyField::County,
                KeyField::Timestamp,
            ],
            aggregates: vec![
                AggregateKind::CountySubmissions,
                AggregateKind::DailyTrend,
                AggregateKind::MonthlyTrend,
            ],
            dense_trends: true,
            default_counties: None,
            default_genders: None,
        },
        VariantConfig {
            variant_id: "demographics".to_string(),
            description: "Age-Gender Composition of Participants".to_string(),
            form_versions: vec![FORM_2025.to_string(), FORM_2024.to_string()],
            dedup_key: vec![KeyField::Id, KeyField::Phone],
            aggregates: vec![AggregateKind::YouthSummary, AggregateKind::Quadrants],
            dense_trends: true,
            default_counties: None,
            default_genders: None,
        },
    ]
}
