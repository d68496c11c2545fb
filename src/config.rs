use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{PipelineError, Result};
use crate::reference::FORM_2025;

/// Environment variable overriding the configured sheet URL.
pub const SHEET_URL_ENV: &str = "MOBILIZATION_SHEET_URL";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Spreadsheet CSV-export URL used when no source is given on the
    /// command line.
    pub sheet_url: Option<String>,
    #[serde(default = "default_form_version")]
    pub form_version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_directory")]
    pub directory: String,
    #[serde(default = "default_variant")]
    pub default_variant: String,
}

/// Optional directories with JSON definitions that extend the compiled-in
/// schema maps and report variants.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryConfig {
    pub schemas_dir: Option<String>,
    pub variants_dir: Option<String>,
}

fn default_form_version() -> String {
    FORM_2025.to_string()
}

fn default_ttl_minutes() -> i64 {
    10
}

fn default_output_directory() -> String {
    "output/reports".to_string()
}

fn default_variant() -> String {
    "county_summary".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            sheet_url: None,
            form_version: default_form_version(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: default_ttl_minutes(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            default_variant: default_variant(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            cache: CacheConfig::default(),
            output: OutputConfig::default(),
            registry: RegistryConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load `config.toml` when present, fall back to defaults when not.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(_) => Self::default(),
        }
    }

    /// Configured sheet URL, with the environment taking precedence.
    pub fn sheet_url(&self) -> Option<String> {
        std::env::var(SHEET_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.source.sheet_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_apply_without_a_config_file() {
        let config = AppConfig::default();
        assert_eq!(config.cache.ttl_minutes, 10);
        assert_eq!(config.output.default_variant, "county_summary");
        assert_eq!(config.source.form_version, FORM_2025);
        assert!(config.registry.schemas_dir.is_none());
    }

    #[test]
    fn partial_config_file_fills_missing_sections_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[source]
sheet_url = "https://docs.google.com/spreadsheets/d/abc/export?format=csv"

[cache]
ttl_minutes = 5
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(
            config.source.sheet_url.as_deref(),
            Some("https://docs.google.com/spreadsheets/d/abc/export?format=csv")
        );
        assert_eq!(config.cache.ttl_minutes, 5);
        assert_eq!(config.output.directory, "output/reports");
    }

    #[test]
    fn missing_config_file_is_a_config_error() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }

    #[test]
    fn malformed_toml_is_a_toml_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[source\nsheet_url = ").unwrap();
        let result = AppConfig::load_from(&path);
        assert!(matches!(result, Err(PipelineError::Toml(_))));
    }
}
