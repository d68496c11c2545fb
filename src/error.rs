use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV read/write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source fetch failed: {message}")]
    Fetch { message: String },

    #[error("Unknown form version: {0}")]
    UnknownFormVersion(String),

    #[error("Unknown report variant: {0}")]
    UnknownVariant(String),

    #[error("No data: the source contains no rows")]
    NoData,
}

pub type Result<T> = std::result::Result<T, PipelineError>;
