use crate::types::FailureKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("Fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Missing required marker '{marker}' in {url}")]
    Structure { url: String, marker: String },

    #[error("Malformed text in {url}: {message}")]
    Encoding { url: String, message: String },

    #[error("Cancelled before fetch")]
    Cancelled,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV output failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ScraperError {
    pub fn fetch(url: &str, message: impl Into<String>) -> Self {
        ScraperError::Fetch {
            url: url.to_string(),
            message: message.into(),
        }
    }

    pub fn structure(url: &str, marker: impl Into<String>) -> Self {
        ScraperError::Structure {
            url: url.to_string(),
            marker: marker.into(),
        }
    }

    pub fn encoding(url: &str, message: impl Into<String>) -> Self {
        ScraperError::Encoding {
            url: url.to_string(),
            message: message.into(),
        }
    }

    /// Side-channel classification used in failure reports.
    /// Transport-level variants count as fetch failures.
    pub fn kind(&self) -> FailureKind {
        match self {
            ScraperError::Structure { .. } => FailureKind::Structure,
            ScraperError::Encoding { .. } => FailureKind::Encoding,
            _ => FailureKind::Fetch,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScraperError>;
