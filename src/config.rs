use crate::constants::{
    DEFAULT_CONCURRENCY, DEFAULT_CONFIG_PATH, DEFAULT_HOST, DEFAULT_OUTPUT_PATH,
    DEFAULT_PROGRESS_EVERY, DEFAULT_TIMEOUT_SECS, FIRST_YEAR,
};
use crate::error::{Result, ScraperError};
use chrono::Datelike;
use serde::Deserialize;
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub start_year: i32,
    pub end_year: i32,
    pub output_path: PathBuf,
    pub concurrency: usize,
    pub request_timeout_secs: u64,
    /// Log a progress line every this many talks.
    pub progress_every: usize,
    pub failures_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            start_year: FIRST_YEAR,
            end_year: chrono::Local::now().year(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            concurrency: DEFAULT_CONCURRENCY,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            progress_every: DEFAULT_PROGRESS_EVERY,
            failures_path: None,
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub output_path: Option<PathBuf>,
    pub concurrency: Option<usize>,
    pub failures_path: Option<PathBuf>,
}

impl Config {
    /// Load `path` if given, else `config.toml` when it exists, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ScraperError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(year) = overrides.start_year {
            self.start_year = year;
        }
        if let Some(year) = overrides.end_year {
            self.end_year = year;
        }
        if let Some(path) = overrides.output_path {
            self.output_path = path;
        }
        if let Some(n) = overrides.concurrency {
            self.concurrency = n;
        }
        if overrides.failures_path.is_some() {
            self.failures_path = overrides.failures_path;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.start_year < FIRST_YEAR {
            return Err(ScraperError::Config(format!(
                "start_year {} is before the first conference year {}",
                self.start_year, FIRST_YEAR
            )));
        }
        if self.start_year > self.end_year {
            return Err(ScraperError::Config(format!(
                "start_year {} is after end_year {}",
                self.start_year, self.end_year
            )));
        }
        if self.concurrency == 0 {
            return Err(ScraperError::Config("concurrency must be at least 1".into()));
        }
        if url::Url::parse(&self.host).is_err() {
            return Err(ScraperError::Config(format!("host '{}' is not a valid URL", self.host)));
        }
        Ok(())
    }

    pub fn years(&self) -> RangeInclusive<i32> {
        self.start_year..=self.end_year
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.start_year, 1971);
        assert!(config.end_year >= 2024);
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.output_path, PathBuf::from("conference_talks.csv"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config =
            Config::from_toml("start_year = 2000\nend_year = 2001\nconcurrency = 2\n").unwrap();
        assert_eq!(config.years(), 2000..=2001);
        assert_eq!(config.concurrency, 2);
        assert_eq!(config.host, DEFAULT_HOST);
    }

    #[test]
    fn test_overrides_win() {
        let config = Config::from_toml("start_year = 2000\nend_year = 2001\n")
            .unwrap()
            .with_overrides(Overrides {
                end_year: Some(2005),
                output_path: Some(PathBuf::from("out.csv")),
                ..Overrides::default()
            });
        assert_eq!(config.start_year, 2000);
        assert_eq!(config.end_year, 2005);
        assert_eq!(config.output_path, PathBuf::from("out.csv"));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.start_year = 1960;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.start_year = 2010;
        config.end_year = 2000;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_type_is_toml_error() {
        let err = Config::from_toml("concurrency = \"lots\"").unwrap_err();
        assert!(matches!(err, ScraperError::Toml(_)));
    }
}
