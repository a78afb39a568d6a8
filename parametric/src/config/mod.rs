//! Configuration for the parametric values engine
//!
//! Default config location: ./parametric.toml

use crate::request::SortParam;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub parametric: ParametricConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ParametricConfig {
    /// Categorical values kept per field when the request sets no cap
    /// (0 = unlimited)
    #[serde(default = "default_max_values")]
    pub max_values: u32,
    #[serde(default)]
    pub sort: SortParam,
    /// Fields processed at the same time within one request
    #[serde(default = "default_max_concurrent_fields")]
    pub max_concurrent_fields: usize,
    /// Upper bound on a field's requested bucket count
    #[serde(default = "default_max_buckets_per_field")]
    pub max_buckets_per_field: u32,
    #[serde(default)]
    pub field_failure: FieldFailurePolicy,
}

fn default_max_values() -> u32 {
    30
}

fn default_max_concurrent_fields() -> usize {
    8
}

fn default_max_buckets_per_field() -> u32 {
    10_000
}

impl Default for ParametricConfig {
    fn default() -> Self {
        Self {
            max_values: default_max_values(),
            sort: SortParam::default(),
            max_concurrent_fields: default_max_concurrent_fields(),
            max_buckets_per_field: default_max_buckets_per_field(),
            field_failure: FieldFailurePolicy::default(),
        }
    }
}

impl ParametricConfig {
    /// Configured cap, `None` when unlimited
    pub fn max_values_limit(&self) -> Option<usize> {
        (self.max_values > 0).then_some(self.max_values as usize)
    }
}

/// What happens to a request when one of its fields fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldFailurePolicy {
    /// The whole request fails with the first failing field
    #[default]
    Fail,
    /// The failing field is left out of the result
    Skip,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    /// `pretty` or `json`
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

impl Config {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from an existing file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load config from file path, or create default
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load(path);
        }

        let config = Config::default();
        if let Err(e) = config.save(path) {
            tracing::warn!("Could not write default config to {:?}: {}", path, e);
        }
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.parametric.max_concurrent_fields == 0 {
            return Err(Error::Config(
                "parametric.max_concurrent_fields must be greater than 0".to_string(),
            ));
        }
        if self.parametric.max_buckets_per_field == 0 {
            return Err(Error::Config(
                "parametric.max_buckets_per_field must be greater than 0".to_string(),
            ));
        }
        match self.logging.format.as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(Error::Config(format!(
                "logging.format must be 'pretty' or 'json', got '{}'",
                other
            ))),
        }
    }
}
