use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Where and how to fetch the model catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// URL to fetch the catalog from.
    #[serde(default = "default_catalog_api_url")]
    pub api_url: String,

    /// Request timeout in seconds. Sized for interactive use: a slow fetch
    /// degrades to an empty catalog instead of hanging the terminal.
    #[serde(default = "default_catalog_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_url: default_catalog_api_url(),
            timeout_secs: default_catalog_timeout_secs(),
        }
    }
}

impl CatalogConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = url::Url::parse(&self.api_url).map_err(|e| {
            ConfigError::Validation(format!("catalog.api_url '{}': {e}", self.api_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(format!(
                "catalog.api_url must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "catalog.timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

fn default_catalog_api_url() -> String {
    "https://models.dev/api.json".to_string()
}

fn default_catalog_timeout_secs() -> u64 {
    10
}

/// Fuzzy search tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// Edit-distance tolerance as a fraction of the query term length.
    #[serde(default = "default_fuzzy")]
    pub fuzzy: f64,

    /// Upper bound on the edit distance regardless of term length.
    #[serde(default = "default_max_fuzzy")]
    pub max_fuzzy: usize,

    /// Whether a query term also matches indexed terms it is a prefix of.
    #[serde(default = "default_true")]
    pub prefix: bool,

    /// Score multiplier for matches in the model name field.
    #[serde(default = "default_name_boost")]
    pub name_boost: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fuzzy: default_fuzzy(),
            max_fuzzy: default_max_fuzzy(),
            prefix: true,
            name_boost: default_name_boost(),
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.fuzzy) {
            return Err(ConfigError::Validation(format!(
                "search.fuzzy must be between 0 and 1, got {}",
                self.fuzzy
            )));
        }
        if !(self.name_boost.is_finite() && self.name_boost > 0.0) {
            return Err(ConfigError::Validation(format!(
                "search.name_boost must be positive, got {}",
                self.name_boost
            )));
        }
        Ok(())
    }
}

fn default_fuzzy() -> f64 {
    0.2
}

fn default_max_fuzzy() -> usize {
    6
}

fn default_name_boost() -> f64 {
    3.0
}

fn default_true() -> bool {
    true
}

/// Series classification rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeriesConfig {
    /// TOML rule table replacing the built-in one.
    #[serde(default)]
    pub rules_path: Option<PathBuf>,
}
