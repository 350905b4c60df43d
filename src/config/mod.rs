//! Configuration for the aidex CLI.
//!
//! Configuration is optional. When present it is a TOML file, with support
//! for environment variable interpolation using `${VAR_NAME}` syntax.
//!
//! # Example
//!
//! ```toml
//! [catalog]
//! api_url = "https://models.dev/api.json"
//! timeout_secs = 10
//!
//! [logging]
//! level = "warn"
//! format = "compact"
//!
//! [search]
//! fuzzy = 0.2
//!
//! [series]
//! rules_path = "${HOME}/.config/aidex/series.toml"
//! ```

mod catalog;
mod observability;

use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

pub use catalog::*;
pub use observability::*;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// File name looked up under the user's config directory.
pub const CONFIG_FILE_NAME: &str = "aidex.toml";

/// Root configuration.
///
/// All sections are optional with sensible defaults, so running without a
/// config file is the common case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AidexConfig {
    /// Catalog source.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Logging to stderr.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Fuzzy search tuning.
    #[serde(default)]
    pub search: SearchConfig,

    /// Series classification rules.
    #[serde(default)]
    pub series: SeriesConfig,
}

impl AidexConfig {
    /// Load the configuration for this run.
    ///
    /// An explicit path must exist. Without one, the default location
    /// (`<config dir>/aidex/aidex.toml`) is used if present, otherwise the
    /// built-in defaults apply.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e, path.as_ref().to_path_buf()))?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(contents: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(contents)?;
        let config: AidexConfig = toml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration for consistency.
    fn validate(&self) -> Result<(), ConfigError> {
        self.catalog.validate()?;
        self.search.validate()?;
        Ok(())
    }
}

/// Default config file location, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("aidex").join(CONFIG_FILE_NAME))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {1}: {0}")]
    Io(std::io::Error, std::path::PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

/// Expand environment variables in the format `${VAR_NAME}`.
/// Variables after a `#` on the same line are left alone.
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut result = String::with_capacity(input.len());

    for line in input.lines() {
        let comment_pos = line.find('#');
        let mut last_end = 0;

        for cap in ENV_VAR.captures_iter(line) {
            let Some(whole) = cap.get(0) else { continue };

            if comment_pos.is_some_and(|pos| whole.start() >= pos) {
                continue;
            }

            result.push_str(&line[last_end..whole.start()]);

            let var_name = &cap[1];
            let value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;
            result.push_str(&value);

            last_end = whole.end();
        }

        result.push_str(&line[last_end..]);
        result.push('\n');
    }

    if !input.ends_with('\n') && result.ends_with('\n') {
        result.pop();
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AidexConfig::from_str("").unwrap();
        assert_eq!(config, AidexConfig::default());
        assert_eq!(config.catalog.api_url, "https://models.dev/api.json");
        assert_eq!(config.catalog.timeout_secs, 10);
        assert_eq!(config.logging.level, LogLevel::Warn);
        assert_eq!(config.search.fuzzy, 0.2);
        assert!(config.series.rules_path.is_none());
    }

    #[test]
    fn test_full_config() {
        let config = AidexConfig::from_str(
            r#"
            [catalog]
            api_url = "http://localhost:8080/api.json"
            timeout_secs = 3

            [logging]
            level = "debug"
            format = "json"
            filter = "reqwest=info"

            [search]
            fuzzy = 0.3
            name_boost = 2.0

            [series]
            rules_path = "/etc/aidex/series.toml"
        "#,
        )
        .unwrap();

        assert_eq!(config.catalog.timeout_secs, 3);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.search.fuzzy, 0.3);
        assert!(config.search.prefix);
        assert_eq!(
            config.series.rules_path,
            Some(PathBuf::from("/etc/aidex/series.toml"))
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = AidexConfig::from_str("[catalog]\nurl = \"x\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = AidexConfig::from_str("[catalog]\ntimeout_secs = 0").unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let err = AidexConfig::from_str("[catalog]\napi_url = \"not a url\"").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let err = AidexConfig::from_str("[catalog]\napi_url = \"ftp://example.com/x\"").unwrap_err();
        assert!(err.to_string().contains("http"));
    }

    #[test]
    fn test_fuzzy_out_of_range_rejected() {
        let err = AidexConfig::from_str("[search]\nfuzzy = 1.5").unwrap_err();
        assert!(err.to_string().contains("search.fuzzy"));
    }

    #[test]
    fn test_env_var_expansion() {
        temp_env::with_var("AIDEX_TEST_CATALOG", Some("http://mirror.local/api.json"), || {
            let config =
                AidexConfig::from_str("[catalog]\napi_url = \"${AIDEX_TEST_CATALOG}\"").unwrap();
            assert_eq!(config.catalog.api_url, "http://mirror.local/api.json");
        });
    }

    #[test]
    fn test_missing_env_var() {
        temp_env::with_var_unset("AIDEX_TEST_MISSING", || {
            let err = AidexConfig::from_str("[catalog]\napi_url = \"${AIDEX_TEST_MISSING}\"")
                .unwrap_err();
            assert!(matches!(err, ConfigError::EnvVarNotFound(ref v) if v == "AIDEX_TEST_MISSING"));
        });
    }

    #[test]
    fn test_env_var_in_comment_ignored() {
        let result = expand_env_vars("# api_url = \"${NONEXISTENT_VAR}\"").unwrap();
        assert_eq!(result, "# api_url = \"${NONEXISTENT_VAR}\"");
    }

    #[test]
    fn test_env_var_after_comment_ignored() {
        let result = expand_env_vars("key = \"value\" # ${NONEXISTENT_VAR}").unwrap();
        assert_eq!(result, "key = \"value\" # ${NONEXISTENT_VAR}");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nlevel = \"error\"").unwrap();

        let config = AidexConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.logging.level, LogLevel::Error);
    }

    #[test]
    fn test_explicit_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let err = AidexConfig::load(Some(missing.as_path())).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_, _)));
    }
}
