//! Series and legacy classification from declarative name-pattern rules.
//!
//! Rules are plain data (`data/series.toml` is embedded as the default) and
//! are compiled once into an immutable [`SeriesClassifier`]. Classification is
//! a pure function of `(model name, provider)`.
//!
//! # Example Rules
//!
//! ```toml
//! [[provider]]
//! id = "openai"
//! aliases = ["azure"]
//! legacy = ['^gpt-3\.5']
//!
//! [[provider.series]]
//! name = "gpt-4o"
//! pattern = '^gpt-4o'
//! ```

use std::{collections::HashMap, path::Path};

use regex::Regex;
use serde::Deserialize;

use crate::config::SeriesConfig;

/// The built-in rule table.
pub const BUILTIN_RULES: &str = include_str!("../../data/series.toml");

/// Label for models whose provider has rules but no pattern matched.
pub const OTHER_SERIES: &str = "other";

/// Label for models from a provider without rules.
pub const UNKNOWN_SERIES: &str = "unknown";

/// Bucket that gathers legacy models when all versions are shown.
pub const LEGACY_BUCKET: &str = "legacy";

/// Result of classifying a model name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Series<'a> {
    /// The first matching series for the provider.
    Named(&'a str),
    /// The provider has rules, none matched.
    Other,
    /// No rules exist for the provider.
    Unknown,
}

impl<'a> Series<'a> {
    pub fn as_str(&self) -> &'a str {
        match self {
            Series::Named(name) => name,
            Series::Other => OTHER_SERIES,
            Series::Unknown => UNKNOWN_SERIES,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleFile {
    #[serde(default, rename = "provider")]
    providers: Vec<ProviderRuleConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProviderRuleConfig {
    id: String,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    order: Vec<String>,
    #[serde(default)]
    legacy: Vec<String>,
    #[serde(default)]
    series: Vec<SeriesRuleConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SeriesRuleConfig {
    name: String,
    pattern: String,
}

/// Compiled rules for one provider.
#[derive(Debug)]
struct ProviderRules {
    series: Vec<(String, Regex)>,
    legacy: Vec<Regex>,
}

/// Immutable lookup structure built from the rule table.
#[derive(Debug)]
pub struct SeriesClassifier {
    providers: Vec<ProviderRules>,
    /// Lower-cased provider id or alias → index into `providers`.
    by_provider: HashMap<String, usize>,
    /// Declared bucket order across all providers.
    bucket_order: Vec<String>,
}

impl SeriesClassifier {
    /// Compile the embedded rule table.
    pub fn builtin() -> Result<Self, SeriesError> {
        Self::from_toml_str(BUILTIN_RULES)
    }

    /// Load the configured rule table, or the built-in one.
    pub fn load(config: &SeriesConfig) -> Result<Self, SeriesError> {
        match &config.rules_path {
            Some(path) => Self::from_file(path),
            None => Self::builtin(),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SeriesError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| SeriesError::Io(e, path.as_ref().to_path_buf()))?;
        Self::from_toml_str(&contents)
    }

    /// Parse and compile a TOML rule table.
    pub fn from_toml_str(contents: &str) -> Result<Self, SeriesError> {
        let file: RuleFile = toml::from_str(contents)?;

        let mut providers = Vec::with_capacity(file.providers.len());
        let mut by_provider = HashMap::new();
        let mut bucket_order: Vec<String> = Vec::new();

        for config in file.providers {
            let index = providers.len();
            for id in std::iter::once(&config.id).chain(&config.aliases) {
                if by_provider.insert(id.to_lowercase(), index).is_some() {
                    return Err(SeriesError::DuplicateProvider(id.clone()));
                }
            }

            let series = config
                .series
                .iter()
                .map(|rule| {
                    compile(&config.id, &rule.pattern).map(|regex| (rule.name.clone(), regex))
                })
                .collect::<Result<Vec<_>, _>>()?;
            let legacy = config
                .legacy
                .iter()
                .map(|pattern| compile(&config.id, pattern))
                .collect::<Result<Vec<_>, _>>()?;

            let declared: Vec<&str> = if config.order.is_empty() {
                series.iter().map(|(name, _)| name.as_str()).collect()
            } else {
                for name in &config.order {
                    if !series.iter().any(|(s, _)| s == name) {
                        return Err(SeriesError::UnknownOrderEntry {
                            provider: config.id.clone(),
                            series: name.clone(),
                        });
                    }
                }
                config.order.iter().map(String::as_str).collect()
            };
            for name in declared {
                if !bucket_order.iter().any(|b| b == name) {
                    bucket_order.push(name.to_string());
                }
            }

            providers.push(ProviderRules { series, legacy });
        }

        tracing::debug!(
            providers = providers.len(),
            buckets = bucket_order.len(),
            "Series rules compiled"
        );

        Ok(Self {
            providers,
            by_provider,
            bucket_order,
        })
    }

    fn rules_for(&self, provider: &str) -> Option<&ProviderRules> {
        self.by_provider
            .get(&provider.to_lowercase())
            .map(|&idx| &self.providers[idx])
    }

    /// Classify a model name. Keys (`provider/model`) are accepted too; only
    /// the part after the last `/` is matched.
    pub fn classify(&self, name: &str, provider: &str) -> Series<'_> {
        let Some(rules) = self.rules_for(provider) else {
            return Series::Unknown;
        };
        let bare = bare_model_name(name);
        rules
            .series
            .iter()
            .find(|(_, regex)| regex.is_match(bare))
            .map(|(label, _)| Series::Named(label.as_str()))
            .unwrap_or(Series::Other)
    }

    /// Whether the model is superseded according to its provider's rules.
    pub fn is_legacy(&self, name: &str, provider: &str) -> bool {
        let bare = bare_model_name(name);
        self.rules_for(provider)
            .is_some_and(|rules| rules.legacy.iter().any(|regex| regex.is_match(bare)))
    }

    /// Sort rank of a bucket label: declared series first in declared order,
    /// then `other`, `unknown`, and `legacy` last.
    pub fn bucket_rank(&self, label: &str) -> usize {
        if let Some(pos) = self.bucket_order.iter().position(|b| b == label) {
            return pos;
        }
        let tail = self.bucket_order.len();
        match label {
            OTHER_SERIES => tail,
            UNKNOWN_SERIES => tail + 1,
            LEGACY_BUCKET => tail + 2,
            _ => tail,
        }
    }

    /// Number of providers with rules (aliases not counted).
    #[cfg(test)]
    fn provider_count(&self) -> usize {
        self.providers.len()
    }
}

fn compile(provider: &str, pattern: &str) -> Result<Regex, SeriesError> {
    let with_flags = if pattern.starts_with("(?i)") {
        pattern.to_string()
    } else {
        format!("(?i){pattern}")
    };
    Regex::new(&with_flags).map_err(|source| SeriesError::Pattern {
        provider: provider.to_string(),
        pattern: pattern.to_string(),
        source,
    })
}

fn bare_model_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Rule table errors.
#[derive(Debug, thiserror::Error)]
pub enum SeriesError {
    #[error("Failed to read series rules {1}: {0}")]
    Io(std::io::Error, std::path::PathBuf),

    #[error("Failed to parse series rules: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid series pattern '{pattern}' for provider '{provider}': {source}")]
    Pattern {
        provider: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Provider '{0}' is declared more than once")]
    DuplicateProvider(String),

    #[error("Provider '{provider}' orders undeclared series '{series}'")]
    UnknownOrderEntry { provider: String, series: String },
}
