//! Raw document shapes for the model catalog.
//!
//! The catalog is published by <https://models.dev> as a provider-nested
//! document. Older mirrors serve a flat `name → entry` mapping instead. Both
//! shapes share the same per-model entry, which itself comes in two historical
//! variants: `cost`/`limit` (current) and `pricing`/`limits` (legacy).

use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::{Map, Value};

use super::CatalogError;

/// The top-level catalog document, resolved once during normalization.
#[derive(Debug, Clone)]
pub enum CatalogDocument {
    /// `{ providerId: { id, name, models: { modelId: entry } } }`
    Nested(Vec<(String, CatalogProvider)>),
    /// `{ name: entry }`, the pre-provider schema.
    Flat(Vec<(String, RawCatalogEntry)>),
}

/// A provider in the nested schema with its models, in document order.
#[derive(Debug, Clone, Default)]
pub struct CatalogProvider {
    /// Models offered by this provider keyed by model id.
    pub models: Vec<(String, RawCatalogEntry)>,
}

/// A single provider-supplied model entry.
///
/// Every field is optional: entries are heterogeneous across providers and
/// across schema generations. A field with an unexpected type reads as absent
/// and the rest of the entry is kept.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawCatalogEntry {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,

    /// Provider id. Only meaningful in the flat schema; the nested schema
    /// takes the provider from the enclosing object.
    #[serde(default, alias = "litellm_provider", deserialize_with = "lenient")]
    pub provider: Option<String>,

    /// Knowledge cutoff (`YYYY-MM-DD`, `YYYYMMDD` or `YYYY-MM`).
    #[serde(default, deserialize_with = "lenient")]
    pub knowledge: Option<String>,

    #[serde(default, deserialize_with = "lenient_strings")]
    pub input_modalities: Option<Vec<String>>,

    #[serde(default, deserialize_with = "lenient_strings")]
    pub output_modalities: Option<Vec<String>>,

    /// models.dev nests modalities as `{ input: [...], output: [...] }`.
    #[serde(default, deserialize_with = "lenient")]
    pub modalities: Option<RawModalities>,

    #[serde(default, deserialize_with = "lenient")]
    pub reasoning: Option<bool>,

    #[serde(default, deserialize_with = "lenient")]
    pub tool_call: Option<bool>,

    #[serde(default, deserialize_with = "lenient")]
    pub mode: Option<String>,

    /// Current pricing object (dollars per 1M tokens).
    #[serde(default, deserialize_with = "lenient")]
    pub cost: Option<RawCost>,

    /// Legacy pricing object (dollars per 1M tokens).
    #[serde(default, deserialize_with = "lenient")]
    pub pricing: Option<RawCost>,

    /// Current limits object.
    #[serde(default, deserialize_with = "lenient")]
    pub limit: Option<RawLimit>,

    /// Legacy limits object.
    #[serde(default, deserialize_with = "lenient")]
    pub limits: Option<RawLimit>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawModalities {
    #[serde(default, deserialize_with = "lenient_strings")]
    pub input: Option<Vec<String>>,

    #[serde(default, deserialize_with = "lenient_strings")]
    pub output: Option<Vec<String>>,
}

/// Pricing in dollars per 1M tokens.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawCost {
    #[serde(default, deserialize_with = "lenient")]
    pub input: Option<f64>,

    #[serde(default, deserialize_with = "lenient")]
    pub output: Option<f64>,

    #[serde(default, deserialize_with = "lenient")]
    pub cache_read: Option<f64>,

    #[serde(default, deserialize_with = "lenient")]
    pub cache_write: Option<f64>,
}

impl RawCost {
    /// True when none of the recognized price fields is present.
    pub fn is_empty(&self) -> bool {
        self.input.is_none()
            && self.output.is_none()
            && self.cache_read.is_none()
            && self.cache_write.is_none()
    }

    /// Resolve the current object against the legacy one.
    ///
    /// An absent or empty current object yields the legacy object unchanged.
    /// A non-empty current object wins field by field, with individual missing
    /// fields taken from the legacy object.
    pub fn resolve(current: Option<&RawCost>, legacy: Option<&RawCost>) -> RawCost {
        let legacy = legacy.cloned().unwrap_or_default();
        match current {
            Some(current) if !current.is_empty() => RawCost {
                input: current.input.or(legacy.input),
                output: current.output.or(legacy.output),
                cache_read: current.cache_read.or(legacy.cache_read),
                cache_write: current.cache_write.or(legacy.cache_write),
            },
            _ => legacy,
        }
    }
}

/// Context and output limits in tokens.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawLimit {
    #[serde(default, deserialize_with = "token_count")]
    pub context: Option<u64>,

    #[serde(default, deserialize_with = "token_count")]
    pub output: Option<u64>,
}

impl RawLimit {
    pub fn is_empty(&self) -> bool {
        self.context.is_none() && self.output.is_none()
    }

    /// Same resolution rule as [`RawCost::resolve`].
    pub fn resolve(current: Option<&RawLimit>, legacy: Option<&RawLimit>) -> RawLimit {
        let legacy = legacy.cloned().unwrap_or_default();
        match current {
            Some(current) if !current.is_empty() => RawLimit {
                context: current.context.or(legacy.context),
                output: current.output.or(legacy.output),
            },
            _ => legacy,
        }
    }
}

/// Reads any value as `T`, treating `null` and ill-typed values as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match T::deserialize(value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => {
            tracing::debug!(
                expected = std::any::type_name::<T>(),
                error = %e,
                "Ignoring ill-typed catalog field"
            );
            Ok(None)
        }
    }
}

/// Reads a list of strings, keeping the string items of an array and
/// treating anything else as absent.
fn lenient_strings<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Array(items) => Ok(Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    other => {
                        tracing::debug!(item = %other, "Ignoring non-string list item");
                        None
                    }
                })
                .collect(),
        )),
        other => {
            tracing::debug!(value = %other, "Ignoring non-list catalog field");
            Ok(None)
        }
    }
}

/// Accepts integer and integral float token counts (`128000` or `128000.0`).
///
/// Negative, fractional and non-numeric values read as absent rather than
/// being truncated.
fn token_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let count = match &value {
        Value::Null => return Ok(None),
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|v| v.is_finite() && *v >= 0.0 && v.fract() == 0.0)
                .map(|v| v as u64)
        }),
        _ => None,
    };
    if count.is_none() {
        tracing::debug!(value = %value, "Ignoring invalid token count");
    }
    Ok(count)
}

impl CatalogDocument {
    /// Classify a parsed JSON value as one of the two catalog shapes.
    ///
    /// The document is nested when any top-level value carries a `models`
    /// object. Non-object entries are skipped.
    pub fn from_value(value: &Value) -> Result<Self, CatalogError> {
        let Value::Object(root) = value else {
            return Err(CatalogError::Shape(json_type_name(value)));
        };

        let nested = root
            .values()
            .any(|v| v.get("models").is_some_and(Value::is_object));

        if nested {
            Ok(Self::Nested(
                root.iter()
                    .filter_map(|(provider_id, provider)| {
                        let provider = provider.as_object()?;
                        Some((provider_id.clone(), parse_provider(provider_id, provider)))
                    })
                    .collect(),
            ))
        } else {
            Ok(Self::Flat(
                root.iter()
                    .filter_map(|(name, entry)| parse_entry(name, entry).map(|e| (name.clone(), e)))
                    .collect(),
            ))
        }
    }

    /// Total number of model entries across all providers.
    pub fn entry_count(&self) -> usize {
        match self {
            Self::Nested(providers) => providers.iter().map(|(_, p)| p.models.len()).sum(),
            Self::Flat(entries) => entries.len(),
        }
    }
}

fn parse_provider(provider_id: &str, provider: &Map<String, Value>) -> CatalogProvider {
    let models = provider
        .get("models")
        .and_then(Value::as_object)
        .map(|models| {
            models
                .iter()
                .filter_map(|(model_id, entry)| {
                    let label = format!("{provider_id}/{model_id}");
                    parse_entry(&label, entry).map(|e| (model_id.clone(), e))
                })
                .collect()
        })
        .unwrap_or_default();

    CatalogProvider { models }
}

fn parse_entry(label: &str, entry: &Value) -> Option<RawCatalogEntry> {
    if !entry.is_object() {
        tracing::debug!(entry = %label, "Skipping non-object catalog entry");
        return None;
    }
    match RawCatalogEntry::deserialize(entry) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!(entry = %label, error = %e, "Skipping malformed catalog entry");
            None
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
