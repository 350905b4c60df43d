//! The canonical model record used by search, filtering and reporting.

use serde::Serialize;

use super::types::{RawCatalogEntry, RawCost, RawLimit};

/// Catalog prices are quoted per one million tokens.
pub const TOKENS_PER_MILLION: f64 = 1_000_000.0;

/// Mode assumed when an entry does not declare one.
pub const DEFAULT_MODE: &str = "chat";

/// A flattened catalog entry with a fixed set of known fields.
///
/// Optional fields stay `None` when the source omits them; a present zero is a
/// real value (free models exist) and is never conflated with "unknown".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedModel {
    /// Unique catalog key, `provider/model` for the nested schema.
    pub key: String,

    /// Bare model id as published by the provider.
    pub id: String,

    /// Display name; falls back to the model id.
    pub name: String,

    /// Provider id, case preserved. Compare with [`Self::provider_matches`].
    pub provider: String,

    /// Knowledge cutoff as published (`YYYY-MM-DD`, `YYYYMMDD` or `YYYY-MM`).
    pub knowledge_cutoff: Option<String>,

    pub input_modalities: Vec<String>,
    pub output_modalities: Vec<String>,

    pub reasoning: Option<bool>,
    pub tool_call: Option<bool>,

    pub max_input_tokens: Option<u64>,
    pub max_output_tokens: Option<u64>,

    /// Dollars per single input token.
    pub input_cost_per_token: Option<f64>,
    /// Dollars per single output token.
    pub output_cost_per_token: Option<f64>,
    /// Dollars per single cached input token read.
    pub cache_read_cost_per_token: Option<f64>,
    /// Dollars per single cached input token written.
    pub cache_write_cost_per_token: Option<f64>,

    /// chat, embedding, completion, rerank, ...
    pub mode: String,

    /// Same as `tool_call`; kept for filters written against the older field.
    pub supports_function_calling: Option<bool>,

    /// Whether `image` is among the input modalities.
    pub supports_vision: bool,
}

impl NormalizedModel {
    /// Flatten a raw entry.
    ///
    /// `key` must already be unique within the catalog; `provider` is the
    /// enclosing provider id for the nested schema, or the entry's own
    /// provider field for the flat one.
    pub fn from_raw(key: String, id: String, provider: String, raw: &RawCatalogEntry) -> Self {
        let cost = RawCost::resolve(raw.cost.as_ref(), raw.pricing.as_ref());
        let limit = RawLimit::resolve(raw.limit.as_ref(), raw.limits.as_ref());

        let input_modalities = raw
            .input_modalities
            .clone()
            .or_else(|| raw.modalities.as_ref().and_then(|m| m.input.clone()))
            .unwrap_or_default();
        let output_modalities = raw
            .output_modalities
            .clone()
            .or_else(|| raw.modalities.as_ref().and_then(|m| m.output.clone()))
            .unwrap_or_default();

        let supports_vision = input_modalities
            .iter()
            .any(|m| m.eq_ignore_ascii_case("image"));

        let name = raw
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| id.clone());

        let mode = raw
            .mode
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MODE)
            .to_string();

        Self {
            key,
            id,
            name,
            provider,
            knowledge_cutoff: raw.knowledge.clone().filter(|k| !k.trim().is_empty()),
            input_modalities,
            output_modalities,
            reasoning: raw.reasoning,
            tool_call: raw.tool_call,
            max_input_tokens: limit.context,
            max_output_tokens: limit.output,
            input_cost_per_token: cost.input.map(per_token),
            output_cost_per_token: cost.output.map(per_token),
            cache_read_cost_per_token: cost.cache_read.map(per_token),
            cache_write_cost_per_token: cost.cache_write.map(per_token),
            mode,
            supports_function_calling: raw.tool_call,
            supports_vision,
        }
    }

    /// Case-insensitive substring match on the provider id.
    pub fn provider_matches(&self, needle: &str) -> bool {
        self.provider
            .to_lowercase()
            .contains(&needle.to_lowercase())
    }

    pub fn has_input_modality(&self, modality: &str) -> bool {
        self.input_modalities
            .iter()
            .any(|m| m.eq_ignore_ascii_case(modality))
    }

    pub fn has_output_modality(&self, modality: &str) -> bool {
        self.output_modalities
            .iter()
            .any(|m| m.eq_ignore_ascii_case(modality))
    }
}

fn per_token(per_million: f64) -> f64 {
    per_million / TOKENS_PER_MILLION
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::RawModalities;

    fn entry() -> RawCatalogEntry {
        serde_json::from_str(
            r#"{
                "id": "gpt-4o",
                "name": "GPT-4o",
                "knowledge": "2023-09",
                "tool_call": true,
                "modalities": { "input": ["text", "image"], "output": ["text"] },
                "cost": { "input": 2.5, "output": 10.0, "cache_read": 1.25 },
                "limit": { "context": 128000, "output": 16384 }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_from_raw_flattens_fields() {
        let model = NormalizedModel::from_raw(
            "openai/gpt-4o".into(),
            "gpt-4o".into(),
            "openai".into(),
            &entry(),
        );

        assert_eq!(model.key, "openai/gpt-4o");
        assert_eq!(model.name, "GPT-4o");
        assert_eq!(model.knowledge_cutoff.as_deref(), Some("2023-09"));
        assert_eq!(model.input_modalities, vec!["text", "image"]);
        assert_eq!(model.max_input_tokens, Some(128000));
        assert_eq!(model.max_output_tokens, Some(16384));
        assert_eq!(model.input_cost_per_token, Some(2.5 / 1_000_000.0));
        assert_eq!(model.cache_read_cost_per_token, Some(1.25 / 1_000_000.0));
        assert_eq!(model.cache_write_cost_per_token, None);
        assert_eq!(model.mode, "chat");
        assert_eq!(model.supports_function_calling, Some(true));
        assert!(model.supports_vision);
        assert_eq!(model.reasoning, None);
    }

    #[test]
    fn test_zero_cost_is_kept() {
        let raw = RawCatalogEntry {
            cost: Some(RawCost {
                input: Some(0.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let model = NormalizedModel::from_raw("k".into(), "k".into(), "p".into(), &raw);
        assert_eq!(model.input_cost_per_token, Some(0.0));
        assert_eq!(model.output_cost_per_token, None);
    }

    #[test]
    fn test_flat_modalities_take_precedence() {
        let raw = RawCatalogEntry {
            input_modalities: Some(vec!["text".into()]),
            modalities: Some(RawModalities {
                input: Some(vec!["text".into(), "image".into()]),
                output: Some(vec!["audio".into()]),
            }),
            ..Default::default()
        };
        let model = NormalizedModel::from_raw("k".into(), "k".into(), "p".into(), &raw);
        assert_eq!(model.input_modalities, vec!["text"]);
        assert_eq!(model.output_modalities, vec!["audio"]);
        assert!(!model.supports_vision);
    }

    #[test]
    fn test_name_and_mode_fallbacks() {
        let raw = RawCatalogEntry {
            name: Some("  ".into()),
            mode: Some("embedding".into()),
            ..Default::default()
        };
        let model = NormalizedModel::from_raw("p/e".into(), "e".into(), "p".into(), &raw);
        assert_eq!(model.name, "e");
        assert_eq!(model.mode, "embedding");
    }

    #[test]
    fn test_provider_matches_is_case_insensitive() {
        let model = NormalizedModel::from_raw(
            "OpenAI/x".into(),
            "x".into(),
            "OpenAI".into(),
            &RawCatalogEntry::default(),
        );
        assert!(model.provider_matches("openai"));
        assert!(model.provider_matches("PEN"));
        assert!(!model.provider_matches("anthropic"));
        assert_eq!(model.provider, "OpenAI");
    }
}
