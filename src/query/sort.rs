use std::{cmp::Ordering, fmt, str::FromStr};

use chrono::NaiveDate;

use crate::catalog::NormalizedModel;

/// Which direction of a field is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    HigherIsBetter,
    LowerIsBetter,
}

/// Fields accepted by `--sort-by`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    MaxInputTokens,
    MaxOutputTokens,
    InputCostPerToken,
    OutputCostPerToken,
    CacheReadCostPerToken,
    CacheWriteCostPerToken,
    KnowledgeCutoff,
}

impl SortField {
    pub const ALL: [SortField; 7] = [
        SortField::MaxInputTokens,
        SortField::MaxOutputTokens,
        SortField::InputCostPerToken,
        SortField::OutputCostPerToken,
        SortField::CacheReadCostPerToken,
        SortField::CacheWriteCostPerToken,
        SortField::KnowledgeCutoff,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::MaxInputTokens => "max_input_tokens",
            SortField::MaxOutputTokens => "max_output_tokens",
            SortField::InputCostPerToken => "input_cost_per_token",
            SortField::OutputCostPerToken => "output_cost_per_token",
            SortField::CacheReadCostPerToken => "cache_read_cost_per_token",
            SortField::CacheWriteCostPerToken => "cache_write_cost_per_token",
            SortField::KnowledgeCutoff => "knowledge_cutoff",
        }
    }

    /// Fixed per field, never inferred from the data.
    pub fn polarity(&self) -> Polarity {
        match self {
            SortField::MaxInputTokens
            | SortField::MaxOutputTokens
            | SortField::KnowledgeCutoff => Polarity::HigherIsBetter,
            SortField::InputCostPerToken
            | SortField::OutputCostPerToken
            | SortField::CacheReadCostPerToken
            | SortField::CacheWriteCostPerToken => Polarity::LowerIsBetter,
        }
    }

    /// Numeric value of the field, if the model has one.
    pub fn value(&self, model: &NormalizedModel) -> Option<f64> {
        match self {
            SortField::MaxInputTokens => model.max_input_tokens.map(|t| t as f64),
            SortField::MaxOutputTokens => model.max_output_tokens.map(|t| t as f64),
            SortField::InputCostPerToken => model.input_cost_per_token,
            SortField::OutputCostPerToken => model.output_cost_per_token,
            SortField::CacheReadCostPerToken => model.cache_read_cost_per_token,
            SortField::CacheWriteCostPerToken => model.cache_write_cost_per_token,
            SortField::KnowledgeCutoff => None,
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = UnknownSortField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s.trim())
            .ok_or_else(|| UnknownSortField(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid sort field '{0}'. Must be one of: {fields}", fields = sort_field_names())]
pub struct UnknownSortField(pub String);

fn sort_field_names() -> String {
    SortField::ALL
        .iter()
        .map(SortField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Sort by an explicit field, in the field's better-first direction.
///
/// A missing numeric value ranks as `0`, so an unknown cost sorts as the
/// cheapest and an unknown limit as the smallest.
pub fn sort_by_field(models: &mut [&NormalizedModel], field: SortField) {
    if field == SortField::KnowledgeCutoff {
        sort_by_knowledge(models);
        return;
    }

    models.sort_by(|a, b| {
        let a = field.value(a).unwrap_or(0.0);
        let b = field.value(b).unwrap_or(0.0);
        match field.polarity() {
            Polarity::HigherIsBetter => b.total_cmp(&a),
            Polarity::LowerIsBetter => a.total_cmp(&b),
        }
    });
}

/// Default order: most recent knowledge cutoff first; absent or unparseable
/// dates last. Stable, so ties keep their input order.
pub fn sort_by_knowledge(models: &mut [&NormalizedModel]) {
    models.sort_by(|a, b| compare_knowledge(b, a));
}

fn compare_knowledge(a: &NormalizedModel, b: &NormalizedModel) -> Ordering {
    let a = a.knowledge_cutoff.as_deref().and_then(parse_knowledge_date);
    let b = b.knowledge_cutoff.as_deref().and_then(parse_knowledge_date);
    // `None` orders before any date, so it lands last when reversed.
    a.cmp(&b)
}

/// Parse `YYYY-MM-DD`, compact `YYYYMMDD`, or month precision `YYYY-MM`
/// (taken as the first of the month).
pub fn parse_knowledge_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.len() == 8 && raw.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(raw, "%Y%m%d").ok();
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d"))
        .ok()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::catalog::{RawCatalogEntry, RawCost};

    fn model(key: &str, knowledge: Option<&str>, input_cost: Option<f64>) -> NormalizedModel {
        let raw = RawCatalogEntry {
            knowledge: knowledge.map(str::to_string),
            cost: input_cost.map(|c| RawCost {
                input: Some(c),
                ..Default::default()
            }),
            ..Default::default()
        };
        NormalizedModel::from_raw(key.into(), key.into(), "acme".into(), &raw)
    }

    fn keys(models: &[&NormalizedModel]) -> Vec<String> {
        models.iter().map(|m| m.key.clone()).collect()
    }

    #[rstest]
    #[case("2024-06-01", Some((2024, 6, 1)))]
    #[case("20240601", Some((2024, 6, 1)))]
    #[case("2024-06", Some((2024, 6, 1)))]
    #[case(" 2023-10-15 ", Some((2023, 10, 15)))]
    #[case("2024-13-01", None)]
    #[case("soon", None)]
    #[case("", None)]
    fn test_parse_knowledge_date(#[case] raw: &str, #[case] expected: Option<(i32, u32, u32)>) {
        let expected = expected.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d));
        assert_eq!(parse_knowledge_date(raw), expected);
    }

    #[test]
    fn test_default_sort_is_newest_first_with_unknown_last() {
        let a = model("a", Some("2023-04"), None);
        let b = model("b", None, None);
        let c = model("c", Some("20240601"), None);
        let d = model("d", Some("garbage"), None);
        let e = model("e", Some("2024-06-01"), None);

        let mut models = vec![&a, &b, &c, &d, &e];
        sort_by_knowledge(&mut models);
        // c and e are the same day and keep their input order.
        assert_eq!(keys(&models), vec!["c", "e", "a", "b", "d"]);
    }

    #[test]
    fn test_cost_sorts_ascending() {
        let cheap = model("cheap", None, Some(0.5));
        let pricey = model("pricey", None, Some(30.0));

        let mut models = vec![&pricey, &cheap];
        sort_by_field(&mut models, SortField::InputCostPerToken);
        assert_eq!(keys(&models), vec!["cheap", "pricey"]);
        assert_eq!(models[0].input_cost_per_token, Some(0.0000005));
    }

    #[test]
    fn test_missing_cost_ranks_as_zero() {
        let unknown = model("unknown", None, None);
        let cheap = model("cheap", None, Some(0.5));

        let mut models = vec![&cheap, &unknown];
        sort_by_field(&mut models, SortField::InputCostPerToken);
        assert_eq!(keys(&models), vec!["unknown", "cheap"]);
    }

    #[test]
    fn test_tokens_sort_descending() {
        let small = NormalizedModel {
            max_input_tokens: Some(8_192),
            ..model("small", None, None)
        };
        let large = NormalizedModel {
            max_input_tokens: Some(1_000_000),
            ..model("large", None, None)
        };
        let unknown = model("unknown", None, None);

        let mut models = vec![&unknown, &small, &large];
        sort_by_field(&mut models, SortField::MaxInputTokens);
        assert_eq!(keys(&models), vec!["large", "small", "unknown"]);
    }

    #[rstest]
    #[case("max_input_tokens", SortField::MaxInputTokens, Polarity::HigherIsBetter)]
    #[case("cache_write_cost_per_token", SortField::CacheWriteCostPerToken, Polarity::LowerIsBetter)]
    #[case("knowledge_cutoff", SortField::KnowledgeCutoff, Polarity::HigherIsBetter)]
    fn test_parse_field(#[case] raw: &str, #[case] field: SortField, #[case] polarity: Polarity) {
        let parsed: SortField = raw.parse().unwrap();
        assert_eq!(parsed, field);
        assert_eq!(parsed.polarity(), polarity);
    }

    #[test]
    fn test_unknown_field_lists_choices() {
        let err = "price".parse::<SortField>().unwrap_err();
        assert!(err.to_string().contains("'price'"));
        assert!(err.to_string().contains("input_cost_per_token"));
    }
}
