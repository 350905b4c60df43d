//! Filter, sort, version collapsing and grouping over search candidates.
//!
//! Every stage borrows from the read-only catalog and returns a new ordered
//! view; nothing here mutates a model.

mod collapse;
mod filter;
mod group;
mod sort;

pub use collapse::{collapse_versions, dated_version};
pub use filter::{Filters, split_list};
pub use group::{Group, GroupBy, Grouping, InvalidGroupBy, UNKNOWN_BUCKET, group_models};
pub use sort::{
    Polarity, SortField, UnknownSortField, parse_knowledge_date, sort_by_field, sort_by_knowledge,
};

use crate::{catalog::NormalizedModel, observability::Verbosity, series::SeriesClassifier};

/// Per-run options for the pipeline stages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Explicit sort field; `None` means newest knowledge cutoff first.
    pub sort: Option<SortField>,
    pub group_by: Option<GroupBy>,
    /// Keep every dated snapshot and legacy model.
    pub show_all: bool,
    pub verbosity: Verbosity,
}

/// One table's worth of models, with an optional group heading.
#[derive(Debug, Clone, PartialEq)]
pub struct Section<'a> {
    pub title: Option<String>,
    pub models: Vec<&'a NormalizedModel>,
}

/// Pipeline result ready for rendering.
#[derive(Debug, Clone, Default)]
pub struct QueryOutput<'a> {
    pub sections: Vec<Section<'a>>,
    /// Models withheld as older snapshots or legacy series members.
    pub hidden: usize,
}

impl QueryOutput<'_> {
    pub fn model_count(&self) -> usize {
        self.sections.iter().map(|s| s.models.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.model_count() == 0
    }
}

/// Run filter → sort → group → collapse over search candidates.
///
/// Within each group the default sort and the version collapse are applied
/// again on their own, unless a sort field was requested or `show_all` is set
/// respectively.
pub fn run_pipeline<'a>(
    candidates: Vec<&'a NormalizedModel>,
    filters: &Filters,
    options: &PipelineOptions,
    classifier: &SeriesClassifier,
) -> QueryOutput<'a> {
    let before = candidates.len();
    let mut models = filters.apply(candidates);
    tracing::debug!(
        candidates = before,
        remaining = models.len(),
        "Filters applied"
    );

    match options.sort {
        Some(field) => sort_by_field(&mut models, field),
        None => sort_by_knowledge(&mut models),
    }
    if options.verbosity.explains() {
        let order: Vec<&str> = models.iter().take(10).map(|m| m.key.as_str()).collect();
        tracing::trace!(sort = ?options.sort, ?order, "Sorted candidates");
    }

    let output = match options.group_by {
        Some(group_by) => {
            let grouping = group_models(&models, group_by, classifier, options.show_all);
            let mut hidden = grouping.legacy_hidden;
            let sections = grouping
                .groups
                .into_iter()
                .filter_map(|group| {
                    let mut bucket = group.models;
                    if options.sort.is_none() {
                        sort_by_knowledge(&mut bucket);
                    }
                    if !options.show_all {
                        let (kept, dropped) = collapse_versions(bucket);
                        hidden += dropped;
                        bucket = kept;
                    }
                    (!bucket.is_empty()).then(|| Section {
                        title: Some(group.name),
                        models: bucket,
                    })
                })
                .collect();
            QueryOutput { sections, hidden }
        }
        None => {
            let (models, hidden) = if options.show_all {
                (models, 0)
            } else {
                collapse_versions(models)
            };
            QueryOutput {
                sections: vec![Section {
                    title: None,
                    models,
                }],
                hidden,
            }
        }
    };

    tracing::debug!(
        sections = output.sections.len(),
        shown = output.model_count(),
        hidden = output.hidden,
        "Pipeline complete"
    );
    output
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::catalog::Catalog;

    fn catalog() -> Catalog {
        Catalog::from_value(&json!({
            "acme": { "models": {
                "gpt-x-2024-01-01": { "id": "gpt-x-2024-01-01", "knowledge": "2023-10" },
                "gpt-x-2024-06-01": { "id": "gpt-x-2024-06-01", "knowledge": "2023-12" },
                "gpt-y": { "id": "gpt-y", "knowledge": "2024-03", "mode": "embedding" }
            }},
            "openai": { "models": {
                "gpt-3.5-turbo": { "id": "gpt-3.5-turbo", "knowledge": "2021-09" },
                "gpt-4o": { "id": "gpt-4o", "knowledge": "2023-10-01" }
            }}
        }))
        .unwrap()
    }

    fn keys(section: &Section<'_>) -> Vec<String> {
        section.models.iter().map(|m| m.key.clone()).collect()
    }

    #[test]
    fn test_default_collapses_and_sorts_by_knowledge() {
        let catalog = catalog();
        let classifier = SeriesClassifier::builtin().unwrap();

        let output = run_pipeline(
            catalog.iter().collect(),
            &Filters::default(),
            &PipelineOptions::default(),
            &classifier,
        );

        assert_eq!(output.hidden, 1);
        assert_eq!(
            keys(&output.sections[0]),
            vec![
                "acme/gpt-y",
                "acme/gpt-x-2024-06-01",
                "openai/gpt-4o",
                "openai/gpt-3.5-turbo"
            ]
        );
    }

    #[test]
    fn test_show_all_keeps_every_snapshot() {
        let catalog = catalog();
        let classifier = SeriesClassifier::builtin().unwrap();
        let options = PipelineOptions {
            show_all: true,
            ..Default::default()
        };

        let output = run_pipeline(
            catalog.iter().collect(),
            &Filters::default(),
            &options,
            &classifier,
        );
        assert_eq!(output.hidden, 0);
        assert_eq!(output.model_count(), 5);
    }

    #[test]
    fn test_grouping_collapses_per_bucket() {
        let catalog = catalog();
        let classifier = SeriesClassifier::builtin().unwrap();
        let options = PipelineOptions {
            group_by: Some(GroupBy::Mode),
            ..Default::default()
        };

        let output = run_pipeline(
            catalog.iter().collect(),
            &Filters::default(),
            &options,
            &classifier,
        );

        let titles: Vec<_> = output
            .sections
            .iter()
            .map(|s| s.title.clone().unwrap())
            .collect();
        assert_eq!(titles, vec!["embedding", "chat"]);
        assert_eq!(
            keys(&output.sections[1]),
            vec!["acme/gpt-x-2024-06-01", "openai/gpt-4o", "openai/gpt-3.5-turbo"]
        );
        assert_eq!(output.hidden, 1);
    }

    #[test]
    fn test_series_grouping_hides_legacy() {
        let catalog = catalog();
        let classifier = SeriesClassifier::builtin().unwrap();
        let options = PipelineOptions {
            group_by: Some(GroupBy::Series),
            ..Default::default()
        };

        let output = run_pipeline(
            catalog.iter().collect(),
            &Filters::default(),
            &options,
            &classifier,
        );

        // One older acme snapshot plus gpt-3.5-turbo as legacy.
        assert_eq!(output.hidden, 2);
        assert!(
            output
                .sections
                .iter()
                .all(|s| s.models.iter().all(|m| m.key != "openai/gpt-3.5-turbo"))
        );
    }

    #[test]
    fn test_explicit_sort_is_kept_inside_groups() {
        let catalog = Catalog::from_value(&json!({
            "acme": { "models": {
                "small": { "id": "small", "knowledge": "2024-06", "limit": { "context": 8000 } },
                "large": { "id": "large", "knowledge": "2023-01", "limit": { "context": 200000 } }
            }}
        }))
        .unwrap();
        let classifier = SeriesClassifier::builtin().unwrap();
        let options = PipelineOptions {
            sort: Some(SortField::MaxInputTokens),
            group_by: Some(GroupBy::Provider),
            ..Default::default()
        };

        let output = run_pipeline(
            catalog.iter().collect(),
            &Filters::default(),
            &options,
            &classifier,
        );
        assert_eq!(keys(&output.sections[0]), vec!["acme/large", "acme/small"]);
    }

    #[test]
    fn test_filters_can_empty_the_output() {
        let catalog = catalog();
        let classifier = SeriesClassifier::builtin().unwrap();
        let filters = Filters {
            reasoning: true,
            ..Default::default()
        };

        let output = run_pipeline(
            catalog.iter().collect(),
            &filters,
            &PipelineOptions::default(),
            &classifier,
        );
        assert!(output.is_empty());
    }
}
