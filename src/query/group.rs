use std::{fmt, str::FromStr};

use crate::{
    catalog::NormalizedModel,
    series::{LEGACY_BUCKET, SeriesClassifier},
};

/// Label for models without a provider or mode.
pub const UNKNOWN_BUCKET: &str = "unknown";

/// Keyword buckets for type grouping, after the implicit `latest` bucket.
const TYPE_KEYWORDS: [&str; 4] = ["preview", "vision", "realtime", "audio"];

/// Catch-all type bucket for names matching no keyword.
const LATEST_BUCKET: &str = "latest";

/// Grouping strategy selected with `--group-by`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Type,
    Provider,
    Mode,
    Series,
}

impl GroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::Type => "type",
            GroupBy::Provider => "provider",
            GroupBy::Mode => "mode",
            GroupBy::Series => "series",
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupBy {
    type Err = InvalidGroupBy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "type" => Ok(GroupBy::Type),
            "provider" => Ok(GroupBy::Provider),
            "mode" => Ok(GroupBy::Mode),
            "series" => Ok(GroupBy::Series),
            _ => Err(InvalidGroupBy(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid --group-by value. Must be one of: type, provider, mode, series")]
pub struct InvalidGroupBy(pub String);

/// A named bucket of models.
#[derive(Debug, Clone, PartialEq)]
pub struct Group<'a> {
    pub name: String,
    pub models: Vec<&'a NormalizedModel>,
}

/// Buckets in display order, plus models withheld from every bucket.
#[derive(Debug, Clone, Default)]
pub struct Grouping<'a> {
    pub groups: Vec<Group<'a>>,
    /// Legacy models hidden by series grouping.
    pub legacy_hidden: usize,
}

/// Partition models into buckets. Empty buckets are dropped.
///
/// With series grouping, legacy models are withheld and counted unless
/// `show_all` is set, in which case they form a trailing `legacy` bucket.
pub fn group_models<'a>(
    models: &[&'a NormalizedModel],
    group_by: GroupBy,
    classifier: &SeriesClassifier,
    show_all: bool,
) -> Grouping<'a> {
    let grouping = match group_by {
        GroupBy::Type => Grouping {
            groups: by_type(models),
            legacy_hidden: 0,
        },
        GroupBy::Provider => Grouping {
            groups: by_label(models, |m| m.provider.as_str()),
            legacy_hidden: 0,
        },
        GroupBy::Mode => Grouping {
            groups: by_label(models, |m| m.mode.as_str()),
            legacy_hidden: 0,
        },
        GroupBy::Series => by_series(models, classifier, show_all),
    };

    tracing::debug!(
        group_by = %group_by,
        groups = grouping.groups.len(),
        legacy_hidden = grouping.legacy_hidden,
        "Models grouped"
    );
    grouping
}

/// A model lands in every keyword bucket its key mentions, or in `latest`.
fn by_type<'a>(models: &[&'a NormalizedModel]) -> Vec<Group<'a>> {
    let mut latest = Group {
        name: LATEST_BUCKET.to_string(),
        models: Vec::new(),
    };
    let mut keyword_groups: Vec<Group<'a>> = TYPE_KEYWORDS
        .iter()
        .map(|k| Group {
            name: k.to_string(),
            models: Vec::new(),
        })
        .collect();

    for &model in models {
        let key = model.key.to_lowercase();
        let mut matched = false;
        for (keyword, group) in TYPE_KEYWORDS.iter().zip(keyword_groups.iter_mut()) {
            if key.contains(keyword) {
                group.models.push(model);
                matched = true;
            }
        }
        if !matched {
            latest.models.push(model);
        }
    }

    std::iter::once(latest)
        .chain(keyword_groups)
        .filter(|g| !g.models.is_empty())
        .collect()
}

/// Buckets in order of first appearance; blank labels become `unknown`.
fn by_label<'a>(
    models: &[&'a NormalizedModel],
    label: impl Fn(&NormalizedModel) -> &str,
) -> Vec<Group<'a>> {
    let mut groups: Vec<Group<'a>> = Vec::new();
    for &model in models {
        let name = match label(model).trim() {
            "" => UNKNOWN_BUCKET,
            name => name,
        };
        match groups.iter_mut().find(|g| g.name == name) {
            Some(group) => group.models.push(model),
            None => groups.push(Group {
                name: name.to_string(),
                models: vec![model],
            }),
        }
    }
    groups
}

fn by_series<'a>(
    models: &[&'a NormalizedModel],
    classifier: &SeriesClassifier,
    show_all: bool,
) -> Grouping<'a> {
    let mut groups: Vec<Group<'a>> = Vec::new();
    let mut legacy = Vec::new();

    for &model in models {
        if classifier.is_legacy(&model.key, &model.provider) {
            legacy.push(model);
            continue;
        }
        let name = classifier.classify(&model.key, &model.provider).as_str();
        match groups.iter_mut().find(|g| g.name == name) {
            Some(group) => group.models.push(model),
            None => groups.push(Group {
                name: name.to_string(),
                models: vec![model],
            }),
        }
    }

    groups.sort_by_key(|g| classifier.bucket_rank(&g.name));

    let legacy_hidden = if show_all {
        if !legacy.is_empty() {
            groups.push(Group {
                name: LEGACY_BUCKET.to_string(),
                models: legacy,
            });
        }
        0
    } else {
        legacy.len()
    };

    Grouping {
        groups,
        legacy_hidden,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rstest::rstest;

    use super::*;
    use crate::catalog::RawCatalogEntry;

    fn model(provider: &str, id: &str, mode: Option<&str>) -> NormalizedModel {
        let raw = RawCatalogEntry {
            mode: mode.map(str::to_string),
            ..Default::default()
        };
        NormalizedModel::from_raw(format!("{provider}/{id}"), id.into(), provider.into(), &raw)
    }

    fn names(grouping: &Grouping<'_>) -> Vec<String> {
        grouping.groups.iter().map(|g| g.name.clone()).collect()
    }

    fn classifier() -> SeriesClassifier {
        SeriesClassifier::builtin().unwrap()
    }

    #[rstest]
    #[case("type", GroupBy::Type)]
    #[case("Provider", GroupBy::Provider)]
    #[case(" mode ", GroupBy::Mode)]
    #[case("series", GroupBy::Series)]
    fn test_parse_group_by(#[case] raw: &str, #[case] expected: GroupBy) {
        assert_eq!(raw.parse::<GroupBy>().unwrap(), expected);
    }

    #[test]
    fn test_invalid_group_by_message() {
        let err = "family".parse::<GroupBy>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid --group-by value. Must be one of: type, provider, mode, series"
        );
    }

    #[test]
    fn test_provider_and_mode_partition_without_loss() {
        let models = [
            model("openai", "gpt-4o", None),
            model("anthropic", "claude-opus-4", None),
            model("openai", "text-embedding-3-small", Some("embedding")),
            model("", "mystery", None),
        ];
        let refs: Vec<&NormalizedModel> = models.iter().collect();

        for group_by in [GroupBy::Provider, GroupBy::Mode] {
            let grouping = group_models(&refs, group_by, &classifier(), false);
            let all: Vec<&str> = grouping
                .groups
                .iter()
                .flat_map(|g| g.models.iter().map(|m| m.key.as_str()))
                .collect();
            let unique: HashSet<&str> = all.iter().copied().collect();
            assert_eq!(all.len(), refs.len());
            assert_eq!(unique.len(), refs.len());
        }

        let grouping = group_models(&refs, GroupBy::Provider, &classifier(), false);
        assert_eq!(names(&grouping), vec!["openai", "anthropic", "unknown"]);

        let grouping = group_models(&refs, GroupBy::Mode, &classifier(), false);
        assert_eq!(names(&grouping), vec!["chat", "embedding"]);
    }

    #[test]
    fn test_type_buckets() {
        let models = [
            model("openai", "gpt-4o", None),
            model("openai", "gpt-4o-realtime-preview", None),
            model("openai", "gpt-4o-audio-preview", None),
        ];
        let refs: Vec<&NormalizedModel> = models.iter().collect();

        let grouping = group_models(&refs, GroupBy::Type, &classifier(), false);
        assert_eq!(names(&grouping), vec!["latest", "preview", "realtime", "audio"]);
        assert_eq!(grouping.groups[1].models.len(), 2);
    }

    #[test]
    fn test_series_buckets_follow_declared_order() {
        let models = [
            model("openai", "o3", None),
            model("groq", "llama-3.1-8b", None),
            model("openai", "gpt-4o", None),
            model("openai", "omni-moderation-latest", None),
            model("openai", "gpt-5", None),
        ];
        let refs: Vec<&NormalizedModel> = models.iter().collect();

        let grouping = group_models(&refs, GroupBy::Series, &classifier(), false);
        assert_eq!(
            names(&grouping),
            vec!["gpt-5", "gpt-4o", "o-series", "other", "unknown"]
        );
    }

    #[test]
    fn test_series_legacy_hidden_or_trailing() {
        let models = [
            model("openai", "gpt-3.5-turbo", None),
            model("openai", "gpt-4o", None),
        ];
        let refs: Vec<&NormalizedModel> = models.iter().collect();

        let hidden = group_models(&refs, GroupBy::Series, &classifier(), false);
        assert_eq!(names(&hidden), vec!["gpt-4o"]);
        assert_eq!(hidden.legacy_hidden, 1);

        let shown = group_models(&refs, GroupBy::Series, &classifier(), true);
        assert_eq!(names(&shown), vec!["gpt-4o", "legacy"]);
        assert_eq!(shown.legacy_hidden, 0);
    }
}
