use crate::catalog::NormalizedModel;

/// Attribute predicates combined with AND. Each unset option is a no-op.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    /// Provider substrings; a model passes if its provider contains any.
    pub providers: Vec<String>,
    pub function_calling: bool,
    pub tool_call: bool,
    pub vision: bool,
    pub reasoning: bool,
    /// Every listed input modality must be supported.
    pub input_modalities: Vec<String>,
    /// Every listed output modality must be supported.
    pub output_modalities: Vec<String>,
    /// Case-insensitive exact mode.
    pub mode: Option<String>,
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, model: &NormalizedModel) -> bool {
        if !self.providers.is_empty()
            && !self.providers.iter().any(|p| model.provider_matches(p))
        {
            return false;
        }
        if self.function_calling && model.supports_function_calling != Some(true) {
            return false;
        }
        if self.tool_call && model.tool_call != Some(true) {
            return false;
        }
        if self.vision && !model.supports_vision {
            return false;
        }
        if self.reasoning && model.reasoning != Some(true) {
            return false;
        }
        if !self
            .input_modalities
            .iter()
            .all(|m| model.has_input_modality(m))
        {
            return false;
        }
        if !self
            .output_modalities
            .iter()
            .all(|m| model.has_output_modality(m))
        {
            return false;
        }
        if let Some(mode) = &self.mode
            && !model.mode.eq_ignore_ascii_case(mode)
        {
            return false;
        }
        true
    }

    /// Keep the models that pass every predicate, in order.
    pub fn apply<'a>(&self, candidates: Vec<&'a NormalizedModel>) -> Vec<&'a NormalizedModel> {
        if self.is_empty() {
            return candidates;
        }
        candidates.into_iter().filter(|m| self.matches(m)).collect()
    }
}

/// Split comma-separated values, trimming blanks.
pub fn split_list<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| v.as_ref().split(','))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RawCatalogEntry;

    fn model(provider: &str, input: &[&str], tool_call: Option<bool>) -> NormalizedModel {
        let raw = RawCatalogEntry {
            input_modalities: Some(input.iter().map(|s| s.to_string()).collect()),
            tool_call,
            ..Default::default()
        };
        NormalizedModel::from_raw(
            format!("{provider}/m"),
            "m".into(),
            provider.into(),
            &raw,
        )
    }

    #[test]
    fn test_empty_filters_pass_everything() {
        let m = model("openai", &[], None);
        assert!(Filters::default().matches(&m));
    }

    #[test]
    fn test_input_modalities_are_a_conjunction() {
        let text_only = model("acme", &["text"], None);
        let text_image = model("acme", &["text", "image"], None);

        let filters = Filters {
            input_modalities: vec!["image".into()],
            ..Default::default()
        };
        assert!(!filters.matches(&text_only));
        assert!(filters.matches(&text_image));

        let filters = Filters {
            input_modalities: vec!["image".into(), "audio".into()],
            ..Default::default()
        };
        assert!(!filters.matches(&text_image));
    }

    #[test]
    fn test_provider_matches_any_substring() {
        let filters = Filters {
            providers: vec!["anthro".into(), "OPEN".into()],
            ..Default::default()
        };
        assert!(filters.matches(&model("openai", &[], None)));
        assert!(filters.matches(&model("anthropic", &[], None)));
        assert!(!filters.matches(&model("google", &[], None)));
    }

    #[test]
    fn test_capability_flags_require_true() {
        let filters = Filters {
            tool_call: true,
            ..Default::default()
        };
        assert!(filters.matches(&model("a", &[], Some(true))));
        assert!(!filters.matches(&model("a", &[], Some(false))));
        assert!(!filters.matches(&model("a", &[], None)));

        let filters = Filters {
            function_calling: true,
            ..Default::default()
        };
        assert!(filters.matches(&model("a", &[], Some(true))));
        assert!(!filters.matches(&model("a", &[], None)));
    }

    #[test]
    fn test_vision_and_mode() {
        let filters = Filters {
            vision: true,
            mode: Some("CHAT".into()),
            ..Default::default()
        };
        assert!(filters.matches(&model("a", &["image"], None)));
        assert!(!filters.matches(&model("a", &["text"], None)));
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list(&["text, image", "", "audio,"]),
            vec!["text", "image", "audio"]
        );
    }
}
