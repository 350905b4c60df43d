use std::collections::HashSet;

use super::CommandError;
use crate::{catalog::NormalizedModel, search::SearchIndex};

/// Resolve every comparison term and union the matches.
///
/// Fails on the first term that matches nothing, and when fewer than two
/// distinct models remain.
pub fn collect_comparison<'c>(
    index: &SearchIndex<'c>,
    terms: &[String],
) -> Result<Vec<&'c NormalizedModel>, CommandError> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut models = Vec::new();

    for term in terms {
        let result = index.search(term);
        if result.is_empty() {
            return Err(CommandError::NoMatch(term.clone()));
        }
        for model in result.models {
            if seen.insert(model.key.as_str()) {
                models.push(model);
            }
        }
    }

    if models.len() < 2 {
        return Err(CommandError::TooFewToCompare);
    }

    tracing::debug!(terms = terms.len(), models = models.len(), "Comparison resolved");
    Ok(models)
}
