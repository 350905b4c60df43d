use std::collections::HashSet;

use crate::{catalog::NormalizedModel, search::SearchIndex};

/// Union the matches of every query in order, first occurrence wins.
/// No queries at all means the whole catalog.
pub fn collect_candidates<'c>(
    index: &SearchIndex<'c>,
    queries: &[String],
) -> Vec<&'c NormalizedModel> {
    if queries.is_empty() {
        return index.search("").models;
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut candidates = Vec::new();
    for query in queries {
        for model in index.search(query).models {
            if seen.insert(model.key.as_str()) {
                candidates.push(model);
            }
        }
    }
    candidates
}
