//! Query resolution over the catalog.
//!
//! A query is resolved in three tiers, stopping at the first that yields
//! anything:
//!
//! 1. **Exact**: the query is a catalog key, verbatim.
//! 2. **Prefix**: the key, bare id or display name starts with the query
//!    (case-insensitive). Results keep catalog order.
//! 3. **Fuzzy**: token match against the term index, ranked by relevance with
//!    name matches boosted. Equal scores keep catalog order.
//!
//! A blank query resolves to the whole catalog.

mod index;

pub use index::{Field, MatchOptions, TermIndex, levenshtein, tokenize};

use crate::{
    catalog::{Catalog, NormalizedModel},
    config::SearchConfig,
    observability::Verbosity,
};

/// Which tier produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    /// Blank query: every model in catalog order.
    All,
    Exact,
    Prefix,
    Fuzzy,
    /// No tier matched.
    None,
}

/// Models matched by one query, best first.
#[derive(Debug, Clone)]
pub struct SearchResult<'c> {
    pub tier: MatchTier,
    pub models: Vec<&'c NormalizedModel>,
}

impl<'c> SearchResult<'c> {
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }
}

/// Search index built once per run over a read-only catalog.
pub struct SearchIndex<'c> {
    catalog: &'c Catalog,
    terms: TermIndex,
    options: MatchOptions,
    verbosity: Verbosity,
}

impl<'c> SearchIndex<'c> {
    pub fn build(catalog: &'c Catalog, config: &SearchConfig, verbosity: Verbosity) -> Self {
        let terms = TermIndex::build(catalog);

        tracing::debug!(
            models = catalog.len(),
            terms = terms.term_count(),
            "Search index built"
        );
        if verbosity.explains() {
            let sample: Vec<&str> = catalog.iter().take(3).map(|m| m.key.as_str()).collect();
            tracing::trace!(?sample, "Sample models indexed");
        }

        Self {
            catalog,
            terms,
            options: MatchOptions {
                prefix: config.prefix,
                fuzzy: config.fuzzy,
                max_fuzzy: config.max_fuzzy,
                name_boost: config.name_boost,
            },
            verbosity,
        }
    }

    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    /// Resolve a query. Never fails; no match is an empty result.
    pub fn search(&self, query: &str) -> SearchResult<'c> {
        let query = query.trim();

        let result = if query.is_empty() {
            SearchResult {
                tier: MatchTier::All,
                models: self.catalog.iter().collect(),
            }
        } else if let Some(model) = self.catalog.get(query) {
            SearchResult {
                tier: MatchTier::Exact,
                models: vec![model],
            }
        } else {
            let prefixed = self.prefix_matches(query);
            if !prefixed.is_empty() {
                SearchResult {
                    tier: MatchTier::Prefix,
                    models: prefixed,
                }
            } else {
                let ranked = self.fuzzy_matches(query);
                let tier = if ranked.is_empty() {
                    MatchTier::None
                } else {
                    MatchTier::Fuzzy
                };
                SearchResult {
                    tier,
                    models: ranked,
                }
            }
        };

        tracing::debug!(
            query,
            tier = ?result.tier,
            matches = result.len(),
            "Query resolved"
        );
        result
    }

    fn prefix_matches(&self, query: &str) -> Vec<&'c NormalizedModel> {
        let needle = query.to_lowercase();
        self.catalog
            .iter()
            .filter(|model| {
                [&model.key, &model.id, &model.name]
                    .iter()
                    .any(|candidate| candidate.to_lowercase().starts_with(&needle))
            })
            .collect()
    }

    fn fuzzy_matches(&self, query: &str) -> Vec<&'c NormalizedModel> {
        let mut scored: Vec<(usize, f64)> = self
            .terms
            .score(query, &self.options)
            .into_iter()
            .filter(|(_, score)| *score > 0.0)
            .collect();
        // Stable sort over ascending positions keeps catalog order on ties.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        let models = self.catalog.models();
        if self.verbosity.explains() {
            for (doc, score) in scored.iter().take(10) {
                tracing::trace!(key = %models[*doc].key, score, "Fuzzy candidate");
            }
        }

        scored.into_iter().map(|(doc, _)| &models[doc]).collect()
    }
}
