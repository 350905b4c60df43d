//! Inverted term index over the catalog's searchable fields.

use std::collections::BTreeMap;

use crate::catalog::{Catalog, NormalizedModel};

/// Weight of a query term that is a strict prefix of an indexed term.
const PREFIX_WEIGHT: f64 = 0.375;

/// Weight of a query term within the edit-distance tolerance of an indexed term.
const FUZZY_WEIGHT: f64 = 0.45;

/// Searchable document fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    /// Key, bare id and display name.
    Name,
    Provider,
    Mode,
    /// Free text: key, provider and mode together.
    Content,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Name, Field::Provider, Field::Mode, Field::Content];

    fn text(self, model: &NormalizedModel) -> String {
        match self {
            Field::Name => format!("{} {} {}", model.key, model.id, model.name),
            Field::Provider => model.provider.clone(),
            Field::Mode => model.mode.clone(),
            Field::Content => format!("{} {} {}", model.key, model.provider, model.mode),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Posting {
    doc: usize,
    field: Field,
    tf: u32,
}

/// How a query term reached an indexed term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TermMatch {
    Exact,
    Prefix { extra: usize },
    Fuzzy { distance: usize },
}

impl TermMatch {
    /// Relative weight for a query term of `len` characters.
    fn weight(self, len: usize) -> f64 {
        let len = len as f64;
        match self {
            TermMatch::Exact => 1.0,
            TermMatch::Prefix { extra } => PREFIX_WEIGHT * len / (len + 0.3 * extra as f64),
            TermMatch::Fuzzy { distance } => FUZZY_WEIGHT * len / (len + distance as f64),
        }
    }
}

/// Matching options for one query.
#[derive(Debug, Clone, Copy)]
pub struct MatchOptions {
    pub prefix: bool,
    pub fuzzy: f64,
    pub max_fuzzy: usize,
    pub name_boost: f64,
}

impl MatchOptions {
    /// Largest edit distance accepted for a query term of `len` characters.
    pub fn max_distance(&self, len: usize) -> usize {
        ((self.fuzzy * len as f64).round() as usize).min(self.max_fuzzy)
    }

    fn boost(&self, field: Field) -> f64 {
        match field {
            Field::Name => self.name_boost,
            _ => 1.0,
        }
    }
}

/// Term → postings over every model in a catalog, built in one pass.
#[derive(Debug, Default)]
pub struct TermIndex {
    terms: BTreeMap<String, Vec<Posting>>,
    doc_count: usize,
}

impl TermIndex {
    pub fn build(catalog: &Catalog) -> Self {
        let mut terms: BTreeMap<String, Vec<Posting>> = BTreeMap::new();

        for (doc, model) in catalog.iter().enumerate() {
            for field in Field::ALL {
                for term in tokenize(&field.text(model)) {
                    let postings = terms.entry(term).or_default();
                    match postings.last_mut() {
                        Some(p) if p.doc == doc && p.field == field => p.tf += 1,
                        _ => postings.push(Posting { doc, field, tf: 1 }),
                    }
                }
            }
        }

        Self {
            terms,
            doc_count: catalog.len(),
        }
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Relevance scores by document position. Documents that match no query
    /// term are absent.
    pub fn score(&self, query: &str, options: &MatchOptions) -> BTreeMap<usize, f64> {
        let mut scores: BTreeMap<usize, f64> = BTreeMap::new();

        for query_term in tokenize(query) {
            let query_len = query_term.chars().count();
            let max_distance = options.max_distance(query_len);

            for (term, postings) in &self.terms {
                let Some(matched) = match_term(&query_term, term, options.prefix, max_distance)
                else {
                    continue;
                };
                let weight = matched.weight(query_len) * self.idf(postings);

                for posting in postings {
                    let tf = f64::from(posting.tf);
                    *scores.entry(posting.doc).or_default() +=
                        weight * options.boost(posting.field) * tf / (tf + 0.5);
                }
            }
        }

        scores
    }

    fn idf(&self, postings: &[Posting]) -> f64 {
        let mut docs: Vec<usize> = postings.iter().map(|p| p.doc).collect();
        docs.dedup();
        let df = docs.len() as f64;
        let n = self.doc_count as f64;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }
}

/// Split on whitespace and commas, case-folded.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn match_term(query: &str, term: &str, prefix: bool, max_distance: usize) -> Option<TermMatch> {
    if term == query {
        return Some(TermMatch::Exact);
    }

    let query_len = query.chars().count();
    let term_len = term.chars().count();

    if prefix && term.starts_with(query) {
        return Some(TermMatch::Prefix {
            extra: term_len - query_len,
        });
    }

    if max_distance == 0 || term_len.abs_diff(query_len) > max_distance {
        return None;
    }
    let distance = levenshtein(query, term);
    (distance <= max_distance).then_some(TermMatch::Fuzzy { distance })
}

/// Edit distance over characters.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
