//! Command execution: resolve queries, run the pipeline, render the report.

mod compare;
mod search;

pub use compare::collect_comparison;
pub use search::collect_candidates;
use termcolor::WriteColor;

use crate::{
    query::{Filters, PipelineOptions, QueryOutput, run_pipeline},
    report::{COMPARISON_HEADING, DETAILS_HEADING, ReportError, SummaryHints, write_report},
    search::SearchIndex,
    series::SeriesClassifier,
};

/// Notice printed when an unfiltered listing finds an empty catalog.
pub const EMPTY_CATALOG_NOTICE: &str =
    "No models available: the model catalog is empty or could not be loaded";

/// What the user asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestKind {
    /// Free-text queries; their matches are unioned. No query lists the
    /// whole catalog.
    Search { queries: Vec<String> },
    /// Each term must match at least one model.
    Compare { terms: Vec<String> },
}

/// A validated request, independent of how it was parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub kind: RequestKind,
    /// Ignored for comparisons.
    pub filters: Filters,
    pub options: PipelineOptions,
}

/// How a successful command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Rendered { shown: usize, hidden: usize },
    EmptyCatalog,
}

/// Command failures; each maps to exit code 1.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("No models found matching: {0}")]
    NoMatch(String),

    #[error("Please provide at least 2 different models to compare")]
    TooFewToCompare,

    #[error("No models found matching the specified criteria")]
    NoResults,

    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Run a request against an indexed catalog and write the report to `out`.
///
/// Nothing is written when the command fails.
pub fn execute<W: WriteColor>(
    request: &QueryRequest,
    index: &SearchIndex<'_>,
    classifier: &SeriesClassifier,
    out: &mut W,
) -> Result<Outcome, CommandError> {
    let (heading, output) = match &request.kind {
        RequestKind::Search { queries } => {
            if queries.is_empty() && request.filters.is_empty() && index.catalog().is_empty() {
                writeln!(out, "{EMPTY_CATALOG_NOTICE}").map_err(ReportError::from)?;
                return Ok(Outcome::EmptyCatalog);
            }
            let candidates = collect_candidates(index, queries);
            let output = run_pipeline(candidates, &request.filters, &request.options, classifier);
            if output.is_empty() {
                return Err(CommandError::NoResults);
            }
            (DETAILS_HEADING, output)
        }
        RequestKind::Compare { terms } => {
            let candidates = collect_comparison(index, terms)?;
            let output = run_pipeline(
                candidates,
                &Filters::default(),
                &request.options,
                classifier,
            );
            // Legacy hiding can leave fewer than two models to compare.
            if output.model_count() < 2 {
                return Err(CommandError::TooFewToCompare);
            }
            (COMPARISON_HEADING, output)
        }
    };

    render(out, heading, &output, &request.options)?;
    Ok(Outcome::Rendered {
        shown: output.model_count(),
        hidden: output.hidden,
    })
}

fn render<W: WriteColor>(
    out: &mut W,
    heading: &str,
    output: &QueryOutput<'_>,
    options: &PipelineOptions,
) -> Result<(), ReportError> {
    let hints = SummaryHints {
        grouped: options.group_by.is_some(),
        sorted: options.sort.is_some(),
    };
    write_report(out, heading, output, hints)
}
