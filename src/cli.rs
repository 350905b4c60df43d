//! Command-line arguments and their validation into a [`QueryRequest`].

use std::path::PathBuf;

use clap::Parser;

use crate::{
    commands::{QueryRequest, RequestKind},
    observability::Verbosity,
    query::{Filters, GroupBy, InvalidGroupBy, PipelineOptions, SortField, UnknownSortField, split_list},
};

/// Look up and compare AI models from the models.dev catalog.
#[derive(Parser, Debug, Default)]
#[command(name = "aidex", version, about, long_about = None)]
pub struct Args {
    /// Search terms, joined into a single query
    #[arg(value_name = "SEARCH")]
    pub terms: Vec<String>,

    /// Search for specific model(s); repeatable
    #[arg(short, long = "model", value_name = "NAME")]
    pub models: Vec<String>,

    /// Filter by provider (comma-separated substrings, any may match)
    #[arg(short, long, value_name = "NAME")]
    pub provider: Option<String>,

    /// Show only models that support function calling
    #[arg(short, long)]
    pub function_calling: bool,

    /// Show only models that support tool calls
    #[arg(short, long)]
    pub tool_call: bool,

    /// Show only models that accept image input (same as --input image)
    #[arg(short, long)]
    pub vision: bool,

    /// Show only reasoning models
    #[arg(long)]
    pub reasoning: bool,

    /// Required input modalities (comma-separated, repeatable)
    #[arg(short, long, value_name = "MODALITIES")]
    pub input: Vec<String>,

    /// Required output modalities (comma-separated, repeatable)
    #[arg(short, long, value_name = "MODALITIES")]
    pub output: Vec<String>,

    /// Filter by mode (chat, embedding, completion, rerank, ...)
    #[arg(long, value_name = "TYPE")]
    pub mode: Option<String>,

    /// Sort by field: max_input_tokens, max_output_tokens, input_cost_per_token,
    /// output_cost_per_token, cache_read_cost_per_token, cache_write_cost_per_token,
    /// knowledge_cutoff
    #[arg(short, long, value_name = "FIELD")]
    pub sort_by: Option<String>,

    /// Sort by max input tokens (largest first)
    #[arg(long)]
    pub sort_token: bool,

    /// Sort by input cost per token (cheapest first)
    #[arg(long)]
    pub sort_cost: bool,

    /// Group results by: type, provider, mode or series (default: series)
    #[arg(
        short,
        long,
        value_name = "STRATEGY",
        num_args = 0..=1,
        default_missing_value = "series"
    )]
    pub group_by: Option<String>,

    /// Show all versions of models, including older snapshots and legacy series
    #[arg(long)]
    pub show_all: bool,

    /// Compare multiple models (comma-separated)
    #[arg(short, long, value_name = "MODELS")]
    pub compare: Option<String>,

    /// Show debug output on stderr (level 1 or 2)
    #[arg(
        long,
        value_name = "LEVEL",
        num_args = 0..=1,
        default_missing_value = "1",
        default_value_t = 0
    )]
    pub verbose: u8,

    /// Path to config file (defaults to ~/.config/aidex/aidex.toml if it exists)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Catalog URL, overriding the config file
    #[arg(long, value_name = "URL")]
    pub catalog_url: Option<String>,
}

/// Argument combinations that cannot be run.
#[derive(Debug, thiserror::Error)]
pub enum UsageError {
    #[error(transparent)]
    InvalidGroupBy(#[from] InvalidGroupBy),

    #[error("--group-by can only be used with --model or --provider flag")]
    GroupByWithoutTarget,

    #[error(transparent)]
    UnknownSortField(#[from] UnknownSortField),
}

impl Args {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_level(self.verbose)
    }

    /// Validate the arguments and build the request they describe.
    pub fn to_request(&self) -> Result<QueryRequest, UsageError> {
        let group_by = self
            .group_by
            .as_deref()
            .map(str::parse::<GroupBy>)
            .transpose()?;
        if group_by.is_some() && !self.has_grouping_target() {
            return Err(UsageError::GroupByWithoutTarget);
        }

        let options = PipelineOptions {
            sort: self.sort_field()?,
            group_by,
            show_all: self.show_all,
            verbosity: self.verbosity(),
        };

        let kind = match &self.compare {
            Some(compare) => RequestKind::Compare {
                terms: split_list(&[compare]),
            },
            None => RequestKind::Search {
                queries: self.queries(),
            },
        };

        Ok(QueryRequest {
            kind,
            filters: self.filters(),
            options,
        })
    }

    fn has_grouping_target(&self) -> bool {
        !self.models.is_empty()
            || !self.terms.is_empty()
            || self.provider.is_some()
            || self.compare.is_some()
    }

    /// `--sort-token` and `--sort-cost` take precedence over `--sort-by`.
    fn sort_field(&self) -> Result<Option<SortField>, UnknownSortField> {
        if self.sort_token {
            return Ok(Some(SortField::MaxInputTokens));
        }
        if self.sort_cost {
            return Ok(Some(SortField::InputCostPerToken));
        }
        self.sort_by
            .as_deref()
            .map(|field| field.to_lowercase().parse())
            .transpose()
    }

    /// Positional terms form one query; each `--model` is another.
    fn queries(&self) -> Vec<String> {
        let joined = self.terms.join(" ");
        std::iter::once(joined)
            .chain(self.models.iter().cloned())
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .collect()
    }

    fn filters(&self) -> Filters {
        let mut input_modalities = split_list(&self.input);
        if self.vision && !input_modalities.iter().any(|m| m.eq_ignore_ascii_case("image")) {
            input_modalities.push("image".to_string());
        }

        Filters {
            providers: self
                .provider
                .as_deref()
                .map(|p| split_list(&[p]))
                .unwrap_or_default(),
            function_calling: self.function_calling,
            tool_call: self.tool_call,
            vision: self.vision,
            reasoning: self.reasoning,
            input_modalities,
            output_modalities: split_list(&self.output),
            mode: self
                .mode
                .as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string),
        }
    }
}
