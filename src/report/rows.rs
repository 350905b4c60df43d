//! Model rows with per-column best/worse marks.

use crate::{
    catalog::NormalizedModel,
    query::{Polarity, SortField},
};

use super::format::{format_cost, format_flag, format_modalities, format_text, format_tokens};

/// How a cell compares with the same column in other rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mark {
    #[default]
    Neutral,
    Best,
    Worse,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    pub mark: Mark,
}

impl Cell {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mark: Mark::Neutral,
        }
    }
}

/// Report columns, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Model,
    Provider,
    Mode,
    Knowledge,
    Input,
    Output,
    Reasoning,
    Tools,
    Context,
    MaxOut,
    InputCost,
    OutputCost,
    CacheReadCost,
    CacheWriteCost,
}

impl Column {
    pub const ALL: [Column; 14] = [
        Column::Model,
        Column::Provider,
        Column::Mode,
        Column::Knowledge,
        Column::Input,
        Column::Output,
        Column::Reasoning,
        Column::Tools,
        Column::Context,
        Column::MaxOut,
        Column::InputCost,
        Column::OutputCost,
        Column::CacheReadCost,
        Column::CacheWriteCost,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            Column::Model => "Model",
            Column::Provider => "Provider",
            Column::Mode => "Mode",
            Column::Knowledge => "Knowledge",
            Column::Input => "Input",
            Column::Output => "Output",
            Column::Reasoning => "Reasoning",
            Column::Tools => "Tools",
            Column::Context => "Context",
            Column::MaxOut => "Max Out",
            Column::InputCost => "$/1M In",
            Column::OutputCost => "$/1M Out",
            Column::CacheReadCost => "$/1M Cache R",
            Column::CacheWriteCost => "$/1M Cache W",
        }
    }

    /// The numeric field behind a column, for ranking.
    fn field(&self) -> Option<SortField> {
        match self {
            Column::Context => Some(SortField::MaxInputTokens),
            Column::MaxOut => Some(SortField::MaxOutputTokens),
            Column::InputCost => Some(SortField::InputCostPerToken),
            Column::OutputCost => Some(SortField::OutputCostPerToken),
            Column::CacheReadCost => Some(SortField::CacheReadCostPerToken),
            Column::CacheWriteCost => Some(SortField::CacheWriteCostPerToken),
            _ => None,
        }
    }

    fn flag(&self, model: &NormalizedModel) -> Option<Option<bool>> {
        match self {
            Column::Reasoning => Some(model.reasoning),
            Column::Tools => Some(model.tool_call),
            _ => None,
        }
    }

    fn text(&self, model: &NormalizedModel) -> String {
        match self {
            Column::Model => model.key.clone(),
            Column::Provider => format_text(Some(model.provider.as_str())),
            Column::Mode => format_text(Some(model.mode.as_str())),
            Column::Knowledge => format_text(model.knowledge_cutoff.as_deref()),
            Column::Input => format_modalities(&model.input_modalities),
            Column::Output => format_modalities(&model.output_modalities),
            Column::Reasoning => format_flag(model.reasoning),
            Column::Tools => format_flag(model.tool_call),
            Column::Context => format_tokens(model.max_input_tokens),
            Column::MaxOut => format_tokens(model.max_output_tokens),
            Column::InputCost => format_cost(model.input_cost_per_token),
            Column::OutputCost => format_cost(model.output_cost_per_token),
            Column::CacheReadCost => format_cost(model.cache_read_cost_per_token),
            Column::CacheWriteCost => format_cost(model.cache_write_cost_per_token),
        }
    }
}

/// Headers and marked rows for one table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableData {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<Cell>>,
}

/// Build rows for a table. Marks are only assigned when there is more than
/// one row to compare against.
pub fn build_rows(models: &[&NormalizedModel]) -> TableData {
    let compare = models.len() > 1;

    let best: Vec<Option<f64>> = Column::ALL
        .iter()
        .map(|column| {
            let field = column.field()?;
            let values = models.iter().filter_map(|m| field.value(m));
            match field.polarity() {
                Polarity::HigherIsBetter => values.reduce(f64::max),
                Polarity::LowerIsBetter => values.reduce(f64::min),
            }
        })
        .collect();

    let rows = models
        .iter()
        .map(|model| {
            Column::ALL
                .iter()
                .zip(&best)
                .map(|(column, best)| {
                    let mark = if !compare {
                        Mark::Neutral
                    } else if let Some(flag) = column.flag(model) {
                        match flag {
                            Some(true) => Mark::Best,
                            Some(false) => Mark::Worse,
                            None => Mark::Neutral,
                        }
                    } else {
                        match (column.field().and_then(|f| f.value(model)), best) {
                            (Some(value), Some(best)) if value == *best => Mark::Best,
                            (Some(_), Some(_)) => Mark::Worse,
                            _ => Mark::Neutral,
                        }
                    };
                    Cell {
                        text: column.text(model),
                        mark,
                    }
                })
                .collect()
        })
        .collect();

    TableData {
        headers: Column::ALL.iter().map(Column::header).collect(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{RawCatalogEntry, RawCost, RawLimit};

    fn model(
        key: &str,
        input_cost: Option<f64>,
        context: Option<u64>,
        reasoning: Option<bool>,
    ) -> NormalizedModel {
        let raw = RawCatalogEntry {
            reasoning,
            cost: Some(RawCost {
                input: input_cost,
                ..Default::default()
            }),
            limit: Some(RawLimit {
                context,
                ..Default::default()
            }),
            ..Default::default()
        };
        NormalizedModel::from_raw(key.into(), key.into(), "acme".into(), &raw)
    }

    fn column(table: &TableData, header: &str) -> Vec<Cell> {
        let idx = table.headers.iter().position(|h| *h == header).unwrap();
        table.rows.iter().map(|r| r[idx].clone()).collect()
    }

    #[test]
    fn test_headers() {
        let table = build_rows(&[]);
        assert_eq!(table.headers.len(), 14);
        assert_eq!(table.headers[0], "Model");
        assert_eq!(table.headers[13], "$/1M Cache W");
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_single_row_is_unmarked() {
        let m = model("a", Some(1.0), Some(1000), Some(true));
        let table = build_rows(&[&m]);
        assert!(table.rows[0].iter().all(|c| c.mark == Mark::Neutral));
    }

    #[test]
    fn test_best_per_polarity() {
        let cheap_small = model("a", Some(0.5), Some(8_000), Some(false));
        let pricey_large = model("b", Some(30.0), Some(200_000), Some(true));
        let unknown = model("c", None, None, None);
        let table = build_rows(&[&cheap_small, &pricey_large, &unknown]);

        let costs = column(&table, "$/1M In");
        assert_eq!(costs[0].mark, Mark::Best);
        assert_eq!(costs[1].mark, Mark::Worse);
        assert_eq!(costs[2].mark, Mark::Neutral);
        assert_eq!(costs[2].text, "N/A");

        let context = column(&table, "Context");
        assert_eq!(context[0].mark, Mark::Worse);
        assert_eq!(context[1].mark, Mark::Best);
        assert_eq!(context[1].text, "200k");

        let reasoning = column(&table, "Reasoning");
        assert_eq!(reasoning[0].mark, Mark::Worse);
        assert_eq!(reasoning[1].mark, Mark::Best);
        assert_eq!(reasoning[2].mark, Mark::Neutral);

        let names = column(&table, "Model");
        assert!(names.iter().all(|c| c.mark == Mark::Neutral));
    }

    #[test]
    fn test_zero_cost_is_best_and_rendered() {
        let free = model("free", Some(0.0), None, None);
        let paid = model("paid", Some(2.0), None, None);
        let table = build_rows(&[&paid, &free]);

        let costs = column(&table, "$/1M In");
        assert_eq!(costs[1].text, "$0.00");
        assert_eq!(costs[1].mark, Mark::Best);
    }
}
