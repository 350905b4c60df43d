//! Text report: heading, one table per section, summary and tips.

mod format;
mod rows;
mod table;

pub use format::{
    CHECK, CROSS, NOT_AVAILABLE, format_cost, format_flag, format_modalities, format_text,
    format_tokens,
};
pub use rows::{Cell, Column, Mark, TableData, build_rows};
pub use table::{column_widths, write_table};
use termcolor::{Color, ColorSpec, WriteColor};

use crate::query::QueryOutput;

pub const DETAILS_HEADING: &str = "Model Details:";
pub const COMPARISON_HEADING: &str = "Model Comparison:";

const GROUP_TIP: &str = "Tip: Use --group-by type|provider|mode|series to organize results";
const SORT_TIP: &str = "Tip: Use --sort-by <field> or --sort-token/--sort-cost to sort results";

/// What the summary block should mention.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryHints {
    pub grouped: bool,
    pub sorted: bool,
}

/// Report rendering errors.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("row {row} has {found} cells, expected {expected}")]
    ColumnMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Render the whole report for one command.
pub fn write_report<W: WriteColor>(
    out: &mut W,
    heading: &str,
    output: &QueryOutput<'_>,
    hints: SummaryHints,
) -> Result<(), ReportError> {
    writeln!(out)?;
    writeln!(out, "{heading}")?;

    for section in &output.sections {
        let table = build_rows(&section.models);
        match &section.title {
            Some(title) => {
                writeln!(out)?;
                let mut bold = ColorSpec::new();
                bold.set_bold(true);
                out.set_color(&bold)?;
                write!(out, "{}", title.to_uppercase())?;
                out.reset()?;
                writeln!(out, " Models:")?;
                write_table(out, &table.headers, &table.rows)?;
                writeln!(out)?;
            }
            None => write_table(out, &table.headers, &table.rows)?,
        }
    }

    write_summary(out, output.hidden, hints)?;
    Ok(())
}

fn write_summary<W: WriteColor>(
    out: &mut W,
    hidden: usize,
    hints: SummaryHints,
) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Summary:")?;

    if hidden > 0 {
        let mut yellow = ColorSpec::new();
        yellow.set_fg(Some(Color::Yellow));
        out.set_color(&yellow)?;
        write!(out, "{hidden} entries hidden")?;
        out.reset()?;
        writeln!(out, " (older models) - use --show-all to see all versions")?;
    }

    let mut dim = ColorSpec::new();
    dim.set_dimmed(true);
    for (show, tip) in [(!hints.grouped, GROUP_TIP), (!hints.sorted, SORT_TIP)] {
        if show {
            out.set_color(&dim)?;
            write!(out, "{tip}")?;
            out.reset()?;
            writeln!(out)?;
        }
    }
    Ok(())
}
