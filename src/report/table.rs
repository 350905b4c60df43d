//! Box-drawn fixed-width tables.

use termcolor::{Color, ColorSpec, WriteColor};

use super::{
    ReportError,
    rows::{Cell, Mark},
};

const HORIZONTAL: char = '═';
const VERTICAL: char = '║';

/// Corner and junction glyphs for one border line: left, junction, right.
struct Border {
    left: char,
    junction: char,
    right: char,
}

const TOP: Border = Border {
    left: '╔',
    junction: '╦',
    right: '╗',
};
const MIDDLE: Border = Border {
    left: '╠',
    junction: '╬',
    right: '╣',
};
const BOTTOM: Border = Border {
    left: '╚',
    junction: '╩',
    right: '╝',
};

fn mark_spec(mark: Mark) -> Option<ColorSpec> {
    match mark {
        Mark::Neutral => None,
        Mark::Best => {
            let mut spec = ColorSpec::new();
            spec.set_fg(Some(Color::Green));
            Some(spec)
        }
        Mark::Worse => {
            let mut spec = ColorSpec::new();
            spec.set_dimmed(true);
            Some(spec)
        }
    }
}

/// Display width of a cell; the glyphs used here are all single-width.
fn width(text: &str) -> usize {
    text.chars().count()
}

/// Column widths: the widest header or cell text in each column.
pub fn column_widths(headers: &[&str], rows: &[Vec<Cell>]) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            rows.iter()
                .map(|row| width(&row[col].text))
                .chain(std::iter::once(width(header)))
                .max()
                .unwrap_or(0)
        })
        .collect()
}

/// Write a table. Every row must have exactly one cell per header.
///
/// Rows are separated by a rule line; marks are painted through `out`, which
/// decides whether escape codes are emitted at all.
pub fn write_table<W: WriteColor>(
    out: &mut W,
    headers: &[&str],
    rows: &[Vec<Cell>],
) -> Result<(), ReportError> {
    if let Some((row, cells)) = rows
        .iter()
        .enumerate()
        .find(|(_, cells)| cells.len() != headers.len())
    {
        return Err(ReportError::ColumnMismatch {
            row,
            expected: headers.len(),
            found: cells.len(),
        });
    }

    let widths = column_widths(headers, rows);

    write_border(out, &widths, &TOP)?;
    let header_cells: Vec<Cell> = headers.iter().map(|h| Cell::plain(*h)).collect();
    write_row(out, &widths, &header_cells)?;
    write_border(out, &widths, &MIDDLE)?;

    for (idx, row) in rows.iter().enumerate() {
        write_row(out, &widths, row)?;
        if idx + 1 < rows.len() {
            write_border(out, &widths, &MIDDLE)?;
        }
    }

    write_border(out, &widths, &BOTTOM)?;
    Ok(())
}

fn write_border<W: WriteColor>(
    out: &mut W,
    widths: &[usize],
    border: &Border,
) -> std::io::Result<()> {
    let mut line = String::new();
    line.push(border.left);
    for (idx, col_width) in widths.iter().enumerate() {
        if idx > 0 {
            line.push(border.junction);
        }
        line.extend(std::iter::repeat_n(HORIZONTAL, col_width + 2));
    }
    line.push(border.right);
    writeln!(out, "{line}")
}

fn write_row<W: WriteColor>(out: &mut W, widths: &[usize], cells: &[Cell]) -> std::io::Result<()> {
    for (cell, col_width) in cells.iter().zip(widths) {
        write!(out, "{VERTICAL} ")?;
        match mark_spec(cell.mark) {
            Some(spec) => {
                out.set_color(&spec)?;
                write!(out, "{}", cell.text)?;
                out.reset()?;
            }
            None => write!(out, "{}", cell.text)?,
        }
        let padding = col_width.saturating_sub(width(&cell.text)) + 1;
        write!(out, "{:padding$}", "")?;
    }
    writeln!(out, "{VERTICAL}")
}
