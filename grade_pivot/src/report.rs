//! Layout of the final spreadsheet: column widths, filter range and the
//! per-row total formulas. Writing the file itself is left to the caller.

use log::{debug, warn};

use crate::config::*;

pub const TOTAL_SCORE_COLUMN: &str = "Total Score";
pub const MAX_COLUMN_WIDTH: usize = 50;

/// Everything needed to write the report, with 0-based coordinates.
#[derive(PartialEq, Debug, Clone)]
pub struct ReportSheet {
    pub table: Table,
    /// One width per table column, in characters.
    pub column_widths: Vec<usize>,
    /// Last row and last column of the auto-filter, which starts at the origin.
    pub filter_end: (usize, usize),
    /// Position of the "Total Score" column, right after the table.
    pub total_column: usize,
    /// First and last question columns, when at least one question is in the header.
    pub question_span: Option<(usize, usize)>,
}

impl ReportSheet {
    /// The formula of the total for a data row (0-based, not counting the header).
    pub fn total_formula(&self, data_row: usize) -> Option<String> {
        self.question_span
            .map(|(first, last)| sum_formula(first, last, data_row + 2))
    }
}

pub fn layout_report(table: Table, question_columns: &[String]) -> ReportSheet {
    let column_widths: Vec<usize> = (0..table.num_columns())
        .map(|c| column_width(&table, c))
        .collect();

    // Positions follow the order of the questions, not the order of the header.
    let question_positions: Vec<usize> = question_columns
        .iter()
        .filter_map(|q| table.column_index(q))
        .collect();
    let question_span = match (question_positions.first(), question_positions.last()) {
        (Some(first), Some(last)) => Some((*first, *last)),
        _ => {
            warn!("layout_report: no question column in the header, totals are left empty");
            None
        }
    };
    debug!(
        "layout_report: widths: {:?} question span: {:?}",
        column_widths, question_span
    );

    ReportSheet {
        filter_end: (table.num_rows(), table.num_columns().saturating_sub(1)),
        total_column: table.num_columns(),
        column_widths,
        question_span,
        table,
    }
}

fn column_width(table: &Table, col: usize) -> usize {
    let header_len = table.columns[col].chars().count();
    let longest = (0..table.num_rows())
        .map(|r| table.cell(r, col).display_text().chars().count())
        .fold(header_len, usize::max);
    (longest + 2).min(MAX_COLUMN_WIDTH)
}

/// Spreadsheet letters of a 0-based column index: 0 is `A`, 26 is `AA`.
pub fn column_letter(col: usize) -> String {
    let mut letters: Vec<char> = Vec::new();
    let mut n = col + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// `=SUM(..)` over the columns `first..=last` of a 1-based spreadsheet row.
pub fn sum_formula(first: usize, last: usize, row_number: usize) -> String {
    format!(
        "=SUM({}{}:{}{})",
        column_letter(first),
        row_number,
        column_letter(last),
        row_number
    )
}
