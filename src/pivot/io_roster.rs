use calamine::{open_workbook, DataType, Reader, Xlsx};
use grade_pivot::{CellValue, Table};
use log::{debug, info};
use snafu::prelude::*;
use std::path::Path;

use crate::pivot::*;

/// Reads the student roster: the first row is the header, the other
/// non-blank rows are students.
pub fn read_roster(path: &Path, worksheet: Option<&str>, key: &str) -> PivotResult<Table> {
    let path_s = path.display().to_string();
    info!("Attempting to read student file {:?}", path_s);
    let wrange = get_range(&path_s, worksheet)?;

    let mut iter = wrange.rows();
    let header = iter.next().context(MissingHeaderSnafu {
        path: path_s.clone(),
    })?;
    let columns: Vec<String> = header.iter().map(header_name).collect();
    debug!("read_roster: header: {:?}", columns);

    let mut table = Table::new(columns);
    table
        .column_index(key)
        .context(MissingRosterColumnSnafu {
            column: key,
            path: path_s.clone(),
        })?;

    for (idx, row) in iter.enumerate() {
        let line: Vec<CellValue> = row.iter().map(read_cell).collect();
        if line.iter().all(|c| c.is_empty()) {
            debug!("read_roster: skipping blank row {}", idx + 2);
            continue;
        }
        table.rows.push(line);
    }
    info!("read_roster: read {} students", table.num_rows());
    Ok(table)
}

fn get_range(path: &str, worksheet: Option<&str>) -> PivotResult<calamine::Range<DataType>> {
    debug!("get_range: path: {:?} worksheet: {:?}", path, worksheet);
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    match worksheet {
        // A worksheet name was provided, use it.
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu {
                worksheet: name,
                path,
            })?
            .context(OpeningExcelSnafu { path }),
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path }),
    }
}

fn header_name(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.trim().to_string(),
        _ => read_cell(cell).display_text(),
    }
}

fn read_cell(cell: &DataType) -> CellValue {
    match cell {
        DataType::Empty => CellValue::Empty,
        DataType::String(s) if s.trim().is_empty() => CellValue::Empty,
        // Text stays text, even when it looks like a number.
        DataType::String(s) => CellValue::Text(s.clone()),
        DataType::Int(i) => CellValue::Number(*i as f64),
        DataType::Float(f) => CellValue::Number(*f),
        DataType::Bool(b) => CellValue::Text(b.to_string().to_uppercase()),
        // Serial date number, as stored by the spreadsheet.
        DataType::DateTime(f) => CellValue::Number(*f),
        DataType::Error(e) => CellValue::Text(format!("#{:?}", e)),
        #[allow(unreachable_patterns)]
        other => CellValue::Text(format!("{:?}", other)),
    }
}
