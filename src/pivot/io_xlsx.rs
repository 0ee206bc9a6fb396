use grade_pivot::report::{ReportSheet, TOTAL_SCORE_COLUMN};
use grade_pivot::CellValue;
use log::{debug, info};
use rust_xlsxwriter::{Format, Workbook};
use snafu::prelude::*;
use std::path::Path;

use crate::pivot::*;

/// Writes the report to an Excel file, replacing any existing file.
///
/// The write is not atomic: a failure may leave a partial file behind.
pub fn write_report(sheet: &ReportSheet, path: &Path) -> PivotResult<()> {
    let path_s = path.display().to_string();
    info!("Attempting to write report {:?}", path_s);
    let ctx = || WritingExcelSnafu {
        path: path_s.clone(),
    };

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();

    for (col, title) in sheet.table.columns.iter().enumerate() {
        worksheet
            .write_string_with_format(0, sheet_col(col)?, title, &bold)
            .context(ctx())?;
    }
    for (idx, row) in sheet.table.rows.iter().enumerate() {
        let row_num = sheet_row(idx + 1)?;
        for (col, cell) in row.iter().enumerate() {
            match cell {
                CellValue::Empty => {}
                CellValue::Number(x) => {
                    worksheet
                        .write_number(row_num, sheet_col(col)?, *x)
                        .context(ctx())?;
                }
                CellValue::Text(s) => {
                    worksheet
                        .write_string(row_num, sheet_col(col)?, s)
                        .context(ctx())?;
                }
            }
        }
    }

    for (col, width) in sheet.column_widths.iter().enumerate() {
        worksheet
            .set_column_width(sheet_col(col)?, *width as f64)
            .context(ctx())?;
    }
    worksheet.set_freeze_panes(1, 0).context(ctx())?;
    let (last_row, last_col) = sheet.filter_end;
    worksheet
        .autofilter(0, 0, sheet_row(last_row)?, sheet_col(last_col)?)
        .context(ctx())?;

    let total_col = sheet_col(sheet.total_column)?;
    worksheet
        .write_string_with_format(0, total_col, TOTAL_SCORE_COLUMN, &bold)
        .context(ctx())?;
    for idx in 0..sheet.table.num_rows() {
        if let Some(formula) = sheet.total_formula(idx) {
            worksheet
                .write_formula(sheet_row(idx + 1)?, total_col, formula.as_str())
                .context(ctx())?;
        }
    }
    debug!(
        "write_report: {} rows, total in column {}",
        sheet.table.num_rows(),
        total_col
    );

    workbook.save(path).context(ctx())?;
    Ok(())
}

fn sheet_col(col: usize) -> PivotResult<u16> {
    match u16::try_from(col) {
        Ok(c) => Ok(c),
        Err(_) => whatever!("Too many columns for a worksheet: column {}", col),
    }
}

fn sheet_row(row: usize) -> PivotResult<u32> {
    match u32::try_from(row) {
        Ok(r) => Ok(r),
        Err(_) => whatever!("Too many rows for a worksheet: row {}", row),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook, DataType, Reader, Xlsx};
    use grade_pivot::report::layout_report;
    use grade_pivot::Table;
    use std::fs::File;
    use std::io::Read;

    // Raw XML of a part of the saved workbook.
    fn read_part(path: &Path, name: &str) -> String {
        let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut xml = String::new();
        part.read_to_string(&mut xml).unwrap();
        xml
    }

    fn sample() -> Table {
        Table {
            columns: vec!["CandidateExternalId".to_string(), "UserId".to_string(), "Q1".to_string(), "Q2".to_string()],
            rows: vec![
                vec![
                    CellValue::Text("C1".to_string()),
                    CellValue::Number(11.0),
                    CellValue::Number(5.0),
                    CellValue::Number(7.0),
                ],
                vec![
                    CellValue::Text("C2".to_string()),
                    CellValue::Number(12.0),
                    CellValue::Number(3.0),
                    CellValue::Empty,
                ],
            ],
        }
    }

    #[test]
    fn writes_totals() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("report.xlsx");
        let sheet = layout_report(sample(), &["Q1".to_string(), "Q2".to_string()]);
        write_report(&sheet, &p).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&p).unwrap();
        let values = workbook.worksheet_range_at(0).unwrap().unwrap();
        assert_eq!(
            values.get_value((0, 4)),
            Some(&DataType::String("Total Score".to_string()))
        );
        assert_eq!(values.get_value((2, 1)), Some(&DataType::Float(12.0)));
        assert_eq!(values.get_value((2, 3)), Some(&DataType::Empty));

        let formulas = workbook.worksheet_formula("Sheet1").unwrap().unwrap();
        let f1 = formulas.get_value((1, 4)).unwrap();
        let f2 = formulas.get_value((2, 4)).unwrap();
        assert!(f1.ends_with("SUM(C2:D2)"), "{}", f1);
        assert!(f2.ends_with("SUM(C3:D3)"), "{}", f2);
    }

    #[test]
    fn header_only_without_questions() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("empty.xlsx");
        let table = Table::new(vec!["CandidateExternalId".to_string(), "UserId".to_string()]);
        let sheet = layout_report(table, &[]);
        write_report(&sheet, &p).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&p).unwrap();
        let values = workbook.worksheet_range_at(0).unwrap().unwrap();
        assert_eq!(values.height(), 1);
        assert_eq!(
            values.get_value((0, 2)),
            Some(&DataType::String("Total Score".to_string()))
        );
    }

    #[test]
    fn header_is_frozen_bold_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("report.xlsx");
        let sheet = layout_report(sample(), &["Q1".to_string(), "Q2".to_string()]);
        write_report(&sheet, &p).unwrap();

        let xml = read_part(&p, "xl/worksheets/sheet1.xml");
        assert!(xml.contains("<pane ySplit=\"1\""), "{}", xml);
        assert!(xml.contains("state=\"frozen\""), "{}", xml);
        assert!(xml.contains("<autoFilter ref=\"A1:D3\"/>"), "{}", xml);
        // Header cells carry a style, data cells do not.
        for cell in ["A1", "B1", "C1", "D1", "E1"] {
            assert!(xml.contains(&format!("<c r=\"{}\" s=\"1\"", cell)), "{}", cell);
        }
        assert!(!xml.contains("<c r=\"B2\" s=\"1\""), "{}", xml);
        let styles = read_part(&p, "xl/styles.xml");
        assert!(styles.contains("<b/>"), "{}", styles);
    }

    #[test]
    fn positions_must_fit_a_worksheet() {
        assert_eq!(sheet_col(3).unwrap(), 3);
        assert!(matches!(
            sheet_col(usize::from(u16::MAX) + 1),
            Err(PivotError::Whatever { .. })
        ));
        assert_eq!(sheet_row(70_000).unwrap(), 70_000);
    }
}
