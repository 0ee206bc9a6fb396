// Primitives for reading the grade exports.

use grade_pivot::{CellValue, GradeRow, REQUIRED_COLUMNS};
use log::{debug, info};
use snafu::prelude::*;
use std::fs;
use std::path::Path;

use crate::pivot::*;

// Candidate delimiters, by order of preference when counts are equal.
const DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Reads all the lines of a grade export.
///
/// The whole file is loaded in memory. Extra columns are ignored.
pub fn read_grades(path: &Path) -> PivotResult<Vec<GradeRow>> {
    let path_s = path.display().to_string();
    info!("Attempting to read grades file {:?}", path_s);
    let contents = fs::read_to_string(path).context(OpeningGradesSnafu {
        path: path_s.clone(),
    })?;
    let contents = contents.strip_prefix('\u{feff}').unwrap_or(&contents);

    let delimiter = sniff_delimiter(contents.lines().next().unwrap_or(""));
    debug!("read_grades: delimiter: {:?}", delimiter as char);

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(contents.as_bytes());

    let header: Vec<String> = rdr
        .headers()
        .context(CsvLineParseSnafu {
            path: path_s.clone(),
            lineno: 1usize,
        })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    debug!("read_grades: header: {:?}", header);

    let mut indexes: Vec<usize> = Vec::new();
    for name in REQUIRED_COLUMNS.iter() {
        let idx = header
            .iter()
            .position(|h| h == name)
            .context(MissingCsvColumnSnafu {
                column: *name,
                path: path_s.clone(),
            })?;
        indexes.push(idx);
    }
    let (cid_idx, uid_idx, q_idx, manual_idx, auto_idx) =
        (indexes[0], indexes[1], indexes[2], indexes[3], indexes[4]);

    let mut res: Vec<GradeRow> = Vec::new();
    for (idx, record_r) in rdr.records().enumerate() {
        // The header is record 1.
        let lineno = idx + 2;
        let record = record_r.context(CsvLineParseSnafu {
            path: path_s.clone(),
            lineno,
        })?;
        let field = |i: usize| record.get(i).unwrap_or("");
        res.push(GradeRow::new(
            field(cid_idx),
            field(uid_idx),
            field(q_idx),
            CellValue::parse(field(manual_idx)),
            CellValue::parse(field(auto_idx)),
        ));
    }
    info!("read_grades: read {} grade rows from {:?}", res.len(), path_s);
    Ok(res)
}

/// Guesses the delimiter from the header line: the candidate seen the most
/// often outside of quotes. Ties and headers without any candidate give a comma.
pub fn sniff_delimiter(header_line: &str) -> u8 {
    let mut counts = [0usize; DELIMITERS.len()];
    let mut in_quotes = false;
    for b in header_line.bytes() {
        if b == b'"' {
            in_quotes = !in_quotes;
        } else if !in_quotes {
            if let Some(pos) = DELIMITERS.iter().position(|d| *d == b) {
                counts[pos] += 1;
            }
        }
    }
    let top = counts.iter().copied().max().unwrap_or(0);
    let mut leaders = DELIMITERS
        .iter()
        .zip(counts.iter())
        .filter(|(_, c)| **c == top);
    match (leaders.next(), leaders.next()) {
        (Some((d, _)), None) if top > 0 => *d,
        _ => b',',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "CandidateExternalId,UserId,QuestionTitle,ManuallyGradedScore,AutoGradedScore";

    fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let p = dir.join(name);
        fs::write(&p, contents).unwrap();
        p
    }

    #[test]
    fn sniffing() {
        assert_eq!(sniff_delimiter("a,b,c"), b',');
        assert_eq!(sniff_delimiter("a;b;c"), b';');
        assert_eq!(sniff_delimiter("a\tb\tc"), b'\t');
        assert_eq!(sniff_delimiter("a|b|c"), b'|');
        assert_eq!(sniff_delimiter("\"x,y\";b;c"), b';');
        assert_eq!(sniff_delimiter("single"), b',');
        assert_eq!(sniff_delimiter("a;b\tc"), b',');
        assert_eq!(sniff_delimiter("a;b;c\td\te|f"), b',');
        assert_eq!(sniff_delimiter("a;b;c\td"), b';');
    }

    #[test]
    fn reads_tab_separated_with_extra_columns() {
        let dir = tempfile::tempdir().unwrap();
        let contents = format!(
            "\u{feff}{}\tComment\nC1\tU1\tQ1\t2.5\t1\tok\nC1\tU1\tQ2\t\t\n",
            HEADER.replace(',', "\t")
        );
        let p = write(dir.path(), "grades.tsv", &contents);
        let rows = read_grades(&p).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].candidate_id, "C1");
        assert_eq!(rows[0].final_score(), CellValue::Number(2.5));
        assert_eq!(rows[1].question, "Q2");
        assert_eq!(rows[1].final_score(), CellValue::Empty);
    }

    #[test]
    fn short_records_are_padded() {
        let dir = tempfile::tempdir().unwrap();
        let p = write(dir.path(), "g.csv", &format!("{}\nC1,U1,Q1\n", HEADER));
        let rows = read_grades(&p).unwrap();
        assert_eq!(rows[0].manual_score, CellValue::Empty);
        assert_eq!(rows[0].auto_score, CellValue::Empty);
    }

    #[test]
    fn quoted_titles() {
        let dir = tempfile::tempdir().unwrap();
        let p = write(
            dir.path(),
            "g.csv",
            &format!("{}\nC1,U1,\"Part 1, essay\",,4\n", HEADER),
        );
        let rows = read_grades(&p).unwrap();
        assert_eq!(rows[0].question, "Part 1, essay");
        assert_eq!(rows[0].final_score(), CellValue::Number(4.0));
    }

    #[test]
    fn missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let p = write(
            dir.path(),
            "g.csv",
            "CandidateExternalId,UserId,QuestionTitle,AutoGradedScore\nC1,U1,Q1,1\n",
        );
        match read_grades(&p) {
            Err(PivotError::MissingCsvColumn { column, .. }) => {
                assert_eq!(column, "ManuallyGradedScore")
            }
            x => panic!("unexpected result {:?}", x),
        }
    }

    #[test]
    fn missing_file() {
        let res = read_grades(Path::new("/does/not/exist.csv"));
        assert!(matches!(res, Err(PivotError::OpeningGrades { .. })));
    }
}
