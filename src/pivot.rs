use log::{debug, info};

use grade_pivot::merge::outer_join;
use grade_pivot::report::layout_report;
use grade_pivot::*;
use snafu::prelude::*;

use std::path::PathBuf;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_roster;
pub mod io_xlsx;

/// The roster column matched against `CandidateExternalId` when none is given.
pub const DEFAULT_ROSTER_KEY: &str = "Nafn í prófi";

pub const REGEX_HELP: &str = r#"
Regex Sorting Help:
--------------------
Use -r or --regex to define how question columns should be sorted.
The regex must contain ONE capturing group. The captured value is used as the sort key.
The regex is matched at the start of each question title.
If numeric, sorting is numeric; otherwise, lexicographic (after all numeric keys).

Examples:
  -r "Okt24-(\d+)"    # Sorts by the number after 'Okt24-'
  -r "Q(\d+)"         # Sorts Q1, Q2, Q10 numerically
  -r "([A-Za-z]+)"    # Sorts by alphabetic prefix
  -r ".*-(\d+)"       # Any prefix ending in a dash followed by digits

Tips:
- Quote the regex in the shell so that backslashes reach the program.
- Columns that the regex does not match are placed last, in alphabetical order.
- -r cannot be combined with -c (column order file).
"#;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PivotError {
    #[snafu(display("Cannot use both -c (column order file) and -r (regex)."))]
    ConflictingOrderOptions {},
    #[snafu(display("Error opening grades file {path}"))]
    OpeningGrades {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading record {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Missing column {column:?} in {path}"))]
    MissingCsvColumn { column: String, path: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook {path} has no worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("No worksheet named {worksheet:?} in {path}"))]
    MissingWorksheet { worksheet: String, path: String },
    #[snafu(display("The worksheet of {path} has no header row"))]
    MissingHeader { path: String },
    #[snafu(display("Missing column {column:?} in the student file {path}"))]
    MissingRosterColumn { column: String, path: String },
    #[snafu(display("Error reading column order file {path}"))]
    OpeningOrderFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading configuration file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing configuration file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error writing {path}"))]
    WritingExcel {
        source: rust_xlsxwriter::XlsxError,
        path: String,
    },
    #[snafu(display("Cannot pivot the grades"))]
    Engine { source: PivotErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type PivotResult<T> = Result<T, PivotError>;

/// The options of one run, after merging the command line and the configuration file.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Settings {
    pub grades_file: PathBuf,
    pub students_file: Option<PathBuf>,
    pub roster_key: String,
    pub roster_sheet: Option<String>,
    pub output_file: Option<PathBuf>,
    pub column_order_file: Option<PathBuf>,
    pub regex: Option<String>,
    pub strict_duplicates: bool,
    pub dry_run: bool,
}

impl Settings {
    pub fn new(grades_file: PathBuf) -> Settings {
        Settings {
            grades_file,
            students_file: None,
            roster_key: DEFAULT_ROSTER_KEY.to_string(),
            roster_sheet: None,
            output_file: None,
            column_order_file: None,
            regex: None,
            strict_duplicates: false,
            dry_run: false,
        }
    }
}

/// What a run produced.
#[derive(PartialEq, Debug, Clone)]
pub enum ConversionSummary {
    /// Nothing was written: only the planned order of the questions.
    DryRun { question_columns: Vec<String> },
    Written {
        output_file: PathBuf,
        rows: usize,
        stats: PivotStats,
    },
}

pub fn format_dry_run(question_columns: &[String]) -> String {
    let mut res = String::from("\nPlanned column order:\n");
    for c in question_columns.iter() {
        res.push_str(&format!("  {}\n", c));
    }
    res.push_str("\n(Dry run: no file written.)");
    res
}

fn column_order(settings: &Settings) -> PivotResult<ColumnOrder> {
    let explicit = match &settings.column_order_file {
        Some(p) => Some(io_common::read_order_file(p)?),
        None => None,
    };
    ColumnOrder::from_options(explicit, settings.regex.as_deref()).context(EngineSnafu {})
}

/// Runs the whole conversion: grades, pivot, optional roster, report.
pub fn run_conversion(settings: &Settings) -> PivotResult<ConversionSummary> {
    // Checked before touching any file.
    ensure!(
        !(settings.column_order_file.is_some() && settings.regex.is_some()),
        ConflictingOrderOptionsSnafu {}
    );
    info!("run_conversion: settings: {:?}", settings);

    let order = column_order(settings)?;
    let rows = io_csv::read_grades(&settings.grades_file)?;
    let options = PivotOptions {
        duplicate_policy: if settings.strict_duplicates {
            DuplicatePolicy::Strict
        } else {
            DuplicatePolicy::FirstWins
        },
        order,
    };
    let outcome = pivot_grades(&rows, &options).context(EngineSnafu {})?;

    if settings.dry_run {
        return Ok(ConversionSummary::DryRun {
            question_columns: outcome.question_columns,
        });
    }

    let output_file = match &settings.output_file {
        Some(p) => p.clone(),
        None => io_common::default_output_path(&settings.grades_file)?,
    };

    let table = match &settings.students_file {
        Some(students) => {
            let roster = io_roster::read_roster(
                students,
                settings.roster_sheet.as_deref(),
                &settings.roster_key,
            )?;
            outer_join(&roster, &settings.roster_key, &outcome.table, CANDIDATE_ID_COLUMN)
                .context(EngineSnafu {})?
        }
        None => outcome.table,
    };

    let sheet = layout_report(table, &outcome.question_columns);
    debug!("run_conversion: report layout: {:?}", sheet.question_span);
    io_xlsx::write_report(&sheet, &output_file)?;
    info!("run_conversion: wrote {:?}", output_file);

    Ok(ConversionSummary::Written {
        output_file,
        rows: sheet.table.num_rows(),
        stats: outcome.stats,
    })
}
