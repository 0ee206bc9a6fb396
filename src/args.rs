use clap::Parser;

/// Pivots an Inspera grade export (one line per candidate and question) into a spreadsheet
/// with one row per candidate and one column per question.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The grade export, as delimited text. The delimiter is detected automatically.
    #[clap(value_parser)]
    pub grades: Option<String>,

    /// (file path, optional) An Excel file with student information, merged with the grades
    /// on the candidate number.
    #[clap(short, long, value_parser)]
    pub students: Option<String>,

    /// (default 'Nafn í prófi') The column of the student file that holds the candidate number.
    #[clap(long, value_parser)]
    pub roster_key: Option<String>,

    /// (default: first worksheet) The worksheet of the student file to read.
    #[clap(long, value_parser)]
    pub roster_sheet: Option<String>,

    /// (file path) The output Excel file. Defaults to 'pivoted-<grades>.xlsx' next to the grades.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path, optional) A file with one question title per line, giving the order of the
    /// question columns. Cannot be combined with --regex.
    #[clap(short = 'c', long, value_parser)]
    pub columnorder: Option<String>,

    /// (regular expression, optional) Sorts the question columns by the value of the single
    /// capturing group. Cannot be combined with --columnorder. See --help-regex.
    #[clap(short, long, value_parser)]
    pub regex: Option<String>,

    /// (file path, optional) A JSON file with the run options. Command line options take precedence.
    #[clap(long, value_parser)]
    pub config: Option<String>,

    /// If passed, several scores for the same candidate and question are an error instead of
    /// keeping the first one.
    #[clap(long, takes_value = false)]
    pub strict: bool,

    /// Shows the planned order of the question columns and exits without writing the Excel file.
    #[clap(long, takes_value = false)]
    pub dry_run: bool,

    /// Shows detailed help on the --regex option and exits.
    #[clap(long, takes_value = false)]
    pub help_regex: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard error.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
