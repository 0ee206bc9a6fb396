// ********* Input data structures ***********

use std::cmp::Ordering;
use std::error::Error;
use std::fmt::Display;

use crate::ordering::ColumnOrder;

pub const CANDIDATE_ID_COLUMN: &str = "CandidateExternalId";
pub const USER_ID_COLUMN: &str = "UserId";
pub const QUESTION_TITLE_COLUMN: &str = "QuestionTitle";
pub const MANUAL_SCORE_COLUMN: &str = "ManuallyGradedScore";
pub const AUTO_SCORE_COLUMN: &str = "AutoGradedScore";

/// The columns that every grade export must provide.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    CANDIDATE_ID_COLUMN,
    USER_ID_COLUMN,
    QUESTION_TITLE_COLUMN,
    MANUAL_SCORE_COLUMN,
    AUTO_SCORE_COLUMN,
];

/// Tokens read as a missing value, whatever their column.
pub const MISSING_VALUE_TOKENS: [&str; 17] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "null",
];

/// The content of a single cell, either read from an input file or produced
/// by the pivot.
#[derive(PartialEq, Debug, Clone, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Interprets raw text the way a spreadsheet would: numbers become numbers,
    /// blanks and missing value markers (`NaN`, `N/A`, `null`, ...) become empty
    /// cells, everything else stays text.
    pub fn parse(raw: &str) -> CellValue {
        let s = raw.trim();
        if s.is_empty() || MISSING_VALUE_TOKENS.contains(&s) {
            return CellValue::Empty;
        }
        match s.parse::<f64>() {
            Ok(x) if x.is_nan() => CellValue::Empty,
            Ok(x) if x.is_finite() => CellValue::Number(x),
            _ => CellValue::Text(s.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// The text shown for this cell. Integral numbers have no decimal part.
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Empty => "".to_string(),
            CellValue::Number(x) => x.to_string(),
            CellValue::Text(s) => s.clone(),
        }
    }
}

/// One line of the grade export: the answer of one candidate to one question.
#[derive(PartialEq, Debug, Clone)]
pub struct GradeRow {
    pub candidate_id: String,
    pub user_id: String,
    pub question: String,
    pub manual_score: CellValue,
    pub auto_score: CellValue,
}

impl GradeRow {
    pub fn new(
        candidate_id: &str,
        user_id: &str,
        question: &str,
        manual_score: CellValue,
        auto_score: CellValue,
    ) -> GradeRow {
        GradeRow {
            candidate_id: candidate_id.trim().to_string(),
            user_id: user_id.trim().to_string(),
            question: question.trim().to_string(),
            manual_score,
            auto_score,
        }
    }

    /// The score that counts for this answer: the manual grading overrides the
    /// automatic one. Both may be missing.
    pub fn final_score(&self) -> CellValue {
        if self.manual_score.is_empty() {
            self.auto_score.clone()
        } else {
            self.manual_score.clone()
        }
    }
}

/// A string key with a total order: integers first, in numeric order, then
/// everything else in lexicographic order.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct NaturalKey(pub String);

impl NaturalKey {
    fn as_integer(&self) -> Option<i128> {
        self.0.parse::<i128>().ok()
    }
}

impl Ord for NaturalKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.as_integer(), other.as_integer()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for NaturalKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Identifies a candidate in the pivoted table.
#[derive(Eq, PartialEq, Debug, Clone, Hash, PartialOrd, Ord)]
pub struct CandidateKey {
    pub candidate_id: NaturalKey,
    pub user_id: NaturalKey,
}

// ******** Tables *********

static EMPTY_CELL: CellValue = CellValue::Empty;

/// A rectangular table with named columns.
///
/// Rows may be shorter than the header: missing cells read as empty.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Table {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    /// Position of the first column with this title.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }
}

// ******** Output data structures *********

/// Counters collected while pivoting.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct PivotStats {
    pub input_rows: usize,
    pub candidates: usize,
    pub questions: usize,
    /// Rows without a candidate id, user id or question title.
    pub skipped_rows: usize,
    /// Scores dropped because another row already filled the same cell.
    pub discarded_duplicates: usize,
}

#[derive(PartialEq, Debug, Clone)]
pub struct PivotOutcome {
    /// `CandidateExternalId`, `UserId`, then one column per question.
    pub table: Table,
    /// The question columns, in their final order.
    pub question_columns: Vec<String>,
    pub stats: PivotStats,
}

/// Errors that prevent the pivot from completing.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum PivotErrors {
    /// An explicit column list and an ordering pattern were both requested.
    ConflictingOrder,
    InvalidPattern {
        pattern: String,
        message: String,
    },
    /// The ordering pattern must have exactly one capturing group.
    CaptureGroupCount {
        pattern: String,
        groups: usize,
    },
    /// Two rows for the same cell under the strict duplicate policy.
    DuplicateCell {
        candidate: String,
        user: String,
        question: String,
    },
    MissingColumn {
        column: String,
    },
}

impl Error for PivotErrors {}

impl Display for PivotErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PivotErrors::ConflictingOrder => write!(
                f,
                "cannot order columns both from an explicit list and from a pattern"
            ),
            PivotErrors::InvalidPattern { pattern, message } => {
                write!(f, "invalid ordering pattern {:?}: {}", pattern, message)
            }
            PivotErrors::CaptureGroupCount { pattern, groups } => write!(
                f,
                "ordering pattern {:?} must have exactly one capturing group, found {}",
                pattern, groups
            ),
            PivotErrors::DuplicateCell {
                candidate,
                user,
                question,
            } => write!(
                f,
                "several scores for candidate {} (user {}) on question {:?}",
                candidate, user, question
            ),
            PivotErrors::MissingColumn { column } => write!(f, "missing column {:?}", column),
        }
    }
}

// ********* Configuration **********

/// What to do when several rows give a score for the same candidate and question.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub enum DuplicatePolicy {
    /// The first non-empty score wins, the others are dropped.
    #[default]
    FirstWins,
    /// Any second row for a cell is an error.
    Strict,
}

#[derive(Debug, Clone, Default)]
pub struct PivotOptions {
    pub duplicate_policy: DuplicatePolicy,
    pub order: ColumnOrder,
}
