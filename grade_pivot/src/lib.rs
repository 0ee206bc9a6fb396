mod config;
pub mod manual;
pub mod merge;
pub mod ordering;
pub mod report;

use log::{debug, info, warn};

use std::collections::{BTreeMap, BTreeSet, HashMap};

pub use crate::config::*;
pub use crate::ordering::{ColumnOrder, QuestionPattern};

/// Pivots the grade rows into one row per candidate and one column per question.
///
/// Arguments:
/// * `rows` the grade rows, one per (candidate, question) answer
/// * `options` the policy for duplicated answers and the order of the question columns
///
/// The candidates are sorted by external id, then by user id. Both ids are restored
/// as the two leading columns of the table.
pub fn pivot_grades(rows: &[GradeRow], options: &PivotOptions) -> Result<PivotOutcome, PivotErrors> {
    info!(
        "pivot_grades: Processing {:?} rows, policy: {:?}, order: {:?}",
        rows.len(),
        options.duplicate_policy,
        options.order
    );

    let mut stats = PivotStats {
        input_rows: rows.len(),
        ..PivotStats::default()
    };

    let mut grid: BTreeMap<CandidateKey, HashMap<String, CellValue>> = BTreeMap::new();
    let mut questions: BTreeSet<String> = BTreeSet::new();

    for (idx, row) in rows.iter().enumerate() {
        // Ids are grouped as they are written out: "01" and "1" are the same candidate.
        let candidate_id = CellValue::parse(&row.candidate_id).display_text();
        let user_id = CellValue::parse(&row.user_id).display_text();
        if candidate_id.is_empty() || user_id.is_empty() || row.question.is_empty() {
            warn!("pivot_grades: skipping incomplete row {}: {:?}", idx, row);
            stats.skipped_rows += 1;
            continue;
        }
        questions.insert(row.question.clone());
        let key = CandidateKey {
            candidate_id: NaturalKey(candidate_id),
            user_id: NaturalKey(user_id),
        };
        let cells = grid.entry(key).or_default();
        let score = row.final_score();
        match cells.get_mut(&row.question) {
            None => {
                cells.insert(row.question.clone(), score);
            }
            Some(_) if options.duplicate_policy == DuplicatePolicy::Strict => {
                return Err(PivotErrors::DuplicateCell {
                    candidate: row.candidate_id.clone(),
                    user: row.user_id.clone(),
                    question: row.question.clone(),
                });
            }
            // An empty cell does not count as a value: the first actual score takes it.
            Some(existing) if existing.is_empty() => {
                *existing = score;
            }
            Some(existing) => {
                if !score.is_empty() {
                    debug!(
                        "pivot_grades: row {}: keeping {:?}, discarding {:?} for {:?}",
                        idx, existing, score, row.question
                    );
                    stats.discarded_duplicates += 1;
                }
            }
        }
    }

    let pivot_order: Vec<String> = questions.into_iter().collect();
    let question_columns = options.order.apply(&pivot_order);
    debug!("pivot_grades: question order: {:?}", question_columns);

    let mut columns = vec![CANDIDATE_ID_COLUMN.to_string(), USER_ID_COLUMN.to_string()];
    columns.extend(question_columns.iter().cloned());
    let mut table = Table::new(columns);

    for (key, cells) in grid.iter() {
        let mut line = vec![
            CellValue::parse(&key.candidate_id.0),
            CellValue::parse(&key.user_id.0),
        ];
        for q in question_columns.iter() {
            line.push(cells.get(q).cloned().unwrap_or_default());
        }
        table.rows.push(line);
    }

    stats.candidates = table.num_rows();
    stats.questions = question_columns.len();
    info!("pivot_grades: stats: {:?}", stats);

    Ok(PivotOutcome {
        table,
        question_columns,
        stats,
    })
}
