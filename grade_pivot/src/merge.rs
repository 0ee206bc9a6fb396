//! Full outer join of a roster table with the pivoted grades.

use log::{debug, info};
use std::collections::{BTreeMap, HashSet};

use crate::config::*;

/// Suffixes added to the titles found on both sides of the join.
pub const LEFT_SUFFIX: &str = "_x";
pub const RIGHT_SUFFIX: &str = "_y";

// The matching rows on each side for one key.
#[derive(Debug, Default)]
struct KeyRows {
    left: Vec<usize>,
    right: Vec<usize>,
}

/// Joins `left` and `right` on `left.left_key == right.right_key`, keeping the rows
/// without a counterpart on either side.
///
/// The columns of `left` come first, then the columns of `right`. Rows are sorted by
/// key (integers first, in numeric order). Rows with an empty key never match and
/// come last, left side first.
pub fn outer_join(
    left: &Table,
    left_key: &str,
    right: &Table,
    right_key: &str,
) -> Result<Table, PivotErrors> {
    let left_idx = left
        .column_index(left_key)
        .ok_or_else(|| PivotErrors::MissingColumn {
            column: left_key.to_string(),
        })?;
    let right_idx = right
        .column_index(right_key)
        .ok_or_else(|| PivotErrors::MissingColumn {
            column: right_key.to_string(),
        })?;
    info!(
        "outer_join: {} rows on {:?} with {} rows on {:?}",
        left.num_rows(),
        left_key,
        right.num_rows(),
        right_key
    );

    let mut by_key: BTreeMap<NaturalKey, KeyRows> = BTreeMap::new();
    let mut unkeyed_left: Vec<usize> = Vec::new();
    let mut unkeyed_right: Vec<usize> = Vec::new();
    for r in 0..left.num_rows() {
        match join_key(left.cell(r, left_idx)) {
            Some(k) => by_key.entry(k).or_default().left.push(r),
            None => unkeyed_left.push(r),
        }
    }
    for r in 0..right.num_rows() {
        match join_key(right.cell(r, right_idx)) {
            Some(k) => by_key.entry(k).or_default().right.push(r),
            None => unkeyed_right.push(r),
        }
    }

    let mut res = Table::new(joined_columns(&left.columns, &right.columns));
    let nleft = left.num_columns();
    let nright = right.num_columns();
    let side = |t: &Table, r: Option<usize>, width: usize| -> Vec<CellValue> {
        (0..width)
            .map(|c| match r {
                Some(r) => t.cell(r, c).clone(),
                None => CellValue::Empty,
            })
            .collect()
    };

    for (key, rows) in by_key.iter() {
        if rows.left.is_empty() || rows.right.is_empty() {
            debug!("outer_join: no match for key {:?}: {:?}", key.0, rows);
        }
        let lefts: Vec<Option<usize>> = if rows.left.is_empty() {
            vec![None]
        } else {
            rows.left.iter().map(|r| Some(*r)).collect()
        };
        let rights: Vec<Option<usize>> = if rows.right.is_empty() {
            vec![None]
        } else {
            rows.right.iter().map(|r| Some(*r)).collect()
        };
        for l in lefts.iter() {
            for r in rights.iter() {
                let mut line = side(left, *l, nleft);
                line.extend(side(right, *r, nright));
                res.rows.push(line);
            }
        }
    }
    for l in unkeyed_left {
        let mut line = side(left, Some(l), nleft);
        line.extend(side(right, None, nright));
        res.rows.push(line);
    }
    for r in unkeyed_right {
        let mut line = side(left, None, nleft);
        line.extend(side(right, Some(r), nright));
        res.rows.push(line);
    }

    info!("outer_join: {} rows after the join", res.num_rows());
    Ok(res)
}

// Numbers and text are matched on their displayed form: 12.0 matches "12".
fn join_key(cell: &CellValue) -> Option<NaturalKey> {
    let s = cell.display_text().trim().to_string();
    if s.is_empty() {
        None
    } else {
        Some(NaturalKey(s))
    }
}

fn joined_columns(left: &[String], right: &[String]) -> Vec<String> {
    let left_names: HashSet<&String> = left.iter().collect();
    let right_names: HashSet<&String> = right.iter().collect();
    let mut columns: Vec<String> = Vec::new();
    for c in left.iter() {
        if right_names.contains(c) {
            columns.push(format!("{}{}", c, LEFT_SUFFIX));
        } else {
            columns.push(c.clone());
        }
    }
    for c in right.iter() {
        if left_names.contains(c) {
            columns.push(format!("{}{}", c, RIGHT_SUFFIX));
        } else {
            columns.push(c.clone());
        }
    }
    columns
}
