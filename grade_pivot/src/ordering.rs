//! Ordering of the question columns.
//!
//! Three modes are available:
//! - [ColumnOrder::Lexicographic] sorts the titles as plain strings. This is the default.
//! - [ColumnOrder::Explicit] puts the listed titles first, in the order of the list,
//!   followed by all the other titles.
//! - [ColumnOrder::Pattern] extracts a sort key from each title with a regular expression.
//!
//! ```
//! use grade_pivot::ordering::ColumnOrder;
//! # use grade_pivot::PivotErrors;
//!
//! let order = ColumnOrder::from_options(None, Some(r"Q(\d+)"))?;
//! let titles: Vec<String> = ["Other", "Q1", "Q10", "Q2"].iter().map(|s| s.to_string()).collect();
//! assert_eq!(order.apply(&titles), vec!["Q1", "Q2", "Q10", "Other"]);
//! # Ok::<(), PivotErrors>(())
//! ```

use log::debug;
use regex::Regex;
use std::collections::HashSet;

use crate::config::PivotErrors;

/// A regular expression with exactly one capturing group, used to derive a
/// sort key from a question title.
#[derive(Debug, Clone)]
pub struct QuestionPattern {
    regex: Regex,
}

// Numeric keys come first, then text keys, then the titles that did not match.
#[derive(Eq, PartialEq, Debug, Clone, PartialOrd, Ord)]
enum SortKey {
    Numeric(u128),
    Text(String),
    Unmatched,
}

impl QuestionPattern {
    pub fn new(pattern: &str) -> Result<QuestionPattern, PivotErrors> {
        let regex = Regex::new(pattern).map_err(|e| PivotErrors::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        // The implicit group 0 is the whole match.
        let groups = regex.captures_len() - 1;
        if groups != 1 {
            return Err(PivotErrors::CaptureGroupCount {
                pattern: pattern.to_string(),
                groups,
            });
        }
        Ok(QuestionPattern { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// The pattern only applies when it matches at the start of the title.
    fn sort_key(&self, title: &str) -> SortKey {
        // The leftmost match is returned: if it does not start at 0, no match does.
        let captured = self
            .regex
            .captures(title)
            .filter(|c| c.get(0).map(|m| m.start()) == Some(0))
            .and_then(|c| c.get(1));
        match captured {
            None => SortKey::Unmatched,
            Some(m) => {
                let s = m.as_str();
                if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
                    match s.parse::<u128>() {
                        Ok(x) => SortKey::Numeric(x),
                        Err(_) => SortKey::Text(s.to_string()),
                    }
                } else {
                    SortKey::Text(s.to_string())
                }
            }
        }
    }
}

/// How the question columns are laid out from left to right.
#[derive(Debug, Clone, Default)]
pub enum ColumnOrder {
    #[default]
    Lexicographic,
    /// Titles in this order first. The titles not in the list follow.
    Explicit(Vec<String>),
    Pattern(QuestionPattern),
}

impl ColumnOrder {
    /// Builds the ordering from the two optional user inputs, which may not be
    /// both present.
    pub fn from_options(
        explicit: Option<Vec<String>>,
        pattern: Option<&str>,
    ) -> Result<ColumnOrder, PivotErrors> {
        match (explicit, pattern) {
            (Some(_), Some(_)) => Err(PivotErrors::ConflictingOrder),
            (Some(titles), None) => Ok(ColumnOrder::Explicit(titles)),
            (None, Some(p)) => Ok(ColumnOrder::Pattern(QuestionPattern::new(p)?)),
            (None, None) => Ok(ColumnOrder::Lexicographic),
        }
    }

    /// Orders the titles. The input is expected in pivot order (sorted); titles
    /// that compare equal under the ordering keep their input order.
    pub fn apply(&self, titles: &[String]) -> Vec<String> {
        match self {
            ColumnOrder::Lexicographic => {
                let mut res = titles.to_vec();
                res.sort();
                res.dedup();
                res
            }
            ColumnOrder::Explicit(wanted) => order_explicit(wanted, titles),
            ColumnOrder::Pattern(pattern) => {
                let mut keyed: Vec<(SortKey, &String)> =
                    titles.iter().map(|t| (pattern.sort_key(t), t)).collect();
                debug!("ColumnOrder::apply: keys: {:?}", keyed);
                // Stable: unmatched titles stay in their input order.
                keyed.sort_by(|a, b| a.0.cmp(&b.0));
                keyed.into_iter().map(|(_, t)| t.clone()).collect()
            }
        }
    }
}

fn order_explicit(wanted: &[String], titles: &[String]) -> Vec<String> {
    let available: HashSet<&String> = titles.iter().collect();
    let mut placed: HashSet<&String> = HashSet::new();
    let mut res: Vec<String> = Vec::new();
    for w in wanted.iter() {
        if !available.contains(w) {
            debug!("order_explicit: {:?} is not a question of this exam", w);
            continue;
        }
        if placed.insert(w) {
            res.push(w.clone());
        }
    }
    for t in titles.iter() {
        if placed.insert(t) {
            res.push(t.clone());
        }
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn lexicographic_by_default() {
        let order = ColumnOrder::from_options(None, None).unwrap();
        let res = order.apply(&titles(&["Q2", "Q10", "Q1", "A"]));
        assert_eq!(res, titles(&["A", "Q1", "Q10", "Q2"]));
        assert!(res.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn explicit_list_first_then_rest() {
        let order = ColumnOrder::Explicit(titles(&["Q3", "Missing", "Q1"]));
        let res = order.apply(&titles(&["Q1", "Q2", "Q3", "Q4"]));
        assert_eq!(res, titles(&["Q3", "Q1", "Q2", "Q4"]));
    }

    #[test]
    fn explicit_list_does_not_duplicate() {
        let order = ColumnOrder::Explicit(titles(&["Q2", "Q2", "Q1"]));
        let res = order.apply(&titles(&["Q1", "Q2"]));
        assert_eq!(res, titles(&["Q2", "Q1"]));
    }

    #[test]
    fn pattern_numeric_then_unmatched() {
        let order = ColumnOrder::from_options(None, Some(r"Q(\d+)")).unwrap();
        let res = order.apply(&titles(&["Other", "Q1", "Q10", "Q2"]));
        assert_eq!(res, titles(&["Q1", "Q2", "Q10", "Other"]));
    }

    #[test]
    fn pattern_is_anchored_at_start() {
        let order = ColumnOrder::from_options(None, Some(r"Okt24-(\d+)")).unwrap();
        let res = order.apply(&titles(&["Okt24-10", "Okt24-9", "X Okt24-1", "Bonus"]));
        assert_eq!(res, titles(&["Okt24-9", "Okt24-10", "X Okt24-1", "Bonus"]));
    }

    #[test]
    fn pattern_text_capture_sorts_after_numbers() {
        let order = ColumnOrder::from_options(None, Some(r"Part-(\w+)")).unwrap();
        let res = order.apply(&titles(&["Part-b", "Part-a", "Part-2", "Zeta", "Part-10"]));
        assert_eq!(res, titles(&["Part-2", "Part-10", "Part-a", "Part-b", "Zeta"]));
    }

    #[test]
    fn pattern_optional_group_not_taken() {
        let order = ColumnOrder::from_options(None, Some(r"Q(\d+)?")).unwrap();
        let res = order.apply(&titles(&["Q", "Q3", "Q1"]));
        assert_eq!(res, titles(&["Q1", "Q3", "Q"]));
    }

    #[test]
    fn pattern_needs_one_group() {
        assert_eq!(
            QuestionPattern::new(r"Q\d+").unwrap_err(),
            PivotErrors::CaptureGroupCount {
                pattern: r"Q\d+".to_string(),
                groups: 0
            }
        );
        assert!(matches!(
            QuestionPattern::new(r"(Q)(\d+)"),
            Err(PivotErrors::CaptureGroupCount { groups: 2, .. })
        ));
        assert!(matches!(
            QuestionPattern::new(r"Q(\d+"),
            Err(PivotErrors::InvalidPattern { .. })
        ));
    }

    #[test]
    fn list_and_pattern_conflict() {
        let res = ColumnOrder::from_options(Some(titles(&["Q1"])), Some(r"Q(\d+)"));
        assert!(matches!(res, Err(PivotErrors::ConflictingOrder)));
    }
}
