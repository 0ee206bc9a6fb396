use log::debug;
use snafu::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::pivot::*;

/// The default report location: `pivoted-<name>.xlsx` next to the grades file.
pub fn default_output_path(grades_file: &Path) -> PivotResult<PathBuf> {
    let stem = match grades_file.file_stem() {
        Some(s) => s.to_string_lossy().to_string(),
        None => whatever!(
            "Cannot derive an output file name from {:?}, use --out",
            grades_file
        ),
    };
    let dir = grades_file.parent().unwrap_or_else(|| Path::new(""));
    Ok(dir.join(format!("pivoted-{}.xlsx", stem)))
}

/// Reads the question titles of an order file: one per line, blank lines skipped.
pub fn read_order_file(path: &Path) -> PivotResult<Vec<String>> {
    let contents = fs::read_to_string(path).context(OpeningOrderFileSnafu {
        path: path.display().to_string(),
    })?;
    let titles: Vec<String> = contents
        .lines()
        .map(|l| l.trim_start_matches('\u{feff}').trim())
        .filter(|l| !l.is_empty())
        .map(|l| l.to_string())
        .collect();
    debug!("read_order_file: {:?}: {:?}", path, titles);
    Ok(titles)
}
