use log::{debug, info};
use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::args::Args;
use crate::pivot::*;

/// The run options that can be stored in a JSON file.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    #[serde(rename = "gradesFile")]
    pub grades_file: Option<String>,
    #[serde(rename = "studentsFile")]
    pub students_file: Option<String>,
    #[serde(rename = "rosterKey")]
    pub roster_key: Option<String>,
    #[serde(rename = "rosterSheet")]
    pub roster_sheet: Option<String>,
    #[serde(rename = "outputFile")]
    pub output_file: Option<String>,
    #[serde(rename = "columnOrderFile")]
    pub column_order_file: Option<String>,
    pub regex: Option<String>,
    #[serde(rename = "strictDuplicates")]
    pub strict_duplicates: Option<bool>,
}

pub fn read_run_config(path: &Path) -> PivotResult<RunConfig> {
    let path_s = path.display().to_string();
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu {
        path: path_s.clone(),
    })?;
    debug!("read content: {:?}", contents);
    let config: RunConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path: path_s })?;
    Ok(config)
}

/// Merges the command line with the configuration file, if any.
///
/// Returns `None` when no grades file is given at all. The order options of the
/// command line replace both order options of the configuration.
pub fn resolve_settings(args: &Args) -> PivotResult<Option<Settings>> {
    // Checked before any file is read.
    ensure!(
        !(args.columnorder.is_some() && args.regex.is_some()),
        ConflictingOrderOptionsSnafu {}
    );

    let (config, root) = match &args.config {
        Some(p) => {
            let config_p = Path::new(p);
            let config = read_run_config(config_p)?;
            info!("config: {:?}", config);
            let root = config_p.parent().map(Path::to_path_buf).unwrap_or_default();
            (config, root)
        }
        None => (RunConfig::default(), PathBuf::new()),
    };
    let from_config = |x: &Option<String>| x.as_ref().map(|s| root.join(s));
    let from_args = |x: &Option<String>| x.as_ref().map(PathBuf::from);

    let grades_file = match from_args(&args.grades).or_else(|| from_config(&config.grades_file)) {
        Some(p) => p,
        None => return Ok(None),
    };

    let (column_order_file, regex) = if args.columnorder.is_some() || args.regex.is_some() {
        (from_args(&args.columnorder), args.regex.clone())
    } else {
        (from_config(&config.column_order_file), config.regex.clone())
    };

    let mut settings = Settings::new(grades_file);
    settings.students_file =
        from_args(&args.students).or_else(|| from_config(&config.students_file));
    if let Some(key) = args.roster_key.clone().or(config.roster_key) {
        settings.roster_key = key;
    }
    settings.roster_sheet = args.roster_sheet.clone().or(config.roster_sheet);
    settings.output_file = from_args(&args.out).or_else(|| from_config(&config.output_file));
    settings.column_order_file = column_order_file;
    settings.regex = regex;
    settings.strict_duplicates = args.strict || config.strict_duplicates.unwrap_or(false);
    settings.dry_run = args.dry_run;
    debug!("resolve_settings: {:?}", settings);
    Ok(Some(settings))
}
