use clap::{CommandFactory, Parser};
use log::debug;
use std::error::Error;
use std::process;

mod args;
mod pivot;

use crate::args::Args;
use crate::pivot::{ConversionSummary, PivotError};

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn exit_with_error(e: &PivotError) -> ! {
    eprintln!("Error: {}", e);
    let mut source = e.source();
    while let Some(s) = source {
        eprintln!("  caused by: {}", s);
        source = s.source();
    }
    process::exit(1)
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);
    debug!("args: {:?}", args);

    if args.help_regex {
        println!("{}", pivot::REGEX_HELP);
        return;
    }

    let settings = match pivot::config_reader::resolve_settings(&args) {
        Ok(Some(s)) => s,
        Ok(None) => {
            let _ = Args::command().print_help();
            process::exit(1)
        }
        Err(e) => exit_with_error(&e),
    };

    match pivot::run_conversion(&settings) {
        Ok(ConversionSummary::DryRun { question_columns }) => {
            println!("{}", pivot::format_dry_run(&question_columns));
        }
        Ok(ConversionSummary::Written {
            output_file,
            rows,
            stats,
        }) => {
            debug!("{} rows written, stats: {:?}", rows, stats);
            if stats.discarded_duplicates > 0 || stats.skipped_rows > 0 {
                eprintln!(
                    "Warning: {} duplicated scores ignored, {} incomplete rows skipped",
                    stats.discarded_duplicates, stats.skipped_rows
                );
            }
            println!("File saved to {}", output_file.display());
        }
        Err(e) => exit_with_error(&e),
    }
}
