//! CLI tool for rolling report containers forward one period.

mod exit_codes;
mod progress;

use std::path::PathBuf;

use clap::Parser;

use pbixroll::{ContainerRef, OutputMode, RollOptions, Workspace};

use exit_codes::{error_to_exit_code, ExitCode};
use progress::CliProgress;

/// Monthly period update for PBIX report slicers and bookmarks.
///
/// Updates the default Year, Month and Quarter slicer values in every report
/// container under the working directory. Without explicit values, the new
/// defaults represent the month preceding the current one.
#[derive(Parser)]
#[command(name = "pbixroll")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Working directory with report containers (defaults to the current directory)
    #[arg(short = 'd', long)]
    directory: Option<PathBuf>,

    /// New value for Year (requires --month)
    #[arg(short = 'y', long, requires = "month")]
    year: Option<i32>,

    /// New value for Month (requires --year)
    #[arg(short = 'm', long, requires = "year", value_parser = clap::value_parser!(u32).range(1..=12))]
    month: Option<u32>,

    /// Old Year value to replace (defaults to the previous period's year)
    #[arg(short = 'o', long = "old-year")]
    old_year: Option<i32>,

    /// Process only this workspace subdirectory (requires --report)
    #[arg(short = 'w', long, requires = "report")]
    workspace: Option<String>,

    /// Process only this report file name (requires --workspace)
    #[arg(short = 'r', long, requires = "workspace")]
    report: Option<String>,

    /// Overwrite originals in place instead of writing to #RESULTS
    /// (a timestamped backup is always taken first)
    #[arg(long)]
    in_place: bool,

    /// Skip the backup copy (results mode only)
    #[arg(long, conflicts_with = "in_place")]
    no_backup: bool,

    /// Suppress progress output
    #[arg(short = 'q', long)]
    quiet: bool,
}

fn main() {
    // Set up Ctrl+C handler
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted");
        std::process::exit(exit_codes::USER_INTERRUPT);
    })
    .ok();

    let cli = Cli::parse();
    std::process::exit(run(cli).code());
}

fn run(cli: Cli) -> ExitCode {
    let root = cli
        .directory
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let workspace = match Workspace::open(&root) {
        Ok(ws) => ws,
        Err(e) => {
            eprintln!("Error: {e}");
            return error_to_exit_code(&e);
        }
    };

    let target = match (cli.workspace, cli.report) {
        (Some(subdir), Some(file_name)) => Some(ContainerRef::new(subdir, file_name)),
        _ => None,
    };

    let options = RollOptions {
        period: cli.year.zip(cli.month),
        old_year: cli.old_year,
        target,
        output: if cli.in_place {
            OutputMode::InPlace
        } else {
            OutputMode::Results
        },
        backup: !cli.no_backup,
    };

    let progress = CliProgress::new(cli.quiet);
    let report = match pbixroll::run(&workspace, &options, &progress) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {e}");
            return error_to_exit_code(&e);
        }
    };
    progress.finish();

    if !cli.quiet {
        println!(
            "{} container(s) updated, {} failed, {} replacement(s)",
            report.succeeded(),
            report.failed(),
            report.replacements()
        );
    }

    if report.failed() > 0 {
        ExitCode::Warning
    } else {
        ExitCode::Success
    }
}
