use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use clap::Parser;

use crate::cli::logging::init_logging;
use crate::history::{HistoryScan, scan_history};
use crate::models::TimeWindow;
use crate::restore::{MaterializeReport, materialize};
use crate::utils::environment::{self, CURSOR_USER_DIR_ENV};
use crate::utils::{format_path_with_tilde, get_cursor_user_dir};
use crate::workspaces::list_workspaces;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const RULE_WIDTH: usize = 80;

const EXAMPLES: &str = "\
Examples:
  # Restore files from the last 7 days (default)
  cursor-restore -r ~/Projects/MyProject/

  # Restore files from the last 30 days
  cursor-restore -r ~/Projects/MyProject/ -b 30

  # Use a custom time range
  cursor-restore -r ~/Projects/MyProject/ -s \"2024-01-01 00:00:00\" -e \"2024-12-31 23:59:59\"

  # List available workspaces
  cursor-restore --list-workspaces";

#[derive(Parser, Debug)]
#[command(name = "cursor-restore")]
#[command(version)]
#[command(about = "Restore files from Cursor's local history backups", long_about = None)]
#[command(after_help = EXAMPLES)]
pub struct RestoreCli {
    /// Cursor User directory (default: the platform's Cursor/User directory)
    #[arg(long, env = CURSOR_USER_DIR_ENV)]
    pub cursor_dir: Option<PathBuf>,

    /// Directory containing the history backups (default: <cursor-dir>/History)
    #[arg(short = 'd', long)]
    pub history_dir: Option<PathBuf>,

    /// Original directory to restore (e.g. ~/Projects/MyProject/)
    #[arg(short = 'r', long, required_unless_present = "list_workspaces")]
    pub restore_path: Option<String>,

    /// Output directory for restored files
    #[arg(short = 'o', long, default_value = "restoredFolder")]
    pub output_dir: PathBuf,

    /// Start of the time range, local time (YYYY-MM-DD HH:MM:SS or YYYY-MM-DD)
    #[arg(short = 's', long, value_parser = parse_local_datetime)]
    pub start_time: Option<DateTime<Utc>>,

    /// End of the time range, local time (default: now)
    #[arg(short = 'e', long, value_parser = parse_local_datetime)]
    pub end_time: Option<DateTime<Utc>>,

    /// Number of days back to search (ignored if --start-time is given)
    #[arg(short = 'b', long, default_value_t = 7)]
    pub days_back: u32,

    /// List all available workspaces and exit
    #[arg(short = 'l', long)]
    pub list_workspaces: bool,

    /// Minimal output
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

pub fn run() -> Result<()> {
    let cli = RestoreCli::parse();
    init_logging(cli.quiet);
    execute(&cli)
}

/// Run the restore tool with already-parsed arguments
pub fn execute(cli: &RestoreCli) -> Result<()> {
    let user_dir = match &cli.cursor_dir {
        Some(dir) => dir.clone(),
        None => get_cursor_user_dir()?,
    };

    if cli.list_workspaces {
        return show_workspaces(&user_dir);
    }

    let Some(restore_path) = cli.restore_path.as_deref() else {
        bail!("--restore-path is required (or use --list-workspaces to list workspaces)");
    };

    let window = resolve_window(cli.start_time, cli.end_time, cli.days_back, Utc::now())?;
    let history_dir = cli.history_dir.clone().unwrap_or_else(|| environment::history_dir(&user_dir));
    let verbose = !cli.quiet;

    if verbose {
        println!("Cursor History Restore");
        println!("{}", "=".repeat(RULE_WIDTH));
        println!("History directory: {}", format_path_with_tilde(&history_dir));
        println!("Restore path: {}", restore_path);
        println!("Output directory: {}", cli.output_dir.display());
        println!("Time range: {} to {}", format_local(window.start), format_local(window.end));
        println!();
    }

    let scan = scan_history(&history_dir, restore_path, &window)?;
    if verbose {
        print_scan(&scan);
    }

    if scan.selection.is_empty() {
        if verbose {
            println!("No files found matching the criteria.");
        }
        return Ok(());
    }

    let report = materialize(&scan.selection, &cli.output_dir)?;
    if verbose {
        print_restore(&report, &cli.output_dir);
    } else if !report.failures.is_empty() {
        eprintln!(
            "Restored {} files, {} failed",
            report.restored_count(),
            report.failures.len()
        );
    }

    Ok(())
}

/// Resolve the time window from explicit bounds or a day-count lookback
///
/// `end` defaults to `now`; without `start`, the window reaches `days_back` days back
/// from `end`.
pub fn resolve_window(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    days_back: u32,
    now: DateTime<Utc>,
) -> Result<TimeWindow> {
    let end = end.unwrap_or(now);
    match start {
        Some(start) => TimeWindow::new(start, end),
        None => TimeWindow::days_back(end, days_back),
    }
}

/// Parse a local `YYYY-MM-DD HH:MM:SS` (or `YYYY-MM-DD`) timestamp into UTC
pub fn parse_local_datetime(value: &str) -> Result<DateTime<Utc>, String> {
    let value = value.trim();
    let naive = NaiveDateTime::parse_from_str(value, TIME_FORMAT)
        .or_else(|_| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d").map(|date| date.and_time(Default::default()))
        })
        .map_err(|_| format!("invalid timestamp '{}', expected YYYY-MM-DD HH:MM:SS", value))?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| format!("'{}' does not exist in the local time zone", value))
}

fn format_local(timestamp: DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format(TIME_FORMAT).to_string()
}

fn display_relative(relative_path: &str) -> &str {
    if relative_path.is_empty() { "." } else { relative_path }
}

fn print_scan(scan: &HistoryScan) {
    for (relative_path, entry) in &scan.selection {
        println!("Found: {} (from {})", display_relative(relative_path), format_local(entry.timestamp));
    }
    println!();
    println!(
        "Processed {} folders, found {} matching files",
        scan.folders_scanned,
        scan.selection.len()
    );
    if !scan.skipped.is_empty() {
        println!("Skipped {} folders with malformed metadata", scan.skipped.len());
    }
}

fn print_restore(report: &MaterializeReport, output_dir: &Path) {
    println!();
    println!("Restoring files to: {}", output_dir.display());
    for relative_path in &report.restored {
        println!("Restored: {}", display_relative(relative_path));
    }
    for failure in &report.failures {
        println!("Error restoring {}: {}", display_relative(&failure.relative_path), failure.error);
    }

    println!();
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("Restore complete!");
    println!("Total files restored: {}", report.restored_count());
    if !report.failures.is_empty() {
        println!("Failed: {}", report.failures.len());
    }
}

fn show_workspaces(user_dir: &Path) -> Result<()> {
    let workspaces = list_workspaces(user_dir)?;

    println!("Available Workspaces:");
    println!("{}", "=".repeat(RULE_WIDTH));
    if workspaces.is_empty() {
        println!("No workspaces found.");
        return Ok(());
    }

    for workspace in &workspaces {
        println!();
        println!("Workspace ID: {}", workspace.id);
        println!("  Path: {}", workspace.canonical_path);
        println!("  Database: {}", workspace.store_location.display());
    }

    Ok(())
}
