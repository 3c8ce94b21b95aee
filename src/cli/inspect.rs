use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::cli::logging::init_logging;
use crate::store::{DEFAULT_OUTPUT_DIR, DEFAULT_TABLE, KvStore, extract_code, render_value};
use crate::utils::environment::{CURSOR_USER_DIR_ENV, global_state_db};
use crate::utils::{get_cursor_user_dir, strip_ansi_codes};

const RULE_WIDTH: usize = 80;

const EXAMPLES: &str = "\
Examples:
  # Summary of the global state database
  cursor-inspect

  # Keys that look like chat bubbles
  cursor-inspect -s 'bubbleId:%' -l 20

  # Pretty-print one value
  cursor-inspect -g 'bubbleId:abc'

  # Extract code snippets mentioning a project
  cursor-inspect -e -f MyProject -o snippets";

#[derive(Parser, Debug)]
#[command(name = "cursor-inspect")]
#[command(version)]
#[command(about = "Explore Cursor SQLite databases to extract code and chat history", long_about = None)]
#[command(after_help = EXAMPLES)]
pub struct InspectCli {
    /// Cursor User directory, used to locate the default database
    #[arg(long, env = CURSOR_USER_DIR_ENV)]
    pub cursor_dir: Option<PathBuf>,

    /// Path to a state.vscdb file (default: <cursor-dir>/globalStorage/state.vscdb)
    #[arg(short = 'd', long)]
    pub db: Option<PathBuf>,

    /// Table to query
    #[arg(long, default_value = DEFAULT_TABLE)]
    pub table: String,

    /// List all tables
    #[arg(short = 't', long)]
    pub list_tables: bool,

    /// List keys of the table
    #[arg(short = 'k', long)]
    pub list_keys: bool,

    /// Search keys with a LIKE pattern (e.g. 'bubbleId:%')
    #[arg(short = 's', long)]
    pub search: Option<String>,

    /// Print the value stored under a key
    #[arg(short = 'g', long)]
    pub get_value: Option<String>,

    /// Extract code snippets from conversations
    #[arg(short = 'e', long)]
    pub extract_code: bool,

    /// Only extract from conversations containing this text
    #[arg(short = 'f', long)]
    pub filter: Option<String>,

    /// Output directory for extracted code
    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Maximum number of keys to display (0 shows all)
    #[arg(short = 'l', long)]
    pub limit: Option<usize>,
}

pub fn run() -> Result<()> {
    let cli = InspectCli::parse();
    init_logging(false);
    execute(&cli)
}

/// Run the inspector with already-parsed arguments
pub fn execute(cli: &InspectCli) -> Result<()> {
    let db_path = match &cli.db {
        Some(path) => path.clone(),
        None => match &cli.cursor_dir {
            Some(dir) => global_state_db(dir),
            None => global_state_db(&get_cursor_user_dir()?),
        },
    };
    let store = KvStore::open(&db_path)?;

    println!("Exploring database: {}", store.path().display());
    println!();

    if cli.list_tables {
        show_tables(&store)
    } else if cli.list_keys {
        show_keys(&store, &cli.table, cli.limit)
    } else if let Some(pattern) = &cli.search {
        show_search(&store, pattern, &cli.table, cli.limit)
    } else if let Some(key) = &cli.get_value {
        show_value(&store, key, &cli.table)
    } else if cli.extract_code {
        show_extract(cli, &store)
    } else {
        show_summary(&store)
    }
}

fn show_tables(store: &KvStore) -> Result<()> {
    let tables = store.list_tables()?;
    println!("Tables:");
    println!("{}", "=".repeat(RULE_WIDTH));
    for table in &tables {
        println!("  {}", strip_ansi_codes(table));
        if let Some(schema) = store.table_schema(table)? {
            println!("    Schema: {}", strip_ansi_codes(&schema));
        }
    }
    Ok(())
}

fn show_keys(store: &KvStore, table: &str, limit: Option<usize>) -> Result<()> {
    let keys = store.list_keys(table, limit)?;
    let total = store.count_keys(table)?;

    println!("Keys in {}:", table);
    println!("{}", "=".repeat(RULE_WIDTH));
    for key in &keys {
        println!("  {}", strip_ansi_codes(key));
    }
    println!();
    println!("Showing {} of {} keys", keys.len(), total);
    Ok(())
}

fn show_search(store: &KvStore, pattern: &str, table: &str, limit: Option<usize>) -> Result<()> {
    let keys = store.search_keys(pattern, table)?;
    let shown = limit.filter(|&n| n > 0).unwrap_or(keys.len()).min(keys.len());

    println!("Keys matching '{}':", pattern);
    println!("{}", "=".repeat(RULE_WIDTH));
    for key in &keys[..shown] {
        println!("  {}", strip_ansi_codes(key));
    }
    println!();
    println!("Total: {} matching keys", keys.len());
    Ok(())
}

fn show_value(store: &KvStore, key: &str, table: &str) -> Result<()> {
    match store.get_value(key, table)? {
        Some(bytes) => {
            println!("Value for key '{}':", key);
            println!("{}", "=".repeat(RULE_WIDTH));
            println!("{}", strip_ansi_codes(&render_value(&bytes)));
        }
        None => println!("Key not found: {}", key),
    }
    Ok(())
}

fn show_extract(cli: &InspectCli, store: &KvStore) -> Result<()> {
    let report = extract_code(store, &cli.table, &cli.output_dir, cli.filter.as_deref())?;

    println!("Conversations searched: {}", report.conversations);
    if report.skipped > 0 {
        println!("Skipped {} records that are not JSON", report.skipped);
    }
    for path in &report.extracted {
        println!("Extracted: {}", path.display());
    }
    if report.write_failures > 0 {
        println!("Failed to write {} snippets", report.write_failures);
    }
    println!();
    println!("Extracted {} code snippets to {}", report.extracted.len(), cli.output_dir.display());
    Ok(())
}

fn show_summary(store: &KvStore) -> Result<()> {
    println!("Database Summary:");
    println!("{}", "=".repeat(RULE_WIDTH));
    for summary in store.summarize()? {
        println!();
        println!("Table: {}", strip_ansi_codes(&summary.name));
        println!("  Keys: {}", summary.key_count);
        if !summary.sample_keys.is_empty() {
            println!("  Sample keys:");
            for key in &summary.sample_keys {
                println!("    {}", strip_ansi_codes(key));
            }
        }
    }
    Ok(())
}
