use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber
///
/// Warnings (skipped records, failed copies) are shown by default; `quiet` keeps only
/// errors. `RUST_LOG` overrides both.
pub fn init_logging(quiet: bool) {
    let default_level = if quiet { "error" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber may already be installed (tests, embedding)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
