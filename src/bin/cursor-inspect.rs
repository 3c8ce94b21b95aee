use std::process::ExitCode;

fn main() -> ExitCode {
    match cursor_history_restore::cli::inspect::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
