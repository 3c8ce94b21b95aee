use std::process::ExitCode;

fn main() -> ExitCode {
    match cursor_history_restore::cli::restore::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
