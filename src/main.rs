//! Binary entrypoint for the `tasklist` CLI.

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // A missing .env file is fine; settings fall back to defaults.
    let _ = dotenvy::dotenv();
    init_logging();

    match tasklist::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so they never interleave with the rendered list.
fn init_logging() {
    let filter = EnvFilter::try_from_env("TASKLIST_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
