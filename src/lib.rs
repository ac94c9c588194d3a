//! Core library entry for the `tasklist` CLI.
//!
//! A terminal front end for a remote todo service. Reads go through a
//! client-side [`cache::TaskCache`]; writes are applied optimistically,
//! rolled back on failure and reconciled with the service afterwards.

pub mod adapters;
pub mod cache;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod context;
pub mod error;
pub mod ports;
pub mod settings;
pub mod store;
pub mod task;
pub mod view;

use clap::Parser;

use crate::settings::Settings;

/// Run the CLI with the provided arguments.
///
/// Settings come from `TASKLIST_*` environment variables, overridden by
/// flags. Commands run on a single-threaded runtime.
///
/// # Errors
///
/// Returns an error string when argument parsing, configuration, or
/// command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        // --help and --version
        Err(err) if !err.use_stderr() => {
            print!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err.to_string().trim_end().to_string()),
    };
    let settings = Settings::from_env()?.with_overrides(&cli.overrides());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start runtime: {e}"))?;
    runtime.block_on(commands::dispatch(&cli.command, &settings))
}
