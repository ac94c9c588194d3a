//! Command dispatch and handlers.

pub mod add;
pub mod list;
pub mod remove;
pub mod shell;
pub mod toggle;

use std::io::Write;

use crate::cassette::session::RecordingSession;
use crate::cli::Command;
use crate::context::ServiceContext;
use crate::settings::Settings;
use crate::store::TaskStore;
use crate::view;

/// Dispatch a parsed command to its handler.
///
/// `TASKLIST_REPLAY` serves the run from a cassette; `TASKLIST_RECORD`
/// records it (see [`ServiceContext::from_settings`]).
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub async fn dispatch(command: &Command, settings: &Settings) -> Result<(), String> {
    let (ctx, session) = ServiceContext::from_settings(settings)?;

    let result = {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        dispatch_with_context(command, &ctx, settings, &mut out).await
    };

    // Finish recording after the command completes (even on error)
    if let Some(session) = session {
        // Drop context first to release the recorder
        drop(ctx);
        finish_recording(session)?;
    }

    result
}

/// Dispatch a command with the given service context.
async fn dispatch_with_context(
    command: &Command,
    ctx: &ServiceContext,
    settings: &Settings,
    out: &mut dyn Write,
) -> Result<(), String> {
    let mut store = TaskStore::with_settings(ctx.api.as_ref(), settings);
    match command {
        Command::List => list::run(&mut store, out).await,
        Command::Add { title } => {
            add::run(&mut store, &title.join(" "), settings.owner_id, out).await
        }
        Command::Toggle { id } => toggle::run(&mut store, *id, out).await,
        Command::Rm { id } => remove::run(&mut store, *id, out).await,
        Command::Shell => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            shell::run(&mut store, settings.owner_id, stdin, out).await
        }
    }
}

/// Write the rendered view of `store`.
pub(crate) fn print_view(store: &TaskStore<'_>, out: &mut dyn Write) -> Result<(), String> {
    write!(out, "{}", view::render(store.cache()))
        .map_err(|e| format!("Failed to write output: {e}"))
}

/// Load the list and show it; a failed load is shown and reported.
pub(crate) async fn load_and_show(
    store: &mut TaskStore<'_>,
    out: &mut dyn Write,
) -> Result<(), String> {
    let loaded = store.load().await;
    print_view(store, out)?;
    loaded.map_err(|e| format!("Failed to load tasks: {e}"))
}

/// Finish a recording session and report where it went.
fn finish_recording(session: RecordingSession) -> Result<(), String> {
    let output_dir = session.finish()?;
    eprintln!("Recording saved to: {}", output_dir.display());
    Ok(())
}
