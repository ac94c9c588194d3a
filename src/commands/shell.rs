//! `tasklist shell`: an interactive session over one cache.
//!
//! The cache lives as long as the session. Each mutation is rendered twice:
//! once with the optimistic edit applied, once after the service answered
//! and the list was reconciled.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use super::print_view;
use crate::store::TaskStore;
use crate::task::TaskDraft;
use crate::view::{Intent, HELP};

const PROMPT: &str = "> ";

/// Run the session until `quit` or end of input.
///
/// Service failures never end the session; they show up in the view.
///
/// # Errors
///
/// Returns an error string only when input or output fails.
pub async fn run<R>(
    store: &mut TaskStore<'_>,
    owner_id: i64,
    input: R,
    out: &mut dyn Write,
) -> Result<(), String>
where
    R: AsyncBufRead + Unpin,
{
    print_view(store, out)?;
    let _ = store.load().await;
    print_view(store, out)?;

    let mut lines = input.lines();
    loop {
        write_out(out, PROMPT)?;
        let Some(line) = lines.next_line().await.map_err(|e| format!("Failed to read input: {e}"))?
        else {
            break;
        };

        let intent = match Intent::parse(&line) {
            Ok(Some(intent)) => intent,
            Ok(None) => continue,
            Err(message) => {
                write_out(out, &format!("{message}\n"))?;
                continue;
            }
        };

        match intent {
            Intent::Quit => break,
            Intent::Help => write_out(out, &format!("{HELP}\n"))?,
            Intent::Show => print_view(store, out)?,
            Intent::Retry => {
                let _ = store.retry().await;
                print_view(store, out)?;
            }
            Intent::Create(title) => {
                let op = store.start_create(TaskDraft::new(title, owner_id));
                print_view(store, out)?;
                let _ = store.finish(op).await;
                print_view(store, out)?;
            }
            Intent::Toggle(id) => {
                let Some(op) = store.start_toggle(id) else {
                    write_out(out, &format!("No task #{id} in the list\n"))?;
                    continue;
                };
                print_view(store, out)?;
                let _ = store.finish(op).await;
                print_view(store, out)?;
            }
            Intent::Delete(id) => {
                let op = store.start_delete(id);
                print_view(store, out)?;
                let _ = store.finish(op).await;
                print_view(store, out)?;
            }
        }
    }
    Ok(())
}

fn write_out(out: &mut dyn Write, text: &str) -> Result<(), String> {
    out.write_all(text.as_bytes())
        .and_then(|()| out.flush())
        .map_err(|e| format!("Failed to write output: {e}"))
}
