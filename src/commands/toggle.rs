//! `tasklist toggle` command.

use std::io::Write;

use super::print_view;
use crate::store::TaskStore;
use crate::task::TaskId;

/// Flip a task between done and not done, then print the reconciled list.
///
/// # Errors
///
/// Returns an error string when the list cannot be loaded, the task is not
/// in it, or the service rejects the update.
pub async fn run(store: &mut TaskStore<'_>, id: i64, out: &mut dyn Write) -> Result<(), String> {
    let id = TaskId(id);
    if let Err(e) = store.load().await {
        print_view(store, out)?;
        return Err(format!("Failed to load tasks: {e}"));
    }

    let Some(updated) = store.toggle(id).await else {
        print_view(store, out)?;
        return Err(format!("No task #{id} in the list"));
    };
    print_view(store, out)?;
    updated.map(|_| ()).map_err(|e| format!("Failed to update task #{id}: {e}"))
}
