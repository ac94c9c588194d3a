//! `tasklist rm` command.

use std::io::Write;

use super::print_view;
use crate::store::TaskStore;
use crate::task::TaskId;

/// Delete a task and print the reconciled list.
///
/// # Errors
///
/// Returns an error string when the list cannot be loaded or the service
/// rejects the delete.
pub async fn run(store: &mut TaskStore<'_>, id: i64, out: &mut dyn Write) -> Result<(), String> {
    let id = TaskId(id);
    if let Err(e) = store.load().await {
        print_view(store, out)?;
        return Err(format!("Failed to load tasks: {e}"));
    }

    let deleted = store.delete(id).await;
    print_view(store, out)?;
    deleted.map(|_| ()).map_err(|e| format!("Failed to delete task #{id}: {e}"))
}
