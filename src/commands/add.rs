//! `tasklist add` command.

use std::io::Write;

use super::print_view;
use crate::store::TaskStore;
use crate::task::TaskDraft;

/// Create a task and print the reconciled list.
///
/// # Errors
///
/// Returns an error string for a blank title, when the list cannot be
/// loaded, or when the service rejects the task.
pub async fn run(
    store: &mut TaskStore<'_>,
    title: &str,
    owner_id: i64,
    out: &mut dyn Write,
) -> Result<(), String> {
    let title = title.trim();
    if title.is_empty() {
        return Err("Title must not be blank".to_string());
    }
    if let Err(e) = store.load().await {
        print_view(store, out)?;
        return Err(format!("Failed to load tasks: {e}"));
    }

    let created = store.create(TaskDraft::new(title, owner_id)).await;
    print_view(store, out)?;
    let task = created.map_err(|e| format!("Failed to create task: {e}"))?;
    writeln!(out, "Created #{}", task.id).map_err(|e| format!("Failed to write output: {e}"))?;
    Ok(())
}
