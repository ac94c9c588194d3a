//! `tasklist list` command.

use std::io::Write;

use super::load_and_show;
use crate::store::TaskStore;

/// Load and print the task list.
///
/// # Errors
///
/// Returns an error string when the list cannot be loaded; the error
/// banner has already been printed by then.
pub async fn run(store: &mut TaskStore<'_>, out: &mut dyn Write) -> Result<(), String> {
    load_and_show(store, out).await
}
