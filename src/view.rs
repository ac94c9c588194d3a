//! Text rendering of the cache and parsing of shell intents.

use std::fmt::Write as _;

use crate::cache::{MutationKind, TaskCache};
use crate::task::{Task, TaskId};

/// Rows shown while the first load is outstanding.
const SKELETON_ROWS: usize = 3;

/// Renders the cache as the text the user sees.
///
/// Pure function of the cache state: header, pending indicator, error
/// banners, loading skeleton, then one row per task.
#[must_use]
pub fn render(cache: &TaskCache) -> String {
    let mut out = String::from("Todo List\n");

    if cache.is_pending(MutationKind::Create) {
        out.push_str("Adding...\n");
    }

    if let Some(error) = cache.list_error() {
        let _ = writeln!(out, "Error: {error}  (type `retry` to try again)");
    }
    if let Some(failed) = cache.mutation_error() {
        let target = label(failed.target);
        let _ = writeln!(out, "Failed to {} task {target}: {}", failed.kind, failed.error);
    }

    if cache.is_loading() {
        for _ in 0..SKELETON_ROWS {
            out.push_str("  [░] ░░░░ ░░░░░░░░░░░░░░░░\n");
        }
        return out;
    }

    let busy = cache.is_pending(MutationKind::Update) || cache.is_pending(MutationKind::Delete);
    for task in cache.tasks() {
        out.push_str(&row(task, busy));
        out.push('\n');
    }
    if cache.tasks().is_empty() && cache.list_error().is_none() {
        out.push_str("  Nothing to do.\n");
    }
    out
}

fn row(task: &Task, busy: bool) -> String {
    let check = if task.completed { 'x' } else { ' ' };
    let suffix = if busy || task.id.is_placeholder() { "  ..." } else { "" };
    format!("  [{check}] {:>5}  {}{suffix}", label(task.id), task.title)
}

/// Placeholder ids mean nothing to the user; show an ellipsis instead.
fn label(id: TaskId) -> String {
    if id.is_placeholder() {
        "…".to_string()
    } else {
        format!("#{id}")
    }
}

/// Something the user asked for in the interactive shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// `add <title>`
    Create(String),
    /// `toggle <id>`
    Toggle(TaskId),
    /// `rm <id>`
    Delete(TaskId),
    /// `retry`
    Retry,
    /// `list`
    Show,
    /// `help`
    Help,
    /// `quit`
    Quit,
}

/// Help text listing the shell intents.
pub const HELP: &str = "\
Commands:
  add <title>    create a task
  toggle <id>    flip a task between done and not done
  rm <id>        delete a task
  retry          reload the list
  list           show the list again
  quit           leave";

impl Intent {
    /// Parses one shell line.
    ///
    /// Returns `Ok(None)` for lines that ask for nothing, such as blank
    /// input or `add` with a blank title.
    ///
    /// # Errors
    ///
    /// Returns a message for unknown commands and malformed ids.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let intent = match command {
            "" => return Ok(None),
            "add" | "a" => {
                if rest.is_empty() {
                    return Ok(None);
                }
                Self::Create(rest.to_string())
            }
            "toggle" | "t" => Self::Toggle(parse_id(rest)?),
            "rm" | "delete" | "d" => Self::Delete(parse_id(rest)?),
            "retry" | "r" => Self::Retry,
            "list" | "ls" => Self::Show,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(format!("Unknown command `{other}`. Type `help` for a list.")),
        };
        Ok(Some(intent))
    }
}

fn parse_id(raw: &str) -> Result<TaskId, String> {
    let raw = raw.trim_start_matches('#');
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id >= 0)
        .map(TaskId)
        .ok_or_else(|| format!("Expected a task id, got `{raw}`"))
}
