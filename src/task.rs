//! Task records exchanged with the remote task service.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a task.
///
/// Ids assigned by the server are non-negative. Negative ids are local
/// placeholders handed out for optimistic creates and are replaced by the
/// server's ids on the next successful refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub i64);

impl TaskId {
    /// Returns `true` for locally generated placeholder ids.
    #[must_use]
    pub fn is_placeholder(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single todo item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Server-assigned id (or a placeholder while a create is in flight).
    pub id: TaskId,
    /// What needs to be done.
    #[serde(alias = "todo")]
    pub title: String,
    /// Whether the item is done.
    #[serde(default)]
    pub completed: bool,
    /// The owning user.
    #[serde(rename = "userId", alias = "ownerId", default)]
    pub owner_id: i64,
}

/// Fields submitted when creating a task. The server assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    /// What needs to be done.
    pub title: String,
    /// Initial completion flag.
    pub completed: bool,
    /// The owning user.
    pub owner_id: i64,
}

impl TaskDraft {
    /// A not-yet-completed draft for the given owner.
    pub fn new(title: impl Into<String>, owner_id: i64) -> Self {
        Self { title: title.into(), completed: false, owner_id }
    }
}

/// Partial update of a task. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    /// Replacement title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Replacement completion flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// A patch that only sets `completed`.
    #[must_use]
    pub fn completed(completed: bool) -> Self {
        Self { title: None, completed: Some(completed) }
    }

    /// Merges the present fields into `task`. Id and owner never change.
    pub fn apply(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title.clone_from(title);
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}

/// Confirmation returned by a delete.
///
/// Some services echo the removed record, others only signal success.
/// Callers should not rely on either form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeleteAck {
    /// The service acknowledged the delete without a usable body.
    Confirmed,
    /// The service echoed the deleted record.
    Echoed(Task),
}
