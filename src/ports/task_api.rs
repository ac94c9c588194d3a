//! Task client port for the remote task service.

use std::future::Future;
use std::pin::Pin;

use crate::error::ApiError;
use crate::task::{DeleteAck, Task, TaskDraft, TaskId, TaskPatch};

/// Boxed future type alias used by [`TaskApi`] to keep the trait dyn-compatible.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// Talks to the remote task service.
///
/// Every call performs one request and propagates failures unchanged;
/// recovery is the caller's concern.
pub trait TaskApi: Send + Sync {
    /// Fetches all tasks.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] when the service is unreachable and
    /// [`ApiError::HttpStatus`] for non-success responses.
    fn list(&self) -> ApiFuture<'_, Vec<Task>>;

    /// Submits a draft and returns the task with its server-assigned id.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`TaskApi::list`].
    fn create(&self, draft: &TaskDraft) -> ApiFuture<'_, Task>;

    /// Applies a partial update and returns the merged task.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpStatus`] (typically 404) for unknown ids.
    fn update(&self, id: TaskId, patch: &TaskPatch) -> ApiFuture<'_, Task>;

    /// Removes a task.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`TaskApi::update`].
    fn delete(&self, id: TaskId) -> ApiFuture<'_, DeleteAck>;
}
