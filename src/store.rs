//! Async driver that couples a [`TaskCache`] with a [`TaskApi`].
//!
//! Every mutation follows the same sequence: apply the optimistic edit,
//! call the service, settle (rolling back on failure), then reconcile with
//! a fresh list whatever the outcome. When several mutations overlap, only
//! the last one to settle reconciles.

use std::time::Duration;

use crate::cache::{Mutation, PendingMutation, RefreshOutcome, Settlement, TaskCache};
use crate::error::ApiError;
use crate::ports::task_api::{ApiFuture, TaskApi};
use crate::settings::Settings;
use crate::task::{DeleteAck, Task, TaskDraft, TaskId, TaskPatch};

/// Upper bound for the delay between automatic list retries.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// A mutation applied to the cache whose service call has not been awaited.
#[must_use = "an in-flight mutation must be finished"]
pub struct InFlight<'a, T> {
    pending: PendingMutation,
    call: ApiFuture<'a, T>,
}

impl<T> InFlight<'_, T> {
    /// The task this mutation targets; the placeholder id for creates.
    pub fn target(&self) -> TaskId {
        self.pending.target()
    }
}

/// Owns the cache for one session and routes intents to the service.
pub struct TaskStore<'a> {
    api: &'a dyn TaskApi,
    cache: TaskCache,
    list_retries: u32,
    retry_delay: Duration,
}

impl<'a> TaskStore<'a> {
    /// A store with an empty cache. Nothing is fetched until [`TaskStore::load`].
    #[must_use]
    pub fn new(api: &'a dyn TaskApi) -> Self {
        let defaults = Settings::default();
        Self {
            api,
            cache: TaskCache::new(),
            list_retries: defaults.list_retries,
            retry_delay: defaults.retry_delay,
        }
    }

    /// A store using the retry policy from `settings`.
    #[must_use]
    pub fn with_settings(api: &'a dyn TaskApi, settings: &Settings) -> Self {
        Self::new(api).with_retries(settings.list_retries, settings.retry_delay)
    }

    /// Overrides the automatic list retry policy.
    #[must_use]
    pub fn with_retries(mut self, retries: u32, delay: Duration) -> Self {
        self.list_retries = retries;
        self.retry_delay = delay;
        self
    }

    /// Read access to the cache for rendering.
    #[must_use]
    pub fn cache(&self) -> &TaskCache {
        &self.cache
    }

    /// Fetches the task list, retrying automatically before giving up.
    ///
    /// A response that arrives while a mutation is pending is dropped; the
    /// last mutation to settle fetches again.
    ///
    /// # Errors
    ///
    /// Returns the last list error; it is also kept in the cache until a
    /// later refresh succeeds.
    pub async fn load(&mut self) -> Result<(), ApiError> {
        let ticket = self.cache.begin_refresh();
        let result = self.list_with_retries().await;
        let error = result.as_ref().err().cloned();
        match self.cache.finish_refresh(ticket, result) {
            RefreshOutcome::Applied => {
                tracing::debug!(count = self.cache.tasks().len(), "task list refreshed");
            }
            RefreshOutcome::Failed => tracing::warn!("task list unavailable"),
            RefreshOutcome::Superseded => tracing::debug!("task list response superseded"),
        }
        error.map_or(Ok(()), Err)
    }

    /// Re-issues the list request after a failure.
    ///
    /// # Errors
    ///
    /// See [`TaskStore::load`].
    pub async fn retry(&mut self) -> Result<(), ApiError> {
        tracing::info!("retrying task list");
        self.load().await
    }

    /// Creates a task, showing it at the head of the list right away.
    ///
    /// # Errors
    ///
    /// Returns the service error after the list has been rolled back.
    pub async fn create(&mut self, draft: TaskDraft) -> Result<Task, ApiError> {
        let op = self.start_create(draft);
        self.finish(op).await
    }

    /// Merges `patch` into task `id`.
    ///
    /// # Errors
    ///
    /// Returns the service error after the list has been rolled back.
    pub async fn update(&mut self, id: TaskId, patch: TaskPatch) -> Result<Task, ApiError> {
        let op = self.start_update(id, patch);
        self.finish(op).await
    }

    /// Flips `completed` on a cached task.
    ///
    /// Returns `None` without contacting the service when `id` is not in
    /// the current list.
    pub async fn toggle(&mut self, id: TaskId) -> Option<Result<Task, ApiError>> {
        let op = self.start_toggle(id)?;
        Some(self.finish(op).await)
    }

    /// Deletes task `id`, hiding it right away.
    ///
    /// # Errors
    ///
    /// Returns the service error after the list has been rolled back.
    pub async fn delete(&mut self, id: TaskId) -> Result<DeleteAck, ApiError> {
        let op = self.start_delete(id);
        self.finish(op).await
    }

    /// Applies the optimistic create and prepares the request.
    ///
    /// The cache already shows the new task when this returns. Nothing is
    /// sent until the operation is passed to [`TaskStore::finish`].
    pub fn start_create(&mut self, draft: TaskDraft) -> InFlight<'a, Task> {
        let api = self.api;
        let pending = self.cache.begin_mutation(Mutation::Create(draft.clone()));
        InFlight { pending, call: api.create(&draft) }
    }

    /// Applies the optimistic update and prepares the request.
    ///
    /// The request is sent by [`TaskStore::finish`].
    pub fn start_update(&mut self, id: TaskId, patch: TaskPatch) -> InFlight<'a, Task> {
        let api = self.api;
        let call = api.update(id, &patch);
        let pending = self.cache.begin_mutation(Mutation::Update { id, patch });
        InFlight { pending, call }
    }

    /// Like [`TaskStore::start_update`] with the cached `completed` flipped.
    ///
    /// Returns `None` when `id` is not in the current list.
    pub fn start_toggle(&mut self, id: TaskId) -> Option<InFlight<'a, Task>> {
        let completed = self.cache.find(id)?.completed;
        Some(self.start_update(id, TaskPatch::completed(!completed)))
    }

    /// Applies the optimistic delete and prepares the request.
    ///
    /// The request is sent by [`TaskStore::finish`].
    pub fn start_delete(&mut self, id: TaskId) -> InFlight<'a, DeleteAck> {
        let api = self.api;
        let pending = self.cache.begin_mutation(Mutation::Delete(id));
        InFlight { pending, call: api.delete(id) }
    }

    /// Sends the request, settles the mutation and reconciles the list.
    ///
    /// The list is re-fetched whether the call succeeded or not, unless
    /// other mutations are still pending. Their optimistic edits stay in
    /// place and the last of them to finish reconciles. A failed re-fetch
    /// is recorded as the list error and does not change the settlement.
    ///
    /// # Errors
    ///
    /// Returns the service error of the mutation itself.
    pub async fn finish<T>(&mut self, op: InFlight<'a, T>) -> Result<T, ApiError> {
        let InFlight { pending, call } = op;
        let result = call.await;

        let kind = pending.kind();
        let target = pending.target();
        let outcome = result.as_ref().map(|_| ());
        match self.cache.settle(pending, outcome) {
            Settlement::Committed => tracing::info!(%kind, %target, "mutation committed"),
            Settlement::RolledBack => tracing::warn!(%kind, %target, "mutation rolled back"),
        }

        if self.cache.has_pending_mutations() {
            tracing::debug!(%kind, "other mutations pending, deferring reconciliation");
        } else if let Err(error) = self.load().await {
            tracing::warn!(%error, "reconciliation after {kind} failed");
        }
        result
    }

    async fn list_with_retries(&self) -> Result<Vec<Task>, ApiError> {
        let mut attempt = 0;
        loop {
            match self.api.list().await {
                Ok(tasks) => return Ok(tasks),
                Err(error) if attempt < self.list_retries => {
                    let delay = backoff(self.retry_delay, attempt);
                    tracing::warn!(%error, attempt, ?delay, "list failed, retrying");
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

/// Exponential backoff: `base * 2^attempt`, capped.
fn backoff(base: Duration, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt);
    base.saturating_mul(factor).min(MAX_RETRY_DELAY)
}
