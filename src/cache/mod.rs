//! Client-side task cache with optimistic mutations.
//!
//! [`TaskCache`] does no I/O. It holds the client's current belief about the
//! server's task list and exposes the transitions that a driver (see
//! [`crate::store::TaskStore`]) walks through around each service call:
//!
//! ```text
//! begin_refresh ──► (list) ──► finish_refresh      Applied | Failed | Superseded
//! begin_mutation ─► (call) ──► settle ──► refresh  Committed | RolledBack
//! ```
//!
//! A list response never overwrites an optimistic edit: starting a mutation
//! supersedes any refresh in flight, and responses that arrive while a
//! mutation is pending are dropped.

pub mod mutation;

use crate::error::ApiError;
use crate::task::{Task, TaskId};

pub use mutation::{Mutation, MutationKind, MutationPhase, PendingMutation, Settlement};

use mutation::MutationSlots;

/// Handle for one list request. Only the most recent ticket is honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a refresh ticket must be passed to finish_refresh"]
pub struct FetchTicket {
    generation: u64,
}

/// What happened to a finished list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The response replaced the snapshot.
    Applied,
    /// The request failed; the error is now the list error.
    Failed,
    /// A newer refresh or a mutation started meanwhile, or a mutation is
    /// still pending; the response was dropped.
    Superseded,
}

/// The last failed mutation, kept for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationError {
    /// Which kind of mutation failed.
    pub kind: MutationKind,
    /// The task it targeted.
    pub target: TaskId,
    /// Why it failed.
    pub error: ApiError,
}

/// Single-owner store of the task list and its loading/error state.
#[derive(Debug, Clone)]
pub struct TaskCache {
    snapshot: Option<Vec<Task>>,
    list_error: Option<ApiError>,
    mutation_error: Option<MutationError>,
    generation: u64,
    in_flight: Option<u64>,
    slots: MutationSlots,
    next_placeholder: i64,
}

impl Default for TaskCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskCache {
    /// An empty cache: nothing loaded, nothing in flight.
    #[must_use]
    pub fn new() -> Self {
        Self {
            snapshot: None,
            list_error: None,
            mutation_error: None,
            generation: 0,
            in_flight: None,
            slots: MutationSlots::default(),
            next_placeholder: -1,
        }
    }

    /// The current task list, `None` until something has been loaded.
    #[must_use]
    pub fn snapshot(&self) -> Option<&[Task]> {
        self.snapshot.as_deref()
    }

    /// The current task list, empty when nothing has been loaded.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        self.snapshot().unwrap_or_default()
    }

    /// Looks up a task in the current snapshot.
    #[must_use]
    pub fn find(&self, id: TaskId) -> Option<&Task> {
        self.tasks().iter().find(|task| task.id == id)
    }

    /// The error of the last failed list request, if not yet recovered.
    #[must_use]
    pub fn list_error(&self) -> Option<&ApiError> {
        self.list_error.as_ref()
    }

    /// The last failed mutation, until the next mutation starts.
    #[must_use]
    pub fn mutation_error(&self) -> Option<&MutationError> {
        self.mutation_error.as_ref()
    }

    /// Whether the first load is still outstanding.
    ///
    /// Background refreshes after a successful load, and retries after a
    /// failed one, do not count as loading.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.snapshot.is_none() && self.list_error.is_none()
    }

    /// Whether a list request is outstanding.
    #[must_use]
    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Lifecycle phase of the mutations of `kind`.
    #[must_use]
    pub fn phase(&self, kind: MutationKind) -> MutationPhase {
        self.slots.phase(kind)
    }

    /// Whether a mutation of `kind` is in flight.
    #[must_use]
    pub fn is_pending(&self, kind: MutationKind) -> bool {
        self.phase(kind) == MutationPhase::Optimistic
    }

    /// Whether any mutation is in flight.
    #[must_use]
    pub fn has_pending_mutations(&self) -> bool {
        MutationKind::ALL.iter().any(|kind| self.is_pending(*kind))
    }

    /// Starts a list request, superseding any request already in flight.
    pub fn begin_refresh(&mut self) -> FetchTicket {
        self.generation += 1;
        self.in_flight = Some(self.generation);
        FetchTicket { generation: self.generation }
    }

    /// Marks any in-flight list request as stale. Its result will be ignored.
    pub fn cancel_refresh(&mut self) {
        if let Some(generation) = self.in_flight.take() {
            tracing::debug!(generation, "superseding in-flight refresh");
        }
    }

    /// Applies the result of the list request identified by `ticket`.
    ///
    /// The result is dropped when the ticket is stale or when a mutation is
    /// pending: the list cannot yet reflect that mutation.
    pub fn finish_refresh(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Task>, ApiError>,
    ) -> RefreshOutcome {
        if self.in_flight != Some(ticket.generation) {
            tracing::debug!(generation = ticket.generation, "discarding superseded list response");
            return RefreshOutcome::Superseded;
        }
        self.in_flight = None;
        if self.has_pending_mutations() {
            tracing::debug!(
                generation = ticket.generation,
                "discarding list response issued during a mutation"
            );
            return RefreshOutcome::Superseded;
        }
        match result {
            Ok(tasks) => {
                self.snapshot = Some(tasks);
                self.list_error = None;
                RefreshOutcome::Applied
            }
            Err(error) => {
                self.list_error = Some(error);
                RefreshOutcome::Failed
            }
        }
    }

    /// Applies `mutation` to the snapshot immediately.
    ///
    /// The returned [`PendingMutation`] carries the snapshot from before the
    /// edit and must be handed back to [`TaskCache::settle`].
    pub fn begin_mutation(&mut self, mutation: Mutation) -> PendingMutation {
        self.cancel_refresh();
        self.mutation_error = None;

        let target = match &mutation {
            Mutation::Create(_) => self.allocate_placeholder(),
            Mutation::Update { id, .. } | Mutation::Delete(id) => *id,
        };
        let prior_snapshot = self.snapshot.clone();
        self.snapshot = mutation::apply(prior_snapshot.as_deref(), &mutation, target);
        self.slots.start(mutation.kind());

        tracing::debug!(kind = %mutation.kind(), %target, "applied optimistic edit");
        PendingMutation { mutation, target, prior_snapshot }
    }

    /// Finishes a mutation with the outcome of its service call.
    ///
    /// On failure the snapshot captured by [`TaskCache::begin_mutation`] is
    /// restored verbatim.
    pub fn settle(
        &mut self,
        pending: PendingMutation,
        result: Result<(), &ApiError>,
    ) -> Settlement {
        let kind = pending.kind();
        let target = pending.target;
        let settlement = match result {
            Ok(()) => Settlement::Committed,
            Err(error) => {
                tracing::warn!(%kind, %target, %error, "rolling back optimistic edit");
                self.snapshot = pending.prior_snapshot;
                self.mutation_error = Some(MutationError { kind, target, error: error.clone() });
                Settlement::RolledBack
            }
        };
        self.slots.finish(kind, settlement);
        settlement
    }

    fn allocate_placeholder(&mut self) -> TaskId {
        let id = TaskId(self.next_placeholder);
        self.next_placeholder -= 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{TaskDraft, TaskPatch};

    fn task(id: i64, title: &str, completed: bool) -> Task {
        Task { id: TaskId(id), title: title.into(), completed, owner_id: 1 }
    }

    fn loaded(tasks: Vec<Task>) -> TaskCache {
        let mut cache = TaskCache::new();
        let ticket = cache.begin_refresh();
        assert_eq!(cache.finish_refresh(ticket, Ok(tasks)), RefreshOutcome::Applied);
        cache
    }

    fn three() -> Vec<Task> {
        vec![task(3, "c", false), task(5, "e", true), task(8, "h", false)]
    }

    fn transport(message: &str) -> ApiError {
        ApiError::Transport { message: message.into() }
    }

    #[test]
    fn new_cache_is_loading() {
        let cache = TaskCache::new();
        assert!(cache.is_loading());
        assert!(cache.snapshot().is_none());
        assert!(cache.tasks().is_empty());
    }

    #[test]
    fn optimistic_create_prepends_uncompleted_entry() {
        let mut cache = loaded(three());
        let pending = cache.begin_mutation(Mutation::Create(TaskDraft::new("Buy milk", 1)));

        let head = &cache.tasks()[0];
        assert_eq!(head.title, "Buy milk");
        assert!(!head.completed);
        assert!(head.id.is_placeholder());
        assert_eq!(head.id, pending.target());
        assert_eq!(cache.tasks().len(), 4);
        assert!(cache.is_pending(MutationKind::Create));
    }

    #[test]
    fn placeholders_never_repeat() {
        let mut cache = loaded(vec![]);
        let first = cache.begin_mutation(Mutation::Create(TaskDraft::new("a", 1)));
        let second = cache.begin_mutation(Mutation::Create(TaskDraft::new("b", 1)));
        assert_ne!(first.target(), second.target());
        assert!(first.target().is_placeholder());
        assert!(second.target().is_placeholder());
        let _ = cache.settle(first, Ok(()));
        let _ = cache.settle(second, Ok(()));
    }

    #[test]
    fn toggle_changes_only_completed() {
        let mut cache = loaded(three());
        let _pending = cache.begin_mutation(Mutation::Update {
            id: TaskId(3),
            patch: TaskPatch::completed(true),
        });

        assert_eq!(cache.find(TaskId(3)), Some(&task(3, "c", true)));
        assert_eq!(cache.find(TaskId(5)), Some(&task(5, "e", true)));
        assert_eq!(cache.find(TaskId(8)), Some(&task(8, "h", false)));
    }

    #[test]
    fn delete_removes_exactly_the_matching_entry() {
        for position in 0..3 {
            let mut tasks = vec![task(1, "a", false), task(2, "b", false)];
            tasks.insert(position, task(5, "five", false));
            let mut cache = loaded(tasks);

            let _pending = cache.begin_mutation(Mutation::Delete(TaskId(5)));
            let ids: Vec<i64> = cache.tasks().iter().map(|t| t.id.0).collect();
            assert_eq!(ids, vec![1, 2], "id 5 at position {position}");
        }
    }

    #[test]
    fn failure_restores_prior_snapshot_verbatim() {
        let mutations = [
            Mutation::Create(TaskDraft::new("x", 1)),
            Mutation::Update { id: TaskId(5), patch: TaskPatch::completed(false) },
            Mutation::Delete(TaskId(8)),
        ];
        for mutation in mutations {
            let mut cache = loaded(three());
            let before = cache.snapshot().map(<[Task]>::to_vec);

            let pending = cache.begin_mutation(mutation.clone());
            assert_ne!(cache.snapshot().map(<[Task]>::to_vec), before);

            let error = ApiError::HttpStatus { code: 500 };
            assert_eq!(cache.settle(pending, Err(&error)), Settlement::RolledBack);
            assert_eq!(cache.snapshot().map(<[Task]>::to_vec), before);
            assert_eq!(
                cache.phase(mutation.kind()),
                MutationPhase::Settled(Settlement::RolledBack)
            );
            let failed = cache.mutation_error().map(|e| e.kind);
            assert_eq!(failed, Some(mutation.kind()));
        }
    }

    #[test]
    fn rollback_of_create_on_unloaded_cache_returns_to_nothing() {
        let mut cache = TaskCache::new();
        let pending = cache.begin_mutation(Mutation::Create(TaskDraft::new("x", 1)));
        assert_eq!(cache.tasks().len(), 1);
        let _ = cache.settle(pending, Err(&transport("down")));
        assert!(cache.snapshot().is_none());
    }

    #[test]
    fn success_keeps_optimistic_snapshot_until_refresh() {
        let mut cache = loaded(three());
        let pending = cache.begin_mutation(Mutation::Delete(TaskId(3)));
        assert_eq!(cache.settle(pending, Ok(())), Settlement::Committed);
        assert_eq!(cache.tasks().len(), 2);
        assert!(!cache.is_pending(MutationKind::Delete));
    }

    #[test]
    fn mutation_supersedes_in_flight_refresh() {
        let mut cache = loaded(three());
        let stale = cache.begin_refresh();
        assert!(cache.is_fetching());

        let pending = cache.begin_mutation(Mutation::Delete(TaskId(5)));
        assert!(!cache.is_fetching());

        // The stale response still contains id 5 and must not resurrect it.
        let outcome = cache.finish_refresh(stale, Ok(three()));
        assert_eq!(outcome, RefreshOutcome::Superseded);
        assert!(cache.find(TaskId(5)).is_none());

        let _ = cache.settle(pending, Ok(()));
        let fresh = cache.begin_refresh();
        let server = vec![task(3, "c", false), task(8, "h", false)];
        let outcome = cache.finish_refresh(fresh, Ok(server.clone()));
        assert_eq!(outcome, RefreshOutcome::Applied);
        assert_eq!(cache.tasks(), server.as_slice());
    }

    #[test]
    fn refresh_begun_during_mutation_is_dropped() {
        let mut cache = loaded(three());
        let delete = cache.begin_mutation(Mutation::Delete(TaskId(5)));
        let toggle = cache.begin_mutation(Mutation::Update {
            id: TaskId(3),
            patch: TaskPatch::completed(true),
        });
        let _ = cache.settle(toggle, Ok(()));

        // Issued after both edits, answered before the delete reached the server.
        let ticket = cache.begin_refresh();
        let outcome = cache.finish_refresh(ticket, Ok(three()));
        assert_eq!(outcome, RefreshOutcome::Superseded);
        assert!(cache.find(TaskId(5)).is_none());
        assert!(!cache.is_fetching());

        let _ = cache.settle(delete, Ok(()));
        let ticket = cache.begin_refresh();
        let server = vec![task(3, "c", true), task(8, "h", false)];
        let outcome = cache.finish_refresh(ticket, Ok(server.clone()));
        assert_eq!(outcome, RefreshOutcome::Applied);
        assert_eq!(cache.tasks(), server.as_slice());
    }

    #[test]
    fn later_refresh_wins_over_earlier_one() {
        let mut cache = loaded(vec![]);
        let first = cache.begin_refresh();
        let second = cache.begin_refresh();
        let outcome = cache.finish_refresh(second, Ok(three()));
        assert_eq!(outcome, RefreshOutcome::Applied);
        let outcome = cache.finish_refresh(first, Ok(vec![]));
        assert_eq!(outcome, RefreshOutcome::Superseded);
        assert_eq!(cache.tasks().len(), 3);
    }

    #[test]
    fn list_failure_is_kept_until_a_successful_refresh() {
        let mut cache = TaskCache::new();
        let ticket = cache.begin_refresh();
        let outcome = cache.finish_refresh(ticket, Err(ApiError::HttpStatus { code: 500 }));
        assert_eq!(outcome, RefreshOutcome::Failed);
        assert!(!cache.is_loading());
        assert_eq!(cache.list_error(), Some(&ApiError::HttpStatus { code: 500 }));

        let retry = cache.begin_refresh();
        assert!(cache.list_error().is_some(), "error stays visible while retrying");
        cache.finish_refresh(retry, Ok(three()));
        assert!(cache.list_error().is_none());
        assert_eq!(cache.tasks().len(), 3);
    }

    #[test]
    fn failed_background_refresh_keeps_snapshot() {
        let mut cache = loaded(three());
        let ticket = cache.begin_refresh();
        cache.finish_refresh(ticket, Err(transport("reset")));
        assert_eq!(cache.tasks().len(), 3);
        assert!(!cache.is_loading());
    }
}
