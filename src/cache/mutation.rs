//! Optimistic mutations and their per-kind lifecycle.

use std::fmt;

use crate::task::{Task, TaskDraft, TaskId, TaskPatch};

/// A user intent that changes the task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Add a new task.
    Create(TaskDraft),
    /// Merge fields into an existing task.
    Update {
        /// Task to change.
        id: TaskId,
        /// Fields to merge.
        patch: TaskPatch,
    },
    /// Remove a task.
    Delete(TaskId),
}

impl Mutation {
    /// The kind of this mutation.
    #[must_use]
    pub fn kind(&self) -> MutationKind {
        match self {
            Self::Create(_) => MutationKind::Create,
            Self::Update { .. } => MutationKind::Update,
            Self::Delete(_) => MutationKind::Delete,
        }
    }
}

/// Discriminant of [`Mutation`], used to track pending state per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    /// See [`Mutation::Create`].
    Create,
    /// See [`Mutation::Update`].
    Update,
    /// See [`Mutation::Delete`].
    Delete,
}

impl MutationKind {
    pub(crate) const ALL: [Self; 3] = [Self::Create, Self::Update, Self::Delete];

    fn index(self) -> usize {
        match self {
            Self::Create => 0,
            Self::Update => 1,
            Self::Delete => 2,
        }
    }

    /// Infinitive verb used in messages ("create", "update", "delete").
    #[must_use]
    pub fn verb(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// How a mutation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// The service accepted the change.
    Committed,
    /// The service call failed and the prior snapshot was restored.
    RolledBack,
}

/// Lifecycle of the mutations of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationPhase {
    /// Nothing of this kind has run yet.
    Idle,
    /// At least one mutation of this kind is in flight.
    Optimistic,
    /// The latest mutation of this kind has finished.
    Settled(Settlement),
}

/// A mutation that has been applied locally and awaits the service.
///
/// Handed out by [`TaskCache::begin_mutation`](super::TaskCache::begin_mutation)
/// and consumed by [`TaskCache::settle`](super::TaskCache::settle).
#[derive(Debug)]
#[must_use = "a pending mutation must be settled"]
pub struct PendingMutation {
    pub(crate) mutation: Mutation,
    pub(crate) target: TaskId,
    pub(crate) prior_snapshot: Option<Vec<Task>>,
}

impl PendingMutation {
    /// Kind of the mutation.
    pub fn kind(&self) -> MutationKind {
        self.mutation.kind()
    }

    /// The task the mutation applies to; the placeholder id for creates.
    pub fn target(&self) -> TaskId {
        self.target
    }
}

/// In-flight counters and last outcome for each mutation kind.
#[derive(Debug, Clone, Default)]
pub(crate) struct MutationSlots {
    in_flight: [usize; 3],
    last: [Option<Settlement>; 3],
}

impl MutationSlots {
    pub(crate) fn start(&mut self, kind: MutationKind) {
        self.in_flight[kind.index()] += 1;
    }

    pub(crate) fn finish(&mut self, kind: MutationKind, settlement: Settlement) {
        let slot = &mut self.in_flight[kind.index()];
        *slot = slot.saturating_sub(1);
        self.last[kind.index()] = Some(settlement);
    }

    pub(crate) fn phase(&self, kind: MutationKind) -> MutationPhase {
        if self.in_flight[kind.index()] > 0 {
            return MutationPhase::Optimistic;
        }
        self.last[kind.index()].map_or(MutationPhase::Idle, MutationPhase::Settled)
    }
}

/// Produce the optimistic snapshot for `mutation`.
///
/// `placeholder` is the id given to a created task until the service
/// assigns one.
pub(crate) fn apply(
    snapshot: Option<&[Task]>,
    mutation: &Mutation,
    placeholder: TaskId,
) -> Option<Vec<Task>> {
    match mutation {
        Mutation::Create(draft) => {
            let created = Task {
                id: placeholder,
                title: draft.title.clone(),
                completed: false,
                owner_id: draft.owner_id,
            };
            let mut next = Vec::with_capacity(snapshot.map_or(0, <[Task]>::len) + 1);
            next.push(created);
            next.extend(snapshot.unwrap_or_default().iter().cloned());
            Some(next)
        }
        Mutation::Update { id, patch } => snapshot.map(|tasks| {
            tasks
                .iter()
                .cloned()
                .map(|mut task| {
                    if task.id == *id {
                        patch.apply(&mut task);
                    }
                    task
                })
                .collect()
        }),
        Mutation::Delete(id) => {
            snapshot.map(|tasks| tasks.iter().filter(|task| task.id != *id).cloned().collect())
        }
    }
}
