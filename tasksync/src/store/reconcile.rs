//! Reconciliation of gateway responses into the store.
//!
//! Each completed gateway request becomes one [`Reconcile`] message. The
//! store applies messages one at a time; targets are found by id when the
//! message is applied, so responses may arrive in any order relative to
//! the requests that produced them. Nothing is changed before the gateway
//! confirms, so a failed request needs no rollback.

use std::collections::HashSet;

use tasksync_proto::{MoveDirection, MoveOutcome, Task, TaskId};

use super::TaskStore;
use crate::gateway::GatewayError;

/// Identifies one dispatched gateway request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    /// Wraps a raw request sequence number.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw sequence number.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The operation a request was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Fetch the whole collection.
    Load,
    /// Create a task.
    Create,
    /// Replace a task.
    Update(TaskId),
    /// Delete a task.
    Remove(TaskId),
    /// Flip a task's completion.
    Toggle(TaskId),
    /// Swap a task with a neighbour.
    Move(TaskId, MoveDirection),
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Load => write!(f, "load"),
            Self::Create => write!(f, "create"),
            Self::Update(id) => write!(f, "update {id}"),
            Self::Remove(id) => write!(f, "remove {id}"),
            Self::Toggle(id) => write!(f, "toggle {id}"),
            Self::Move(id, direction) => write!(f, "move {id} {direction}"),
        }
    }
}

/// A successful gateway response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The full collection in service order.
    Loaded(Vec<Task>),
    /// A newly created task.
    Created(Task),
    /// The replaced task.
    Updated(Task),
    /// The id that was deleted.
    Removed(TaskId),
    /// The task with its completion flipped.
    Toggled(Task),
    /// Both records affected by a move.
    Moved(MoveOutcome),
}

/// One gateway response, ready to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconcile {
    /// Request this response belongs to.
    pub request: RequestId,
    /// What was requested.
    pub operation: Operation,
    /// What the gateway answered.
    pub result: Result<Outcome, GatewayError>,
}

impl Reconcile {
    /// A successful response.
    #[must_use]
    pub const fn ok(request: RequestId, operation: Operation, outcome: Outcome) -> Self {
        Self {
            request,
            operation,
            result: Ok(outcome),
        }
    }

    /// A failed response.
    #[must_use]
    pub const fn failed(request: RequestId, operation: Operation, error: GatewayError) -> Self {
        Self {
            request,
            operation,
            result: Err(error),
        }
    }
}

/// Why a successful response left the collection unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOpReason {
    /// The target id is no longer in the collection.
    Missing(TaskId),
    /// The service reported a move at the list boundary.
    Boundary(TaskId),
}

/// What applying one [`Reconcile`] message did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileEffect {
    /// The collection was replaced by `count` tasks.
    Loaded {
        /// Number of tasks now held.
        count: usize,
    },
    /// A task was appended at the end.
    Appended(TaskId),
    /// A task was replaced at its existing position.
    Replaced {
        /// Replaced task.
        id: TaskId,
        /// Its unchanged position.
        index: usize,
    },
    /// A task was removed from `index`.
    Removed {
        /// Removed task.
        id: TaskId,
        /// Position it occupied.
        index: usize,
    },
    /// Two tasks exchanged positions.
    Swapped {
        /// The moved task.
        moved: TaskId,
        /// The task it traded places with.
        swapped_with: TaskId,
    },
    /// Nothing changed.
    NoOp(NoOpReason),
    /// The request failed; the message is now the store's last error.
    Failed(String),
}

impl TaskStore {
    /// Applies one gateway response.
    ///
    /// Failures only record the error (and end `loading` for a load);
    /// successes mutate the collection by id lookup.
    pub fn apply(&mut self, message: Reconcile) -> ReconcileEffect {
        let Reconcile {
            request,
            operation,
            result,
        } = message;

        if operation == Operation::Load {
            self.finish_load();
        }

        let effect = match result {
            Ok(outcome) => self.apply_outcome(outcome),
            Err(error) => {
                let message = error.to_string();
                self.last_error = Some(message.clone());
                ReconcileEffect::Failed(message)
            }
        };

        match &effect {
            ReconcileEffect::Failed(error) => {
                tracing::warn!(%request, %operation, %error, "gateway request failed");
            }
            ReconcileEffect::NoOp(reason) => {
                tracing::debug!(%request, %operation, ?reason, "response left tasks unchanged");
            }
            _ => tracing::debug!(%request, %operation, ?effect, "response applied"),
        }
        effect
    }

    fn apply_outcome(&mut self, outcome: Outcome) -> ReconcileEffect {
        match outcome {
            Outcome::Loaded(tasks) => self.replace_all(tasks),
            Outcome::Created(task) => self.append(task),
            Outcome::Updated(task) | Outcome::Toggled(task) => self.replace_in_place(task),
            Outcome::Removed(id) => self.remove(id),
            Outcome::Moved(outcome) => self.swap(&outcome),
        }
    }

    fn replace_all(&mut self, tasks: Vec<Task>) -> ReconcileEffect {
        let mut seen = HashSet::with_capacity(tasks.len());
        let mut unique = Vec::with_capacity(tasks.len());
        for task in tasks {
            if seen.insert(task.id) {
                unique.push(task);
            } else {
                tracing::warn!(id = %task.id, "load returned a duplicate id; keeping first");
            }
        }
        self.tasks = unique;
        self.last_error = None;
        ReconcileEffect::Loaded {
            count: self.tasks.len(),
        }
    }

    fn append(&mut self, task: Task) -> ReconcileEffect {
        if self.position_of(task.id).is_some() {
            tracing::warn!(id = %task.id, "created id already present; replacing in place");
            return self.replace_in_place(task);
        }
        let id = task.id;
        self.tasks.push(task);
        ReconcileEffect::Appended(id)
    }

    fn replace_in_place(&mut self, task: Task) -> ReconcileEffect {
        let id = task.id;
        match self.position_of(id) {
            Some(index) => {
                self.tasks[index] = task;
                ReconcileEffect::Replaced { id, index }
            }
            None => ReconcileEffect::NoOp(NoOpReason::Missing(id)),
        }
    }

    fn remove(&mut self, id: TaskId) -> ReconcileEffect {
        match self.position_of(id) {
            Some(index) => {
                self.tasks.remove(index);
                ReconcileEffect::Removed { id, index }
            }
            None => ReconcileEffect::NoOp(NoOpReason::Missing(id)),
        }
    }

    fn swap(&mut self, outcome: &MoveOutcome) -> ReconcileEffect {
        let moved = outcome.moved.id;
        let swapped_with = outcome.swapped_with.id;
        if outcome.is_noop() {
            return ReconcileEffect::NoOp(NoOpReason::Boundary(moved));
        }
        let Some(a) = self.position_of(moved) else {
            return ReconcileEffect::NoOp(NoOpReason::Missing(moved));
        };
        let Some(b) = self.position_of(swapped_with) else {
            return ReconcileEffect::NoOp(NoOpReason::Missing(swapped_with));
        };
        self.tasks.swap(a, b);
        ReconcileEffect::Swapped {
            moved,
            swapped_with,
        }
    }
}
