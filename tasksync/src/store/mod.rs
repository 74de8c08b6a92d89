//! Client-side task state.
//!
//! [`TaskStore`] holds the ordered task collection together with the
//! `loading` flag and the last recorded gateway error. It changes only by
//! applying [`Reconcile`] messages (see [`reconcile`]), and every message
//! locates its targets by id at the moment it is applied. [`TaskSync`]
//! owns a store, dispatches gateway requests, and feeds their responses
//! back one at a time.

pub mod reconcile;
pub mod sync;

pub use reconcile::{NoOpReason, Operation, Outcome, Reconcile, ReconcileEffect, RequestId};
pub use sync::TaskSync;

use tasksync_proto::{MoveDirection, Task, TaskId};

use crate::filter::{FilterKind, FilteredView};

/// Ordered task collection plus request status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskStore {
    tasks: Vec<Task>,
    /// Loads dispatched whose responses have not been applied yet.
    pending_loads: usize,
    last_error: Option<String>,
}

impl TaskStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The collection in canonical order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Whether any load is outstanding.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.pending_loads > 0
    }

    /// The most recent gateway failure, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Forgets the recorded gateway failure.
    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Number of tasks in the collection.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Looks up a task by id.
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Absolute position of a task in the full collection.
    #[must_use]
    pub fn position_of(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// The task a move would swap with: the true neighbour in the full
    /// collection, regardless of any filter.
    ///
    /// Returns `None` if `id` is unknown or already at that boundary.
    #[must_use]
    pub fn move_target(&self, id: TaskId, direction: MoveDirection) -> Option<TaskId> {
        let index = self.position_of(id)?;
        let target = match direction {
            MoveDirection::Up => index.checked_sub(1)?,
            MoveDirection::Down => index + 1,
        };
        self.tasks.get(target).map(|t| t.id)
    }

    /// Whether a move has a neighbour to swap with.
    #[must_use]
    pub fn can_move(&self, id: TaskId, direction: MoveDirection) -> bool {
        self.move_target(id, direction).is_some()
    }

    /// Filtered, order-preserving view over the collection.
    #[must_use]
    pub fn view(&self, filter: FilterKind) -> FilteredView<'_> {
        FilteredView::new(&self.tasks, filter)
    }

    /// Records a dispatched load.
    pub(crate) const fn begin_load(&mut self) {
        self.pending_loads += 1;
    }

    /// Records that one load has resolved, either way.
    pub(crate) const fn finish_load(&mut self) {
        self.pending_loads = self.pending_loads.saturating_sub(1);
    }
}
