//! Filtered views over the task collection.
//!
//! A [`FilteredView`] is a stable subsequence of the full collection: it
//! keeps the relative order of matching tasks and never re-sorts. Because
//! moves and deletes act on the full collection, the view translates a
//! filtered position back to the task id (and absolute index) it shows.

use std::ops::Range;

use tasksync_proto::{MoveDirection, Priority, Task, TaskId};

/// Which tasks a view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterKind {
    /// Every task.
    #[default]
    All,
    /// Tasks not yet completed.
    Active,
    /// Completed tasks.
    Completed,
    /// Tasks with the given priority.
    Priority(Priority),
}

impl FilterKind {
    /// Whether `task` passes this filter.
    #[must_use]
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed,
            Self::Completed => task.completed,
            Self::Priority(priority) => task.priority == priority,
        }
    }
}

impl std::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
            Self::Priority(p) => write!(f, "priority={p}"),
        }
    }
}

/// Error returned for an unrecognised filter name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "unknown filter '{0}' (expected all, active, completed, low, medium, high, or priority=<p>)"
)]
pub struct UnknownFilter(pub String);

impl std::str::FromStr for FilterKind {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let priority = normalized.strip_prefix("priority=").unwrap_or(&normalized);
        match normalized.as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            _ => priority
                .parse()
                .map(Self::Priority)
                .map_err(|_| UnknownFilter(s.to_string())),
        }
    }
}

/// Returns the tasks matching `filter`, in collection order.
#[must_use]
pub fn filter_tasks(tasks: &[Task], filter: FilterKind) -> Vec<&Task> {
    tasks.iter().filter(|t| filter.matches(t)).collect()
}

/// Order-preserving filtered view with position translation.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    source: &'a [Task],
    /// Absolute index of each visible task, ascending.
    indices: Vec<usize>,
    filter: FilterKind,
}

impl<'a> FilteredView<'a> {
    /// Builds the view of `source` under `filter`.
    #[must_use]
    pub fn new(source: &'a [Task], filter: FilterKind) -> Self {
        let indices = source
            .iter()
            .enumerate()
            .filter(|(_, t)| filter.matches(t))
            .map(|(i, _)| i)
            .collect();
        Self {
            source,
            indices,
            filter,
        }
    }

    /// The filter this view applies.
    #[must_use]
    pub const fn filter(&self) -> FilterKind {
        self.filter
    }

    /// Number of visible tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether no task is visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Whether the underlying collection itself is empty, as opposed to
    /// the filter hiding everything.
    #[must_use]
    pub fn is_empty_collection(&self) -> bool {
        self.source.is_empty()
    }

    /// Task at a filtered position.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&'a Task> {
        self.indices.get(position).map(|&i| &self.source[i])
    }

    /// Id of the task at a filtered position.
    #[must_use]
    pub fn id_at(&self, position: usize) -> Option<TaskId> {
        self.get(position).map(|t| t.id)
    }

    /// Absolute collection index of the task at a filtered position.
    #[must_use]
    pub fn absolute_index(&self, position: usize) -> Option<usize> {
        self.indices.get(position).copied()
    }

    /// Filtered position of a task, if it is visible.
    #[must_use]
    pub fn position_of(&self, id: TaskId) -> Option<usize> {
        self.indices.iter().position(|&i| self.source[i].id == id)
    }

    /// Visible tasks in order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Task> + '_ {
        self.indices.iter().map(|&i| &self.source[i])
    }

    /// Visible tasks in `range` (clamped to the view), with their positions.
    pub fn window(&self, range: Range<usize>) -> impl Iterator<Item = (usize, &'a Task)> + '_ {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        (start..end).map(|position| (position, &self.source[self.indices[position]]))
    }

    /// Whether moving the task at `position` would swap it with a task this
    /// view hides.
    ///
    /// Moves always swap with the neighbour in the full collection. Under a
    /// filter that neighbour may be invisible, so the visible order can look
    /// unchanged after the move. Returns `false` at the collection boundary
    /// or for an out-of-range position.
    #[must_use]
    pub fn move_skips_hidden(&self, position: usize, direction: MoveDirection) -> bool {
        let Some(absolute) = self.absolute_index(position) else {
            return false;
        };
        let neighbour = match direction {
            MoveDirection::Up => absolute.checked_sub(1),
            MoveDirection::Down => Some(absolute + 1).filter(|&i| i < self.source.len()),
        };
        neighbour.is_some_and(|i| !self.filter.matches(&self.source[i]))
    }
}
