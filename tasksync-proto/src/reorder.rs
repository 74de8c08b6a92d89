//! Reorder request and response types.
//!
//! The service computes the swap target for a move and returns both
//! affected records. When the moved task is already at the boundary the
//! service answers with the same task in both slots; clients treat that as
//! "no swap occurred", not as a failure.

use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Direction of a single-step move in the full collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    /// Towards the front of the list.
    Up,
    /// Towards the end of the list.
    Down,
}

impl std::fmt::Display for MoveDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
        }
    }
}

/// Error returned when a string is not `up` or `down`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown direction '{0}' (expected up or down)")]
pub struct UnknownDirection(pub String);

impl std::str::FromStr for MoveDirection {
    type Err = UnknownDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            _ => Err(UnknownDirection(s.to_string())),
        }
    }
}

/// Body of `POST /tasks/{id}/move`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Which way to move.
    pub direction: MoveDirection,
}

/// Response of `POST /tasks/{id}/move`: both records whose positions swapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    /// The task the move was requested for.
    pub moved: Task,
    /// The neighbour it traded places with.
    pub swapped_with: Task,
}

impl MoveOutcome {
    /// Returns `true` for the boundary sentinel (both slots hold the same task).
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.moved.id == self.swapped_with.id
    }
}
