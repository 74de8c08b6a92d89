//! Shared wire definitions for the `tasksync` task service.

pub mod codec;
pub mod reorder;
pub mod task;

pub use reorder::{MoveDirection, MoveOutcome, MoveRequest};
pub use task::{Priority, Task, TaskDraft, TaskId};
