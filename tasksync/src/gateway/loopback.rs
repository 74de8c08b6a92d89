//! Loopback gateway for testing and offline use.
//!
//! Holds the task collection in process behind a [`tokio::sync::Mutex`] and
//! answers every request the way the remote service does: ids are assigned
//! from a counter and never reused, creations append, moves swap with the
//! adjacent task and report the boundary sentinel at either end, and
//! unknown ids answer 404.

use std::collections::VecDeque;

use tasksync_proto::{MoveDirection, MoveOutcome, Task, TaskDraft, TaskId};
use tokio::sync::Mutex;

use super::{GatewayError, TaskGateway};

#[derive(Debug, Default)]
struct ServiceState {
    tasks: Vec<Task>,
    /// Next id to hand out; `None` once the id space is used up.
    next_id: Option<u64>,
    /// Errors returned, in order, by the next requests instead of serving them.
    injected: VecDeque<GatewayError>,
}

impl ServiceState {
    fn take_injected(&mut self) -> Result<(), GatewayError> {
        self.injected.pop_front().map_or(Ok(()), Err)
    }

    fn index_of(&self, id: TaskId) -> Result<usize, GatewayError> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| GatewayError::not_found(id))
    }
}

/// In-process task service.
#[derive(Debug)]
pub struct LoopbackGateway {
    state: Mutex<ServiceState>,
}

impl Default for LoopbackGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopbackGateway {
    /// Creates an empty service whose first id will be `1`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ServiceState {
                next_id: Some(1),
                ..ServiceState::default()
            }),
        }
    }

    /// Creates a service pre-populated with `tasks`, in order.
    ///
    /// New ids continue after the largest id present.
    #[must_use]
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let next_id = tasks
            .iter()
            .map(|t| t.id.get())
            .max()
            .map_or(Some(1), |max| max.checked_add(1));
        Self {
            state: Mutex::new(ServiceState {
                tasks,
                next_id,
                injected: VecDeque::new(),
            }),
        }
    }

    /// Makes the next request fail with `error` without touching the collection.
    pub async fn fail_next(&self, error: GatewayError) {
        self.state.lock().await.injected.push_back(error);
    }

    /// Returns a copy of the service-side collection.
    pub async fn snapshot(&self) -> Vec<Task> {
        self.state.lock().await.tasks.clone()
    }
}

impl TaskGateway for LoopbackGateway {
    async fn list(&self) -> Result<Vec<Task>, GatewayError> {
        let mut state = self.state.lock().await;
        state.take_injected()?;
        Ok(state.tasks.clone())
    }

    async fn create(&self, draft: TaskDraft) -> Result<Task, GatewayError> {
        let mut state = self.state.lock().await;
        state.take_injected()?;
        let raw = state.next_id.ok_or_else(|| GatewayError::Status {
            status: 500,
            body: "task id space exhausted".to_string(),
        })?;
        let id = TaskId::new(raw);
        state.next_id = raw.checked_add(1);
        let task = Task::from_draft(id, draft);
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn update(&self, task: Task) -> Result<Task, GatewayError> {
        let mut state = self.state.lock().await;
        state.take_injected()?;
        let index = state.index_of(task.id)?;
        state.tasks[index] = task.clone();
        Ok(task)
    }

    async fn delete(&self, id: TaskId) -> Result<(), GatewayError> {
        let mut state = self.state.lock().await;
        state.take_injected()?;
        let index = state.index_of(id)?;
        state.tasks.remove(index);
        Ok(())
    }

    async fn toggle(&self, id: TaskId) -> Result<Task, GatewayError> {
        let mut state = self.state.lock().await;
        state.take_injected()?;
        let index = state.index_of(id)?;
        let task = &mut state.tasks[index];
        task.completed = !task.completed;
        Ok(task.clone())
    }

    async fn move_task(
        &self,
        id: TaskId,
        direction: MoveDirection,
    ) -> Result<MoveOutcome, GatewayError> {
        let mut state = self.state.lock().await;
        state.take_injected()?;
        let index = state.index_of(id)?;
        let target = match direction {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => Some(index + 1).filter(|&i| i < state.tasks.len()),
        };
        let Some(target) = target else {
            let task = state.tasks[index].clone();
            return Ok(MoveOutcome {
                moved: task.clone(),
                swapped_with: task,
            });
        };
        state.tasks.swap(index, target);
        Ok(MoveOutcome {
            moved: state.tasks[target].clone(),
            swapped_with: state.tasks[index].clone(),
        })
    }
}
