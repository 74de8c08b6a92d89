//! Remote task gateway abstraction.
//!
//! Defines the [`TaskGateway`] trait that the store dispatches requests
//! through. Concrete implementations:
//! - [`http::HttpGateway`]: JSON over HTTP against the task service
//! - [`loopback::LoopbackGateway`]: in-process service for tests and demos

pub mod http;
pub mod loopback;

use std::future::Future;

use tasksync_proto::{MoveDirection, MoveOutcome, Task, TaskDraft, TaskId};

/// Failure of a gateway round-trip.
///
/// The store does not distinguish between variants: any of them is a
/// network-or-server failure recorded as the store's last error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The request never produced a response (connect, I/O, dropped call).
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("service returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The request body could not be encoded; nothing was sent.
    #[error("malformed request: {0}")]
    Encode(String),

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),

    /// The configured service URL is unusable.
    #[error("invalid service url: {0}")]
    InvalidUrl(String),
}

impl GatewayError {
    /// Builds the "unknown task" error the service returns for a missing id.
    #[must_use]
    pub fn not_found(id: TaskId) -> Self {
        Self::Status {
            status: 404,
            body: format!("task {id} not found"),
        }
    }
}

/// Async request/response mapping to the remote task service.
///
/// Every method is a single attempt: implementations do not retry. The
/// returned records are the service's post-mutation state and are what the
/// store reconciles against.
pub trait TaskGateway: Send + Sync {
    /// Fetch the full collection in service order.
    fn list(&self) -> impl Future<Output = Result<Vec<Task>, GatewayError>> + Send;

    /// Create a task; the service assigns its id and appends it.
    fn create(&self, draft: TaskDraft) -> impl Future<Output = Result<Task, GatewayError>> + Send;

    /// Replace a task by id.
    fn update(&self, task: Task) -> impl Future<Output = Result<Task, GatewayError>> + Send;

    /// Delete a task by id.
    fn delete(&self, id: TaskId) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Flip a task's completion flag.
    fn toggle(&self, id: TaskId) -> impl Future<Output = Result<Task, GatewayError>> + Send;

    /// Swap a task with its neighbour in the given direction.
    fn move_task(
        &self,
        id: TaskId,
        direction: MoveDirection,
    ) -> impl Future<Output = Result<MoveOutcome, GatewayError>> + Send;
}
