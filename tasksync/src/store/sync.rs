//! Request dispatch and response reconciliation.
//!
//! # Architecture
//!
//! ```text
//! TaskSync (owner)  ── spawn ──→  gateway request (tokio task)
//!        ↑                               │
//!        └──────── Reconcile message ────┘
//! ```
//!
//! Every operation spawns its gateway call and returns a [`RequestId`]
//! immediately, so any number of requests can be in flight. Responses come
//! back over one channel and are applied by the owner, one at a time, in
//! arrival order. Nothing captured at request time (such as an index) is
//! used when a response is applied.

use std::future::Future;
use std::sync::Arc;

use tasksync_proto::{MoveDirection, Task, TaskDraft, TaskId};
use tokio::sync::mpsc;

use super::reconcile::{Operation, Outcome, Reconcile, ReconcileEffect, RequestId};
use super::TaskStore;
use crate::filter::{FilterKind, FilteredView};
use crate::gateway::{GatewayError, TaskGateway};

/// Single owner of a [`TaskStore`] that talks to a [`TaskGateway`].
///
/// Must be used inside a tokio runtime: operations spawn their requests.
pub struct TaskSync<G> {
    gateway: Arc<G>,
    store: TaskStore,
    tx: mpsc::UnboundedSender<Reconcile>,
    rx: mpsc::UnboundedReceiver<Reconcile>,
    next_request: u64,
    in_flight: usize,
    initialized: bool,
}

impl<G: TaskGateway + 'static> TaskSync<G> {
    /// Creates a synchronizer with an empty, not yet loaded store.
    pub fn new(gateway: G) -> Self {
        Self::with_shared(Arc::new(gateway))
    }

    /// Creates a synchronizer over a gateway shared with other owners.
    #[must_use]
    pub fn with_shared(gateway: Arc<G>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            gateway,
            store: TaskStore::new(),
            tx,
            rx,
            next_request: 0,
            in_flight: 0,
            initialized: false,
        }
    }

    /// Issues the first load. Later calls do nothing and return `None`.
    pub fn initialize(&mut self) -> Option<RequestId> {
        if self.initialized {
            return None;
        }
        self.initialized = true;
        Some(self.load())
    }

    /// Fetches the whole collection; the response replaces `tasks`.
    pub fn load(&mut self) -> RequestId {
        self.initialized = true;
        self.store.begin_load();
        self.dispatch(Operation::Load, |gateway| async move {
            gateway.list().await.map(Outcome::Loaded)
        })
    }

    /// Creates a task; the response is appended at the end.
    pub fn create(&mut self, draft: TaskDraft) -> RequestId {
        self.dispatch(Operation::Create, |gateway| async move {
            gateway.create(draft).await.map(Outcome::Created)
        })
    }

    /// Replaces a task; the response overwrites it in place if still present.
    pub fn update(&mut self, task: Task) -> RequestId {
        self.dispatch(Operation::Update(task.id), |gateway| async move {
            gateway.update(task).await.map(Outcome::Updated)
        })
    }

    /// Deletes a task; the response removes it if still present.
    pub fn remove(&mut self, id: TaskId) -> RequestId {
        self.dispatch(Operation::Remove(id), move |gateway| async move {
            gateway.delete(id).await.map(|()| Outcome::Removed(id))
        })
    }

    /// Flips a task's completion; the response overwrites it in place.
    pub fn toggle_completion(&mut self, id: TaskId) -> RequestId {
        self.dispatch(Operation::Toggle(id), move |gateway| async move {
            gateway.toggle(id).await.map(Outcome::Toggled)
        })
    }

    /// Swaps a task with its full-collection neighbour.
    ///
    /// The response names both records; they are exchanged by id, and the
    /// move is dropped if either is gone by then.
    pub fn move_task(&mut self, id: TaskId, direction: MoveDirection) -> RequestId {
        self.dispatch(Operation::Move(id, direction), move |gateway| async move {
            gateway.move_task(id, direction).await.map(Outcome::Moved)
        })
    }

    fn dispatch<F, Fut>(&mut self, operation: Operation, call: F) -> RequestId
    where
        F: FnOnce(Arc<G>) -> Fut,
        Fut: Future<Output = Result<Outcome, GatewayError>> + Send + 'static,
    {
        let request = RequestId::new(self.next_request);
        self.next_request += 1;
        self.in_flight += 1;

        tracing::debug!(%request, %operation, "dispatching gateway request");
        let fut = call(Arc::clone(&self.gateway));
        let tx = self.tx.clone();
        let call = tokio::spawn(fut);
        tokio::spawn(async move {
            // A panicking call still answers, so `in_flight` always drains.
            let result = call.await.unwrap_or_else(|e| {
                tracing::error!(%request, %operation, error = %e, "gateway request aborted");
                Err(GatewayError::Transport(format!("request aborted: {e}")))
            });
            // The receiver lives as long as the owner; a send error means
            // the owner is gone and nobody wants the answer.
            let _ = tx.send(Reconcile {
                request,
                operation,
                result,
            });
        });
        request
    }
}

impl<G> TaskSync<G> {
    /// Waits for the next response and applies it.
    ///
    /// Returns `None` without waiting when nothing is in flight.
    pub async fn next_reconciled(&mut self) -> Option<(RequestId, ReconcileEffect)> {
        if self.in_flight == 0 {
            return None;
        }
        let message = self.rx.recv().await?;
        Some(self.reconcile(message))
    }

    /// Applies every response that has already arrived, without waiting.
    pub fn reconcile_ready(&mut self) -> Vec<(RequestId, ReconcileEffect)> {
        let mut applied = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            applied.push(self.reconcile(message));
        }
        applied
    }

    /// Applies responses until no request is in flight.
    pub async fn settle(&mut self) -> Vec<(RequestId, ReconcileEffect)> {
        let mut applied = Vec::new();
        while let Some(entry) = self.next_reconciled().await {
            applied.push(entry);
        }
        applied
    }

    fn reconcile(&mut self, message: Reconcile) -> (RequestId, ReconcileEffect) {
        self.in_flight = self.in_flight.saturating_sub(1);
        let request = message.request;
        (request, self.store.apply(message))
    }

    /// Read-only access to the current state.
    #[must_use]
    pub const fn store(&self) -> &TaskStore {
        &self.store
    }

    /// The collection in canonical order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    /// Filtered view over the current collection.
    #[must_use]
    pub fn view(&self, filter: FilterKind) -> FilteredView<'_> {
        self.store.view(filter)
    }

    /// Forgets the recorded gateway failure.
    pub fn clear_error(&mut self) {
        self.store.clear_error();
    }

    /// Number of requests whose responses have not been applied yet.
    #[must_use]
    pub const fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Whether [`initialize`](TaskSync::initialize) or a load has run.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }
}
