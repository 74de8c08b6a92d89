//! Integration tests for `HttpGateway` against a local task service.
//!
//! Starts an axum server on an ephemeral port that serves the task REST
//! contract from an in-process `LoopbackGateway`, then drives it through
//! `HttpGateway` and `TaskSync`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use tasksync::gateway::http::HttpGateway;
use tasksync::gateway::loopback::LoopbackGateway;
use tasksync::gateway::{GatewayError, TaskGateway};
use tasksync::store::TaskSync;
use tasksync_proto::{MoveDirection, MoveOutcome, MoveRequest, Priority, Task, TaskDraft, TaskId};

// ---------------------------------------------------------------------------
// Test service
// ---------------------------------------------------------------------------

type Service = Arc<LoopbackGateway>;

/// Maps a service-side failure onto an HTTP response.
struct ApiError(GatewayError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            GatewayError::Status { status, body } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                body,
            )
                .into_response(),
            other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()).into_response(),
        }
    }
}

async fn list_tasks(State(svc): State<Service>) -> Result<Json<Vec<Task>>, ApiError> {
    svc.list().await.map(Json).map_err(ApiError)
}

async fn create_task(
    State(svc): State<Service>,
    Json(draft): Json<TaskDraft>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let task = svc.create(draft).await.map_err(ApiError)?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_task(
    State(svc): State<Service>,
    Path(id): Path<u64>,
    Json(mut task): Json<Task>,
) -> Result<Json<Task>, ApiError> {
    task.id = TaskId::new(id);
    svc.update(task).await.map(Json).map_err(ApiError)
}

async fn delete_task(
    State(svc): State<Service>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    svc.delete(TaskId::new(id)).await.map_err(ApiError)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_task(
    State(svc): State<Service>,
    Path(id): Path<u64>,
) -> Result<Json<Task>, ApiError> {
    svc.toggle(TaskId::new(id)).await.map(Json).map_err(ApiError)
}

async fn move_task(
    State(svc): State<Service>,
    Path(id): Path<u64>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<MoveOutcome>, ApiError> {
    svc.move_task(TaskId::new(id), request.direction)
        .await
        .map(Json)
        .map_err(ApiError)
}

/// Starts the test service on an ephemeral port.
async fn start_service(svc: Service) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let app = Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/{id}", put(update_task).delete(delete_task))
        .route("/api/tasks/{id}/toggle", patch(toggle_task))
        .route("/api/tasks/{id}/move", post(move_task))
        .with_state(svc);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test service");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test service failed");
    });
    (addr, handle)
}

fn gateway_for(addr: SocketAddr) -> HttpGateway {
    HttpGateway::new(&format!("http://{addr}/api/tasks"), Duration::from_secs(2))
        .expect("valid base url")
}

async fn service_with(texts: &[&str]) -> (Service, HttpGateway) {
    let svc = Arc::new(LoopbackGateway::new());
    for text in texts {
        svc.create(TaskDraft::new(*text)).await.unwrap();
    }
    let (addr, _handle) = start_service(Arc::clone(&svc)).await;
    (svc, gateway_for(addr))
}

fn ids(tasks: &[Task]) -> Vec<u64> {
    tasks.iter().map(|t| t.id.get()).collect()
}

// ===========================================================================
// Gateway operations
// ===========================================================================

#[tokio::test]
async fn list_and_create_round_trip() {
    let (_svc, gw) = service_with(&["a", "b"]).await;
    assert_eq!(ids(&gw.list().await.unwrap()), vec![1, 2]);

    let due = chrono::NaiveDate::from_ymd_opt(2026, 12, 1);
    let created = gw
        .create(
            TaskDraft::new("c")
                .with_priority(Priority::High)
                .with_due_date(due),
        )
        .await
        .unwrap();
    assert_eq!(created.id, TaskId::new(3));
    assert_eq!(created.priority, Priority::High);
    assert_eq!(created.due_date, due);
    assert_eq!(ids(&gw.list().await.unwrap()), vec![1, 2, 3]);
}

#[tokio::test]
async fn update_toggle_and_delete() {
    let (svc, gw) = service_with(&["a", "b"]).await;

    let mut task = gw.list().await.unwrap().remove(0);
    task.text = "renamed".to_string();
    let updated = gw.update(task.clone()).await.unwrap();
    assert_eq!(updated, task);

    let toggled = gw.toggle(TaskId::new(2)).await.unwrap();
    assert!(toggled.completed);

    gw.delete(TaskId::new(1)).await.unwrap();
    assert_eq!(ids(&svc.snapshot().await), vec![2]);
}

#[tokio::test]
async fn move_swaps_and_reports_boundary() {
    let (svc, gw) = service_with(&["a", "b", "c"]).await;

    let outcome = gw.move_task(TaskId::new(3), MoveDirection::Up).await.unwrap();
    assert_eq!(outcome.moved.id, TaskId::new(3));
    assert_eq!(outcome.swapped_with.id, TaskId::new(2));
    assert_eq!(ids(&svc.snapshot().await), vec![1, 3, 2]);

    let edge = gw.move_task(TaskId::new(1), MoveDirection::Up).await.unwrap();
    assert!(edge.is_noop());
}

#[tokio::test]
async fn unknown_id_maps_to_status_error() {
    let (_svc, gw) = service_with(&["a"]).await;
    let err = gw.toggle(TaskId::new(42)).await.unwrap_err();
    assert_eq!(
        err,
        GatewayError::Status {
            status: 404,
            body: "task 42 not found".to_string()
        }
    );
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    // Bind then drop a listener so the port is very likely closed.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = gateway_for(addr).list().await.unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)), "got {err:?}");
}

// ===========================================================================
// TaskSync over HTTP
// ===========================================================================

#[tokio::test]
async fn sync_mirrors_service_after_each_response() {
    let (svc, gw) = service_with(&["A", "B", "C"]).await;
    let mut sync = TaskSync::new(gw);

    sync.initialize();
    sync.settle().await;
    assert_eq!(ids(sync.tasks()), vec![1, 2, 3]);

    sync.move_task(TaskId::new(2), MoveDirection::Up);
    sync.toggle_completion(TaskId::new(3));
    sync.create(TaskDraft::new("D"));
    sync.settle().await;

    assert!(sync.store().last_error().is_none());
    assert_eq!(sync.tasks(), svc.snapshot().await.as_slice());
    assert_eq!(ids(sync.tasks()), vec![2, 1, 3, 4]);
}

#[tokio::test]
async fn sync_records_service_rejection() {
    let (_svc, gw) = service_with(&["A"]).await;
    let mut sync = TaskSync::new(gw);
    sync.initialize();
    sync.settle().await;

    sync.remove(TaskId::new(9));
    sync.settle().await;

    assert_eq!(ids(sync.tasks()), vec![1]);
    assert_eq!(
        sync.store().last_error(),
        Some("service returned 404: task 9 not found")
    );
}
