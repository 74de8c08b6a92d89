//! Integration tests for filtered, windowed presentation of the task list.
//!
//! Drives `TaskSync` against a `LoopbackGateway`, then checks what a
//! `Viewport` renders through a `FilteredView` as the collection changes.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use tasksync::cli::{self, Command, ListArgs};
use tasksync::config::ClientConfig;
use tasksync::filter::FilterKind;
use tasksync::gateway::TaskGateway;
use tasksync::gateway::loopback::LoopbackGateway;
use tasksync::store::TaskSync;
use tasksync::window::{DEFAULT_WINDOW_SIZE, Viewport};
use tasksync_proto::{MoveDirection, Priority, Task, TaskDraft, TaskId};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn synced(drafts: Vec<TaskDraft>) -> TaskSync<LoopbackGateway> {
    let gateway = LoopbackGateway::new();
    for draft in drafts {
        gateway.create(draft).await.unwrap();
    }
    let mut sync = TaskSync::new(gateway);
    sync.initialize();
    sync.settle().await;
    sync
}

fn numbered(n: usize) -> Vec<TaskDraft> {
    (1..=n).map(|i| TaskDraft::new(format!("task {i}"))).collect()
}

/// Renders one window and returns `(position, id)` for each row.
fn render(
    sync: &TaskSync<LoopbackGateway>,
    viewport: &mut Viewport,
    filter: FilterKind,
    size: usize,
) -> Vec<(usize, u64)> {
    let view = sync.view(filter);
    let mut rows = Vec::new();
    viewport.present(&view, size, &mut |position: usize, task: &Task| {
        rows.push((position, task.id.get()));
    });
    rows
}

// ===========================================================================
// Filtering
// ===========================================================================

#[tokio::test]
async fn priority_filter_shows_matching_tasks_in_order() {
    let sync = synced(vec![
        TaskDraft::new("a").with_priority(Priority::Low),
        TaskDraft::new("b").with_priority(Priority::High),
        TaskDraft::new("c").with_priority(Priority::High),
    ])
    .await;

    let view = sync.view(FilterKind::Priority(Priority::High));
    let ids: Vec<u64> = view.iter().map(|t| t.id.get()).collect();
    assert_eq!(ids, vec![2, 3]);
}

#[tokio::test]
async fn toggling_moves_task_between_status_views() {
    let mut sync = synced(numbered(3)).await;
    sync.toggle_completion(TaskId::new(2));
    sync.settle().await;

    let active: Vec<u64> = sync.view(FilterKind::Active).iter().map(|t| t.id.get()).collect();
    let done: Vec<u64> = sync
        .view(FilterKind::Completed)
        .iter()
        .map(|t| t.id.get())
        .collect();
    assert_eq!(active, vec![1, 3]);
    assert_eq!(done, vec![2]);
}

#[tokio::test]
async fn move_under_filter_swaps_with_hidden_neighbour() {
    let mut sync = synced(vec![
        TaskDraft::new("a").with_priority(Priority::High),
        TaskDraft::new("b").with_priority(Priority::Low),
        TaskDraft::new("c").with_priority(Priority::High),
    ])
    .await;
    let filter = FilterKind::Priority(Priority::High);

    {
        let view = sync.view(filter);
        let position = view.position_of(TaskId::new(3)).unwrap();
        assert!(view.move_skips_hidden(position, MoveDirection::Up));
    }

    sync.move_task(TaskId::new(3), MoveDirection::Up);
    sync.settle().await;

    // Full order changed; the filtered order did not.
    let all: Vec<u64> = sync.tasks().iter().map(|t| t.id.get()).collect();
    assert_eq!(all, vec![1, 3, 2]);
    let visible: Vec<u64> = sync.view(filter).iter().map(|t| t.id.get()).collect();
    assert_eq!(visible, vec![1, 3]);
}

// ===========================================================================
// Windowing
// ===========================================================================

#[tokio::test]
async fn window_materializes_only_visible_rows() {
    let sync = synced(numbered(20)).await;
    let mut viewport = Viewport::at(10);
    let rows = render(&sync, &mut viewport, FilterKind::All, DEFAULT_WINDOW_SIZE);
    assert_eq!(rows, vec![(10, 11), (11, 12), (12, 13), (13, 14), (14, 15)]);
}

#[tokio::test]
async fn window_clamps_after_deletes_shrink_the_list() {
    let mut sync = synced(numbered(8)).await;
    let mut viewport = Viewport::at(3);
    assert_eq!(render(&sync, &mut viewport, FilterKind::All, 5).len(), 5);

    for id in 4..=8 {
        sync.remove(TaskId::new(id));
    }
    sync.settle().await;

    let rows = render(&sync, &mut viewport, FilterKind::All, 5);
    assert_eq!(rows, vec![(0, 1), (1, 2), (2, 3)]);
    assert_eq!(viewport.offset(), 0);
}

#[tokio::test]
async fn window_clamps_when_filter_narrows() {
    let mut drafts = numbered(10);
    for draft in drafts.iter_mut().step_by(5) {
        draft.priority = Priority::High;
    }
    let sync = synced(drafts).await;

    let mut viewport = Viewport::at(6);
    let rows = render(&sync, &mut viewport, FilterKind::Priority(Priority::High), 5);
    assert_eq!(rows, vec![(0, 1), (1, 6)]);
}

#[tokio::test]
async fn empty_collection_renders_nothing() {
    let sync = synced(Vec::new()).await;
    let view = sync.view(FilterKind::All);
    assert!(view.is_empty_collection());
    assert!(render(&sync, &mut Viewport::new(), FilterKind::All, 5).is_empty());
}

// ===========================================================================
// CLI output
// ===========================================================================

#[tokio::test]
async fn cli_list_respects_default_filter_and_window() {
    let gateway = LoopbackGateway::new();
    for i in 1..=8 {
        let priority = if i % 2 == 0 { Priority::High } else { Priority::Low };
        gateway
            .create(TaskDraft::new(format!("task {i}")).with_priority(priority))
            .await
            .unwrap();
    }
    let config = ClientConfig {
        default_filter: FilterKind::Priority(Priority::High),
        window_size: 3,
        ..ClientConfig::default()
    };

    let mut out = Vec::new();
    cli::run(Command::List(ListArgs::default()), &config, gateway, &mut out)
        .await
        .unwrap();
    let out = String::from_utf8(out).unwrap();

    assert!(out.contains("task 2"));
    assert!(out.contains("task 6"));
    assert!(!out.contains("task 8"));
    assert!(!out.contains("task 1"));
    assert!(out.contains("-- 1-3 of 4 (priority=high)"));
}
