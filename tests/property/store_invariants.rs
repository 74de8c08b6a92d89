//! Property-based tests for store reconciliation and filtered views.
//!
//! Uses proptest to verify, for arbitrary sequences of gateway responses:
//! 1. Task ids in the store stay unique.
//! 2. A failed response never changes the collection.
//! 3. Every filtered view is an order-preserving subsequence of the store.
//! 4. A rendered window never leaves `0..len` of its view.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;

use proptest::prelude::*;
use tasksync::filter::{FilterKind, FilteredView};
use tasksync::gateway::GatewayError;
use tasksync::store::{Operation, Outcome, Reconcile, ReconcileEffect, RequestId, TaskStore};
use tasksync::window::Viewport;
use tasksync_proto::{MoveDirection, MoveOutcome, Priority, Task, TaskId};

// --- Strategies ---

fn arb_priority() -> impl Strategy<Value = Priority> {
    prop_oneof![
        Just(Priority::Low),
        Just(Priority::Medium),
        Just(Priority::High),
    ]
}

fn arb_direction() -> impl Strategy<Value = MoveDirection> {
    prop_oneof![Just(MoveDirection::Up), Just(MoveDirection::Down)]
}

/// Tasks drawn from a small id space so responses often collide.
fn arb_task() -> impl Strategy<Value = Task> {
    (1u64..12, any::<bool>(), arb_priority()).prop_map(|(id, completed, priority)| Task {
        id: TaskId::new(id),
        text: format!("task {id}"),
        completed,
        priority,
        due_date: None,
    })
}

fn arb_filter() -> impl Strategy<Value = FilterKind> {
    prop_oneof![
        Just(FilterKind::All),
        Just(FilterKind::Active),
        Just(FilterKind::Completed),
        arb_priority().prop_map(FilterKind::Priority),
    ]
}

/// One gateway response, possibly stale or failed.
fn arb_message() -> impl Strategy<Value = Reconcile> {
    let outcome = prop_oneof![
        prop::collection::vec(arb_task(), 0..10).prop_map(|t| (Operation::Load, Outcome::Loaded(t))),
        arb_task().prop_map(|t| (Operation::Create, Outcome::Created(t))),
        arb_task().prop_map(|t| (Operation::Update(t.id), Outcome::Updated(t))),
        arb_task().prop_map(|t| (Operation::Toggle(t.id), Outcome::Toggled(t))),
        (1u64..12).prop_map(|id| {
            let id = TaskId::new(id);
            (Operation::Remove(id), Outcome::Removed(id))
        }),
        (arb_task(), arb_task(), arb_direction()).prop_map(|(moved, swapped_with, direction)| {
            (
                Operation::Move(moved.id, direction),
                Outcome::Moved(MoveOutcome {
                    moved,
                    swapped_with,
                }),
            )
        }),
    ];
    (any::<u64>(), outcome, prop::bool::weighted(0.2)).prop_map(
        |(request, (operation, outcome), fail)| {
            let request = RequestId::new(request);
            if fail {
                Reconcile::failed(
                    request,
                    operation,
                    GatewayError::Transport("connection reset".to_string()),
                )
            } else {
                Reconcile::ok(request, operation, outcome)
            }
        },
    )
}

fn is_subsequence(view: &FilteredView<'_>, all: &[Task]) -> bool {
    let mut rest = all.iter();
    view.iter().all(|v| rest.any(|t| t.id == v.id))
}

proptest! {
    #[test]
    fn ids_stay_unique(messages in prop::collection::vec(arb_message(), 0..60)) {
        let mut store = TaskStore::new();
        for message in messages {
            store.apply(message);
            let ids: HashSet<TaskId> = store.tasks().iter().map(|t| t.id).collect();
            prop_assert_eq!(ids.len(), store.len());
        }
    }

    #[test]
    fn failures_leave_tasks_untouched(messages in prop::collection::vec(arb_message(), 0..60)) {
        let mut store = TaskStore::new();
        for message in messages {
            let before = store.tasks().to_vec();
            let failed = message.result.is_err();
            let effect = store.apply(message);
            if failed {
                prop_assert!(matches!(effect, ReconcileEffect::Failed(_)), "effect was {:?}", effect);
                prop_assert_eq!(store.tasks(), before.as_slice());
                prop_assert!(store.last_error().is_some());
            }
        }
    }

    #[test]
    fn views_are_ordered_subsequences(
        messages in prop::collection::vec(arb_message(), 0..40),
        filter in arb_filter(),
    ) {
        let mut store = TaskStore::new();
        for message in messages {
            store.apply(message);
        }
        let view = store.view(filter);
        prop_assert!(is_subsequence(&view, store.tasks()));
        prop_assert!(view.iter().all(|t| filter.matches(t)));
        let hidden = store.tasks().iter().filter(|t| !filter.matches(t)).count();
        prop_assert_eq!(view.len() + hidden, store.len());
    }

    #[test]
    fn window_stays_in_range(
        tasks in prop::collection::vec(arb_task(), 0..30),
        filter in arb_filter(),
        offset in 0usize..40,
        size in 1usize..10,
    ) {
        let view = FilteredView::new(&tasks, filter);
        let mut viewport = Viewport::at(offset);
        let mut positions = Vec::new();
        let range = viewport.present(&view, size, &mut |p: usize, _: &Task| positions.push(p));
        prop_assert!(range.end <= view.len());
        prop_assert!(range.len() <= size);
        prop_assert_eq!(positions, range.clone().collect::<Vec<_>>());
        if view.len() >= size {
            prop_assert_eq!(range.len(), size);
        }
    }
}
