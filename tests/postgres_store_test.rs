//! Postgres task store integration tests.
//!
//! These need a live database and are ignored by default. Run with:
//! `TEST_DATABASE_URL=postgres://localhost/livetodo_test \
//!  cargo test --test postgres_store_test -- --ignored`

#![allow(clippy::expect_used, clippy::unwrap_used)] // Test code

use livetodo::{PostgresTaskStore, TaskDraft, TaskId, TaskStore, TaskStoreError};

async fn connect() -> PostgresTaskStore {
    let url = std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("set TEST_DATABASE_URL to run the database tests");
    PostgresTaskStore::connect(&url).await.expect("connect")
}

fn draft(title: &str) -> TaskDraft {
    TaskDraft {
        title: Some(title.to_string()),
        ..TaskDraft::default()
    }
}

async fn cleanup(store: &PostgresTaskStore, ids: &[TaskId]) {
    for id in ids {
        let _ = store.delete(*id).await;
    }
}

#[tokio::test]
#[ignore] // Requires a running database
async fn list_order_is_stable_across_reads() {
    let store = connect().await;
    let mut ids = Vec::new();
    for title in ["First", "Second", "Third"] {
        ids.push(store.create(draft(title)).await.expect("create").id);
    }

    let positions = |tasks: &[livetodo::Task]| -> Vec<TaskId> {
        tasks
            .iter()
            .map(|t| t.id)
            .filter(|id| ids.contains(id))
            .collect()
    };

    let first_read = positions(&store.list().await.expect("list"));
    // Newest first; same-timestamp rows fall back to the id tiebreaker, so
    // repeated reads must agree.
    assert_eq!(first_read.last(), ids.first());
    for _ in 0..5 {
        let reread = positions(&store.list().await.expect("list"));
        assert_eq!(reread, first_read);
    }

    cleanup(&store, &ids).await;
}

#[tokio::test]
#[ignore] // Requires a running database
async fn crud_round_trip() {
    let store = connect().await;

    let task = store.create(draft("Buy milk")).await.expect("create");
    assert!(!task.completed);

    let updated = store
        .update(
            task.id,
            TaskDraft {
                completed: Some(true),
                ..TaskDraft::default()
            },
        )
        .await
        .expect("update");
    assert!(updated.completed);
    assert_eq!(updated.title, "Buy milk");

    store.delete(task.id).await.expect("delete");
    let missing = store.find(task.id).await;
    assert!(matches!(missing, Err(TaskStoreError::NotFound(_))));
}
