//! End-to-end live update tests.
//!
//! Runs a real server on a loopback port, drives mutations over HTTP with
//! `reqwest`, and watches the broadcast channel through real WebSocket
//! clients. Run with: `cargo test --test live_updates_test`

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)] // Test code

use futures::StreamExt;
use livetodo::{
    AppState, ChannelBroadcaster, InMemoryTaskStore, TaskStore, bridge, build_router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_tungstenite::tungstenite::Message;

type WsClient = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a full server (in-memory store + bridge + router) on a random
/// loopback port. Returns the address and a handle to the store for
/// out-of-band assertions.
async fn spawn_server() -> (String, Arc<dyn TaskStore>) {
    let store: Arc<dyn TaskStore> = Arc::new(InMemoryTaskStore::new());
    let broadcaster = ChannelBroadcaster::new();
    bridge::spawn(&store, broadcaster.clone());

    let app = build_router(AppState::new(Arc::clone(&store), broadcaster));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });

    (addr.to_string(), store)
}

/// Opens a WebSocket subscription to the todos channel and waits long enough
/// for the server-side subscription to be registered.
async fn subscribe(addr: &str) -> WsClient {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/todos/stream"))
        .await
        .expect("websocket connect");
    // The upgrade response races the server-side channel subscription.
    tokio::time::sleep(Duration::from_millis(250)).await;
    ws
}

/// Receives the next JSON push instruction from a subscriber.
async fn next_update(ws: &mut WsClient) -> serde_json::Value {
    let message = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("timed out waiting for push")
        .expect("stream ended")
        .expect("websocket error");
    match message {
        Message::Text(text) => serde_json::from_str(&text).expect("push is JSON"),
        other => panic!("expected text push, got {other:?}"),
    }
}

/// Asserts that no further push arrives within a grace period.
async fn assert_silent(ws: &mut WsClient) {
    let outcome = tokio::time::timeout(Duration::from_millis(300), ws.next()).await;
    assert!(outcome.is_err(), "expected no push, got {outcome:?}");
}

#[tokio::test]
async fn create_is_pushed_once_to_every_subscriber() {
    let (addr, _store) = spawn_server().await;
    let mut viewer_one = subscribe(&addr).await;
    let mut viewer_two = subscribe(&addr).await;

    // Client 1 creates a task; client 2 never issues a request.
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/todos"))
        .form(&[("title", "Buy milk")])
        .send()
        .await
        .expect("create request");
    assert_eq!(response.status(), 201);

    // Fragment-respond policy: the mutating client gets the instruction back.
    let body: serde_json::Value = response.json().await.expect("instruction body");
    assert_eq!(body["action"], "prepend");
    assert_eq!(body["target"], "todos");
    assert!(body["html"].as_str().expect("html").contains("Buy milk"));

    // Both subscribers get exactly one prepend carrying the fragment.
    for viewer in [&mut viewer_one, &mut viewer_two] {
        let push = next_update(viewer).await;
        assert_eq!(push, body);
        assert_silent(viewer).await;
    }
}

#[tokio::test]
async fn create_accepts_a_json_body() {
    let (addr, store) = spawn_server().await;
    let mut viewer = subscribe(&addr).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/todos"))
        .json(&serde_json::json!({ "title": "Buy milk" }))
        .send()
        .await
        .expect("create request");
    assert_eq!(response.status(), 201);

    let body: serde_json::Value = response.json().await.expect("instruction body");
    assert_eq!(body["action"], "prepend");
    assert!(body["html"].as_str().expect("html").contains("Buy milk"));

    let push = next_update(&mut viewer).await;
    assert_eq!(push, body);
    assert_eq!(store.list().await.expect("list")[0].title, "Buy milk");
}

#[tokio::test]
async fn update_accepts_a_json_body() {
    let (addr, store) = spawn_server().await;
    let client = reqwest::Client::new();

    client
        .post(format!("http://{addr}/todos"))
        .form(&[("title", "Buy milk")])
        .send()
        .await
        .expect("create request");
    let id = store.list().await.expect("list")[0].id;

    let response = client
        .patch(format!("http://{addr}/todos/{id}"))
        .json(&serde_json::json!({ "completed": true }))
        .send()
        .await
        .expect("update request");
    assert_eq!(response.status(), 200);

    assert!(store.find(id).await.expect("find").completed);
}

#[tokio::test]
async fn explicit_false_uncompletes_a_task() {
    let (addr, store) = spawn_server().await;
    let client = reqwest::Client::new();

    client
        .post(format!("http://{addr}/todos"))
        .form(&[("title", "Buy milk"), ("completed", "true")])
        .send()
        .await
        .expect("create request");
    let id = store.list().await.expect("list")[0].id;
    assert!(store.find(id).await.expect("find").completed);

    // The edit form always submits an explicit completed value; absent would
    // mean "leave unchanged".
    let response = client
        .patch(format!("http://{addr}/todos/{id}"))
        .form(&[("completed", "false")])
        .send()
        .await
        .expect("update request");
    assert_eq!(response.status(), 200);

    let push: serde_json::Value = response.json().await.expect("instruction body");
    assert_eq!(push["action"], "replace");
    assert!(!push["html"].as_str().expect("html").contains("checked"));

    assert!(!store.find(id).await.expect("find").completed);
}

#[tokio::test]
async fn delete_is_pushed_as_remove_and_list_excludes_the_id() {
    let (addr, store) = spawn_server().await;
    let client = reqwest::Client::new();

    // Seed one task before anyone subscribes.
    let response = client
        .post(format!("http://{addr}/todos"))
        .form(&[("title", "Obsolete"), ("description", "old entry")])
        .send()
        .await
        .expect("create request");
    assert_eq!(response.status(), 201);
    let id = store.list().await.expect("list")[0].id;

    let mut deleter = subscribe(&addr).await;
    let mut viewer = subscribe(&addr).await;

    let response = client
        .delete(format!("http://{addr}/todos/{id}"))
        .send()
        .await
        .expect("delete request");
    assert_eq!(response.status(), 200);

    // All subscribers, the deleting client included, get exactly one remove.
    for ws in [&mut deleter, &mut viewer] {
        let push = next_update(ws).await;
        assert_eq!(push["action"], "remove");
        assert_eq!(push["target"], format!("todo_{id}"));
        assert_silent(ws).await;
    }

    assert!(store.list().await.expect("list").is_empty());
    let page = client
        .get(format!("http://{addr}/todos"))
        .send()
        .await
        .expect("list page")
        .text()
        .await
        .expect("page body");
    assert!(!page.contains(&format!("todo_{id}")));
}

#[tokio::test]
async fn update_is_pushed_as_replace_addressed_by_id() {
    let (addr, store) = spawn_server().await;
    let client = reqwest::Client::new();

    client
        .post(format!("http://{addr}/todos"))
        .form(&[("title", "Buy milk")])
        .send()
        .await
        .expect("create request");
    let id = store.list().await.expect("list")[0].id;

    let mut viewer = subscribe(&addr).await;

    let response = client
        .patch(format!("http://{addr}/todos/{id}"))
        .form(&[("completed", "true")])
        .send()
        .await
        .expect("update request");
    assert_eq!(response.status(), 200);

    let push = next_update(&mut viewer).await;
    assert_eq!(push["action"], "replace");
    assert_eq!(push["target"], format!("todo_{id}"));
    assert!(push["html"].as_str().expect("html").contains("checked"));

    let reread = store.find(id).await.expect("find");
    assert!(reread.completed);
    assert_eq!(reread.title, "Buy milk");
}

#[tokio::test]
async fn validation_failure_replies_with_form_replace_and_broadcasts_nothing() {
    let (addr, store) = spawn_server().await;
    let mut viewer = subscribe(&addr).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/todos"))
        .form(&[("title", "")])
        .send()
        .await
        .expect("create request");
    assert_eq!(response.status(), 422);

    let body: serde_json::Value = response.json().await.expect("instruction body");
    assert_eq!(body["action"], "replace");
    assert_eq!(body["target"], "todo_form");
    assert!(body["html"].as_str().expect("html").contains("blank"));

    assert!(store.list().await.expect("list").is_empty());
    assert_silent(&mut viewer).await;
}

#[tokio::test]
async fn unknown_id_is_a_not_found_page() {
    let (addr, _store) = spawn_server().await;

    let response = reqwest::Client::new()
        .get(format!(
            "http://{addr}/todos/00000000-0000-0000-0000-000000000000"
        ))
        .send()
        .await
        .expect("show request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn liveness_probe_answers_without_the_store() {
    let (addr, _store) = spawn_server().await;

    let response = reqwest::Client::new()
        .get(format!("http://{addr}/up"))
        .send()
        .await
        .expect("probe request");
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.expect("probe body");
    assert_eq!(body["status"], "ok");
}
