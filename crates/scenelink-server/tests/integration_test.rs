//! End-to-end tests for the scenelink HTTP API.
//!
//! Tests exercise the full stack: HTTP request -> axum router -> handler ->
//! engines -> HostBridge -> fake editor host -> HTTP response.
//!
//! The fake host is an axum app on an ephemeral port that answers the editor
//! listener protocol and records every command it receives. Requests reach the
//! router through `tower::ServiceExt::oneshot` without a network server.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower::ServiceExt;

use scenelink_bridge::BridgeConfig;
use scenelink_server::router::build_router;
use scenelink_server::state::AppState;

// ---------------------------------------------------------------------------
// Fake host
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FakeHost {
    commands: Mutex<Vec<(String, Value)>>,
}

impl FakeHost {
    fn commands(&self) -> Vec<(String, Value)> {
        self.commands.lock().unwrap().clone()
    }

    fn command_types(&self) -> Vec<String> {
        self.commands().into_iter().map(|(t, _)| t).collect()
    }
}

async fn host_status() -> Json<Value> {
    Json(json!({
        "status": "online",
        "version": "2.0",
        "service": "fake listener",
        "project": "House",
        "engine_version": "5.4.1"
    }))
}

async fn host_command(State(host): State<Arc<FakeHost>>, Json(body): Json<Value>) -> Json<Value> {
    let command_type = body["type"].as_str().unwrap_or_default().to_string();
    let params = body["params"].clone();
    host.commands
        .lock()
        .unwrap()
        .push((command_type.clone(), params.clone()));

    match command_type.as_str() {
        "actor.spawn" if params["assetPath"] == "/Game/Bad" => {
            Json(json!({ "success": false, "error": "Asset not found: /Game/Bad" }))
        }
        "actor.spawn" => {
            let name = params["name"].clone();
            Json(json!({ "success": true, "actorName": name }))
        }
        "actor.delete" if params["actorName"] == "Locked" => {
            Json(json!({ "success": false, "error": "Actor is locked: Locked" }))
        }
        "actor.get_state" => Json(json!({
            "success": true,
            "actor_name": params["actorName"],
            "location": [100.0, 0.0, 0.0],
            "rotation": [0.0, 0.0, 90.0],
            "scale": [1.0, 1.0, 1.0],
            "mesh": "/Game/Meshes/SM_Wall.SM_Wall",
            "asset_path": "/Game/Meshes/SM_Wall.SM_Wall"
        })),
        "actor.delete" | "actor.modify" | "level.save" | "viewport.camera" => {
            Json(json!({ "success": true }))
        }
        "viewport.screenshot" => Json(json!({ "success": true, "filepath": "/tmp/shot.png" })),
        other => Json(json!({ "success": false, "error": format!("Unknown command: {}", other) })),
    }
}

async fn start_fake_host() -> (String, Arc<FakeHost>) {
    let host = Arc::new(FakeHost::default());
    let app = Router::new()
        .route("/", get(host_status).post(host_command))
        .with_state(Arc::clone(&host));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), host)
}

fn bridge_config(url: &str) -> BridgeConfig {
    BridgeConfig {
        request_timeout: Duration::from_secs(2),
        probe_timeout: Duration::from_millis(500),
        health_interval: Duration::from_secs(5),
        ..BridgeConfig::with_base_url(url)
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Creates a router talking to a fresh fake host.
async fn test_app() -> (Router, Arc<FakeHost>) {
    let (url, host) = start_fake_host().await;
    let state = AppState::new(bridge_config(&url)).expect("failed to create AppState");
    (build_router(state), host)
}

/// Creates a router whose host URL has nothing listening.
async fn offline_app() -> Router {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let state = AppState::new(bridge_config(&format!("http://{}", addr)))
        .expect("failed to create AppState");
    build_router(state)
}

/// Sends a POST request with a JSON body and returns (status, json).
async fn post_json(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(path)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(json!(null));
    (status, json)
}

/// Sends a GET request and returns (status, json).
async fn get_json(app: &Router, path: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(json!(null));
    (status, json)
}

/// Spawns a named actor through the tool endpoint.
async fn spawn(app: &Router, name: &str) {
    let (status, body) = post_json(
        app,
        "/tools/actor_spawn",
        json!({ "params": { "assetPath": "/Game/Wall", "name": name } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "spawn failed: {:?}", body);
    assert_eq!(body["success"], true, "spawn failed: {:?}", body);
}

fn text(body: &Value) -> &str {
    body["text"].as_str().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tool execution and undo/redo
// ---------------------------------------------------------------------------

#[tokio::test]
async fn spawn_then_undo_deletes_actor() {
    let (app, host) = test_app().await;
    spawn(&app, "Wall_01").await;

    let (status, body) = post_json(&app, "/undo", json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(text(&body).contains("Successfully undone 1 operation(s):"));
    assert!(text(&body).contains("✓ Spawn Wall_01 (actor_spawn)"));
    assert_eq!(body["status"]["currentIndex"], -1);
    let (command_type, params) = host.commands().pop().unwrap();
    assert_eq!(command_type, "actor.delete");
    assert_eq!(params, json!({ "actorName": "Wall_01" }));
}

#[tokio::test]
async fn redo_replays_original_call() {
    let (app, host) = test_app().await;
    spawn(&app, "Wall_01").await;
    post_json(&app, "/undo", json!({})).await;

    let (status, body) = post_json(&app, "/redo", json!({ "count": 1 })).await;

    assert_eq!(status, StatusCode::OK);
    assert!(text(&body).contains("↷ Spawn Wall_01 (actor_spawn)"));
    assert_eq!(body["status"]["currentIndex"], 0);
    let (command_type, params) = host.commands().pop().unwrap();
    assert_eq!(command_type, "actor.spawn");
    assert_eq!(params["name"], "Wall_01");
}

#[tokio::test]
async fn level_save_stops_undo_chain() {
    let (app, host) = test_app().await;
    spawn(&app, "Wall_01").await;
    let (status, _) = post_json(&app, "/tools/level_save", json!({ "params": {} })).await;
    assert_eq!(status, StatusCode::OK);
    let sent_before = host.commands().len();

    let (status, body) = post_json(&app, "/undo", json!({ "count": 2 })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["completed"].as_array().unwrap().len(), 0);
    assert_eq!(body["failed"].as_array().unwrap().len(), 1);
    assert!(text(&body).contains("no undo data"));
    assert_eq!(body["status"]["currentIndex"], 1);
    assert_eq!(host.commands().len(), sent_before);
}

#[tokio::test]
async fn failed_inverse_stops_chain_after_one_step() {
    let (app, _host) = test_app().await;
    spawn(&app, "A").await;
    // Deleting "Locked" is refused by the host, so undoing its spawn fails.
    spawn(&app, "Locked").await;
    spawn(&app, "C").await;

    let (_, body) = post_json(&app, "/undo", json!({ "count": 3 })).await;

    assert_eq!(body["completed"].as_array().unwrap().len(), 1);
    assert_eq!(body["failed"].as_array().unwrap().len(), 1);
    assert_eq!(body["failed"][0]["error"], "Actor is locked: Locked");
    assert_eq!(body["status"]["currentIndex"], 1);
    assert!(text(&body).contains("Failed to undo 1 operation(s):"));
}

#[tokio::test]
async fn undo_with_empty_history_is_a_no_op() {
    let (app, host) = test_app().await;

    let (status, body) = post_json(&app, "/undo", json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert!(text(&body).starts_with("Nothing to undo."));
    assert!(host.commands().is_empty());
}

#[tokio::test]
async fn undo_count_must_be_positive() {
    let (app, _host) = test_app().await;

    let (status, body) = post_json(&app, "/undo", json!({ "count": 0 })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn delete_snapshot_is_used_to_restore_actor() {
    let (app, host) = test_app().await;
    let (_, body) = post_json(
        &app,
        "/tools/actor_delete",
        json!({ "params": { "actorName": "Wall_01" } }),
    )
    .await;
    assert!(body["recorded"]["undoable"].as_bool().unwrap());

    post_json(&app, "/undo", json!({})).await;

    assert_eq!(
        host.command_types(),
        vec!["actor.get_state", "actor.delete", "actor.spawn"]
    );
    let (_, params) = host.commands().pop().unwrap();
    assert_eq!(
        params,
        json!({
            "assetPath": "/Game/Meshes/SM_Wall.SM_Wall",
            "location": [100.0, 0.0, 0.0],
            "rotation": [0.0, 0.0, 90.0],
            "scale": [1.0, 1.0, 1.0],
            "name": "Wall_01"
        })
    );
}

#[tokio::test]
async fn rejected_tool_call_is_not_recorded() {
    let (app, _host) = test_app().await;

    let (status, body) = post_json(
        &app,
        "/tools/actor_spawn",
        json!({ "params": { "assetPath": "/Game/Bad" } }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(text(&body).contains("Asset not found: /Game/Bad"));
    assert_eq!(body["status"]["totalOperations"], 0);
}

#[tokio::test]
async fn unknown_tool_is_bad_request() {
    let (app, host) = test_app().await;

    let (status, _) = post_json(&app, "/tools/level_delete", json!({ "params": {} })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(host.commands().is_empty());
}

// ---------------------------------------------------------------------------
// Checkpoints
// ---------------------------------------------------------------------------

#[tokio::test]
async fn checkpoint_round_trip() {
    let (app, _host) = test_app().await;
    spawn(&app, "A").await;
    let (status, created) =
        post_json(&app, "/checkpoints", json!({ "name": "c1", "description": "one wall" })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(text(&created).contains("Checkpoint \"c1\" created at operation 2 of 2."));
    assert!(text(&created).contains("Total checkpoints: 1"));
    spawn(&app, "B").await;
    spawn(&app, "C").await;

    let (status, body) = post_json(&app, "/checkpoints/c1/restore", json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(text(&body).starts_with("Restored to checkpoint \"c1\"."));
    assert_eq!(body["undone"].as_array().unwrap().len(), 2);
    assert_eq!(body["status"]["currentIndex"], created["index"]);

    let (_, again) = post_json(&app, "/checkpoints/c1/restore", json!({})).await;
    assert!(text(&again).starts_with("Already at checkpoint \"c1\""));
}

#[tokio::test]
async fn restore_forward_redoes() {
    let (app, _host) = test_app().await;
    post_json(&app, "/checkpoints", json!({ "name": "start" })).await;
    spawn(&app, "A").await;
    post_json(&app, "/checkpoints", json!({ "name": "after-a" })).await;
    post_json(&app, "/checkpoints/start/restore", json!({})).await;

    let (_, body) = post_json(&app, "/checkpoints/after-a/restore", json!({})).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["redone"].as_array().unwrap().len(), 2);
    assert!(text(&body).contains("↷ Spawn A (actor_spawn)"));
}

#[tokio::test]
async fn checkpoint_validation_errors() {
    let (app, _host) = test_app().await;

    let (status, body) = post_json(&app, "/checkpoints/nope/restore", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("No checkpoints exist"));

    let (status, _) = post_json(&app, "/checkpoints", json!({ "name": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    post_json(&app, "/checkpoints", json!({ "name": "c1" })).await;
    let (status, _) = post_json(&app, "/checkpoints", json!({ "name": "c1" })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = post_json(&app, "/checkpoints/c2/restore", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Available checkpoints: c1"));
    assert_eq!(body["error"]["details"]["availableCheckpoints"], json!(["c1"]));
}

#[tokio::test]
async fn list_checkpoints_marks_current() {
    let (app, _host) = test_app().await;
    post_json(&app, "/checkpoints", json!({ "name": "c1" })).await;

    let (status, body) = get_json(&app, "/checkpoints").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checkpoints"][0]["name"], "c1");
    assert_eq!(body["checkpoints"][0]["index"], 0);
    assert!(text(&body).contains("• c1 (operation 1) <- current"));
}

// ---------------------------------------------------------------------------
// History listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn history_lists_undoable_and_redoable() {
    let (app, _host) = test_app().await;
    spawn(&app, "A").await;
    post_json(&app, "/checkpoints", json!({ "name": "c1" })).await;
    spawn(&app, "B").await;
    post_json(&app, "/undo", json!({})).await;

    let (status, body) = get_json(&app, "/history?limit=5&showRedo=true").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["operations"].as_array().unwrap().len(), 2);
    assert_eq!(body["operations"][0]["checkpointName"], "c1");
    assert_eq!(body["redoable"][0]["description"], "Spawn B");
    assert!(text(&body).contains("↷ #3 Spawn B (actor_spawn)"));
    assert!(text(&body).contains("Undo available: 2 | Redo available: 1 | Checkpoints: c1"));

    let (_, plain) = get_json(&app, "/history").await;
    assert!(plain.get("redoable").is_none());
}

#[tokio::test]
async fn history_limit_is_bounded() {
    let (app, _host) = test_app().await;

    let (status, _) = get_json(&app, "/history?limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(&app, "/history?limit=51").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Batch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn batch_reports_each_item() {
    let (app, host) = test_app().await;

    let (status, body) = post_json(
        &app,
        "/batch",
        json!({
            "operations": [
                { "operation": "actor_spawn", "params": { "assetPath": "/Game/Wall" }, "id": "w1" },
                { "operation": "actor_spawn", "params": { "assetPath": "/Game/Bad" }, "id": "w2" },
                { "operation": "viewport_screenshot", "params": {} }
            ]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["successCount"], 2);
    assert_eq!(body["failureCount"], 1);
    assert_eq!(body["operations"][2]["id"], "op_2");
    assert_eq!(body["operations"][2]["success"], true);
    assert!(text(&body).contains("✓ w1"));
    assert!(text(&body).contains("✗ w2: Asset not found: /Game/Bad"));
    assert_eq!(host.commands().len(), 3);

    let (_, history) = get_json(&app, "/history").await;
    assert_eq!(history["status"]["totalOperations"], 0);
}

#[tokio::test]
async fn batch_validation_rejects_before_dispatch() {
    let (app, host) = test_app().await;

    let (status, _) = post_json(&app, "/batch", json!({ "operations": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post_json(
        &app,
        "/batch",
        json!({
            "operations": [
                { "operation": "actor_spawn", "params": { "assetPath": "/Game/Wall" } },
                { "operation": "level_save", "params": {} }
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("operations[1]: unsupported batch operation 'level_save'"));

    let (status, _) = post_json(
        &app,
        "/batch",
        json!({ "operations": [{ "operation": "actor_spawn", "params": [1, 2] }] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(host.commands().is_empty());
}

// ---------------------------------------------------------------------------
// Bridge
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bridge_status_reports_host() {
    let (app, _host) = test_app().await;

    let (status, body) = get_json(&app, "/bridge/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["connected"], true);
    assert_eq!(body["state"], "online");
    assert_eq!(body["host"]["project"], "House");
    assert!(text(&body).starts_with("Connected to host at http://127.0.0.1:"));
}

#[tokio::test]
async fn offline_host_is_distinct_error() {
    let app = offline_app().await;

    let (status, body) = get_json(&app, "/bridge/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["connected"], false);
    assert_eq!(body["state"], "offline");

    let (status, body) = post_json(
        &app,
        "/tools/actor_spawn",
        json!({ "params": { "assetPath": "/Game/Wall" } }),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "BRIDGE_OFFLINE");

    let (status, body) = post_json(
        &app,
        "/batch",
        json!({ "operations": [{ "operation": "viewport_camera", "params": {}, "id": "cam" }] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["failureCount"], 1);
    assert!(text(&body).contains("✗ cam: host process is offline"));
}
