//! Integration tests for concurrent access to trace sessions.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::json;
use tokio::sync::Notify;
use tower::ServiceExt;

use replay_core::{ExecutionError, State, Trace};
use replay_server::executor::Executor;
use replay_server::router::build_router;
use replay_server::state::AppState;

/// Produces `payload.parse::<u64>()` states after a short delay, so loads
/// overlap with other requests.
struct CountingExecutor {
    delay: Duration,
}

#[async_trait]
impl Executor for CountingExecutor {
    async fn execute(&self, payload: &str) -> Result<Trace, ExecutionError> {
        tokio::time::sleep(self.delay).await;
        let n: u64 = payload
            .trim()
            .parse()
            .map_err(|_| ExecutionError::MalformedOutput(format!("bad count '{payload}'")))?;
        Ok((0..n).map(|i| State::new(json!({ "PC": i }))).collect())
    }
}

/// Blocks loads of the `"slow"` program until the test opens the gate;
/// every other payload yields three states immediately.
struct GatedExecutor {
    entered: Arc<Notify>,
    gate: Arc<Notify>,
}

#[async_trait]
impl Executor for GatedExecutor {
    async fn execute(&self, payload: &str) -> Result<Trace, ExecutionError> {
        if payload == "slow" {
            self.entered.notify_one();
            self.gate.notified().await;
        }
        Ok((0..3).map(|i| State::new(json!({ "PC": i }))).collect())
    }
}

fn test_state(delay: Duration) -> AppState {
    AppState::with_executor(Arc::new(CountingExecutor { delay }))
}

async fn request_json(
    app: &Router,
    method: Method,
    path: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(path);
    let body = match body {
        Some(v) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&v).unwrap())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(json!(null));
    (status, json)
}

async fn load(app: &Router, n: u64) -> String {
    let (status, body) = request_json(
        app,
        Method::POST,
        "/api/load",
        Some(json!({ "program": n.to_string() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "load failed: {body:?}");
    body["session_id"].as_str().unwrap().to_string()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_steps_at_penultimate_position() {
    let app = build_router(test_state(Duration::ZERO));
    let id = load(&app, 5).await;
    for _ in 0..3 {
        request_json(&app, Method::POST, &format!("/api/step/{id}"), None).await;
    }

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let app = app.clone();
            let path = format!("/api/step/{id}");
            tokio::spawn(async move { request_json(&app, Method::POST, &path, None).await })
        })
        .collect();

    for h in handles {
        let (status, body) = h.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["current_step"], 4);
        assert_eq!(body["done"], true);
    }

    let (_, body) = request_json(&app, Method::GET, &format!("/api/state/{id}"), None).await;
    assert_eq!(body["current_step"], 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_sessions_stepped_in_parallel() {
    let app = build_router(test_state(Duration::from_millis(5)));

    let handles: Vec<_> = (1..=8u64)
        .map(|n| {
            let app = app.clone();
            tokio::spawn(async move {
                let id = load(&app, n).await;
                // Step once more than needed; every session stops at its own last state.
                for _ in 0..n + 1 {
                    let (status, _) =
                        request_json(&app, Method::POST, &format!("/api/step/{id}"), None).await;
                    assert_eq!(status, StatusCode::OK);
                }
                let (_, body) =
                    request_json(&app, Method::GET, &format!("/api/state/{id}"), None).await;
                (n, body)
            })
        })
        .collect();

    for h in handles {
        let (n, body) = h.await.unwrap();
        assert_eq!(body["current_step"], n - 1);
        assert_eq!(body["total_steps"], n);
        assert_eq!(body["state"], json!({ "PC": n - 1 }));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_slow_load_does_not_block_other_sessions() {
    let entered = Arc::new(Notify::new());
    let gate = Arc::new(Notify::new());
    let state = AppState::with_executor(Arc::new(GatedExecutor {
        entered: Arc::clone(&entered),
        gate: Arc::clone(&gate),
    }));
    let app = build_router(state.clone());

    let (status, body) =
        request_json(&app, Method::POST, "/api/load", Some(json!({ "program": "fast" }))).await;
    assert_eq!(status, StatusCode::OK);
    let id = body["session_id"].as_str().unwrap().to_string();

    let slow = {
        let app = app.clone();
        tokio::spawn(async move {
            request_json(&app, Method::POST, "/api/load", Some(json!({ "program": "slow" })))
                .await
        })
    };
    entered.notified().await;

    // The slow load is parked inside the executor; other sessions still answer.
    let step_path = format!("/api/step/{id}");
    let step = request_json(&app, Method::POST, &step_path, None);
    let (status, body) = tokio::time::timeout(Duration::from_secs(10), step)
        .await
        .expect("step blocked behind an in-flight load");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current_step"], 1);
    assert_eq!(state.store.session_count(), 1);

    gate.notify_one();
    let (status, _) = slow.await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.store.session_count(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_deletes_succeed_exactly_once() {
    let state = test_state(Duration::ZERO);
    let app = build_router(state.clone());
    let id = load(&app, 3).await;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let app = app.clone();
            let path = format!("/api/session/{id}");
            tokio::spawn(async move { request_json(&app, Method::DELETE, &path, None).await.0 })
        })
        .collect();

    let mut ok = 0;
    let mut not_found = 0;
    for h in handles {
        let status = h.await.unwrap();
        if status == StatusCode::OK {
            ok += 1;
        } else if status == StatusCode::NOT_FOUND {
            not_found += 1;
        } else {
            panic!("unexpected status {status}");
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(not_found, 3);
    assert_eq!(state.store.session_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_steps_racing_delete_never_error_otherwise() {
    let state = test_state(Duration::ZERO);
    let app = build_router(state.clone());
    let id = load(&app, 50).await;

    let steppers: Vec<_> = (0..16)
        .map(|_| {
            let app = app.clone();
            let path = format!("/api/step/{id}");
            tokio::spawn(async move { request_json(&app, Method::POST, &path, None).await })
        })
        .collect();
    let (status, _) = request_json(&app, Method::DELETE, &format!("/api/session/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    for h in steppers {
        let (status, body) = h.await.unwrap();
        if status == StatusCode::OK {
            assert!(body["current_step"].as_u64().unwrap() <= 49);
        } else {
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["error"]["code"], "NOT_FOUND");
        }
    }
    assert_eq!(state.store.session_count(), 0);
}

#[tokio::test]
async fn test_idle_sweep_reclaims_sessions() {
    let state = test_state(Duration::ZERO);
    let app = build_router(state.clone());
    let id = load(&app, 2).await;

    tokio::time::sleep(Duration::from_millis(30)).await;
    let evicted = state.store.sweep_idle(Duration::from_millis(10));
    assert_eq!(evicted.len(), 1);

    let (status, _) = request_json(&app, Method::GET, &format!("/api/state/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
