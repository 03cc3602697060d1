#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use codehub_core::storage::{KeyValueStore, MemoryStore, UserStorage};
use codehub_core::ApiClient;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct SessionRecord {
    pub title: Option<String>,
    /// (sender, message) pairs in arrival order.
    pub messages: Vec<(String, String)>,
}

/// Shared state of the mock backend, inspectable from tests.
#[derive(Default)]
pub struct MockState {
    pub saved_progress: Mutex<Option<(u32, u32)>>,
    pub progress_saves: AtomicUsize,
    pub quiz_attempts_remaining: Mutex<u32>,
    pub quiz_submissions: Mutex<Vec<Value>>,
    pub sessions: Mutex<HashMap<String, SessionRecord>>,
    pub next_session: AtomicUsize,
    pub settings_fetches: AtomicUsize,
    pub saw_bearer_token: AtomicUsize,
}

pub struct MockBackend {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
}

impl MockBackend {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Bind the mock API to an ephemeral port and serve it in the background.
pub async fn spawn_backend() -> MockBackend {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let state = Arc::new(MockState {
        quiz_attempts_remaining: Mutex::new(3),
        ..MockState::default()
    });

    let app = Router::new()
        .route(
            "/learning/modules/{id}/get_progress/",
            get(get_progress),
        )
        .route(
            "/learning/modules/{id}/save_progress/",
            post(save_progress),
        )
        .route("/learning/quizzes/{id}/submit_simple/", post(submit_quiz))
        .route("/settings/", get(get_settings))
        .route("/ai/sessions/", get(list_sessions).post(create_session))
        .route(
            "/ai/sessions/{id}/",
            get(get_session).patch(patch_session).delete(delete_session),
        )
        .route("/ai/sessions/{id}/send_message/", post(send_message))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockBackend { addr, state }
}

/// Storage pre-loaded with a bearer token, the way a logged-in tab looks.
pub fn test_storage(user_id: &str) -> UserStorage {
    let session: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let shared: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let storage = UserStorage::new(session, shared, user_id);
    storage.set_token("test-jwt");
    storage
}

pub fn client_for(backend: &MockBackend, storage: UserStorage) -> Arc<ApiClient> {
    Arc::new(ApiClient::new(backend.base_url(), storage))
}

// ---- handlers ----

fn note_auth(state: &MockState, headers: &HeaderMap) {
    if headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("Bearer "))
        .unwrap_or(false)
    {
        state.saw_bearer_token.fetch_add(1, Ordering::SeqCst);
    }
}

async fn get_progress(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(_id): Path<String>,
) -> impl IntoResponse {
    note_auth(&state, &headers);
    match *state.saved_progress.lock().unwrap() {
        Some((current, total)) => (
            StatusCode::OK,
            Json(json!({ "current_slide": current, "total_slides": total })),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "No progress found" })),
        ),
    }
}

async fn save_progress(
    State(state): State<Arc<MockState>>,
    Path(_id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let current = body["current_slide"].as_u64().unwrap_or(0) as u32;
    let total = body["total_slides"].as_u64().unwrap_or(0) as u32;
    *state.saved_progress.lock().unwrap() = Some((current, total));
    state.progress_saves.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "success": true }))
}

async fn submit_quiz(
    State(state): State<Arc<MockState>>,
    Path(_id): Path<String>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let mut remaining = state.quiz_attempts_remaining.lock().unwrap();
    if *remaining == 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "Maximum attempts (3) reached for this quiz" })),
        );
    }
    *remaining -= 1;
    state.quiz_submissions.lock().unwrap().push(body);
    let used = 3 - *remaining;
    (
        StatusCode::OK,
        Json(json!({ "attempts_used": used, "attempts_remaining": *remaining })),
    )
}

async fn get_settings(State(state): State<Arc<MockState>>) -> Json<Value> {
    state.settings_fetches.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "success": true,
        "features": {
            "ai_mentor": true,
            "competitions": false,
            "learning_paths": true
        }
    }))
}

fn session_json(id: &str, record: &SessionRecord) -> Value {
    json!({
        "id": id,
        "title": record.title,
        "session_type": "general_chat",
        "status": "active"
    })
}

async fn list_sessions(State(state): State<Arc<MockState>>) -> Json<Value> {
    let sessions = state.sessions.lock().unwrap();
    let list: Vec<Value> = sessions
        .iter()
        .map(|(id, record)| session_json(id, record))
        .collect();
    Json(json!({ "results": list }))
}

async fn create_session(State(state): State<Arc<MockState>>) -> Json<Value> {
    let n = state.next_session.fetch_add(1, Ordering::SeqCst) + 1;
    let id = format!("sess-{}", n);
    let record = SessionRecord::default();
    let body = session_json(&id, &record);
    state.sessions.lock().unwrap().insert(id, record);
    Json(body)
}

async fn get_session(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.lock().unwrap();
    match sessions.get(&id) {
        Some(record) => {
            let messages: Vec<Value> = record
                .messages
                .iter()
                .map(|(sender, message)| json!({ "sender": sender, "message": message }))
                .collect();
            (
                StatusCode::OK,
                Json(json!({ "id": id, "title": record.title, "messages": messages })),
            )
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Session not found" })),
        ),
    }
}

async fn patch_session(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let mut sessions = state.sessions.lock().unwrap();
    match sessions.get_mut(&id) {
        Some(record) => {
            if let Some(title) = body["title"].as_str() {
                record.title = Some(title.to_string());
            }
            (StatusCode::OK, Json(session_json(&id, record)))
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Session not found" })),
        ),
    }
}

async fn delete_session(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let removed = state.sessions.lock().unwrap().remove(&id).is_some();
    if removed {
        (StatusCode::OK, Json(json!({})))
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Session not found" })),
        )
    }
}

async fn send_message(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let message = body["message"].as_str().unwrap_or("").to_string();
    let mut sessions = state.sessions.lock().unwrap();
    let Some(record) = sessions.get_mut(&id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Session not found" })),
        );
    };

    let reply = format!("You asked about: {}", message);
    record.messages.push(("user".to_string(), message.clone()));
    record.messages.push(("ai".to_string(), reply.clone()));

    let mut response = json!({ "ai_response": { "message": reply } });
    if message.contains("search") {
        response["action"] = json!({
            "type": "search_results",
            "results": { "modules": [{ "title": "Intro to Rust" }] }
        });
    }
    (StatusCode::OK, Json(response))
}
