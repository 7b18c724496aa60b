//! In-process mock of the recipe platform backend.
//!
//! Speaks the same envelope dialect as production: 2xx bodies wrapped in
//! `{status, data, message}`, errors carrying a `detail` field.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde_json::{Value, json};

#[derive(Debug, Clone)]
pub struct MockNotification {
    pub id: String,
    pub kind: String,
    pub priority: String,
    pub title: String,
    pub is_read: bool,
}

impl MockNotification {
    pub fn new(id: &str, kind: &str, priority: &str, title: &str, is_read: bool) -> Self {
        Self {
            id: id.to_string(),
            kind: kind.to_string(),
            priority: priority.to_string(),
            title: title.to_string(),
            is_read,
        }
    }

    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "type": self.kind,
            "priority": self.priority,
            "title": self.title,
            "body": null,
            "actionUrl": null,
            "isRead": self.is_read,
            "createdAt": "2026-08-01T12:00:00Z",
        })
    }
}

#[derive(Debug, Default)]
pub struct MockBackend {
    pub notifications: Vec<MockNotification>,
    pub saved: HashSet<String>,
    pub suggestions: Vec<Value>,
    /// When set, every mutation fails with a 500 and this detail text.
    pub fail_mutations: Option<String>,
}

pub type Shared = Arc<Mutex<MockBackend>>;

fn envelope(data: Value) -> Json<Value> {
    Json(json!({"status": "ok", "data": data, "message": null}))
}

fn backend_error(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({"detail": detail}))).into_response()
}

fn mutation_gate(state: &Shared) -> Option<Response> {
    let backend = state.lock().unwrap();
    backend
        .fail_mutations
        .as_ref()
        .map(|detail| backend_error(StatusCode::INTERNAL_SERVER_ERROR, detail))
}

async fn login(Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if body["password"].as_str() != Some("secret") {
        return backend_error(StatusCode::UNAUTHORIZED, "invalid credentials");
    }
    envelope(json!({
        "token": "test-token",
        "user": {"id": "u1", "email": email, "displayName": "Test Cook"},
    }))
    .into_response()
}

async fn me(headers: HeaderMap) -> Response {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "Bearer test-token");
    if !authorized {
        return backend_error(StatusCode::UNAUTHORIZED, "missing or invalid token");
    }
    envelope(json!({"id": "u1", "email": "cook@example.com", "displayName": "Test Cook"}))
        .into_response()
}

async fn suggestions(State(state): State<Shared>) -> Response {
    let suggestions = state.lock().unwrap().suggestions.clone();
    envelope(Value::Array(suggestions)).into_response()
}

async fn smart_search(Json(body): Json<Value>) -> Response {
    let query = body["query"].as_str().unwrap_or_default();
    let data = if query.contains("lasagna") {
        json!([{
            "id": "r1",
            "title": "Classic Lasagna",
            "authorId": "u2",
            "category": "Italian",
            "description": null,
            "imageUrl": null,
            "status": "APPROVED",
            "createdAt": "2026-07-01T09:00:00Z",
        }])
    } else {
        json!([])
    };
    let total = data.as_array().map_or(0, Vec::len);
    Json(json!({
        "status": "ok",
        "data": data,
        "total": total,
        "execution_time_ms": 12.5,
    }))
    .into_response()
}

async fn saved_list(State(state): State<Shared>) -> Response {
    let saved = state.lock().unwrap().saved.clone();
    let recipes: Vec<Value> = saved
        .iter()
        .map(|id| {
            json!({
                "id": id,
                "title": format!("Recipe {id}"),
                "authorId": "u2",
                "category": null,
                "description": null,
                "imageUrl": null,
                "status": "APPROVED",
                "createdAt": "2026-07-01T09:00:00Z",
            })
        })
        .collect();
    envelope(Value::Array(recipes)).into_response()
}

async fn saved_add(
    State(state): State<Shared>,
    Path((_user, recipe_id)): Path<(String, String)>,
) -> Response {
    if let Some(response) = mutation_gate(&state) {
        return response;
    }
    state.lock().unwrap().saved.insert(recipe_id);
    envelope(json!({})).into_response()
}

async fn saved_remove(
    State(state): State<Shared>,
    Path((_user, recipe_id)): Path<(String, String)>,
) -> Response {
    if let Some(response) = mutation_gate(&state) {
        return response;
    }
    state.lock().unwrap().saved.remove(&recipe_id);
    envelope(json!({})).into_response()
}

async fn notifications_list(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let unread_only = params.get("unread").map(String::as_str) == Some("true");
    let page: u32 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let page_size: u32 = params
        .get("page_size")
        .and_then(|p| p.parse().ok())
        .unwrap_or(20);

    let backend = state.lock().unwrap();
    let items: Vec<Value> = backend
        .notifications
        .iter()
        .filter(|n| !unread_only || !n.is_read)
        .map(MockNotification::to_json)
        .collect();
    let total = items.len();

    envelope(json!({
        "items": items,
        "total": total,
        "page": page,
        "page_size": page_size,
    }))
    .into_response()
}

async fn unread_count(State(state): State<Shared>) -> Response {
    let count = state
        .lock()
        .unwrap()
        .notifications
        .iter()
        .filter(|n| !n.is_read)
        .count();
    envelope(json!({"count": count})).into_response()
}

async fn mark_read(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    if let Some(response) = mutation_gate(&state) {
        return response;
    }
    let mut backend = state.lock().unwrap();
    match backend.notifications.iter_mut().find(|n| n.id == id) {
        Some(notification) => {
            notification.is_read = true;
            envelope(json!({})).into_response()
        }
        None => backend_error(StatusCode::NOT_FOUND, "notification not found"),
    }
}

async fn mark_all_read(State(state): State<Shared>) -> Response {
    if let Some(response) = mutation_gate(&state) {
        return response;
    }
    let mut backend = state.lock().unwrap();
    let affected = backend.notifications.iter().filter(|n| !n.is_read).count();
    for notification in &mut backend.notifications {
        notification.is_read = true;
    }
    envelope(json!({"affected": affected})).into_response()
}

async fn delete_one(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    if let Some(response) = mutation_gate(&state) {
        return response;
    }
    state.lock().unwrap().notifications.retain(|n| n.id != id);
    envelope(json!({})).into_response()
}

async fn clear_all(State(state): State<Shared>) -> Response {
    if let Some(response) = mutation_gate(&state) {
        return response;
    }
    let mut backend = state.lock().unwrap();
    let affected = backend.notifications.len();
    backend.notifications.clear();
    envelope(json!({"affected": affected})).into_response()
}

/// Serves the mock backend on an ephemeral port, returning the shared
/// state handle and the base URL to point a client at.
pub async fn spawn(backend: MockBackend) -> (Shared, String) {
    let shared: Shared = Arc::new(Mutex::new(backend));

    let router = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/search/suggestions", get(suggestions))
        .route("/search/smart", post(smart_search))
        .route("/users/{user}/saved-recipes", get(saved_list))
        .route("/users/{user}/saved-recipes/{id}", post(saved_add))
        .route("/users/{user}/saved-recipes/{id}", delete(saved_remove))
        .route("/notifications", get(notifications_list))
        .route("/notifications", delete(clear_all))
        .route("/notifications/unread-count", get(unread_count))
        .route("/notifications/{id}/read", patch(mark_read))
        .route("/notifications/read-all", post(mark_all_read))
        .route("/notifications/{id}", delete(delete_one))
        .with_state(shared.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind mock backend");
    let addr = listener.local_addr().expect("missing local addr");

    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    (shared, format!("http://{addr}"))
}

/// Config pointing at the mock backend, with the cache isolated to a
/// temp directory.
pub fn test_config(base_url: &str, cache_dir: &tempfile::TempDir) -> ladle::Config {
    let mut config = ladle::Config::default();
    config.api.base_url = base_url.to_string();
    config.api.api_key = "test-key".to_string();
    config.cache.path = Some(cache_dir.path().join("cache.json"));
    // Keep the debounce short so suggestion tests stay fast.
    config.search.debounce_ms = 20;
    config
}
