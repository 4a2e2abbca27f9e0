// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared test fixtures: an in-process fake Supabase and a router wired to it.
//!
//! The fake speaks just enough of PostgREST, the `get_user_from_jwt` RPC and
//! the Storage object API for the upload handlers, and records every call so
//! tests can assert what did (or did not) reach the backend.

use axum::{
    body::{Body, Bytes},
    extract::{Path, Query, State},
    http::{HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use course_publisher::config::Config;
use course_publisher::routes::create_router;
use course_publisher::AppState;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const SERVICE_KEY: &str = "test_service_key";
pub const OWNER_TOKEN: &str = "token-u1";
pub const OTHER_TOKEN: &str = "token-u2";

/// An object held by the fake storage.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: String,
}

/// In-memory stand-in for the Supabase project.
#[derive(Default)]
pub struct FakeBackend {
    /// Token → RPC response body
    pub tokens: HashMap<String, Value>,
    pub tables: HashMap<String, Vec<Value>>,
    /// `bucket/key` → object
    pub objects: HashMap<String, StoredObject>,
    /// Every storage write attempt, as `bucket/key`
    pub uploads: Vec<String>,
    pub rpc_calls: usize,
    /// `apikey` headers seen on any request
    pub api_keys: Vec<String>,
    pub fail_rpc: Option<String>,
    pub fail_select: Option<String>,
    pub fail_storage: Option<String>,
    pub fail_update: Option<String>,
}

#[allow(dead_code)]
impl FakeBackend {
    /// Two teachers, each owning one course with one lesson.
    pub fn seeded() -> Self {
        let mut backend = Self::default();
        backend.tokens.insert(
            OWNER_TOKEN.to_string(),
            json!({ "id": "u1", "email": "u1@example.com" }),
        );
        backend.tokens.insert(
            OTHER_TOKEN.to_string(),
            json!({ "id": "u2", "email": "u2@example.com" }),
        );

        backend.tables.insert(
            "courses".to_string(),
            vec![
                json!({
                    "id": "c1", "name": "Rust 101", "teacher_id": "u1",
                    "cover_url": null, "tags": ["rust"], "description": "Intro",
                    "learning_goals": "Ownership", "is_public": true
                }),
                json!({
                    "id": "c2", "name": "Go 101", "teacher_id": "u2",
                    "cover_url": null, "tags": null, "description": "Intro",
                    "learning_goals": "Goroutines", "is_public": false
                }),
            ],
        );
        backend.tables.insert(
            "course_lessons".to_string(),
            vec![
                json!({ "id": "l1", "course_id": "c1", "item_link": null }),
                json!({ "id": "l2", "course_id": "c2", "item_link": null }),
            ],
        );
        backend.tables.insert(
            "profiles".to_string(),
            vec![json!({
                "id": "u1", "username": "ada", "avatar_url": null,
                "is_bannable": false, "created_at": "2022-01-01T00:00:00Z"
            })],
        );
        backend.tables.insert(
            "teachers".to_string(),
            vec![json!({
                "id": "u1", "full_name": "Ada Lovelace", "website": null,
                "about": "Analytical engines", "created_at": "2022-01-01T00:00:00Z"
            })],
        );
        backend
    }

    pub fn row(&self, table: &str, id: &str) -> Option<Value> {
        self.tables
            .get(table)?
            .iter()
            .find(|row| row["id"] == id)
            .cloned()
    }
}

pub type SharedBackend = Arc<Mutex<FakeBackend>>;

fn record_api_key(backend: &mut FakeBackend, headers: &HeaderMap) {
    if let Some(key) = headers.get("apikey").and_then(|h| h.to_str().ok()) {
        backend.api_keys.push(key.to_string());
    }
}

fn postgrest_error(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "code": "XX000", "details": null, "hint": null, "message": message })),
    )
        .into_response()
}

/// Equality filters from a PostgREST query string.
fn filters(query: &[(String, String)]) -> Vec<(String, String)> {
    query
        .iter()
        .filter(|(k, _)| k != "select" && k != "limit")
        .filter_map(|(k, v)| v.strip_prefix("eq.").map(|v| (k.clone(), v.to_string())))
        .collect()
}

fn matches(row: &Value, filters: &[(String, String)]) -> bool {
    filters
        .iter()
        .all(|(col, val)| row.get(col).and_then(Value::as_str) == Some(val.as_str()))
}

async fn rpc_get_user(
    State(backend): State<SharedBackend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut backend = backend.lock().unwrap();
    record_api_key(&mut backend, &headers);
    backend.rpc_calls += 1;

    if let Some(msg) = &backend.fail_rpc {
        return postgrest_error(msg);
    }

    let token = body["jwt"].as_str().unwrap_or_default();
    let user = backend.tokens.get(token).cloned().unwrap_or(Value::Null);
    Json(user).into_response()
}

async fn select_rows(
    State(backend): State<SharedBackend>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
) -> Response {
    let mut backend = backend.lock().unwrap();
    record_api_key(&mut backend, &headers);

    if let Some(msg) = &backend.fail_select {
        return postgrest_error(msg);
    }

    let filters = filters(&query);
    let rows: Vec<Value> = backend
        .tables
        .get(&table)
        .map(|rows| rows.iter().filter(|r| matches(r, &filters)).cloned().collect())
        .unwrap_or_default();
    Json(rows).into_response()
}

async fn update_rows(
    State(backend): State<SharedBackend>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
    Json(fields): Json<Value>,
) -> Response {
    let mut backend = backend.lock().unwrap();
    record_api_key(&mut backend, &headers);

    if let Some(msg) = &backend.fail_update {
        return postgrest_error(msg);
    }

    let filters = filters(&query);
    let mut updated = Vec::new();
    if let Some(rows) = backend.tables.get_mut(&table) {
        for row in rows.iter_mut().filter(|r| matches(r, &filters)) {
            if let (Some(row_obj), Some(new_fields)) = (row.as_object_mut(), fields.as_object()) {
                for (k, v) in new_fields {
                    row_obj.insert(k.clone(), v.clone());
                }
            }
            updated.push(row.clone());
        }
    }
    Json(updated).into_response()
}

async fn upload_object(
    State(backend): State<SharedBackend>,
    Path((bucket, key)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut backend = backend.lock().unwrap();
    record_api_key(&mut backend, &headers);

    let path = format!("{}/{}", bucket, key);
    backend.uploads.push(path.clone());

    if let Some(msg) = &backend.fail_storage {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "statusCode": "400", "error": "Bad Request", "message": msg })),
        )
            .into_response();
    }

    let upsert = headers.get("x-upsert").and_then(|h| h.to_str().ok()) == Some("true");
    if !upsert && backend.objects.contains_key(&path) {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "statusCode": "409", "error": "Duplicate", "message": "The resource already exists" })),
        )
            .into_response();
    }

    let content_type = headers
        .get("content-type")
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_string();
    backend
        .objects
        .insert(path.clone(), StoredObject { body, content_type });

    Json(json!({ "Key": path })).into_response()
}

/// Start the fake backend on an ephemeral port.
pub async fn spawn_backend(backend: FakeBackend) -> (String, SharedBackend) {
    let shared: SharedBackend = Arc::new(Mutex::new(backend));

    let app = Router::new()
        .route("/rest/v1/rpc/get_user_from_jwt", post(rpc_get_user))
        .route("/rest/v1/{table}", get(select_rows).patch(update_rows))
        .route("/storage/v1/object/{bucket}/{*key}", post(upload_object))
        .with_state(shared.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake backend");
    let addr = listener.local_addr().expect("fake backend address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake backend crashed");
    });

    (format!("http://{}", addr), shared)
}

/// Test app wired to a fake backend.
pub struct TestApp {
    pub router: Router,
    pub backend: SharedBackend,
    pub state: Arc<AppState>,
    pub base_url: String,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new(backend: FakeBackend) -> Self {
        let (base_url, backend) = spawn_backend(backend).await;
        let config = Config::test_default(&base_url);
        let state = Arc::new(AppState::new(config));

        Self {
            router: create_router(state.clone()),
            backend,
            state,
            base_url,
        }
    }

    pub async fn seeded() -> Self {
        Self::new(FakeBackend::seeded()).await
    }

    /// Send a request and decode the JSON response body.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub fn backend(&self) -> std::sync::MutexGuard<'_, FakeBackend> {
        self.backend.lock().unwrap()
    }

    /// Public URL the app should derive for an object key.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/storage/v1/object/public/images/{}", self.base_url, key)
    }
}

/// Build an upload request.
#[allow(dead_code)]
pub fn upload_request(
    uri: &str,
    token: Option<&str>,
    content_type: Option<&str>,
    body: impl Into<Body>,
) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(token) = token {
        builder = builder.header("x-token", token);
    }
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    builder.body(body.into()).unwrap()
}
