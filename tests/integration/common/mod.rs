//! In-process fake of the lab management REST API

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::{
        header::{AUTHORIZATION, COOKIE},
        HeaderMap, StatusCode,
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use lab_portal::{api, build_state, config::AppConfig};

pub const TOKEN: &str = "tok-abc";
pub const PASSWORD: &str = "secret123";

#[derive(Clone, Default)]
pub struct FakeState {
    pub hits: Arc<AtomicUsize>,
    pub fail_dashboard: Arc<AtomicBool>,
    pub reject_dashboard: Arc<AtomicBool>,
    pub stall_first_dashboard: Arc<AtomicBool>,
    pub dashboard_calls: Arc<AtomicUsize>,
}

pub struct FakeBackend {
    pub base_url: String,
    pub state: FakeState,
}

impl FakeBackend {
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn fail_dashboard(&self) {
        self.state.fail_dashboard.store(true, Ordering::SeqCst);
    }

    pub fn reject_dashboard(&self) {
        self.state.reject_dashboard.store(true, Ordering::SeqCst);
    }

    /// The first dashboard fetch answers late with a 500, later ones at once
    pub fn stall_first_dashboard(&self) {
        self.state.stall_first_dashboard.store(true, Ordering::SeqCst);
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TOKEN))
        .unwrap_or(false);
    let cookie = headers
        .get(COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains(&format!("imx_token={}", TOKEN)))
        .unwrap_or(false);
    bearer && cookie
}

fn equipment() -> Value {
    json!([
        {
            "id": 1, "sku": "OSC-1", "name": "Oscilloscope", "category": "equipment",
            "location": "Shelf A1", "quantity": 4, "available_quantity": "3", "status": "active"
        },
        {
            "id": 2, "sku": "MM-7", "name": "Multimeter", "category": "tool",
            "location": "Drawer 3", "quantity": 2, "available_quantity": 0, "status": "active"
        }
    ])
}

async fn count_hits(State(state): State<FakeState>, request: Request, next: Next) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    next.run(request).await
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] != PASSWORD {
        return error(StatusCode::BAD_REQUEST, "invalid credentials");
    }
    Json(json!({
        "token": TOKEN,
        "exp": (Utc::now() + Duration::hours(1)).timestamp(),
        "user": { "id": 7, "username": "jdoe", "full_name": "Jane Doe", "email": "jane@lab.edu" }
    }))
    .into_response()
}

async fn logout() -> Json<Value> {
    Json(json!({ "ok": true }))
}

async fn dashboard_stat(State(state): State<FakeState>) -> Response {
    let call = state.dashboard_calls.fetch_add(1, Ordering::SeqCst);
    if state.reject_dashboard.load(Ordering::SeqCst) {
        return error(StatusCode::UNAUTHORIZED, "missing or invalid auth");
    }
    if state.stall_first_dashboard.load(Ordering::SeqCst) && call == 0 {
        tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        return error(StatusCode::INTERNAL_SERVER_ERROR, "db down");
    }
    if state.fail_dashboard.load(Ordering::SeqCst) {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "db down");
    }
    let now = Utc::now();
    Json(json!({
        "log_lab_equipment_master": equipment(),
        "log_lab_borrow_records": [
            {
                "id": 1, "item_id": 1, "user_id": 7, "quantity": 1,
                "borrow_date": (now - Duration::days(10)).to_rfc3339(),
                "return_date": (now - Duration::days(2)).to_rfc3339(),
                "actual_return_date": null, "status": "borrowed"
            },
            {
                "id": 2, "item_id": 2, "user_id": 7, "quantity": 2,
                "borrow_date": (now - Duration::days(5)).to_rfc3339(),
                "return_date": (now - Duration::days(1)).to_rfc3339(),
                "actual_return_date": (now - Duration::days(3)).to_rfc3339(),
                "status": "returned"
            }
        ],
        "log_lab_maintenance_records": [
            { "id": 1, "item_id": 2, "date_reported": "2024-01-02", "date_fixed": null }
        ],
        "log_lab_calibration_logs": [],
        "log_lab_activity_logs": [
            { "id": 1, "user_id": 7, "action": "Borrowed Oscilloscope (OSC-1) x1", "timestamp": now.to_rfc3339() },
            { "id": null, "action": "orphaned" }
        ],
        "log_lab_storage": { "error": "query error" }
    }))
    .into_response()
}

async fn list_items() -> Json<Value> {
    Json(json!({ "items": equipment() }))
}

async fn get_item(Path(id): Path<i64>) -> Response {
    match id {
        999 => error(StatusCode::UNAUTHORIZED, "missing or invalid auth"),
        1 | 2 => {
            let items = equipment();
            Json(items[(id - 1) as usize].clone()).into_response()
        }
        _ => error(StatusCode::NOT_FOUND, "item not found"),
    }
}

async fn create_item(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "missing or invalid auth");
    }
    (StatusCode::CREATED, Json(json!({ "id": 3 }))).into_response()
}

async fn borrow(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "missing or invalid auth");
    }
    if body["user_id"] != 7 || body["borrower_name"] != "Jane Doe" {
        return error(StatusCode::BAD_REQUEST, "unexpected borrower");
    }
    (StatusCode::CREATED, Json(json!({ "id": 11, "item_id": 1, "status": "borrowed" }))).into_response()
}

async fn list_instructions() -> Json<Value> {
    Json(json!([
        { "id": 30, "item_id": 1, "title": "Calibration" },
        { "id": 20, "item_id": 1, "title": "Setup" },
        { "id": 10, "item_id": 1, "title": "Unboxing" }
    ]))
}

async fn get_instruction(Path(id): Path<i64>) -> Json<Value> {
    Json(json!({
        "id": id,
        "item_id": 1,
        "title": "Setup",
        "body": "# Setup\n\nConnect the probe.\n\n<script>alert(1)</script>"
    }))
}

async fn list_notes() -> Json<Value> {
    Json(json!({ "notes": [{ "id": 1, "item_id": 1, "note_text": "Probe 2 is loose" }] }))
}

pub async fn spawn_backend() -> FakeBackend {
    let state = FakeState::default();

    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/dashboard-stat", get(dashboard_stat))
        .route("/api/items", get(list_items).post(create_item))
        .route("/api/items/borrow", post(borrow))
        .route("/api/items/:id", get(get_item))
        .route("/api/instructions", get(list_instructions))
        .route("/api/instructions/:id", get(get_instruction))
        .route("/api/equipment-notes", get(list_notes))
        .layer(middleware::from_fn_with_state(state.clone(), count_hits))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeBackend {
        base_url: format!("http://{}", addr),
        state,
    }
}

pub struct Portal {
    pub app: Router,
    pub backend: FakeBackend,
    pub session_file: PathBuf,
}

/// Portal wired to a fresh fake backend and an empty session store
pub async fn spawn_portal() -> Portal {
    let backend = spawn_backend().await;
    let session_file = std::env::temp_dir()
        .join(format!("lab-portal-it-{}", uuid::Uuid::new_v4()))
        .join("session.json");

    let mut config = AppConfig::default();
    config.backend.base_url = backend.base_url.clone();
    config.session.store_path = session_file.clone();

    let state = build_state(config).await.unwrap();
    Portal {
        app: api::create_router(state),
        backend,
        session_file,
    }
}
