//! Portal routes driven end to end against the fake backend

mod common;

use axum::{
    body::Body,
    http::{
        header::{CONTENT_TYPE, HOST, LOCATION, SET_COOKIE},
        Method, Request, StatusCode,
    },
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{spawn_portal, PASSWORD};

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let mut request = Request::builder()
        .method(method)
        .uri(uri)
        .header(HOST, "localhost:8090");
    let body = match body {
        Some(body) => {
            request = request.header(CONTENT_TYPE, "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };
    app.clone().oneshot(request.body(body).unwrap()).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(response: &Response) -> &str {
    response.headers()[LOCATION].to_str().unwrap()
}

async fn sign_in(app: &Router) -> Response {
    send(
        app,
        Method::POST,
        "/auth/login",
        Some(json!({ "email": "jane@lab.edu", "password": PASSWORD })),
    )
    .await
}

#[tokio::test]
async fn test_health_check() {
    let portal = spawn_portal().await;
    let response = send(&portal.app, Method::GET, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "healthy");
}

#[tokio::test]
async fn test_gated_pages_redirect_to_login() {
    let portal = spawn_portal().await;

    for (method, uri) in [
        (Method::GET, "/borrow"),
        (Method::GET, "/add-item"),
        (Method::GET, "/borrow/suggestions?q=osc"),
        (Method::DELETE, "/borrow/scan"),
    ] {
        let response = send(&portal.app, method, uri, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(location(&response), "/login");
    }

    let response = send(&portal.app, Method::POST, "/add-item", Some(json!({ "sku": "X" }))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(portal.backend.hits(), 0);
}

#[tokio::test]
async fn test_root_and_unknown_routes_redirect() {
    let portal = spawn_portal().await;

    let response = send(&portal.app, Method::GET, "/", None).await;
    assert_eq!(location(&response), "/login");

    let response = send(&portal.app, Method::GET, "/labs/physics", None).await;
    assert_eq!(location(&response), "/");

    sign_in(&portal.app).await;
    let response = send(&portal.app, Method::GET, "/", None).await;
    assert_eq!(location(&response), "/dashboard");
}

#[tokio::test]
async fn test_login_sets_cookie_and_persists_session() {
    let portal = spawn_portal().await;

    let response = sign_in(&portal.app).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response.headers()[SET_COOKIE].to_str().unwrap().to_string();
    assert!(cookie.starts_with("imx_token=tok-abc;"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(!cookie.contains("Domain="));

    let body = json_body(response).await;
    assert_eq!(body["signed_in"], true);
    assert_eq!(body["display_name"], "Jane Doe");
    assert!(body.get("token").is_none());

    let stored: Value = serde_json::from_str(&std::fs::read_to_string(&portal.session_file).unwrap()).unwrap();
    assert_eq!(stored["token"], "tok-abc");
}

#[tokio::test]
async fn test_login_validation_and_backend_errors() {
    let portal = spawn_portal().await;

    let response = send(&portal.app, Method::POST, "/auth/login", Some(json!({ "email": "jane@lab.edu" }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["message"], "Please enter email and password.");
    assert_eq!(portal.backend.hits(), 0);

    let response = send(
        &portal.app,
        Method::POST,
        "/auth/login",
        Some(json!({ "email": "jane@lab.edu", "password": "wrong" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["message"], "invalid credentials");
    assert!(!portal.session_file.exists());
}

#[tokio::test]
async fn test_add_item_rejected_locally_without_backend_call() {
    let portal = spawn_portal().await;
    sign_in(&portal.app).await;
    let before = portal.backend.hits();

    let response = send(
        &portal.app,
        Method::POST,
        "/add-item",
        Some(json!({ "sku": "OSC-2", "name": "Scope", "quantity": 1, "available_quantity": 5 })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Available must be between 0 and Quantity");
    assert_eq!(portal.backend.hits(), before);
}

#[tokio::test]
async fn test_add_item_success() {
    let portal = spawn_portal().await;
    sign_in(&portal.app).await;

    let response = send(&portal.app, Method::GET, "/add-item", None).await;
    assert_eq!(json_body(response).await["default_status"], "active");

    let response = send(
        &portal.app,
        Method::POST,
        "/add-item",
        Some(json!({ "sku": "OSC-2", "name": "Scope", "quantity": "2", "available_quantity": "2" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(json_body(response).await["record"]["id"], 3);
}

#[tokio::test]
async fn test_dashboard_aggregates_snapshot() {
    let portal = spawn_portal().await;

    let response = send(&portal.app, Method::GET, "/dashboard", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    assert_eq!(body["status"], "ready");
    assert_eq!(body["kpis"]["total"], 2);
    assert_eq!(body["kpis"]["available"], 1);
    assert_eq!(body["kpis"]["borrowed"], 1);
    assert_eq!(body["kpis"]["overdue"], 1);
    assert_eq!(body["kpis"]["maintenance_open"], 1);
    assert_eq!(body["kpis"]["utilization"], 50);

    let tables = body["tables"].as_array().unwrap();
    assert_eq!(tables.len(), 6);
    let borrows = &tables[1];
    assert_eq!(borrows["table"], "borrows");
    let flags: Vec<&str> = borrows["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["overdue_flag"].as_str().unwrap())
        .collect();
    assert_eq!(flags, vec!["", "OVERDUE"]);
    assert_eq!(tables[2]["empty_message"], "No data.");
    assert_eq!(tables[4]["row_count"], 1);
    assert_eq!(tables[5]["table"], "storage");
    assert_eq!(tables[5]["empty_message"], "No data.");
}

#[tokio::test]
async fn test_dashboard_sort_toggles_direction() {
    let portal = spawn_portal().await;
    send(&portal.app, Method::GET, "/dashboard", None).await;

    let sort = json!({ "table": "equipment", "key": "available_quantity" });
    let first = json_body(send(&portal.app, Method::POST, "/dashboard/sort", Some(sort.clone())).await).await;
    assert_eq!(first["tables"][0]["sort"]["direction"], "desc");
    assert_eq!(first["tables"][0]["rows"][0]["id"], 1);

    let second = json_body(send(&portal.app, Method::POST, "/dashboard/sort", Some(sort)).await).await;
    assert_eq!(second["tables"][0]["sort"]["direction"], "asc");
    assert_eq!(second["tables"][0]["rows"][0]["id"], 2);
}

#[tokio::test]
async fn test_dashboard_failure_shows_error_only() {
    let portal = spawn_portal().await;
    portal.backend.fail_dashboard();

    let response = send(&portal.app, Method::GET, "/dashboard", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "status": "error", "message": "db down" }));
}

#[tokio::test]
async fn test_dashboard_backend_401_redirects_to_login() {
    let portal = spawn_portal().await;
    portal.backend.reject_dashboard();

    let response = send(&portal.app, Method::GET, "/dashboard", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_concurrent_dashboard_loads_keep_their_own_results() {
    let portal = spawn_portal().await;
    portal.backend.stall_first_dashboard();

    let app = portal.app.clone();
    let slow = tokio::spawn(async move { send(&app, Method::GET, "/dashboard", None).await });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let fast = json_body(send(&portal.app, Method::GET, "/dashboard", None).await).await;
    assert_eq!(fast["status"], "ready");

    let slow = json_body(slow.await.unwrap()).await;
    assert_eq!(slow, json!({ "status": "error", "message": "db down" }));

    let sort = json!({ "table": "equipment", "key": "id" });
    let sorted = json_body(send(&portal.app, Method::POST, "/dashboard/sort", Some(sort)).await).await;
    assert_eq!(sorted["status"], "ready");
    assert_eq!(sorted["tables"][0]["aria_sort"], "ascending");
}

#[tokio::test]
async fn test_equipment_browser_filters_and_selects() {
    let portal = spawn_portal().await;

    let body = json_body(send(&portal.app, Method::GET, "/equipments?q=SHELF", None).await).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["selected"]["item"]["sku"], "OSC-1");
    assert_eq!(body["selected"]["notes"][0]["note_text"], "Probe 2 is loose");
    assert_eq!(body["selected"]["instructions"].as_array().unwrap().len(), 3);

    let body = json_body(send(&portal.app, Method::GET, "/equipments?q=&item_id=2", None).await).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["selected"]["item"]["id"], 2);
}

#[tokio::test]
async fn test_backend_401_redirects_and_404_passes_through() {
    let portal = spawn_portal().await;

    let response = send(&portal.app, Method::GET, "/equipments/999", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let response = send(&portal.app, Method::GET, "/equipments/404", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["message"], "item not found");
}

#[tokio::test]
async fn test_instruction_page_is_sanitized_with_navigation() {
    let portal = spawn_portal().await;

    let response = send(&portal.app, Method::GET, "/instructions/20", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    let html = body["html"].as_str().unwrap();
    assert!(html.contains("<h1>Setup</h1>"));
    assert!(!html.contains("<script"));
    assert_eq!(body["prev_id"], 10);
    assert_eq!(body["next_id"], 30);
    assert_eq!(body["item"]["name"], "Oscilloscope");
}

#[tokio::test]
async fn test_borrow_sends_session_credentials() {
    let portal = spawn_portal().await;
    sign_in(&portal.app).await;

    let page = json_body(send(&portal.app, Method::GET, "/borrow", None).await).await;
    assert_eq!(page["borrower_name"], "Jane Doe");

    let response = send(&portal.app, Method::POST, "/borrow", Some(json!({ "sku": " OSC-1 " }))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(json_body(response).await["message"], "Borrowed record #11 (item 1)");

    let response = send(&portal.app, Method::POST, "/borrow", Some(json!({ "sku": "" }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["message"], "Provide SKU or Item ID");
}

#[tokio::test]
async fn test_suggestions_and_unconfigured_scanner() {
    let portal = spawn_portal().await;
    sign_in(&portal.app).await;

    let body = json_body(send(&portal.app, Method::GET, "/borrow/suggestions?q=multi", None).await).await;
    assert_eq!(body, json!([{ "id": 2, "sku": "MM-7", "name": "Multimeter", "available": 0 }]));

    let response = send(&portal.app, Method::POST, "/borrow/scan/borrow", None).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = send(&portal.app, Method::DELETE, "/borrow/scan", None).await;
    assert_eq!(json_body(response).await["state"], "idle");
}

#[tokio::test]
async fn test_logout_clears_session_and_cookie() {
    let portal = spawn_portal().await;
    sign_in(&portal.app).await;
    assert!(portal.session_file.exists());

    let response = send(&portal.app, Method::POST, "/auth/logout", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    assert!(response.headers()[SET_COOKIE].to_str().unwrap().contains("Max-Age=0"));

    let body = json_body(send(&portal.app, Method::GET, "/auth/session", None).await).await;
    assert_eq!(body["signed_in"], false);
    assert!(!portal.session_file.exists());
}
