mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{setup, TestApp};
use evswap::{create_api_router, ApiState};

fn router(app: &TestApp) -> Router {
    create_api_router(ApiState::new(app.services.clone(), app.db.clone()), None)
}

async fn call(
    app: &TestApp,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let req = match body {
        Some(body) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    let resp = router(app).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn register_and_login(app: &TestApp, email: &str) -> String {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({ "email": email, "password": "secret-password", "full_name": "Test Driver" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);

    let (status, body) = call(
        app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": email, "password": "secret-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_database() {
    let app = setup().await;
    let (status, body) = call(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"]["status"], "ok");
}

#[tokio::test]
async fn request_id_is_echoed() {
    let app = setup().await;
    let req = Request::builder()
        .uri("/health")
        .header("x-request-id", "trace-me")
        .body(Body::empty())
        .unwrap();
    let resp = router(&app).oneshot(req).await.unwrap();
    assert_eq!(resp.headers()["x-request-id"], "trace-me");
}

#[tokio::test]
async fn protected_routes_need_a_token() {
    let app = setup().await;
    let (status, body) = call(&app, Method::GET, "/api/v1/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn registered_driver_sees_own_profile() {
    let app = setup().await;
    let token = register_and_login(&app, "rider@evswap.test").await;

    let (status, body) = call(&app, Method::GET, "/api/v1/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "rider@evswap.test");
    assert_eq!(body["data"]["role"], "DRIVER");
}

#[tokio::test]
async fn drivers_cannot_reach_staff_routes() {
    let app = setup().await;
    let token = register_and_login(&app, "rider@evswap.test").await;

    let (status, _) = call(&app, Method::GET, "/api/v1/batteries", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call(&app, Method::GET, "/api/v1/reports/swaps", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = setup().await;
    register_and_login(&app, "rider@evswap.test").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "rider@evswap.test", "password": "not-the-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn invalid_registration_is_rejected() {
    let app = setup().await;
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({ "email": "not-an-email", "password": "short", "full_name": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn forged_webhook_gets_plain_ack() {
    let app = setup().await;
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/payments/webhook",
        None,
        Some(json!({ "signature": "forged", "data": { "orderCode": 1 } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn qr_session_is_created_and_polled_by_uuid() {
    let app = setup().await;

    let (status, body) = call(&app, Method::POST, "/api/v1/auth/qr", None, None).await;
    assert_eq!(status, StatusCode::CREATED);
    let session_id = body["data"]["session_id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["expires_in"], 120);

    let uri = format!("/api/v1/auth/qr/{}", session_id);
    let (status, body) = call(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "PENDING");

    let (status, _) = call(&app, Method::GET, "/api/v1/auth/qr/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn openapi_documents_uuid_session_ids() {
    let app = setup().await;
    let (status, doc) = call(&app, Method::GET, "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);

    assert!(doc["paths"]["/api/v1/auth/qr/{session_id}"]["get"].is_object());
    let session_id = &doc["components"]["schemas"]["QrSessionResponse"]["properties"]["session_id"];
    assert_eq!(session_id["format"], "uuid");
}
