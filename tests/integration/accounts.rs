use axum::http::StatusCode;
use serde_json::json;

use crate::common::TestApp;

#[tokio::test]
async fn test_health_and_readiness() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get("/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.get("/api/v1/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_register_login_and_me() {
    let app = TestApp::spawn().await;
    let token = app.register_reader("alice").await;

    let (status, body) = app.get("/api/v1/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["is_admin"], false);
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_rejects_duplicate_and_mismatch() {
    let app = TestApp::spawn().await;
    app.register_reader("bob").await;

    let (status, body) = app
        .post(
            "/api/v1/auth/register",
            None,
            Some(json!({
                "username": "bob",
                "password": "secret1",
                "confirm_password": "secret1"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Duplicate");

    let (status, _) = app
        .post(
            "/api/v1/auth/register",
            None,
            Some(json!({
                "username": "carol",
                "password": "secret1",
                "confirm_password": "secret2"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .post(
            "/api/v1/auth/login",
            None,
            Some(json!({ "username": "admin", "password": "wrong" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "NotAuthorized");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::spawn().await;

    let (status, _) = app.get("/api/v1/loans/mine", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/api/v1/auth/me", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_deactivated_user_cannot_log_in() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let reader = app.register_reader("dave").await;

    let (_, me) = app.get("/api/v1/auth/me", Some(&reader)).await;
    let id = me["id"].as_i64().expect("id");

    let (status, body) = app
        .post(&format!("/api/v1/users/{id}/deactivate"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], false);

    let (status, _) = app
        .post(
            "/api/v1/auth/login",
            None,
            Some(json!({ "username": "dave", "password": "secret1" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
