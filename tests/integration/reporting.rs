use axum::http::StatusCode;
use serde_json::json;

use crate::common::TestApp;

#[tokio::test]
async fn test_public_summary() {
    let app = TestApp::spawn().await;
    let reader = app.register_reader("leo").await;
    let book_id = app.book_id("Python").await;
    app.post(&format!("/api/v1/books/{book_id}/borrow"), Some(&reader), None)
        .await;

    let (status, body) = app.get("/api/v1/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_books"], 5);
    assert_eq!(body["total_users"], 2);
    assert_eq!(body["active_loans"], 1);
    assert_eq!(body["popular_books"][0]["id"], book_id);
    assert_eq!(body["popular_books"][0]["loan_count"], 1);
}

#[tokio::test]
async fn test_admin_routes_reject_readers() {
    let app = TestApp::spawn().await;
    let reader = app.register_reader("mallory").await;

    let (status, body) = app.get("/api/v1/admin/dashboard", Some(&reader)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "NotAuthorized");

    let (status, _) = app.get("/api/v1/users", Some(&reader)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .post(
            "/api/v1/books",
            Some(&reader),
            Some(json!({ "title": "Nope", "author": "Nobody", "total_copies": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_dashboard() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let reader = app.register_reader("nina").await;
    let book_id = app.book_id("Systems").await;
    app.post(&format!("/api/v1/books/{book_id}/borrow"), Some(&reader), None)
        .await;

    let (status, body) = app.get("/api/v1/admin/dashboard", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["counts"]["active_loans"], 1);
    assert_eq!(body["counts"]["overdue_loans"], 0);
    assert_eq!(body["books"].as_array().map(Vec::len), Some(5));
    assert_eq!(body["users"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["loans"][0]["username"], "nina");
    assert_eq!(body["loans"][0]["is_overdue"], false);
}
