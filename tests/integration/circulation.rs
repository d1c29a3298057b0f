use axum::http::StatusCode;
use serde_json::json;

use crate::common::TestApp;

#[tokio::test]
async fn test_borrow_and_return_flow() {
    let app = TestApp::spawn().await;
    let token = app.register_reader("erin").await;
    let book_id = app.book_id("Design").await;

    let (_, before) = app.get(&format!("/api/v1/books/{book_id}"), None).await;
    let available = before["available_copies"].as_i64().expect("available");

    let (status, loan) = app
        .post(&format!("/api/v1/books/{book_id}/borrow"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(loan["book_id"], book_id);
    assert_eq!(loan["is_returned"], false);

    let (_, during) = app.get(&format!("/api/v1/books/{book_id}"), None).await;
    assert_eq!(during["available_copies"].as_i64(), Some(available - 1));

    let (status, mine) = app.get("/api/v1/loans/mine", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().map(Vec::len), Some(1));
    assert_eq!(mine[0]["title"], "Design Patterns");
    assert_eq!(mine[0]["is_overdue"], false);

    let loan_id = loan["id"].as_i64().expect("loan id");
    let (status, returned) = app
        .post(&format!("/api/v1/loans/{loan_id}/return"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(returned["loan"]["is_returned"], true);
    assert_eq!(returned["fine"].as_str().map(|f| f.parse::<f64>().ok()), Some(Some(0.0)));

    let (_, after) = app.get(&format!("/api/v1/books/{book_id}"), None).await;
    assert_eq!(after["available_copies"].as_i64(), Some(available));

    let (status, body) = app
        .post(&format!("/api/v1/loans/{loan_id}/return"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "AlreadyReturned");
}

#[tokio::test]
async fn test_borrow_refusals() {
    let app = TestApp::spawn().await;
    let first = app.register_reader("frank").await;
    let second = app.register_reader("grace").await;
    // Single-copy title
    let book_id = app.book_id("Algorithms").await;

    let (status, _) = app
        .post(&format!("/api/v1/books/{book_id}/borrow"), Some(&first), None)
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .post(&format!("/api/v1/books/{book_id}/borrow"), Some(&second), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "ItemNotAvailable");

    let (status, body) = app.post("/api/v1/books/9999/borrow", Some(&second), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NoSuchData");

    let python = app.book_id("Python").await;
    let (status, _) = app
        .post(&format!("/api/v1/books/{python}/borrow"), Some(&second), None)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = app
        .post(&format!("/api/v1/books/{python}/borrow"), Some(&second), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "AlreadyBorrowed");
}

#[tokio::test]
async fn test_loan_limit() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let reader = app.register_reader("heidi").await;

    let mut book_ids = Vec::new();
    for n in 0..6 {
        let (status, book) = app
            .post(
                "/api/v1/books",
                Some(&admin),
                Some(json!({
                    "title": format!("Volume {n}"),
                    "author": "Anon",
                    "total_copies": 2
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        book_ids.push(book["id"].as_i64().expect("id"));
    }

    for id in &book_ids[..5] {
        let (status, _) = app
            .post(&format!("/api/v1/books/{id}/borrow"), Some(&reader), None)
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app
        .post(&format!("/api/v1/books/{}/borrow", book_ids[5]), Some(&reader), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "MaxBorrowsReached");
}

#[tokio::test]
async fn test_cannot_return_someone_elses_loan() {
    let app = TestApp::spawn().await;
    let owner = app.register_reader("ivan").await;
    let other = app.register_reader("judy").await;
    let book_id = app.book_id("Flask").await;

    let (_, loan) = app
        .post(&format!("/api/v1/books/{book_id}/borrow"), Some(&owner), None)
        .await;
    let loan_id = loan["id"].as_i64().expect("loan id");

    let (status, _) = app
        .post(&format!("/api/v1/loans/{loan_id}/return"), Some(&other), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_and_history() {
    let app = TestApp::spawn().await;
    let reader = app.register_reader("ken").await;

    let (status, books) = app.get("/api/v1/books?search=python", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(books.as_array().map(Vec::len), Some(1));

    let (_, categories) = app.get("/api/v1/books/categories", None).await;
    assert!(categories
        .as_array()
        .expect("categories")
        .iter()
        .any(|c| c == "Algorithms"));

    let (status, books) = app.get("/api/v1/books?category=Algorithms", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(books[0]["title"], "Introduction to Algorithms");

    let book_id = books[0]["id"].as_i64().expect("id");
    app.post(&format!("/api/v1/books/{book_id}/borrow"), Some(&reader), None)
        .await;

    let (status, history) = app.get(&format!("/api/v1/books/{book_id}/loans"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history[0]["username"], "ken");

    let (status, _) = app.get("/api/v1/books/9999/loans", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
