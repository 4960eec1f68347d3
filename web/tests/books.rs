//! Router-level tests for the catalog endpoints.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

mod common;

use axum::http::StatusCode;
use common::{checkout_body, ADMIN_TOKEN, READER_TOKEN};
use serde_json::json;

#[tokio::test]
async fn health_endpoint_answers_ok() {
    let app = common::spawn().await;
    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::Value::String("ok".to_string()));
}

#[tokio::test]
async fn adding_books_is_admin_only() {
    let app = common::spawn().await;

    let body = json!({
        "title": "Dune",
        "author": "Frank Herbert",
        "description": "Spice and sand.",
        "price": 1000,
        "genre": ["Science Fiction"],
        "publicationYear": 1965,
        "stockQuantity": 5,
    });

    let (status, _) = app
        .post("/api/v1/books", Some(READER_TOKEN), body.clone())
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = app.post("/api/v1/books", Some(ADMIN_TOKEN), body.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["title"], "Dune");
    assert_eq!(created["data"]["isActive"], true);

    // Same title+author pair is rejected.
    let (status, duplicate) = app.post("/api/v1/books", Some(ADMIN_TOKEN), body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(duplicate["message"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn adding_a_book_requires_all_fields() {
    let app = common::spawn().await;

    let (status, body) = app
        .post(
            "/api/v1/books",
            Some(ADMIN_TOKEN),
            json!({"title": "Dune", "author": "Frank Herbert"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Please fill in all required fields"));

    let (status, body) = app
        .post(
            "/api/v1/books",
            Some(ADMIN_TOKEN),
            json!({
                "title": "Dune",
                "author": "Frank Herbert",
                "description": "Spice and sand.",
                "price": 1000,
                "genre": ["Gardening"],
                "publicationYear": 1965,
                "stockQuantity": 5,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Invalid genre"));
}

#[tokio::test]
async fn listing_filters_by_keyword_and_paginates() {
    let app = common::spawn().await;
    app.seed_book("Dune", 1000, 5).await;
    app.seed_book("Dune Messiah", 1100, 5).await;
    app.seed_book("Emma", 900, 5).await;

    let (status, body) = app.get("/api/v1/books?limit=2&page=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalBooks"], 3);
    assert_eq!(body["data"]["pages"], 2);
    assert_eq!(body["data"]["books"].as_array().unwrap().len(), 2);

    let (_, body) = app.get("/api/v1/books?keyword=dune", None).await;
    assert_eq!(body["data"]["totalBooks"], 2);

    let (_, body) = app.get("/api/v1/books?keyword=austen", None).await;
    assert_eq!(body["data"]["totalBooks"], 0);

    let (_, body) = app.get("/api/v1/books?genre=Fiction", None).await;
    assert_eq!(body["data"]["totalBooks"], 3);

    let (status, _) = app.get("/api/v1/books?genre=Gardening", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn updates_reject_noops_and_apply_changes() {
    let app = common::spawn().await;
    let book = app.seed_book("Dune", 1000, 5).await;
    let path = format!("/api/v1/books/{book}");

    let (status, body) = app.put(&path, Some(ADMIN_TOKEN), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("no changes detected"));

    let (status, body) = app
        .put(&path, Some(ADMIN_TOKEN), Some(json!({"price": 1500, "stockQuantity": 7})))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["price"], 1500);
    assert_eq!(body["data"]["stockQuantity"], 7);

    let (status, _) = app
        .put(&path, Some(READER_TOKEN), Some(json!({"price": 1})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn soft_deleted_books_are_hidden_and_not_orderable() {
    let app = common::spawn().await;
    let book = app.seed_book("Dune", 1000, 5).await;
    let path = format!("/api/v1/books/{book}");

    let (status, _) = app.delete(&path, Some(READER_TOKEN)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.delete(&path, Some(ADMIN_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], serde_json::Value::Null);
    assert_eq!(body["message"], "Book deleted successfully (soft deleted).");

    // Hidden from the public catalog.
    let (status, _) = app.get(&path, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, listing) = app.get("/api/v1/books", None).await;
    assert_eq!(listing["data"]["totalBooks"], 0);

    // Not orderable.
    let (status, _) = app
        .post(
            "/api/v1/orders",
            Some(READER_TOKEN),
            checkout_body(&[(&book, 1)], 0, 0, 1000),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Deleting again reports the gone book.
    let (status, body) = app.delete(&path, Some(ADMIN_TOKEN)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains("already deleted"));
}

#[tokio::test]
async fn unknown_book_lookups_fail_cleanly() {
    let app = common::spawn().await;

    let (status, _) = app.get("/api/v1/books/garbled", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .get("/api/v1/books/00000000-0000-4000-8000-000000000000", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}
