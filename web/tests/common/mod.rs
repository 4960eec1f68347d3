//! Shared harness for router-level tests: an app wired over the
//! in-memory stores, seeded accounts and request helpers.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
#![allow(dead_code)] // Not every test file uses every helper

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use bookery_core::User;
use bookery_testing::{fixtures, test_clock, InMemoryCatalog, InMemoryOrders, InMemoryUsers};
use bookery_web::{api_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const ADMIN_TOKEN: &str = "admin-token";
pub const READER_TOKEN: &str = "reader-token";
pub const STRANGER_TOKEN: &str = "stranger-token";

pub struct TestApp {
    pub router: Router,
    pub reader: User,
    pub stranger: User,
}

pub async fn spawn() -> TestApp {
    let catalog = Arc::new(InMemoryCatalog::new());
    let orders = Arc::new(InMemoryOrders::new());
    let users = Arc::new(InMemoryUsers::new());

    let reader = fixtures::customer("reader");
    let stranger = fixtures::customer("stranger");
    users.add(fixtures::admin(), ADMIN_TOKEN).await;
    users.add(reader.clone(), READER_TOKEN).await;
    users.add(stranger.clone(), STRANGER_TOKEN).await;

    let state = AppState::new(catalog, orders, users, Arc::new(test_clock()));
    TestApp {
        router: api_router(state),
        reader,
        stranger,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request("GET", path, token, None).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request("POST", path, token, Some(body)).await
    }

    pub async fn put(
        &self,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.request("PUT", path, token, body).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request("DELETE", path, token, None).await
    }

    /// Seeds a book through the admin endpoint, returning its id.
    pub async fn seed_book(&self, title: &str, price_cents: i64, stock: u32) -> String {
        let (status, body) = self
            .post(
                "/api/v1/books",
                Some(ADMIN_TOKEN),
                json!({
                    "title": title,
                    "author": "Test Author",
                    "description": "A book used in tests.",
                    "price": price_cents,
                    "genre": ["Fiction"],
                    "publicationYear": 2020,
                    "stockQuantity": stock,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "seeding failed: {body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }

    /// Stock currently visible through the public book endpoint.
    pub async fn stock_of(&self, book_id: &str) -> u64 {
        let (status, body) = self.get(&format!("/api/v1/books/{book_id}"), None).await;
        assert_eq!(status, StatusCode::OK, "book lookup failed: {body}");
        body["data"]["stockQuantity"].as_u64().unwrap()
    }

    /// Places an order for `quantity` of one book, returning the order id.
    pub async fn place_order(&self, token: &str, book_id: &str, quantity: i64) -> String {
        let (status, body) = self
            .post(
                "/api/v1/orders",
                Some(token),
                checkout_body(&[(book_id, quantity)], 0, 0, 0),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "checkout failed: {body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }
}

/// Builds a `POST /orders` body with the standard test address.
pub fn checkout_body(
    lines: &[(&str, i64)],
    tax_cents: i64,
    shipping_cents: i64,
    total_cents: i64,
) -> Value {
    json!({
        "orderItems": lines
            .iter()
            .map(|(book, quantity)| json!({"book": book, "quantity": quantity}))
            .collect::<Vec<_>>(),
        "shippingAddress": {
            "address": "1 Library Way",
            "city": "Springfield",
            "state": "IL",
            "postalCode": "62701",
            "country": "USA",
        },
        "paymentMethod": "Cash on Delivery",
        "taxAmount": tax_cents,
        "shippingAmount": shipping_cents,
        "totalAmount": total_cents,
    })
}

/// Standard payment confirmation body.
pub fn payment_body() -> Value {
    json!({
        "transactionId": "txn-42",
        "status": "COMPLETED",
        "emailAddress": "payer@example.com",
    })
}
