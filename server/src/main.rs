//! Bookery HTTP server.
//!
//! Wires the order workflow over the in-memory document stores and
//! serves the REST API. Configuration is environment-driven:
//!
//! - `BOOKERY_ADDR`: bind address, default `0.0.0.0:3000`
//! - `BOOKERY_ADMIN_TOKEN`: bearer token for the seeded admin account,
//!   default `admin-dev-token`
//! - `RUST_LOG`: tracing filter, default `info`
//!
//! # Example requests
//!
//! ```bash
//! # Browse the catalog
//! curl http://localhost:3000/api/v1/books
//!
//! # Place an order
//! curl -X POST http://localhost:3000/api/v1/orders \
//!   -H "Authorization: Bearer admin-dev-token" \
//!   -H "Content-Type: application/json" \
//!   -d '{
//!     "orderItems": [{"book": "<book-id>", "quantity": 2}],
//!     "shippingAddress": {
//!       "address": "1 Library Way", "city": "Springfield",
//!       "state": "IL", "postalCode": "62701", "country": "USA"
//!     },
//!     "paymentMethod": "Cash on Delivery",
//!     "taxAmount": 100, "shippingAmount": 200, "totalAmount": 2300
//!   }'
//! ```

use bookery_core::SystemClock;
use bookery_testing::{fixtures, InMemoryCatalog, InMemoryOrders, InMemoryUsers};
use bookery_web::{api_router, AppState};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let catalog = Arc::new(InMemoryCatalog::new());
    let orders = Arc::new(InMemoryOrders::new());
    let users = Arc::new(InMemoryUsers::new());

    let admin_token =
        std::env::var("BOOKERY_ADMIN_TOKEN").unwrap_or_else(|_| "admin-dev-token".to_string());
    users.add(fixtures::admin(), admin_token).await;
    info!("seeded admin account (token from BOOKERY_ADMIN_TOKEN)");

    let state = AppState::new(catalog, orders, users, Arc::new(SystemClock));

    let app = api_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    let addr = std::env::var("BOOKERY_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("server listening on http://{addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
