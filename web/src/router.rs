//! Router assembly.

use crate::handlers::{books, health, orders};
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};

/// Builds the full application router.
///
/// # Routes
///
/// Orders (under `/api/v1`):
/// - `POST /orders`: place an order
/// - `GET /orders/my`: the caller's orders
/// - `GET /orders/admin/all`: privileged listing with filters
/// - `GET /orders/:id`: one order
/// - `PUT /orders/:id/pay`: record payment
/// - `PUT /orders/:id/deliver`: record delivery
///
/// Catalog (under `/api/v1`):
/// - `GET /books`, `POST /books`
/// - `GET /books/:id`, `PUT /books/:id`, `DELETE /books/:id`
///
/// Plus `GET /health` at the root.
#[must_use]
pub fn api_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/orders", post(orders::create_order))
        .route("/orders/my", get(orders::my_orders))
        .route("/orders/admin/all", get(orders::admin_orders))
        .route("/orders/:id", get(orders::get_order))
        .route("/orders/:id/pay", put(orders::pay_order))
        .route("/orders/:id/deliver", put(orders::deliver_order))
        .route("/books", get(books::list_books).post(books::add_book))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        );

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", api)
        .with_state(state)
}
