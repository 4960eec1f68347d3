//! Health check endpoint.

use axum::http::StatusCode;

/// Simple liveness probe. Returns 200 OK without touching any store.
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}
