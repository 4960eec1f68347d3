//! # Bookery Web
//!
//! Axum HTTP surface for the Bookery backend.
//!
//! The web layer is a thin shell over `bookery-core`: handlers extract
//! and convert, the services decide. Every response uses the uniform
//! envelope `{statusCode, data|null, message, success}`; every failure
//! renders as `{statusCode, message, success:false}`.
//!
//! # Request Flow
//!
//! 1. **HTTP request** arrives at an Axum handler
//! 2. **Extractors** resolve the bearer token ([`CurrentUser`]) and
//!    pagination, and parse the JSON body with envelope-shaped
//!    rejections ([`extractors::JsonBody`])
//! 3. **Handlers** convert DTOs into domain types and call a service
//! 4. **Services** run the workflow against the stores
//! 5. **Results** are wrapped in [`ApiResponse`]; domain errors convert
//!    into [`ApiError`] via their status codes

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;
pub mod state;

// Re-export key types for convenience
pub use error::ApiError;
pub use extractors::{CurrentUser, Pagination};
pub use response::ApiResponse;
pub use router::api_router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, ApiError>;
