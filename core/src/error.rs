//! Typed failure taxonomy for the order workflow.
//!
//! Every validation and business-rule failure is one of these variants,
//! each carrying an HTTP status code and a client-facing message. The web
//! boundary converts them into the uniform error envelope; anything that
//! is not one of these surfaces as a generic 500 without leaking
//! internals.

use thiserror::Error;

/// Failure taxonomy shared by the whole workflow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed or missing request input.
    #[error("{0}")]
    InvalidRequest(String),

    /// A referenced identifier is structurally malformed.
    #[error("{0}")]
    InvalidReference(String),

    /// A referenced book, order or user does not exist (or is inactive).
    #[error("{0}")]
    NotFound(String),

    /// Missing or invalid authentication.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not permitted.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Requested quantity exceeds available stock.
    #[error(
        "Insufficient stock for book \"{title}\". Available: {available}, Requested: {requested}"
    )]
    InsufficientStock {
        /// Title of the offending book.
        title: String,
        /// Stock available at the time of the request.
        available: u32,
        /// Quantity the caller asked for.
        requested: u32,
    },

    /// Idempotency guard: the order is already paid.
    #[error("Order is already marked as paid.")]
    AlreadyPaid,

    /// Idempotency guard: the order is already delivered.
    #[error("Order is already marked as delivered.")]
    AlreadyDelivered,

    /// Unexpected failure; the message is logged, never sent to clients.
    #[error("{0}")]
    Internal(String),
}

impl Error {
    /// HTTP status code this failure maps to.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest(_)
            | Self::InvalidReference(_)
            | Self::InsufficientStock { .. }
            | Self::AlreadyPaid
            | Self::AlreadyDelivered => 400,
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Internal(_) => 500,
        }
    }
}
