//! Uniform success envelope.
//!
//! Every successful response carries the same shape:
//! `{statusCode, data, message, success:true}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Success response envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    status_code: u16,
    data: Option<T>,
    message: String,
    success: bool,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wraps a payload in the envelope.
    #[must_use]
    pub fn new(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            data: Some(data),
            message: message.into(),
            success: true,
        }
    }
}

impl ApiResponse<()> {
    /// Envelope with a `null` data field.
    #[must_use]
    pub fn empty(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            data: None,
            message: message.into(),
            success: true,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}
