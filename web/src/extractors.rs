//! Custom Axum extractors.
//!
//! - [`CurrentUser`]: resolves the bearer token through the user
//!   directory, rejecting with a 401 envelope
//! - [`Pagination`]: `limit`/`page` query params with the listing
//!   defaults; non-numeric values fall back to the defaults
//! - [`JsonBody`]: like `Json` but rejections render as the error
//!   envelope instead of axum's plain-text body

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{header, request::Parts},
    Json,
};
use bookery_core::{PageRequest, User};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::convert::Infallible;

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::unauthorized("User not logged in"))?;

        let user = state
            .users
            .find_by_token(token)
            .await
            .map_err(|err| ApiError::from(bookery_core::Error::from(err)))?
            .ok_or_else(|| ApiError::unauthorized("Invalid Token"))?;

        Ok(Self(user))
    }
}

/// `limit`/`page` query parameters, defaulting to 10 and 1.
#[derive(Debug, Clone, Copy)]
pub struct Pagination(pub PageRequest);

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let params: HashMap<String, String> = Query::try_from_uri(&parts.uri)
            .map(|Query(params)| params)
            .unwrap_or_default();

        let page = params
            .get("page")
            .and_then(|value| value.parse().ok())
            .unwrap_or(1);
        let limit = params
            .get("limit")
            .and_then(|value| value.parse().ok())
            .unwrap_or(PageRequest::DEFAULT_LIMIT);

        Ok(Self(PageRequest::new(page, limit)))
    }
}

/// JSON body whose rejection is the uniform error envelope.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        Ok(Self(value))
    }
}
