//! Path and query extractors that reject with the coded envelope
//!
//! Plain `axum::extract::{Path, Query}` answer a malformed id or query string
//! with a bare text body. These wrappers turn the rejection into an
//! `INVALID_REQUEST` [`ApiError`] instead.

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::FromRequestParts;

use super::ApiError;
use crate::domain::DomainError;

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(DomainError::Validation(format!("Invalid path: {}", rejection.body_text())))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(DomainError::Validation(format!("Invalid query: {}", rejection.body_text())))
    }
}
