//! Response envelope and error mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::domain::{DomainError, ErrorCode};

/// Outcome header of every [`GenericResponseDto`]
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HeaderDto {
    /// `0` on success, otherwise an [`ErrorCode`] value
    pub code: i32,
    pub message: String,
}

/// Standard response wrapper.
///
/// Success: `{"header": {"code": 0, "message": "OK"}, "body": {...}}`,
/// failure: `{"header": {"code": 2, "message": "..."}}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenericResponseDto<T> {
    pub header: HeaderDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<T>,
}

impl<T> GenericResponseDto<T> {
    pub fn success(body: T) -> Self {
        Self {
            header: HeaderDto {
                code: ErrorCode::OK,
                message: "OK".to_string(),
            },
            body: Some(body),
        }
    }

    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            header: HeaderDto {
                code: code.code(),
                message: message.into(),
            },
            body: None,
        }
    }
}

/// Handler error: a [`DomainError`] rendered as a coded envelope.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

pub fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::UsernameAlreadyExists(_) | DomainError::EmailAlreadyExists(_) => {
            StatusCode::CONFLICT
        }
        DomainError::RolesNotFound(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Unsupported(_) => StatusCode::NOT_IMPLEMENTED,
        DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let message = match &self.0 {
            // Do not leak driver messages to clients
            DomainError::Storage(detail) => {
                error!(%detail, "Storage failure while handling request");
                "Internal storage error".to_string()
            }
            other => other.to_string(),
        };

        let body = GenericResponseDto::<()>::error(self.0.code(), message);
        (status, Json(body)).into_response()
    }
}
