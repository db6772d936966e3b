use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Machine-readable code carried in every response header.
///
/// `0` is reserved for success (see [`ErrorCode::OK`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Generic "not found"; used for users and any other missing row.
    OfficeNotFound,
    UsernameAlreadyExists,
    EmailAlreadyExists,
    RoleNotFound,
    UnsupportedOperation,
    InvalidRequest,
    InternalError,
}

impl ErrorCode {
    /// Header code of a successful response.
    pub const OK: i32 = 0;

    pub fn code(&self) -> i32 {
        match self {
            Self::OfficeNotFound => 1,
            Self::UsernameAlreadyExists => 2,
            Self::EmailAlreadyExists => 3,
            Self::RoleNotFound => 4,
            Self::UnsupportedOperation => 5,
            Self::InvalidRequest => 6,
            Self::InternalError => 99,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OfficeNotFound => "OFFICE_NOT_FOUND",
            Self::UsernameAlreadyExists => "USERNAME_ALREADY_EXISTS",
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            Self::RoleNotFound => "ROLE_NOT_FOUND",
            Self::UnsupportedOperation => "UNSUPPORTED_OPERATION",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Username already exists: {0}")]
    UsernameAlreadyExists(String),

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("The following roles do not exist: {0:?}")]
    RolesNotFound(Vec<i32>),

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::NotFound { .. } => ErrorCode::OfficeNotFound,
            DomainError::UsernameAlreadyExists(_) => ErrorCode::UsernameAlreadyExists,
            DomainError::EmailAlreadyExists(_) => ErrorCode::EmailAlreadyExists,
            DomainError::RolesNotFound(_) => ErrorCode::RoleNotFound,
            DomainError::Validation(_) => ErrorCode::InvalidRequest,
            DomainError::Unsupported(_) => ErrorCode::UnsupportedOperation,
            DomainError::Storage(_) => ErrorCode::InternalError,
        }
    }

    pub fn user_not_found(id: i32) -> Self {
        DomainError::NotFound {
            entity: "User",
            field: "id",
            value: id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_error_maps_to_a_nonzero_code() {
        let errors = [
            DomainError::user_not_found(7),
            DomainError::UsernameAlreadyExists("john".into()),
            DomainError::EmailAlreadyExists("john@example.com".into()),
            DomainError::RolesNotFound(vec![98, 99]),
            DomainError::Validation("limit".into()),
            DomainError::Unsupported("delete"),
            DomainError::Storage("boom".into()),
        ];

        for err in &errors {
            assert_ne!(err.code().code(), ErrorCode::OK, "{err}");
        }
    }

    #[test]
    fn missing_roles_are_listed_in_message() {
        let err = DomainError::RolesNotFound(vec![98, 99]);
        assert_eq!(err.code(), ErrorCode::RoleNotFound);
        assert_eq!(err.to_string(), "The following roles do not exist: [98, 99]");
    }

    #[test]
    fn error_code_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&ErrorCode::OfficeNotFound).unwrap();
        assert_eq!(json, "\"OFFICE_NOT_FOUND\"");
        assert_eq!(ErrorCode::OfficeNotFound.as_str(), "OFFICE_NOT_FOUND");
    }
}
