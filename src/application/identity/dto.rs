//! Wire DTOs for the user service

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::{Role, User};

/// Reference to a role. Only `id` is read on input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RoleDto {
    pub id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl RoleDto {
    pub fn new(id: i32) -> Self {
        Self { id, name: None }
    }
}

impl From<Role> for RoleDto {
    fn from(r: Role) -> Self {
        Self {
            id: r.id,
            name: Some(r.name),
        }
    }
}

/// User API representation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    /// Assigned by the store; ignored on create
    #[serde(default)]
    pub id: Option<i32>,
    #[validate(length(min = 3, max = 50, message = "must be 3-50 characters"))]
    pub username: String,
    #[validate(email(message = "must be a valid email address"), length(max = 255))]
    pub email: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub name: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub roles: Vec<RoleDto>,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            name: u.name,
            last_name: u.last_name,
            roles: u.roles.into_iter().map(RoleDto::from).collect(),
        }
    }
}

impl UserDto {
    /// Entity for a fresh insert: id cleared, roles by reference only.
    pub fn into_new_user(self) -> User {
        User {
            id: None,
            username: self.username,
            email: self.email,
            name: self.name,
            last_name: self.last_name,
            roles: self
                .roles
                .into_iter()
                .map(|r| Role {
                    id: r.id,
                    name: r.name.unwrap_or_default(),
                })
                .collect(),
        }
    }
}

/// Offset/limit query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams, ToSchema)]
pub struct PaginatedRequestDto {
    /// Number of rows to skip. Default: 0
    pub offset: Option<u64>,
    /// Page size. Default and maximum come from configuration
    pub limit: Option<u64>,
}

impl PaginatedRequestDto {
    pub fn new(offset: u64, limit: u64) -> Self {
        Self {
            offset: Some(offset),
            limit: Some(limit),
        }
    }
}

/// One page of results
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponseDto<T> {
    /// `offset / limit`; exact only when the offset is a multiple of the limit
    pub page: u64,
    pub limit: u64,
    /// Total number of rows across all pages
    pub total: u64,
    pub data: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_dto_uses_camel_case() {
        let dto = UserDto {
            id: Some(4),
            username: "johndoe".into(),
            email: "john.doe@example.com".into(),
            name: "John".into(),
            last_name: "Doe".into(),
            roles: vec![RoleDto::new(1)],
        };

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["lastName"], "Doe");
        assert_eq!(json["roles"][0], serde_json::json!({"id": 1}));
    }

    #[test]
    fn new_user_drops_client_id() {
        let dto = UserDto {
            id: Some(42),
            username: "johndoe".into(),
            email: "john.doe@example.com".into(),
            roles: vec![RoleDto::new(2)],
            ..Default::default()
        };

        let user = dto.into_new_user();
        assert_eq!(user.id, None);
        assert_eq!(user.role_ids(), vec![2]);
    }

    #[test]
    fn validation_rejects_bad_email_and_short_username() {
        let dto = UserDto {
            username: "jo".into(),
            email: "not-an-email".into(),
            ..Default::default()
        };

        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
    }
}
